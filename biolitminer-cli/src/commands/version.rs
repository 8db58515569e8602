use owo_colors::OwoColorize;

pub fn execute() {
    println!("{} version {}", "BioLitMiner".bold().blue(), version().green());
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
