pub mod search;
pub mod version;

use std::time::Duration;

use anyhow::Result;
use biolitminer_client::{ClientConfig, PubMedClient};

pub fn create_client(email: &str, timeout_secs: u64) -> Result<PubMedClient> {
    let config = ClientConfig::new()
        .with_email(email)
        .with_timeout(Duration::from_secs(timeout_secs));

    Ok(PubMedClient::with_config(config)?)
}
