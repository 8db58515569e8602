use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use biolitminer_client::{PubMedClient, SearchExport, export_filename};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use crate::logging::LogControl;
use crate::views::{self, FormState, SearchOutcome};

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const MAX_RESULTS_LIMIT: usize = 100;

/// State shared by all handlers
///
/// One client serves every request so pacing holds across searches; the
/// mutex keeps its calls sequential.
pub struct AppState {
    client: Mutex<PubMedClient>,
    default_email: String,
    last_export: RwLock<Option<SearchExport>>,
    logs: LogControl,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(client: PubMedClient, logs: LogControl) -> Self {
        let default_email = client.email().to_string();
        Self {
            client: Mutex::new(client),
            default_email,
            last_export: RwLock::new(None),
            logs,
        }
    }

    fn default_form(&self) -> FormState {
        FormState {
            query: String::new(),
            email: self.default_email.clone(),
            max_results: DEFAULT_MAX_RESULTS,
            verbose: self.logs.is_verbose(),
            show_abstracts: true,
        }
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/export.json", get(export_json))
        .route("/clear", get(clear))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query string of the search form; checkboxes are present only when ticked
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
    email: Option<String>,
    max_results: Option<String>,
    verbose: Option<String>,
    show_abstracts: Option<String>,
}

impl SearchParams {
    fn form_state(&self, default_email: &str) -> FormState {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(default_email);

        FormState {
            query: self.query.trim().to_string(),
            email: email.to_string(),
            max_results: self.max_results(),
            verbose: self.verbose.is_some(),
            show_abstracts: self.show_abstracts.is_some(),
        }
    }

    /// A cleared or non-numeric field falls back to the default
    fn max_results(&self) -> usize {
        let Some(requested) = self
            .max_results
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
        else {
            return DEFAULT_MAX_RESULTS;
        };
        requested.clamp(1, MAX_RESULTS_LIMIT as i64) as usize
    }
}

fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(views::index_page(&state.default_form(), version()))
}

#[instrument(skip(state, params), fields(query = %params.query))]
async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let form = params.form_state(&state.default_email);
    state.logs.set_verbose(form.verbose);

    if form.query.is_empty() {
        return Html(views::missing_query_page(&form, version()));
    }

    let (pmids, articles) = {
        let mut client = state.client.lock().await;
        client.set_email(form.email.as_str());

        let pmids = client.search_articles(&form.query, form.max_results).await;
        let articles = if pmids.is_empty() {
            Vec::new()
        } else {
            client.fetch_articles(&pmids).await
        };
        (pmids, articles)
    };

    info!(
        found = pmids.len(),
        parsed = articles.len(),
        "Dashboard search finished"
    );

    let outcome = if pmids.is_empty() {
        SearchOutcome::NoArticles
    } else if articles.is_empty() {
        SearchOutcome::Unparsed
    } else {
        SearchOutcome::Found {
            articles: &articles,
            total_ids: pmids.len(),
        }
    };
    let page = views::results_page(&form, version(), &outcome);

    if !articles.is_empty() {
        *state.last_export.write().await = Some(SearchExport::new(form.query.as_str(), articles));
    }

    Html(page)
}

async fn export_json(State(state): State<SharedState>) -> Response {
    let stored = state.last_export.read().await;
    let Some(export) = stored.as_ref() else {
        return (StatusCode::NOT_FOUND, "No search results to export").into_response();
    };

    match export.to_json_pretty() {
        Ok(json) => {
            let disposition = format!("attachment; filename=\"{}\"", export_filename("json"));
            (
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                json,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize export");
            (StatusCode::INTERNAL_SERVER_ERROR, "Export failed").into_response()
        }
    }
}

async fn clear(State(state): State<SharedState>) -> Redirect {
    *state.last_export.write().await = None;
    Redirect::to("/")
}
