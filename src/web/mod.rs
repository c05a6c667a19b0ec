mod handlers;
pub mod render;

use crate::components::shifts::{RoleView, ShiftAggregator};
use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use url::form_urlencoded;

pub use handlers::{api_shifts_handler, dashboard_handler, health_handler, refresh_handler};

/// Site selector value meaning every site
pub const ALL_SITES: &str = "all";

#[derive(Clone)]
pub struct AppState {
    /// Aggregator over the configured feeds
    pub aggregator: ShiftAggregator,
}

/// Dashboard controls carried in the query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardQuery {
    /// Site id, or `all`
    pub site: Option<String>,
    /// Free-text search over names and roles
    pub q: Option<String>,
    /// `standard` or `mc`
    pub view: Option<String>,
}

impl DashboardQuery {
    /// Selected site id, `None` for all sites
    pub fn site_id(&self) -> Option<&str> {
        self.site
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ALL_SITES)
    }

    pub fn search(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }

    /// Requested view, falling back to the standard buckets
    pub fn role_view(&self) -> RoleView {
        self.view
            .as_deref()
            .and_then(RoleView::from_query)
            .unwrap_or_default()
    }

    /// Encode the controls back into a query string, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(site) = self.site_id() {
            serializer.append_pair("site", site);
        }
        if !self.search().trim().is_empty() {
            serializer.append_pair("q", self.search());
        }
        if self.role_view() != RoleView::Standard {
            serializer.append_pair("view", self.role_view().query_value());
        }
        serializer.finish()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/refresh", post(refresh_handler))
        .route("/api/shifts", get(api_shifts_handler))
        .route("/health", get(health_handler))
        // Serve static files
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
