use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::render::{render_config_error, render_dashboard, DashboardOutcome, DashboardPage};
use super::{AppState, DashboardQuery};
use crate::components::shifts::{
    apply_search_filter, regroup_for_mc_view, select_site, RoleView, SiteMeta, SiteSchedule,
};
use crate::error::{Error, ShiftResult};

/// Sites after selection, regrouping and search, plus the selector options
struct DashboardData {
    site_options: Vec<SiteMeta>,
    sites: Vec<SiteSchedule>,
}

/// Run one render cycle: aggregate, select site, regroup, then filter
async fn load_dashboard(
    state: &AppState,
    query: &DashboardQuery,
    now: DateTime<Utc>,
) -> ShiftResult<DashboardData> {
    let all_sites = state.aggregator.active_shifts(now).await?;
    let site_options = all_sites.iter().map(|s| s.site.clone()).collect();

    let selected = select_site(all_sites, query.site_id());
    let regrouped = match query.role_view() {
        RoleView::Standard => selected,
        RoleView::McFocused => regroup_for_mc_view(&selected),
    };
    let sites = apply_search_filter(&regrouped, query.search());

    Ok(DashboardData {
        site_options,
        sites,
    })
}

/// Handler for the dashboard page
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let now = Utc::now();
    let timezone = state.aggregator.config().timezone;

    let (site_options, outcome) = match load_dashboard(&state, &query, now).await {
        Ok(data) if data.site_options.is_empty() => (data.site_options, DashboardOutcome::NobodyScheduled),
        Ok(data) if data.sites.is_empty() => (data.site_options, DashboardOutcome::NoMatch),
        Ok(data) => (data.site_options, DashboardOutcome::Sites(data.sites)),
        Err(e) if e.is_config() => {
            error!("Configuration error: {}", e);
            return Html(render_config_error(&e.to_string()));
        }
        Err(e) => {
            error!("Error fetching or parsing schedule: {}", e);
            (Vec::new(), DashboardOutcome::FetchError(e.to_string()))
        }
    };

    Html(render_dashboard(&DashboardPage {
        now,
        timezone,
        query: &query,
        site_options,
        outcome,
    }))
}

/// Handler for the refresh button: clear the cache and go back to the dashboard
pub async fn refresh_handler(
    State(state): State<AppState>,
    Form(query): Form<DashboardQuery>,
) -> Response {
    if let Err(e) = state.aggregator.refresh().await {
        error!("Failed to clear feed cache: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    let target = match query.to_query_string() {
        params if params.is_empty() => "/".to_string(),
        params => format!("/?{}", params),
    };
    Redirect::to(&target).into_response()
}

#[derive(Debug, Serialize)]
struct ShiftsResponse {
    generated_at: DateTime<Utc>,
    view: RoleView,
    sites: Vec<SiteSchedule>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// JSON view of the same data as the dashboard
pub async fn api_shifts_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let now = Utc::now();

    match load_dashboard(&state, &query, now).await {
        Ok(data) => {
            info!("Serving {} sites as JSON", data.sites.len());
            Json(ShiftsResponse {
                generated_at: now,
                view: query.role_view(),
                sites: data.sites,
            })
            .into_response()
        }
        Err(e) => {
            error!("Error building shifts response: {}", e);
            let status = match e {
                Error::Config(_) | Error::Environment(_) => StatusCode::SERVICE_UNAVAILABLE,
                Error::Fetch(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
