use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::access::{AccessOutcome, check_authorization, challenge};
use crate::aggregator::group_by_period;
use crate::config::{INDEX_FILE, ServerConfig};
use crate::dashboard::{
    AnswerRateView, ChannelPivot, CompanyRanking, CompanyRow, FilterOptions, GlobalStats,
    SpamOverview, WeekdayHourGrid,
};
use crate::export::{to_csv, to_xlsx};
use crate::record::{CHANNEL, RateSummary};
use crate::snapshot::{DashboardSnapshot, load_snapshot};

/// Shared read-only state: the configuration, the snapshot loaded at startup
/// and the static file service for everything but the index.
pub struct AppState {
    config: ServerConfig,
    snapshot: DashboardSnapshot,
    assets: ServeDir,
}

/// Where a path outside the API lands once percent-decoded and normalized.
#[derive(Debug, PartialEq, Eq)]
enum StaticTarget {
    Index,
    Asset,
    Invalid,
}

fn static_target(path: &str) -> StaticTarget {
    let decoded = match urlencoding::decode(path) {
        Ok(decoded) => decoded,
        Err(_) => return StaticTarget::Invalid,
    };

    let last = decoded
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .last();

    match last {
        None => StaticTarget::Index,
        Some(name) if name.eq_ignore_ascii_case(INDEX_FILE) => StaticTarget::Index,
        Some(_) => StaticTarget::Asset,
    }
}

#[derive(Deserialize, Default)]
struct FilterQuery {
    agence: Option<String>,
    canal: Option<String>,
}

impl FilterQuery {
    fn view(&self) -> AnswerRateView {
        AnswerRateView::new(
            self.agence.as_deref().unwrap_or("all"),
            self.canal.as_deref().unwrap_or("all"),
        )
    }
}

#[derive(Deserialize, Default)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Serialize)]
struct AnswerRateResponse {
    series: Vec<RateSummary>,
    stats: RateSummary,
}

#[derive(Serialize)]
struct SpamRateResponse {
    monthly: Vec<RateSummary>,
    by_channel: ChannelPivot,
}

pub fn router(config: ServerConfig, snapshot: DashboardSnapshot) -> Router {
    let assets = ServeDir::new(&config.root).append_index_html_on_directories(false);
    let app_state = Arc::new(AppState {
        config,
        snapshot,
        assets,
    });

    Router::new()
        .route("/", get(serve_protected))
        .route("/index.html", get(serve_protected))
        .route("/api/protected", get(serve_protected))
        .route("/api/filters", get(filters))
        .route("/api/answer-rate", get(answer_rate))
        .route("/api/spam-rate", get(spam_rate))
        .route("/api/spam-pj", get(spam_pj))
        .route("/api/weekday-hour", get(weekday_hour))
        .route("/api/stats", get(stats))
        .route("/api/ranking", get(ranking))
        .route("/api/export.csv", get(export_csv))
        .route("/api/export.xlsx", get(export_xlsx))
        .fallback(serve_static)
        .with_state(app_state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(&config.data)?;
    let bind = config.bind;
    let app = router(config, snapshot);

    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn unauthorized(outcome: AccessOutcome) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge())],
        outcome.message(),
    )
        .into_response()
}

async fn serve_protected(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    protected_index(&state, &headers).await
}

// Any spelling of the index path goes through the credential check before
// the file service sees the request.
async fn serve_static(State(state): State<Arc<AppState>>, request: Request) -> Response {
    match static_target(request.uri().path()) {
        StaticTarget::Index => protected_index(&state, request.headers()).await,
        StaticTarget::Invalid => StatusCode::NOT_FOUND.into_response(),
        StaticTarget::Asset => match state.assets.clone().oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
    }
}

async fn protected_index(state: &AppState, headers: &HeaderMap) -> Response {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let outcome = check_authorization(provided, &state.config.credentials);
    if !outcome.is_granted() {
        if outcome == AccessOutcome::Denied {
            warn!("dashboard access denied");
        }
        return unauthorized(outcome);
    }

    let index = state.config.index_path();
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("failed to read {}: {}", index.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn answer_rate(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let view = params.view();
    Json(AnswerRateResponse {
        series: view.series(&state.snapshot),
        stats: view.stats(&state.snapshot),
    })
}

async fn spam_rate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(SpamRateResponse {
        monthly: group_by_period(&state.snapshot.spam_by_month()),
        by_channel: ChannelPivot::build(&state.snapshot.spam_by_channel(), CHANNEL),
    })
}

async fn filters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(FilterOptions::from_snapshot(&state.snapshot))
}

async fn weekday_hour(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(WeekdayHourGrid::build(&state.snapshot.decroche_jour_heure))
}

async fn spam_pj(State(state): State<Arc<AppState>>) -> Response {
    match SpamOverview::from_snapshot(&state.snapshot) {
        Some(overview) => Json(overview).into_response(),
        None => {
            warn!("snapshot has no spam_pj_analysis");
            (StatusCode::NOT_FOUND, "No spam analysis in snapshot").into_response()
        }
    }
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(GlobalStats::compute(&state.snapshot))
}

async fn ranking(
    Query(params): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let ranking = CompanyRanking::build(&state.snapshot.hierarchy_combined);
    let companies: Vec<CompanyRow> = ranking
        .search(params.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(companies)
}

async fn export_csv(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let series = params.view().series(&state.snapshot);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        to_csv(&series),
    )
}

async fn export_xlsx(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let series = params.view().series(&state.snapshot);
    match to_xlsx(&series) {
        Ok(buffer) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            )],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!("xlsx export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_spellings_are_recognized() {
        for path in [
            "/",
            "//",
            "/index.html",
            "//index.html",
            "/./index.html",
            "/%69ndex.html",
            "/index%2Ehtml",
            "/INDEX.HTML",
            "/assets/index.html",
            "/index.html/",
            "/%2F",
        ] {
            assert_eq!(static_target(path), StaticTarget::Index, "path {:?}", path);
        }
    }

    #[test]
    fn other_paths_go_to_the_file_service() {
        assert_eq!(static_target("/dashboard_data.json"), StaticTarget::Asset);
        assert_eq!(static_target("/css/style.css"), StaticTarget::Asset);
        assert_eq!(static_target("/index.html.bak"), StaticTarget::Asset);
        assert_eq!(static_target("/%FF"), StaticTarget::Invalid);
    }
}
