use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::{
    config::Settings,
    detail::find_match,
    league::slugify,
    query::{league_counts, query, MatchesParams},
    snapshot::SnapshotSource,
    utils::{now_ts, today},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub source: SnapshotSource,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let source = SnapshotSource::new(&settings.matches_path, settings.snapshot_cache);
        Self { settings, source }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = state.settings.cors_allow_any;
    let app = Router::new()
        .route("/api/matches", get(api_matches))
        .route("/api/matches/{league}/{slug}", get(api_match_detail))
        .route("/api/leagues", get(api_leagues))
        .route("/api/health", get(api_health))
        .with_state(state);

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub async fn serve(settings: Settings) -> Result<()> {
    let addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .with_context(|| format!("api addr parse {}", settings.bind_addr()))?;

    log::info!(
        "api.start url=http://{} matches={} cache={}",
        addr,
        settings.matches_path,
        settings.snapshot_cache
    );
    let app = build_router(AppState::new(settings));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("api.shutdown");
        })
        .await?;
    Ok(())
}

fn unavailable(what: &str, e: &anyhow::Error) -> Response {
    log::error!("api.{}.error {:#}", what, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Failed to fetch matches", "matches": []})),
    )
        .into_response()
}

async fn api_matches(
    State(st): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let snapshot = match st.source.load() {
        Ok(s) => s,
        Err(e) => return unavailable("matches", &e),
    };

    let opts = MatchesParams::from_pairs(pairs).to_options(today(st.settings.today_timezone));
    let env = query(&snapshot.matches, &opts, snapshot.generated_at.clone());
    log::debug!(
        "api.matches league={:?} search={:?} page={} limit={} total={}",
        opts.league,
        opts.search,
        env.page,
        env.limit,
        env.total
    );
    Json(env).into_response()
}

async fn api_match_detail(
    State(st): State<AppState>,
    Path((league, slug)): Path<(String, String)>,
) -> Response {
    let snapshot = match st.source.load() {
        Ok(s) => s,
        Err(e) => return unavailable("match_detail", &e),
    };

    match find_match(&snapshot.matches, &league, &slug, st.settings.related_limit) {
        Some(detail) => Json(detail).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Match not found"})),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
struct LeagueRow {
    name: String,
    slug: String,
    count: usize,
}

async fn api_leagues(State(st): State<AppState>) -> Response {
    let snapshot = match st.source.load() {
        Ok(s) => s,
        Err(e) => return unavailable("leagues", &e),
    };

    let rows = league_counts(&snapshot.matches)
        .into_iter()
        .map(|(name, count)| LeagueRow {
            slug: slugify(&name),
            name,
            count,
        })
        .collect::<Vec<_>>();
    Json(rows).into_response()
}

async fn api_health(State(st): State<AppState>) -> impl IntoResponse {
    let ts = now_ts();
    let path = st.source.path().display().to_string();
    let cache = st.source.is_cached();
    match st.source.load() {
        Ok(snap) => Json(serde_json::json!({
            "ts": ts,
            "matches_path": path,
            "cache": cache,
            "ok": true,
            "matches": snap.matches.len(),
            "generated_at": snap.generated_at,
        })),
        Err(e) => Json(serde_json::json!({
            "ts": ts,
            "matches_path": path,
            "cache": cache,
            "ok": false,
            "error": format!("{e:#}"),
        })),
    }
}
