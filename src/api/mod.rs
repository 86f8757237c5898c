use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{
    Field, IncomeBracket, RawValue, Recommendation, SimulationParameters, SimulationPoint,
    SimulationResult, UnresolvedBracket, bracket_for_income, brackets, resolve_recommendation,
    simulate,
};
use crate::form::{RawParameters, assemble};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    parameters: SimulationParameters,
    validation: BTreeMap<Field, String>,
    result: SimulationResult,
    yearly: Vec<SimulationPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BracketEntry {
    #[serde(flatten)]
    bracket: IncomeBracket,
    recommendation: Recommendation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BracketsResponse {
    brackets: Vec<BracketEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_bracket_id: Option<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BracketsQuery {
    #[serde(rename = "revenuMensuel")]
    monthly_income: Option<RawValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationResponse {
    bracket_id: String,
    recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<UnresolvedBracket>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/brackets", get(brackets_handler))
        .route(
            "/api/brackets/:id/recommendation",
            get(recommendation_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "savings simulator API listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(raw): Query<RawParameters>) -> Response {
    simulate_handler_impl(raw).await
}

async fn simulate_post_handler(Json(raw): Json<RawParameters>) -> Response {
    simulate_handler_impl(raw).await
}

async fn simulate_handler_impl(raw: RawParameters) -> Response {
    let response = build_simulate_response(&raw);
    if !response.validation.is_empty() {
        tracing::debug!(issues = response.validation.len(), "simulation inputs clamped");
    }
    json_response(StatusCode::OK, response)
}

async fn brackets_handler(Query(query): Query<BracketsQuery>) -> Response {
    json_response(StatusCode::OK, build_brackets_response(&query))
}

async fn recommendation_handler(Path(id): Path<String>) -> Response {
    let resolution = resolve_recommendation(&id);
    json_response(
        StatusCode::OK,
        RecommendationResponse {
            bracket_id: id,
            recommendation: resolution.recommendation,
            notice: resolution.notice,
        },
    )
}

fn build_simulate_response(raw: &RawParameters) -> SimulateResponse {
    let assembled = assemble(raw);
    let result = simulate(&assembled.parameters);
    let yearly = result.yearly_points().copied().collect();
    SimulateResponse {
        parameters: assembled.parameters,
        validation: assembled.messages,
        result,
        yearly,
    }
}

fn build_brackets_response(query: &BracketsQuery) -> BracketsResponse {
    BracketsResponse {
        brackets: brackets()
            .iter()
            .map(|bracket| BracketEntry {
                bracket: *bracket,
                recommendation: bracket.recommendation(),
            })
            .collect(),
        matched_bracket_id: query
            .monthly_income
            .as_ref()
            .and_then(RawValue::as_number)
            .and_then(bracket_for_income)
            .map(|bracket| bracket.id),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
