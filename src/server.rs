use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info};
use serde::Serialize;
use serde_json::json;

use crate::data::{SchedulingInput, SolverConfig};
use crate::solver::{self, SolveError};

const LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Every response carries the permissive origin header so browser clients
/// can call the API directly.
fn with_cors(status: StatusCode, body: impl Serialize) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

async fn solve_handler(body: String) -> Response {
    // Parsed by hand so a malformed body maps to 500, not an extractor
    // rejection.
    let input: SchedulingInput = match serde_json::from_str(&body) {
        Ok(input) => input,
        Err(err) => {
            error!("rejecting malformed request: {err}");
            return with_cors(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": format!("Server error: {err}") }),
            );
        }
    };

    let config = SolverConfig::default();
    match solver::solve(&input, &config) {
        Ok(schedule) => with_cors(StatusCode::OK, schedule),
        Err(SolveError::Validation(errors)) => with_cors(
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "error": errors.join("; "),
                "validationErrors": errors,
            }),
        ),
        Err(SolveError::Unsolvable(report)) => with_cors(StatusCode::BAD_REQUEST, *report),
    }
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

pub async fn run_server() {
    let app = Router::new().route("/api/schedule", post(solve_handler).options(preflight));

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await.unwrap();

    info!(
        "timetable server running at http://{}",
        listener.local_addr().unwrap()
    );

    axum::serve(listener, app).await.unwrap();
}
