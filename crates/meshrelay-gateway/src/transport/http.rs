//! `POST /v1/ingest?topic=...`: raw envelope bytes in, JSON event out.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::ingest::{Delivery, IngestOutcome};
use crate::transport::codec::{dropped_json, sys_error_json};

#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    pub topic: String,
}

const JSON: [(header::HeaderName, &str); 1] = [(header::CONTENT_TYPE, "application/json")];

pub async fn ingest(
    State(app): State<AppState>,
    Query(q): Query<IngestQuery>,
    body: Bytes,
) -> Response {
    if app.is_draining() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            JSON,
            sys_error_json("DRAINING", "gateway is shutting down"),
        )
            .into_response();
    }

    match app.ingestor().ingest(Delivery::new(q.topic, body)).await {
        IngestOutcome::Dropped { reason } => {
            (StatusCode::ACCEPTED, JSON, dropped_json(reason)).into_response()
        }
        IngestOutcome::Decoded(event) => (StatusCode::OK, JSON, event.to_json()).into_response(),
    }
}
