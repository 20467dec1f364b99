//! API Server Module
//!
//! This module implements the HTTP endpoint for pin-operation batches.
//! It accepts a JSON batch, validates it as a whole, and applies the
//! resulting operation queue to the pin driver only if validation succeeded.

use crate::{
    config::Config,
    gpio::{Executor, PinDriver},
    registry::AliasRegistry,
    validation::Validator,
    OperationOutcome, ValidationError,
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Message returned when a validated queue could not be applied
pub const EXECUTION_FAILED_MESSAGE: &str = "Failed to apply pin operations.";

/// Shared application state that is accessible across all request handlers
///
/// - `validator`: Validates incoming batches against the alias registry
/// - `executor`: Applies validated queues to the pin driver
#[derive(Clone)]
pub struct AppState {
    validator: Arc<Validator>,
    executor: Arc<Executor>,
}

/// The main API server struct
///
/// Encapsulates the server configuration and application state.
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port, aliases)
    /// * `registry` - Alias registry, built once from the configuration
    /// * `driver` - Pin driver the validated queues are applied to
    pub fn new(config: Config, registry: AliasRegistry, driver: impl PinDriver + 'static) -> Self {
        let validator = Arc::new(Validator::new(Arc::new(registry)));
        let executor = Arc::new(Executor::new(driver));

        Self {
            config,
            state: AppState { validator, executor },
        }
    }

    /// Builds the router serving `/api` and `/health`
    ///
    /// `/api` answers both GET and POST; the batch is always read from the body.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api", get(handle_batch).post(handle_batch))
            .route("/health", get(handle_health))
            .with_state(self.state.clone())
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// # Returns
    /// `Ok(())` if the server shuts down cleanly, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        info!(
            "API server listening on {} with {} aliases",
            addr,
            self.state.validator.registry().len()
        );

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Error body: `{ "message": <reason> }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Success body
///
/// - `applied_at`: Unix time in milliseconds when the queue finished
/// - `results`: One outcome per requested operation, in request order
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub applied_at: i64,
    pub results: Vec<OperationOutcome>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Batch request handler
///
/// The body is read raw so that a payload which is not JSON at all is
/// reported the same way as JSON that is not a list.
async fn handle_batch(State(state): State<AppState>, body: Bytes) -> Response {
    let batch: Value = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(e) => {
            debug!("Request body is not JSON: {}", e);
            return ValidationError::MalformedBody.into_response();
        }
    };

    // Step 1: Validate the whole batch before touching any pin
    let queue = match state.validator.validate(&batch) {
        Ok(queue) => queue,
        Err(validation_error) => {
            warn!("Batch rejected: {}", validation_error);
            return validation_error.into_response();
        }
    };
    info!("Batch of {} operations validated", queue.len());

    // Step 2: Apply the queue
    match state.executor.apply(&queue).await {
        Ok(results) => {
            let response = BatchResponse {
                applied_at: chrono::Utc::now().timestamp_millis(),
                results,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Batch execution failed: {}", e);
            let body = ErrorResponse {
                message: EXECUTION_FAILED_MESSAGE.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
