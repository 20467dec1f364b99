//! API Module
//!
//! This module handles the HTTP API for pin-operation batches.
//! It provides the endpoint that clients use to read and drive aliased pins.

mod server;
pub use server::{BatchResponse, ErrorResponse, HealthResponse, Server, EXECUTION_FAILED_MESSAGE};
