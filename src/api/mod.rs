//! API Module
//!
//! HTTP handlers and routing for the local progress gateway.
//!
//! # Endpoints
//! - `GET /progress`, `GET /modules`, `GET /modules/:module_id/lessons` - Reads
//! - `GET|PATCH /modules/:module_id/lessons/:lesson_id/status` - Lesson status
//! - `POST /modules/:module_id/lessons/:lesson_id/{toggle,complete,start,reset}` - Writes
//! - `GET /local` - Local (optimistic) state
//! - `GET /stats`, `DELETE /cache`, `GET /health` - Housekeeping

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
