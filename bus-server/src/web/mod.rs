//! Web layer for the bus trip search server.
//!
//! Provides HTTP endpoints for searching trips and looking up buses,
//! trips and stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
