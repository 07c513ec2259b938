//! SNG Web - HTTP front end for the graph viewer
//!
//! Serves the landing and query pages and the JSON endpoints the
//! force-directed graph reads from.

mod assets;
pub mod error;
pub mod server;

pub use error::AppError;
pub use server::{create_router, run_server, AppState};
