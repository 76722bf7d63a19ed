// ============================================================================
// Conduit API Library
// ============================================================================

pub mod app;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod messaging;
pub mod state;

// Re-export the wiring surface for the binary and integration tests
pub use app::build_router;
pub use config::AppConfig;
pub use state::AppState;
