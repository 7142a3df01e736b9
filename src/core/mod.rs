pub mod app_state;
pub mod config;
pub mod error;
pub mod tools_registry;
pub mod types;

pub use app_state::AppState;
