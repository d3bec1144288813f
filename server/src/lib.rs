pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod state;
pub mod user_store;

pub use state::AppState;
