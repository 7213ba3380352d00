pub mod app;
pub mod carousel;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod polish;
pub mod reservation;
pub mod state;
pub mod storage;
pub mod throttle;
pub mod ui;
pub mod view;
pub mod widgets;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_preferences, resolve_preferences_path};
