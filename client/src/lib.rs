#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod app;
pub mod camera;
pub mod character;
pub mod control_mode;
pub mod settings;
pub mod ui;

pub use app::bootstrap::run_client_app;
pub use app::state::AppState;
