pub mod bootstrap;
pub mod plugins;
pub mod scene;
pub mod state;
