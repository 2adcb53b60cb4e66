mod app;
mod cli;
mod effects;
mod render;
mod settings;
mod watch;
mod workbench;

pub use app::run_app;
