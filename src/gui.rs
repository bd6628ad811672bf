mod app_state;
mod components;

pub use app_state::{AppState, RunSummary};
