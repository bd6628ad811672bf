mod live_monitoring;
mod menu;

pub use live_monitoring::render_live_monitoring;
pub use menu::render_menu;
