mod config;
mod health;
mod widgets;

pub use config::config_routes;
pub use health::health_routes;
pub use widgets::widget_routes;
