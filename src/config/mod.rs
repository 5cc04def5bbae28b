//! Configuration loading

mod app_config;
mod jwt_options;

pub use app_config::{AppConfig, CacheConfig, LogFormat, LoggingConfig};
pub use jwt_options::JwtOptions;
