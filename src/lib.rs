pub mod api;
pub mod config;
pub mod http_client;
pub mod pico_client;
pub mod services;

pub use services::connection::{ConnectionRejected, validate_connection};
pub use services::hydraulics::{ConfigurationStore, Configuration, HoseType, Position, SystemType};
pub use services::recommendations::compute_recommendations;
pub use services::tags::TagInfo;
