pub mod errors;

pub use errors::{CampusError, ConfigError};

pub type Result<T> = std::result::Result<T, CampusError>;
