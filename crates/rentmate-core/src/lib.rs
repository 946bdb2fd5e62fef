pub mod config;
pub mod error;

pub use config::RentmateConfig;
pub use error::{RentmateError, Result};
