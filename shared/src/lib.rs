pub mod config;
pub mod error;
pub mod validation;

pub use config::*;
pub use error::*;
pub use validation::*;
