pub mod config;
pub mod error;
pub mod package;

pub use error::{Result, StowageError};
pub use package::Package;
