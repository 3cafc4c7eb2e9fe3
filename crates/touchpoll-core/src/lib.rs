//! Register layout and decoded types for polled FT5406-style touch controllers.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
