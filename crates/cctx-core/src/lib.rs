pub mod error;
pub mod transcript;
pub mod ts;
pub mod types;

pub use error::CoreError;
pub use types::*;
