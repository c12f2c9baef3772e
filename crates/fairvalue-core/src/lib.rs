pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::FairvalueError;
pub use types::*;

/// Standard result type for all fairvalue operations
pub type FairvalueResult<T> = Result<T, FairvalueError>;
