pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

pub use error::MortgageCalcError;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageCalcResult<T> = Result<T, MortgageCalcError>;
