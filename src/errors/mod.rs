pub mod types;

pub use types::AppError;

/// Convenience result alias used below the web layer
pub type AppResult<T> = Result<T, AppError>;
