//! The unified error handling system for the application.

pub use types::ServiceError;

/// A unified `Result` type for the entire application.
pub type Result<T> = std::result::Result<T, ServiceError>;

pub mod macros;
pub mod types;

/// Context trait for attaching a message to any convertible error.
pub trait Context<T> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<ServiceError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|error| ServiceError::Internal {
            message: context().to_string(),
            source: Some(anyhow::Error::new(error.into())),
        })
    }
}
