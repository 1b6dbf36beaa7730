use std::any::Any;

use thiserror::Error;

/// Type-erased failure raised by a fallible collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unchecked abort raised inside the subscriber protocol.
///
/// Every failure a subscriber callback produces, whether a returned error or a
/// panic, is normalized into one of these before it reaches `on_error`.
#[derive(Error, Debug)]
pub enum Abort {
    #[error("{0}")]
    Failed(BoxError),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl Abort {
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Abort::Failed(error.into())
    }

    /// Recovers an abort from a panic payload.
    ///
    /// Payloads raised by [`crate::attempt::uncheck`] carry an `Abort` and are
    /// returned as is; string payloads from `panic!` become `Panicked`.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let payload = match payload.downcast::<Abort>() {
            Ok(abort) => return *abort,
            Err(payload) => payload,
        };

        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return Abort::Panicked((*message).to_owned());
        }

        match payload.downcast::<String>() {
            Ok(message) => Abort::Panicked(*message),
            Err(_) => Abort::Panicked("non-string panic payload".to_owned()),
        }
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Input argument error: {0}")]
    InvalidInput(String),

    #[error("Publisher closed")]
    Closed,

    #[error("Executor error: {0}")]
    Executor(#[from] std::io::Error),
}
