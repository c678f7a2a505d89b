use std::sync::Arc;

use thiserror::Error;

use crate::ImageError;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Dbus connection error")]
    Connection(#[source] Arc<zbus::Error>),
    #[error("Dbus connection was closed")]
    ConnectionClosed,
    #[error("Notification server rejected the call")]
    Call(#[source] Arc<zbus::Error>),
    #[error("Unexpected reply from notification server: {0}")]
    Decode(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl Error {
    /// Whether this error means the subscription or connection it came from is unusable.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::ConnectionClosed)
    }
}

impl From<zbus::Error> for Error {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(..) | zbus::Error::FDO(_) => Error::Call(Arc::new(err)),
            zbus::Error::Variant(_)
            | zbus::Error::InvalidReply
            | zbus::Error::ExcessData
            | zbus::Error::MissingField
            | zbus::Error::InvalidField => Error::Decode(err.to_string()),
            _ => Error::Connection(Arc::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
