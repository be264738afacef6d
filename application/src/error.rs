//! [`Error`]-related definitions.

use std::fmt;

use axum::{response::IntoResponse, Json};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use serde_json::json;
use service::infra::database;
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `VALIDATION_ERROR` [`Error`]: malformed or out-of-range
    /// input, not to be retried as-is.
    #[must_use]
    pub fn validation(msg: &impl ToString) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `NOT_FOUND` [`Error`]: a referenced entity is missing.
    #[must_use]
    pub fn not_found(msg: &impl ToString) -> Self {
        Self {
            code: "NOT_FOUND",
            status_code: http::StatusCode::NOT_FOUND,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `CONFLICT` [`Error`]: a uniqueness violation the caller
    /// may resolve by choosing a different slot.
    #[must_use]
    pub fn conflict(msg: &impl ToString) -> Self {
        Self {
            code: "CONFLICT",
            status_code: http::StatusCode::CONFLICT,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `CAPACITY_EXCEEDED` [`Error`]: a [`conflict()`] subtype
    /// distinguished for clearer messaging.
    ///
    /// [`conflict()`]: Error::conflict
    #[must_use]
    pub fn capacity_exceeded(msg: &impl ToString) -> Self {
        Self {
            code: "CAPACITY_EXCEEDED",
            status_code: http::StatusCode::CONFLICT,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `INVALID_TRANSITION` [`Error`]: a status workflow
    /// violation, never silently applied.
    #[must_use]
    pub fn invalid_transition(msg: &impl ToString) -> Self {
        Self {
            code: "INVALID_TRANSITION",
            status_code: http::StatusCode::CONFLICT,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new `FORBIDDEN` [`Error`]: the actor lacks the required
    /// role.
    #[must_use]
    pub fn forbidden(msg: &impl ToString) -> Self {
        Self {
            code: "FORBIDDEN",
            status_code: http::StatusCode::FORBIDDEN,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace: _,
            message,
        } = self;

        write!(f, "[{code}]: {message}")
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let Self {
            code,
            status_code,
            backtrace,
            message,
        } = self;

        if status_code.is_server_error() {
            tracing::error!(
                code,
                backtrace = backtrace
                    .as_ref()
                    .map(|trace| trace.to_string()),
                "{message}",
            );
        }

        (
            status_code,
            Json(json!({
                "code": code,
                "message": message,
            })),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}
