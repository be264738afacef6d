//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use service::{
    command::{self, Command as _},
    domain::user::{self, session, Role},
};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, Service};

/// Application context of one REST request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Bearer token of the request, if one was provided.
    token: Option<session::Token>,

    /// Current [`Session`].
    current_session: OnceCell<Session>,

    /// Last authentication [`Error`].
    auth_error: OnceCell<Error>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Tries to get the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        self.current_session().await.map(Some).or_else(|e| {
            if e.code == Error::from(AuthError::AuthorizationRequired).code {
                Ok(None)
            } else {
                Err(e)
            }
        })
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| async {
                match self
                    .auth_error
                    .get_or_try_init(|| async {
                        match self.do_authentication().await {
                            Ok(u) => Err(u),
                            Err(e) => Ok(e),
                        }
                    })
                    .await
                {
                    Ok(e) => Err(e),
                    Err(u) => Ok(u),
                }
            })
            .await
            .cloned()
            .map_err(Clone::clone)
    }

    /// Returns the current [`Session`], requiring a staff (ADMIN or
    /// MANAGEMENT) [`Role`].
    ///
    /// # Errors
    ///
    /// Errors if the request is not authorized, or the actor is a regular
    /// resident.
    pub async fn current_staff_session(&self) -> Result<Session, Error> {
        let session = self.current_session().await?;
        match session.role {
            Role::Admin | Role::Management => Ok(session),
            Role::Resident => {
                Err(Error::forbidden(&"staff privileges required"))
            }
        }
    }

    /// Returns the current [`Session`], requiring the ADMIN [`Role`].
    ///
    /// # Errors
    ///
    /// Errors if the request is not authorized, or the actor is not an
    /// administrator.
    pub async fn current_admin_session(&self) -> Result<Session, Error> {
        let session = self.current_session().await?;
        match session.role {
            Role::Admin => Ok(session),
            Role::Management | Role::Resident => {
                Err(Error::forbidden(&"administrator privileges required"))
            }
        }
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let Some(token) = self.token.clone() else {
            return Err(AuthError::AuthorizationRequired.into());
        };

        self.service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map(|s| Session {
                user_id: s.user_id,
                role: s.role,
                token,
                expires_at: s.expires_at.coerce(),
            })
            .map_err(AsError::into_error)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let token = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                Some(unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                })
            }
            Err(e) if e.is_missing() => None,
            Err(e) => return Err(e.into_error()),
        };

        Ok(Self {
            service,
            token,
            current_session: OnceCell::new(),
            auth_error: OnceCell::new(),
        })
    }
}

/// User session of a REST request.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the [`User`] associated with this [`Session`].
    ///
    /// [`User`]: service::domain::User
    pub user_id: user::Id,

    /// [`Role`] of the [`User`] at the time the [`Session`] was issued.
    ///
    /// [`User`]: service::domain::User
    pub role: Role,

    /// Authentication token.
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}
