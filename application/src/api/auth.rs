//! Token endpoint of the REST API.

use axum::{Extension, Form, Json};
use derive_more::Debug;
use secrecy::{ExposeSecret as _, SecretBox, SecretString};
use serde::{Deserialize, Serialize};
use service::command::{self, Command as _};

use crate::{define_error, AsError as _, Context, Error};

/// OAuth2 client credentials the token endpoint accepts.
#[derive(Clone, Debug)]
pub struct Clients {
    /// Client ID issued to the first-party applications.
    pub client_id: String,

    /// Client secret issued to the first-party applications.
    #[debug(skip)]
    pub client_secret: SecretString,
}

/// Password-grant token request.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// OAuth2 grant type: only `password` is supported.
    pub grant_type: String,

    /// Email the [`User`] signs in with.
    ///
    /// [`User`]: service::domain::User
    pub username: String,

    /// Password of the [`User`].
    ///
    /// [`User`]: service::domain::User
    #[debug(skip)]
    pub password: String,

    /// ID of the requesting client.
    pub client_id: String,

    /// Secret of the requesting client.
    #[debug(skip)]
    pub client_secret: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The bearer token itself.
    pub access_token: String,

    /// Token type: always `Bearer`.
    pub token_type: &'static str,

    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// `POST /o/token/`: the OAuth2 password-grant token endpoint.
///
/// # Errors
///
/// - [`AuthError::InvalidClient`] if the client credentials are unknown;
/// - [`AuthError::UnsupportedGrantType`] for anything but `password`;
/// - [`AuthError::InvalidGrant`] if the user credentials are wrong.
pub async fn token(
    ctx: Context,
    Extension(clients): Extension<Clients>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, Error> {
    let TokenRequest {
        grant_type,
        username,
        password,
        client_id,
        client_secret,
    } = request;

    if client_id != clients.client_id
        || client_secret != clients.client_secret.expose_secret()
    {
        return Err(AuthError::InvalidClient.into());
    }

    if grant_type != "password" {
        return Err(AuthError::UnsupportedGrantType.into());
    }

    let email = username
        .parse()
        .map_err(|_| Error::from(AuthError::InvalidGrant))?;
    let password = SecretBox::new(Box::new(
        password
            .parse()
            .map_err(|_| Error::from(AuthError::InvalidGrant))?,
    ));

    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password,
        })
        .await
        .map_err(|e| {
            use command::create_user_session::ExecutionError as E;

            // Which part of the credentials was wrong is not leaked.
            match e.as_ref() {
                E::UserDeactivated(_)
                | E::UserNotExists(_)
                | E::WrongCredentials => AuthError::InvalidGrant.into(),
                E::Db(_) | E::JsonWebTokenEncodeError(_) => e.into_error(),
            }
        })?;

    let expires_in = (output.expires_at.coerce() - common::DateTime::now())
        .as_secs();

    Ok(Json(TokenResponse {
        access_token: output.token.to_string(),
        token_type: "Bearer",
        expires_in,
    }))
}

impl crate::AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_)
            | Self::UserDeactivated(_)
            | Self::UserNotExists(_)
            | Self::WrongCredentials => None,
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "INVALID_CLIENT"]
        #[status = UNAUTHORIZED]
        #[message = "Unknown client credentials"]
        InvalidClient,

        #[code = "INVALID_GRANT"]
        #[status = BAD_REQUEST]
        #[message = "Wrong user credentials"]
        InvalidGrant,

        #[code = "UNSUPPORTED_GRANT_TYPE"]
        #[status = BAD_REQUEST]
        #[message = "Only the `password` grant is supported"]
        UnsupportedGrantType,
    }
}
