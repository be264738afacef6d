//! [`User`]-related REST API definitions.
//!
//! [`User`]: service::domain::User

use axum::Json;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, user},
};

use crate::{AsError, Context, Error};

/// [`User`] representation of the REST API.
///
/// [`User`]: domain::User
#[derive(Debug, Serialize)]
pub struct User {
    /// ID of the user.
    pub id: user::Id,

    /// Human-readable name.
    pub name: String,

    /// Email the user signs in with.
    pub email: String,

    /// Role of the user.
    pub role: user::Role,

    /// Phone number, if any.
    pub phone_number: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_date: String,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            phone_number: user.phone.map(|p| p.to_string()),
            created_date: user.created_at.coerce::<()>().to_rfc3339(),
        }
    }
}

/// Input of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct UserInput {
    /// Human-readable name.
    pub name: String,

    /// Email the user signs in with.
    pub email: String,

    /// Initial password.
    pub password: String,

    /// Role of the user.
    pub role: user::Role,

    /// Phone number, if any.
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// `POST /users/`: creates a new account.
///
/// # Errors
///
/// If the actor is not an administrator, the input is invalid, or the email
/// is already occupied.
pub async fn create(
    ctx: Context,
    Json(input): Json<UserInput>,
) -> Result<Json<User>, Error> {
    let _session = ctx.current_admin_session().await?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name: user::Name::new(input.name)
                .ok_or_else(|| Error::validation(&"invalid `name`"))?,
            email: input
                .email
                .parse()
                .map_err(|_| Error::validation(&"invalid `email`"))?,
            password: SecretBox::new(Box::new(
                input
                    .password
                    .parse()
                    .map_err(|_| Error::validation(&"invalid `password`"))?,
            )),
            role: input.role,
            phone: input
                .phone_number
                .map(|p| {
                    user::Phone::new(p).ok_or_else(|| {
                        Error::validation(&"invalid `phone_number`")
                    })
                })
                .transpose()?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(user.into()))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_user::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::EmailOccupied(_) => Some(Error::conflict(&self)),
        }
    }
}
