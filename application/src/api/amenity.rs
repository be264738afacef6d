//! [`Amenity`]-related REST API definitions.
//!
//! [`Amenity`]: service::domain::Amenity

use axum::{
    extract::{Path, Query},
    Json,
};
use common::{Date, TimeOfDay};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, amenity},
    query::{self, availability, Query as _},
    read::amenity::availability::Window,
};

use crate::{AsError, Context, Error};

/// [`Amenity`] representation of the REST API.
///
/// [`Amenity`]: domain::Amenity
#[derive(Debug, Serialize)]
pub struct Amenity {
    /// ID of the amenity.
    pub id: amenity::Id,

    /// Human-readable name.
    pub name: String,

    /// Location inside the compound.
    pub location: String,

    /// Free-form description, if any.
    pub description: Option<String>,

    /// Daily opening time.
    pub opening_time: TimeOfDay,

    /// Daily closing time.
    pub closing_time: TimeOfDay,

    /// Maximum bookings admitted per overlapping window.
    pub max_bookings_per_slot: u16,

    /// Usage fee in `{amount}{CUR}` form, if the amenity charges one.
    pub fee: Option<String>,

    /// Reference to an image, if any.
    pub image: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_date: String,
}

impl From<domain::Amenity> for Amenity {
    fn from(amenity: domain::Amenity) -> Self {
        Self {
            id: amenity.id,
            name: amenity.name.to_string(),
            location: amenity.location.to_string(),
            description: amenity.description.map(|d| d.to_string()),
            opening_time: amenity.hours.start(),
            closing_time: amenity.hours.end(),
            max_bookings_per_slot: amenity.capacity.get(),
            fee: amenity.fee.map(|f| f.to_string()),
            image: amenity.image.map(Into::into),
            created_date: amenity.created_at.coerce::<()>().to_rfc3339(),
        }
    }
}

/// Input of the [`create()`] and [`update()`] endpoints.
#[derive(Debug, Deserialize)]
pub struct AmenityInput {
    /// Human-readable name.
    pub name: String,

    /// Location inside the compound.
    pub location: String,

    /// Free-form description, if any.
    #[serde(default)]
    pub description: Option<String>,

    /// Daily opening time.
    pub opening_time: TimeOfDay,

    /// Daily closing time.
    pub closing_time: TimeOfDay,

    /// Maximum bookings admitted per overlapping window.
    pub max_bookings_per_slot: u16,

    /// Usage fee in `{amount}{CUR}` form, if the amenity charges one.
    #[serde(default)]
    pub fee: Option<String>,

    /// Reference to an image, if any.
    #[serde(default)]
    pub image: Option<String>,
}

/// Validated fields of an [`AmenityInput`].
struct ParsedInput {
    /// Parsed name.
    name: amenity::Name,

    /// Parsed location.
    location: amenity::Location,

    /// Parsed description.
    description: Option<amenity::Description>,

    /// Parsed fee.
    fee: Option<common::Money>,

    /// Parsed image reference.
    image: Option<amenity::ImageRef>,
}

impl AmenityInput {
    /// Validates the free-form fields of this [`AmenityInput`].
    fn parse(&self) -> Result<ParsedInput, Error> {
        Ok(ParsedInput {
            name: amenity::Name::new(self.name.clone())
                .ok_or_else(|| Error::validation(&"invalid `name`"))?,
            location: amenity::Location::new(self.location.clone())
                .ok_or_else(|| Error::validation(&"invalid `location`"))?,
            description: self
                .description
                .clone()
                .map(|d| {
                    amenity::Description::new(d).ok_or_else(|| {
                        Error::validation(&"invalid `description`")
                    })
                })
                .transpose()?,
            fee: self
                .fee
                .as_deref()
                .map(|f| {
                    f.parse()
                        .map_err(|_| Error::validation(&"invalid `fee`"))
                })
                .transpose()?,
            image: self.image.clone().map(amenity::ImageRef::from),
        })
    }
}

/// `GET /amenities/`: lists every amenity.
///
/// # Errors
///
/// If the request is not authenticated.
pub async fn list(ctx: Context) -> Result<Json<Vec<Amenity>>, Error> {
    let _session = ctx.current_session().await?;

    let amenities = ctx
        .service()
        .execute(query::amenity::All::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(amenities.into_iter().map(Into::into).collect()))
}

/// `POST /amenities/`: creates a new amenity.
///
/// # Errors
///
/// If the actor is not an administrator, or the input is invalid.
pub async fn create(
    ctx: Context,
    Json(input): Json<AmenityInput>,
) -> Result<Json<Amenity>, Error> {
    let _session = ctx.current_admin_session().await?;

    let parsed = input.parse()?;
    let amenity = ctx
        .service()
        .execute(command::CreateAmenity {
            name: parsed.name,
            location: parsed.location,
            description: parsed.description,
            opening: input.opening_time,
            closing: input.closing_time,
            capacity: input.max_bookings_per_slot,
            fee: parsed.fee,
            image: parsed.image,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(amenity.into()))
}

/// `PUT|PATCH /amenities/{id}/`: updates an existing amenity.
///
/// # Errors
///
/// If the actor is not an administrator, the input is invalid, or the amenity
/// does not exist.
pub async fn update(
    ctx: Context,
    Path(id): Path<amenity::Id>,
    Json(input): Json<AmenityInput>,
) -> Result<Json<Amenity>, Error> {
    let _session = ctx.current_admin_session().await?;

    let parsed = input.parse()?;
    let amenity = ctx
        .service()
        .execute(command::UpdateAmenity {
            amenity_id: id,
            name: parsed.name,
            location: parsed.location,
            description: parsed.description,
            opening: input.opening_time,
            closing: input.closing_time,
            capacity: input.max_bookings_per_slot,
            fee: parsed.fee,
            image: parsed.image,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(amenity.into()))
}

/// `DELETE /amenities/{id}/`: deletes an amenity without open bookings.
///
/// # Errors
///
/// If the actor is not an administrator, the amenity does not exist, or open
/// bookings still reference it.
pub async fn delete(
    ctx: Context,
    Path(id): Path<amenity::Id>,
) -> Result<http::StatusCode, Error> {
    let _session = ctx.current_admin_session().await?;

    ctx.service()
        .execute(command::DeleteAmenity { amenity_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

/// Parameters of the [`availability()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    /// Date to inspect.
    pub date: Date,
}

/// One bookable window with its remaining capacity.
#[derive(Debug, Serialize)]
pub struct AvailabilityWindow {
    /// Start of the window.
    pub start_time: TimeOfDay,

    /// End of the window.
    pub end_time: TimeOfDay,

    /// Remaining number of bookings the window admits.
    pub remaining: u16,
}

impl From<Window> for AvailabilityWindow {
    fn from(window: Window) -> Self {
        Self {
            start_time: window.slot.start(),
            end_time: window.slot.end(),
            remaining: window.remaining,
        }
    }
}

/// `GET /amenities/{id}/availability/?date=`: remaining capacity per hourly
/// window.
///
/// # Errors
///
/// If the request is not authenticated, or the amenity does not exist.
pub async fn availability(
    ctx: Context,
    Path(id): Path<amenity::Id>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<AvailabilityWindow>>, Error> {
    let _session = ctx.current_session().await?;

    let windows = ctx
        .service()
        .execute(availability::Availability {
            amenity_id: id,
            date: params.date,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(windows.into_iter().map(Into::into).collect()))
}

impl AsError for command::create_amenity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_amenity::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidCapacity(_) | E::InvalidHours(_) | E::NegativeFee(_) => {
                Some(Error::validation(&self))
            }
        }
    }
}

impl AsError for command::update_amenity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_amenity::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::AmenityNotExists(_) => Some(Error::not_found(&self)),
            E::InvalidCapacity(_) | E::InvalidHours(_) | E::NegativeFee(_) => {
                Some(Error::validation(&self))
            }
        }
    }
}

impl AsError for command::delete_amenity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_amenity::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::AmenityNotExists(_) => Some(Error::not_found(&self)),
            E::OpenBookingsExist(_) => Some(Error::conflict(&self)),
        }
    }
}

impl AsError for query::availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use query::availability::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::AmenityNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}
