//! [`Booking`]-related REST API definitions.
//!
//! [`Booking`]: service::domain::Booking

use axum::{
    extract::{Path, Query},
    Json,
};
use common::{pagination::Arguments, Date, TimeOfDay};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, amenity, booking, user},
    query::{self, Query as _},
    read,
};

use crate::{AsError, Context, Error};

/// Default page size of the booking list.
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Page size used when a whole amenity's bookings are requested at once.
const AMENITY_PAGE_SIZE: i64 = 500;

/// [`Booking`] representation of the REST API.
///
/// [`Booking`]: domain::Booking
#[derive(Debug, Serialize)]
pub struct Booking {
    /// ID of the booking.
    pub id: booking::Id,

    /// ID of the booked amenity.
    pub amenity: amenity::Id,

    /// ID of the booking resident.
    pub resident: user::Id,

    /// Day the booking was submitted on.
    pub booking_date: Date,

    /// Day the amenity will be used on.
    pub usage_date: Date,

    /// Start of the reserved slot.
    pub start_time: TimeOfDay,

    /// End of the reserved slot.
    pub end_time: TimeOfDay,

    /// Free-form note for the administrator, if any.
    pub note: Option<String>,

    /// Status of the booking.
    pub status: booking::Status,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id,
            amenity: booking.amenity_id,
            resident: booking.resident_id,
            booking_date: booking.booked_on,
            usage_date: booking.usage_date,
            start_time: booking.slot.start(),
            end_time: booking.slot.end(),
            note: booking.note.map(|n| n.to_string()),
            status: booking.status,
        }
    }
}

/// Parameters of the [`list()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Resident to list bookings of.
    #[serde(default)]
    pub resident: Option<user::Id>,

    /// Amenity to list bookings of.
    #[serde(default)]
    pub amenity: Option<amenity::Id>,

    /// Number of bookings to return.
    #[serde(default)]
    pub first: Option<i64>,

    /// Cursor to resume the listing after.
    #[serde(default)]
    pub after: Option<booking::Id>,
}

/// Page of [`Booking`]s.
#[derive(Debug, Serialize)]
pub struct Page {
    /// [`Booking`]s of this [`Page`], ordered by usage date ascending.
    pub items: Vec<Booking>,

    /// Cursor resuming the listing after this [`Page`].
    pub end_cursor: Option<booking::Id>,

    /// Indicator whether more [`Booking`]s follow.
    pub has_next_page: bool,
}

/// Reads one [`Page`] of bookings matching the provided filter.
async fn read_page(
    ctx: &Context,
    filter: read::booking::list::Filter,
    first: Option<i64>,
    after: Option<booking::Id>,
    default_size: i64,
) -> Result<Page, Error> {
    let arguments = Arguments::new(first, after, default_size)
        .ok_or_else(|| Error::validation(&"invalid pagination arguments"))?;

    let page = ctx
        .service()
        .execute(query::booking::List::by(read::booking::list::Selector {
            arguments,
            filter,
        }))
        .await
        .map_err(AsError::into_error)?;

    let ids = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
    let mut bookings = ctx
        .service()
        .execute(query::booking::ByIds::by(ids.clone()))
        .await
        .map_err(AsError::into_error)?;

    let info = page.page_info();
    Ok(Page {
        items: ids
            .into_iter()
            .filter_map(|id| bookings.remove(&id))
            .map(Into::into)
            .collect(),
        end_cursor: info.end_cursor,
        has_next_page: info.has_next_page,
    })
}

/// `GET /amenitybookings/?resident=&amenity=&first=&after=`: lists bookings,
/// ordered by usage date ascending.
///
/// Residents always receive their own bookings; staff may filter by any
/// resident or amenity.
///
/// # Errors
///
/// If the request is not authenticated, or the pagination arguments are
/// invalid.
pub async fn list(
    ctx: Context,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, Error> {
    let session = ctx.current_session().await?;

    let resident_id = match session.role {
        user::Role::Resident => Some(session.user_id),
        user::Role::Admin | user::Role::Management => params.resident,
    };

    let page = read_page(
        &ctx,
        read::booking::list::Filter {
            amenity_id: params.amenity,
            resident_id,
        },
        params.first,
        params.after,
        DEFAULT_PAGE_SIZE,
    )
    .await?;

    Ok(Json(page))
}

/// `GET /amenitybookings/{id}/`: lists bookings of one amenity.
///
/// # Errors
///
/// If the request is not authenticated.
pub async fn for_amenity(
    ctx: Context,
    Path(amenity_id): Path<amenity::Id>,
) -> Result<Json<Page>, Error> {
    let _session = ctx.current_session().await?;

    let page = read_page(
        &ctx,
        read::booking::list::Filter {
            amenity_id: Some(amenity_id),
            resident_id: None,
        },
        Some(AMENITY_PAGE_SIZE),
        None,
        AMENITY_PAGE_SIZE,
    )
    .await?;

    Ok(Json(page))
}

/// Input of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct BookingInput {
    /// ID of the amenity to book.
    pub amenity: amenity::Id,

    /// Day the amenity will be used on.
    pub usage_date: Date,

    /// Start of the requested slot.
    pub start_time: TimeOfDay,

    /// End of the requested slot.
    pub end_time: TimeOfDay,

    /// Free-form note for the administrator, if any.
    #[serde(default)]
    pub note: Option<String>,
}

/// `POST /amenitybookings/`: submits a new booking for the authenticated
/// resident.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the slot is empty, inverted, or outside the
///   amenity's operating hours;
/// - `CONFLICT` if an identical booking was already submitted;
/// - `CAPACITY_EXCEEDED` if every overlapping window is taken.
pub async fn create(
    ctx: Context,
    Json(input): Json<BookingInput>,
) -> Result<Json<Booking>, Error> {
    let session = ctx.current_session().await?;

    let note = input
        .note
        .map(|n| {
            booking::Note::new(n)
                .ok_or_else(|| Error::validation(&"invalid `note`"))
        })
        .transpose()?;

    let booking = ctx
        .service()
        .execute(command::CreateBooking {
            amenity_id: input.amenity,
            resident_id: session.user_id,
            usage_date: input.usage_date,
            start: input.start_time,
            end: input.end_time,
            note,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(booking.into()))
}

/// Input of the [`set_status()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct SetStatusInput {
    /// Status to transition the booking into.
    pub status: booking::Status,
}

/// `PATCH /amenitybookings/{id}/set-status/`: decides on a booking.
///
/// # Errors
///
/// If the actor is not staff, the booking does not exist, or the transition
/// violates the status workflow.
pub async fn set_status(
    ctx: Context,
    Path(id): Path<booking::Id>,
    Json(input): Json<SetStatusInput>,
) -> Result<Json<Booking>, Error> {
    let _session = ctx.current_staff_session().await?;

    let booking = ctx
        .service()
        .execute(command::SetBookingStatus {
            booking_id: id,
            status: input.status,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(booking.into()))
}

/// `DELETE /amenitybookings/{id}/`: administrative hard delete.
///
/// # Errors
///
/// If the actor is not an administrator, or the booking does not exist.
pub async fn delete(
    ctx: Context,
    Path(id): Path<booking::Id>,
) -> Result<http::StatusCode, Error> {
    let _session = ctx.current_admin_session().await?;

    ctx.service()
        .execute(command::DeleteBooking { booking_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::AmenityNotExists(_) => Some(Error::not_found(&self)),
            E::CapacityExceeded { .. } => Some(Error::capacity_exceeded(&self)),
            E::DuplicateBooking { .. } => Some(Error::conflict(&self)),
            E::InvalidSlot(_) | E::OutsideOperatingHours { .. } => {
                Some(Error::validation(&self))
            }
        }
    }
}

impl AsError for command::set_booking_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::set_booking_status::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => Some(Error::not_found(&self)),
            E::InvalidTransition { .. } => {
                Some(Error::invalid_transition(&self))
            }
        }
    }
}

impl AsError for command::delete_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_booking::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::BookingNotExists(_) => Some(Error::not_found(&self)),
        }
    }
}
