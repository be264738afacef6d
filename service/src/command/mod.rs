//! [`Command`] definition.

pub mod authorize_user_session;
pub mod complete_payment;
pub mod create_amenity;
pub mod create_booking;
pub mod create_fee_category;
pub mod create_user;
pub mod create_user_session;
pub mod delete_amenity;
pub mod delete_booking;
pub mod fail_payment;
pub mod initiate_payment;
pub mod refund_payment;
pub mod set_booking_status;
pub mod set_fee_category_active;
pub mod update_amenity;
pub mod update_fee_category;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    complete_payment::CompletePayment, create_amenity::CreateAmenity,
    create_booking::CreateBooking, create_fee_category::CreateFeeCategory,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_amenity::DeleteAmenity, delete_booking::DeleteBooking,
    fail_payment::FailPayment, initiate_payment::InitiatePayment,
    refund_payment::RefundPayment, set_booking_status::SetBookingStatus,
    set_fee_category_active::SetFeeCategoryActive,
    update_amenity::UpdateAmenity, update_fee_category::UpdateFeeCategory,
};
