//! REST API definitions.

pub mod amenity;
pub mod auth;
pub mod booking;
pub mod category;
pub mod payment;
pub mod user;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

/// Builds the [`Router`] of the REST API.
///
/// The [`Service`] and [`auth::Clients`] extensions must be layered on top by
/// the caller.
///
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/o/token/", post(auth::token))
        .route("/users/", post(user::create))
        .route("/amenities/", get(amenity::list).post(amenity::create))
        .route(
            "/amenities/:id/",
            put(amenity::update)
                .patch(amenity::update)
                .delete(amenity::delete),
        )
        .route("/amenities/:id/availability/", get(amenity::availability))
        .route(
            "/amenitybookings/",
            get(booking::list).post(booking::create),
        )
        .route(
            "/amenitybookings/:id/",
            get(booking::for_amenity).delete(booking::delete),
        )
        .route("/amenitybookings/:id/set-status/", patch(booking::set_status))
        .route(
            "/paymentcategories/",
            get(category::list).post(category::create),
        )
        .route("/paymentcategories/payable/", get(category::payable))
        .route("/paymentcategories/:id/", patch(category::update))
        .route("/paymenttransactions/my-payments/", get(payment::my_payments))
        .route(
            "/paymenttransactions/:id/create-vnpay-payment/",
            post(payment::create_vnpay),
        )
        .route(
            "/paymenttransactions/:id/update-payment/",
            patch(payment::update_payment),
        )
}
