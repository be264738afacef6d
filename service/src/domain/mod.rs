//! Domain definitions.

pub mod amenity;
pub mod booking;
pub mod fee;
pub mod payment;
pub mod user;

pub use self::{
    amenity::Amenity, booking::Booking, fee::Category, payment::Transaction,
    user::User,
};
