//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    timeslot::InvalidTimeSlot,
    Date, DateTime, TimeOfDay, TimeSlot,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{amenity, booking, user, Amenity, Booking},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// Name of the unique constraint guarding duplicate [`Booking`] submissions.
const DUPLICATE_CONSTRAINT: &str = "amenity_bookings_unique_start";

/// [`Command`] for creating a new [`Booking`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`Amenity`] to book.
    pub amenity_id: amenity::Id,

    /// ID of the resident [`User`] who books.
    ///
    /// [`User`]: crate::domain::User
    pub resident_id: user::Id,

    /// [`Date`] the [`Amenity`] will be used on.
    pub usage_date: Date,

    /// Requested start time.
    pub start: TimeOfDay,

    /// Requested end time.
    pub end: TimeOfDay,

    /// Free-form note for the administrator, if any.
    pub note: Option<booking::Note>,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Amenity>, amenity::Id>>,
            Ok = Option<Amenity>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Amenity, amenity::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::IsDuplicate, read::booking::DuplicateStart>>,
            Ok = read::booking::IsDuplicate,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::OpenCount, read::booking::Overlapping>>,
            Ok = read::booking::OpenCount,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            amenity_id,
            resident_id,
            usage_date,
            start,
            end,
            note,
        } = cmd;

        let slot = TimeSlot::new(start, end)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let amenity = self
            .database()
            .execute(Select(By::<Option<Amenity>, _>::new(amenity_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AmenityNotExists(amenity_id))
            .map_err(tracerr::wrap!())?;

        if !amenity.hours.admits(&slot) {
            return Err(tracerr::new!(E::OutsideOperatingHours {
                slot,
                hours: amenity.hours,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serializes concurrent capacity checks upon the same `Amenity`.
        tx.execute(Lock(By::new(amenity.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let read::booking::IsDuplicate(duplicate) = tx
            .execute(Select(By::new(read::booking::DuplicateStart {
                amenity_id: amenity.id,
                resident_id,
                usage_date,
                start,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if duplicate {
            return Err(tracerr::new!(E::DuplicateBooking {
                amenity_id: amenity.id,
                resident_id,
            }));
        }

        let read::booking::OpenCount(taken) = tx
            .execute(Select(By::new(read::booking::Overlapping {
                amenity_id: amenity.id,
                usage_date,
                slot,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if taken >= i64::from(amenity.capacity.get()) {
            return Err(tracerr::new!(E::CapacityExceeded {
                amenity_id: amenity.id,
                capacity: amenity.capacity,
            }));
        }

        let booking = Booking {
            id: booking::Id::new(),
            amenity_id: amenity.id,
            resident_id,
            booked_on: DateTime::now().date(),
            usage_date,
            slot,
            note,
            status: booking::Status::New,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(booking.clone()))
            .await
            .map_err(|e| {
                // A concurrent identical submission slipping past the check
                // above lands on the unique index instead of double-booking.
                if e.as_ref().is_unique_violation(Some(DUPLICATE_CONSTRAINT)) {
                    tracerr::new!(E::DuplicateBooking {
                        amenity_id: amenity.id,
                        resident_id,
                    })
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Amenity`] with the provided ID does not exist.
    #[display("`Amenity(id: {_0})` does not exist")]
    AmenityNotExists(#[error(not(source))] amenity::Id),

    /// All overlapping windows of the [`Amenity`] are taken.
    #[display(
        "`Amenity(id: {amenity_id})` admits only {capacity} overlapping \
         bookings"
    )]
    CapacityExceeded {
        /// ID of the booked [`Amenity`].
        amenity_id: amenity::Id,

        /// Capacity of the booked [`Amenity`].
        capacity: amenity::Capacity,
    },

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// The resident already has a [`Booking`] of this [`Amenity`] starting at
    /// the same moment of the same day.
    #[display(
        "`User(id: {resident_id})` already booked \
         `Amenity(id: {amenity_id})` at this start time"
    )]
    DuplicateBooking {
        /// ID of the booked [`Amenity`].
        amenity_id: amenity::Id,

        /// ID of the booking resident.
        resident_id: user::Id,
    },

    /// Requested [`TimeSlot`] is empty or inverted.
    #[display("invalid requested slot: {_0}")]
    #[from]
    InvalidSlot(InvalidTimeSlot),

    /// Requested [`TimeSlot`] does not fit the operating hours.
    #[display("slot {slot} is outside of operating hours")]
    OutsideOperatingHours {
        /// Requested [`TimeSlot`].
        slot: TimeSlot,

        /// Operating hours of the [`Amenity`].
        hours: amenity::Hours,
    },
}

#[cfg(test)]
mod spec {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use common::{
        operations::{By, Commit, Insert, Lock, Select, Transact, Update},
        DateTime, TimeOfDay, TimeSlot,
    };
    use secrecy::SecretString;
    use tracerr::Traced;

    use crate::{
        domain::{amenity, booking, payment, user, Amenity, Booking, Transaction},
        infra::{database, gateway, Database},
        read, task, Config, Service,
    };

    use super::{Command as _, CreateBooking, ExecutionError as E};

    /// In-memory [`Database`] double backing the booking ledger.
    #[derive(Clone, Debug, Default)]
    struct FakeDb {
        amenities: Arc<Mutex<HashMap<amenity::Id, Amenity>>>,
        bookings: Arc<Mutex<Vec<Booking>>>,
    }

    impl Database<Transact> for FakeDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Database<Commit> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    impl Database<Lock<By<Amenity, amenity::Id>>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Lock<By<Amenity, amenity::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    impl Database<Select<By<Option<Amenity>, amenity::Id>>> for FakeDb {
        type Ok = Option<Amenity>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Amenity>, amenity::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self
                .amenities
                .lock()
                .unwrap()
                .get(&by.into_inner())
                .cloned())
        }
    }

    impl
        Database<
            Select<
                By<read::booking::IsDuplicate, read::booking::DuplicateStart>,
            >,
        > for FakeDb
    {
        type Ok = read::booking::IsDuplicate;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<
                By<read::booking::IsDuplicate, read::booking::DuplicateStart>,
            >,
        ) -> Result<Self::Ok, Self::Err> {
            let sel = by.into_inner();
            Ok(read::booking::IsDuplicate(
                self.bookings.lock().unwrap().iter().any(|b| {
                    b.amenity_id == sel.amenity_id
                        && b.resident_id == sel.resident_id
                        && b.usage_date == sel.usage_date
                        && b.slot.start() == sel.start
                }),
            ))
        }
    }

    impl
        Database<
            Select<By<read::booking::OpenCount, read::booking::Overlapping>>,
        > for FakeDb
    {
        type Ok = read::booking::OpenCount;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<
                By<read::booking::OpenCount, read::booking::Overlapping>,
            >,
        ) -> Result<Self::Ok, Self::Err> {
            let sel = by.into_inner();
            let count = self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| {
                    b.amenity_id == sel.amenity_id
                        && b.usage_date == sel.usage_date
                        && b.status.is_open()
                        && b.slot.overlaps(&sel.slot)
                })
                .count();
            Ok(read::booking::OpenCount(i64::try_from(count).unwrap()))
        }
    }

    impl Database<Insert<Booking>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(booking): Insert<Booking>,
        ) -> Result<Self::Ok, Self::Err> {
            self.bookings.lock().unwrap().push(booking);
            Ok(())
        }
    }

    // Required by the background task the `Service` spawns on startup.
    impl Database<Update<By<Transaction, payment::CreationDateTime>>>
        for FakeDb
    {
        type Ok = u64;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Update<By<Transaction, payment::CreationDateTime>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(0)
        }
    }

    fn config() -> Config {
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
            gateway: gateway::Config {
                payment_url: "https://gateway.test/pay".to_owned(),
                tmn_code: "TEST0001".to_owned(),
                hash_secret: SecretString::from("test".to_owned()),
                return_url: "https://app.test/return".to_owned(),
            },
            expire_pending_payments: task::expire_pending_payments::Config {
                interval: std::time::Duration::from_secs(60),
                timeout: std::time::Duration::from_secs(60),
            },
        }
    }

    fn tod(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn pool(capacity: u16) -> Amenity {
        Amenity {
            id: amenity::Id::new(),
            name: amenity::Name::new("Pool").unwrap(),
            location: amenity::Location::new("Tower A, roof").unwrap(),
            description: None,
            hours: TimeSlot::new(tod("06:00"), tod("22:00")).unwrap().into(),
            capacity: amenity::Capacity::new(capacity).unwrap(),
            fee: None,
            image: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn service_with(amenity: &Amenity) -> Service<FakeDb> {
        let db = FakeDb::default();
        _ = db
            .amenities
            .lock()
            .unwrap()
            .insert(amenity.id, amenity.clone());
        let (service, _bg) = Service::new(config(), db);
        service
    }

    fn request(amenity: &Amenity, start: &str, end: &str) -> CreateBooking {
        CreateBooking {
            amenity_id: amenity.id,
            resident_id: user::Id::new(),
            usage_date: "2025-07-14".parse().unwrap(),
            start: tod(start),
            end: tod(end),
            note: None,
        }
    }

    #[tokio::test]
    async fn inserts_a_new_booking_with_submitted_fields() {
        let amenity = pool(1);
        let service = service_with(&amenity);

        let cmd = request(&amenity, "10:00", "11:00");
        let resident_id = cmd.resident_id;
        let booking = service.execute(cmd).await.unwrap();

        assert_eq!(booking.amenity_id, amenity.id);
        assert_eq!(booking.resident_id, resident_id);
        assert_eq!(booking.usage_date, "2025-07-14".parse().unwrap());
        assert_eq!(booking.slot.start(), tod("10:00"));
        assert_eq!(booking.slot.end(), tod("11:00"));
        assert_eq!(booking.status, booking::Status::New);
    }

    #[tokio::test]
    async fn rejects_inverted_and_empty_slots() {
        let amenity = pool(1);
        let service = service_with(&amenity);

        let err = service
            .execute(request(&amenity, "11:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::InvalidSlot(_)));

        let err = service
            .execute(request(&amenity, "10:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::InvalidSlot(_)));
    }

    #[tokio::test]
    async fn rejects_slots_outside_operating_hours() {
        let amenity = pool(1);
        let service = service_with(&amenity);

        let err = service
            .execute(request(&amenity, "05:00", "07:00"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::OutsideOperatingHours { .. }));
    }

    #[tokio::test]
    async fn fails_for_an_unknown_amenity() {
        let amenity = pool(1);
        let service = service_with(&amenity);

        let mut cmd = request(&amenity, "10:00", "11:00");
        cmd.amenity_id = amenity::Id::new();
        let err = service.execute(cmd).await.unwrap_err();
        assert!(matches!(err.as_ref(), E::AmenityNotExists(_)));
    }

    #[tokio::test]
    async fn repeated_identical_submission_is_a_conflict() {
        let amenity = pool(2);
        let service = service_with(&amenity);

        let cmd = request(&amenity, "10:00", "11:00");
        let retry = cmd.clone();
        drop(service.execute(cmd).await.unwrap());

        let err = service.execute(retry).await.unwrap_err();
        assert!(matches!(err.as_ref(), E::DuplicateBooking { .. }));
    }

    #[tokio::test]
    async fn capacity_bounds_overlapping_bookings() {
        let amenity = pool(2);
        let service = service_with(&amenity);

        drop(service
            .execute(request(&amenity, "10:00", "12:00"))
            .await
            .unwrap());
        drop(service
            .execute(request(&amenity, "11:00", "13:00"))
            .await
            .unwrap());

        // Both existing bookings cover 11:00-12:00, so a third overlapping
        // one exceeds the capacity of 2…
        let err = service
            .execute(request(&amenity, "11:30", "12:30"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::CapacityExceeded { .. }));

        // …while a disjoint slot is still available.
        drop(service
            .execute(request(&amenity, "13:00", "14:00"))
            .await
            .unwrap());
    }
}
