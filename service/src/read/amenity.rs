//! [`Amenity`] read model definitions.

#[cfg(doc)]
use crate::domain::Amenity;

pub mod availability {
    //! Remaining capacity of an [`Amenity`] per discrete time window.

    use std::time::Duration;

    use common::TimeSlot;

    use crate::domain::amenity::{Capacity, Hours};
    #[cfg(doc)]
    use crate::domain::{Amenity, Booking};

    /// Width of one availability window.
    const WINDOW: Duration = Duration::from_secs(60 * 60);

    /// One bookable window of an [`Amenity`] with its remaining capacity.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Window {
        /// [`TimeSlot`] of this [`Window`].
        pub slot: TimeSlot,

        /// Remaining number of [`Booking`]s this [`Window`] admits.
        pub remaining: u16,
    }

    /// Slices the operating [`Hours`] into hourly [`Window`]s and reports the
    /// capacity remaining in each, given the slots of all open [`Booking`]s
    /// on the requested date.
    ///
    /// The trailing window is clamped to the closing time, so a venue open
    /// until half past an hour still exposes its last fraction.
    #[must_use]
    pub fn windows(
        hours: Hours,
        capacity: Capacity,
        booked: &[TimeSlot],
    ) -> Vec<Window> {
        let mut out = Vec::new();
        let mut start = hours.start();
        while start < hours.end() {
            let end = start.advance_clamped(WINDOW, hours.end());
            let slot =
                TimeSlot::new(start, end).expect("start < end by construction");

            let taken = booked.iter().filter(|b| b.overlaps(&slot)).count();
            let taken = u16::try_from(taken).unwrap_or(u16::MAX);
            out.push(Window {
                slot,
                remaining: capacity.get().saturating_sub(taken),
            });

            start = end;
        }
        out
    }

    #[cfg(test)]
    mod spec {
        use common::{TimeOfDay, TimeSlot};

        use crate::domain::amenity::{Capacity, Hours};

        use super::windows;

        fn slot(start: &str, end: &str) -> TimeSlot {
            TimeSlot::new(
                start.parse::<TimeOfDay>().unwrap(),
                end.parse::<TimeOfDay>().unwrap(),
            )
            .unwrap()
        }

        #[test]
        fn slices_hours_into_hourly_windows() {
            let out = windows(
                Hours::from(slot("08:00", "11:00")),
                Capacity::new(2).unwrap(),
                &[],
            );
            assert_eq!(out.len(), 3);
            assert_eq!(out[0].slot, slot("08:00", "09:00"));
            assert_eq!(out[2].slot, slot("10:00", "11:00"));
            assert!(out.iter().all(|w| w.remaining == 2));
        }

        #[test]
        fn clamps_the_trailing_window_to_closing() {
            let out = windows(
                Hours::from(slot("08:00", "09:30")),
                Capacity::new(1).unwrap(),
                &[],
            );
            assert_eq!(out.len(), 2);
            assert_eq!(out[1].slot, slot("09:00", "09:30"));
        }

        #[test]
        fn bookings_reduce_only_the_windows_they_overlap() {
            let out = windows(
                Hours::from(slot("08:00", "12:00")),
                Capacity::new(2).unwrap(),
                &[slot("08:00", "10:00"), slot("09:30", "10:30")],
            );
            assert_eq!(out[0].remaining, 1); // 08:00-09:00
            assert_eq!(out[1].remaining, 0); // 09:00-10:00
            assert_eq!(out[2].remaining, 1); // 10:00-11:00
            assert_eq!(out[3].remaining, 2); // 11:00-12:00
        }

        #[test]
        fn oversubscription_saturates_at_zero() {
            let out = windows(
                Hours::from(slot("08:00", "09:00")),
                Capacity::new(1).unwrap(),
                &[slot("08:00", "09:00"), slot("08:00", "09:00")],
            );
            assert_eq!(out[0].remaining, 0);
        }
    }
}
