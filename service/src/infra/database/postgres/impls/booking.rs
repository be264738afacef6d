//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    TimeSlot,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{amenity, booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a [`Booking`].
const COLUMNS: &str = "\
    id, amenity_id, resident_id, \
    booked_on, usage_date, start_time, end_time, \
    note, status, created_at";

/// Restores a [`Booking`] from the provided [`Row`].
fn from_row(row: &Row) -> Booking {
    let start = row.get("start_time");
    let end = row.get("end_time");
    Booking {
        id: row.get("id"),
        amenity_id: row.get("amenity_id"),
        resident_id: row.get("resident_id"),
        booked_on: row.get("booked_on"),
        usage_date: row.get("usage_date"),
        slot: TimeSlot::new(start, end).expect("stored slot is validated"),
        note: row.get("note"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM amenity_bookings \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<HashMap<booking::Id, Booking>, Vec<booking::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, Vec<booking::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM amenity_bookings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let booking = from_row(row);
                (booking.id, booking)
            })
            .collect())
    }
}

impl<C>
    Database<Select<By<read::booking::IsDuplicate, read::booking::DuplicateStart>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::IsDuplicate;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::IsDuplicate, read::booking::DuplicateStart>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::DuplicateStart {
            amenity_id,
            resident_id,
            usage_date,
            start,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM amenity_bookings \
            WHERE amenity_id = $1::UUID \
              AND resident_id = $2::UUID \
              AND usage_date = $3::DATE \
              AND start_time = $4::TIME \
            LIMIT 1";
        self.query_opt(SQL, &[&amenity_id, &resident_id, &usage_date, &start])
            .await
            .map_err(tracerr::wrap!())
            .map(|r| read::booking::IsDuplicate(r.is_some()))
    }
}

impl<C>
    Database<Select<By<read::booking::OpenCount, read::booking::Overlapping>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::OpenCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::OpenCount, read::booking::Overlapping>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::Overlapping {
            amenity_id,
            usage_date,
            slot,
        } = by.into_inner();

        let start = slot.start();
        let end = slot.end();

        // Half-open `[start, end)` overlap.
        const SQL: &str = "\
            SELECT COUNT(*)::INT8 \
            FROM amenity_bookings \
            WHERE amenity_id = $1::UUID \
              AND usage_date = $2::DATE \
              AND status IN ($3::INT2, $4::INT2) \
              AND start_time < $6::TIME \
              AND end_time > $5::TIME";
        self.query_opt(
            SQL,
            &[
                &amenity_id,
                &usage_date,
                &booking::Status::New,
                &booking::Status::Approved,
                &start,
                &end,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| {
            read::booking::OpenCount(
                row.expect("always exists").get::<_, i64>(0),
            )
        })
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::OnDate>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::OnDate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::OnDate {
            amenity_id,
            usage_date,
        } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM amenity_bookings \
             WHERE amenity_id = $1::UUID \
               AND usage_date = $2::DATE \
             ORDER BY start_time ASC, id ASC",
        );
        Ok(self
            .query(&sql, &[&amenity_id, &usage_date])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::booking::HasOpen, amenity::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::HasOpen;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::booking::HasOpen, amenity::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let amenity_id: amenity::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM amenity_bookings \
            WHERE amenity_id = $1::UUID \
              AND status IN ($2::INT2, $3::INT2) \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[
                &amenity_id,
                &booking::Status::New,
                &booking::Status::Approved,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|r| read::booking::HasOpen(r.is_some()))
    }
}

impl<C>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector {
            arguments,
            filter:
                read::booking::list::Filter {
                    amenity_id,
                    resident_id,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let amenity_idx = amenity_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let resident_idx = resident_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM amenity_bookings \
             WHERE true \
                   {cursor} \
                   {amenity_filtering} \
                   {resident_filtering} \
             ORDER BY usage_date ASC, \
                      id ASC \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(
                    "AND (usage_date, id) > \
                     (SELECT usage_date, id \
                      FROM amenity_bookings \
                      WHERE id = ${idx}::UUID)"
                ))
            }),
            amenity_filtering =
                amenity_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND amenity_id = ${idx}::UUID"))
                }),
            resident_filtering =
                resident_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND resident_id = ${idx}::UUID"))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id: booking::Id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::booking::list::Page::new(edges, has_more))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            amenity_id,
            resident_id,
            booked_on,
            usage_date,
            slot,
            note,
            status,
            created_at,
        } = booking;

        let start = slot.start();
        let end = slot.end();

        const SQL: &str = "\
            INSERT INTO amenity_bookings (\
                id, amenity_id, resident_id, \
                booked_on, usage_date, start_time, end_time, \
                note, status, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::DATE, $5::DATE, $6::TIME, $7::TIME, \
                $8::VARCHAR, $9::INT2, $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET usage_date = EXCLUDED.usage_date, \
                start_time = EXCLUDED.start_time, \
                end_time = EXCLUDED.end_time, \
                note = EXCLUDED.note, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &amenity_id,
                &resident_id,
                &booked_on,
                &usage_date,
                &start,
                &end,
                &note,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM amenity_bookings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        // Row lock is held until the surrounding transaction commits.
        const SQL: &str = "\
            SELECT id \
            FROM amenity_bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
