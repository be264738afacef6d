//! [`Amenity`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money, TimeSlot,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{amenity, Amenity},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns selected for an [`Amenity`].
const COLUMNS: &str = "\
    id, name, location, description, \
    opening_time, closing_time, capacity, \
    fee, fee_currency, image, \
    created_at";

/// Restores an [`Amenity`] from the provided [`Row`].
fn from_row(row: &Row) -> Amenity {
    let opening = row.get("opening_time");
    let closing = row.get("closing_time");
    Amenity {
        id: row.get("id"),
        name: row.get("name"),
        location: row.get("location"),
        description: row.get("description"),
        hours: TimeSlot::new(opening, closing)
            .expect("stored hours are validated")
            .into(),
        capacity: u16::try_from(row.get::<_, i32>("capacity"))
            .ok()
            .and_then(amenity::Capacity::new)
            .expect("stored capacity is validated"),
        fee: row.get::<_, Option<_>>("fee").map(|amount| Money {
            amount,
            currency: row.get("fee_currency"),
        }),
        image: row.get("image"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Amenity>, amenity::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Amenity>, amenity::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: amenity::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM amenities \
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

impl<C> Database<Select<By<Vec<Amenity>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Amenity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Amenity>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM amenities \
             ORDER BY name ASC, id ASC",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Amenity>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Amenity>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(amenity): Insert<Amenity>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(amenity))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Amenity>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(amenity): Update<Amenity>,
    ) -> Result<Self::Ok, Self::Err> {
        let Amenity {
            id,
            name,
            location,
            description,
            hours,
            capacity,
            fee,
            image,
            created_at,
        } = amenity;

        let opening = hours.start();
        let closing = hours.end();
        let capacity = i32::from(capacity.get());
        let fee_amount = fee.map(|m| m.amount);
        let fee_currency = fee.map(|m| m.currency);

        const SQL: &str = "\
            INSERT INTO amenities (\
                id, name, location, description, \
                opening_time, closing_time, capacity, \
                fee, fee_currency, image, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIME, $6::TIME, $7::INT4, \
                $8::NUMERIC, $9::INT2, $10::VARCHAR, \
                $11::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                location = EXCLUDED.location, \
                description = EXCLUDED.description, \
                opening_time = EXCLUDED.opening_time, \
                closing_time = EXCLUDED.closing_time, \
                capacity = EXCLUDED.capacity, \
                fee = EXCLUDED.fee, \
                fee_currency = EXCLUDED.fee_currency, \
                image = EXCLUDED.image";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &location,
                &description,
                &opening,
                &closing,
                &capacity,
                &fee_amount,
                &fee_currency,
                &image,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Amenity, amenity::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Amenity, amenity::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: amenity::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM amenities \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Amenity, amenity::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Amenity, amenity::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: amenity::Id = by.into_inner();

        // Row lock is held until the surrounding transaction commits.
        const SQL: &str = "\
            SELECT id \
            FROM amenities \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
