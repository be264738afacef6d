//! Fee [`Category`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{fee, Category},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a fee [`Category`].
const COLUMNS: &str = "\
    id, name, amount, amount_currency, tax, \
    frequency, kind, grace_period, is_recurring, active, \
    resident_id, description, created_at";

/// Restores a fee [`Category`] from the provided [`Row`].
fn from_row(row: &Row) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("amount_currency"),
        },
        tax: row.get("tax"),
        frequency: row.get("frequency"),
        kind: row.get("kind"),
        grace_period: u16::try_from(row.get::<_, i32>("grace_period"))
            .expect("`grace_period` overflow")
            .into(),
        is_recurring: row.get("is_recurring"),
        active: row.get("active"),
        resident_id: row.get("resident_id"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Category>, fee::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Category>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Category>, fee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: fee::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payment_categories \
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

impl<C> Database<Select<By<Vec<Category>, read::fee::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Category>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Category>, read::fee::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::fee::list::Filter {
            active,
            resident_id,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let active_idx = active.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });
        let resident_idx = resident_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payment_categories \
             WHERE true \
                   {active_filtering} \
                   {resident_filtering} \
             ORDER BY created_at DESC, id DESC",
            active_filtering =
                active_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND active = ${idx}::BOOL"))
                }),
            // A resident sees both addressed and broadcast categories.
            resident_filtering =
                resident_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND (resident_id = ${idx}::UUID \
                              OR resident_id IS NULL)"
                    ))
                }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Category>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Category>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(category): Insert<Category>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(category))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Category>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(category): Update<Category>,
    ) -> Result<Self::Ok, Self::Err> {
        let Category {
            id,
            name,
            amount,
            tax,
            frequency,
            kind,
            grace_period,
            is_recurring,
            active,
            resident_id,
            description,
            created_at,
        } = category;

        let amount_currency = amount.currency;
        let amount = amount.amount;
        let grace_period = i32::from(u16::from(grace_period));

        const SQL: &str = "\
            INSERT INTO payment_categories (\
                id, name, amount, amount_currency, tax, \
                frequency, kind, grace_period, is_recurring, active, \
                resident_id, description, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::NUMERIC, $4::INT2, $5::NUMERIC, \
                $6::INT2, $7::INT2, $8::INT4, $9::BOOL, $10::BOOL, \
                $11::UUID, $12::VARCHAR, $13::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                amount = EXCLUDED.amount, \
                amount_currency = EXCLUDED.amount_currency, \
                tax = EXCLUDED.tax, \
                frequency = EXCLUDED.frequency, \
                kind = EXCLUDED.kind, \
                grace_period = EXCLUDED.grace_period, \
                is_recurring = EXCLUDED.is_recurring, \
                active = EXCLUDED.active, \
                resident_id = EXCLUDED.resident_id, \
                description = EXCLUDED.description";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &amount,
                &amount_currency,
                &tax,
                &frequency,
                &kind,
                &grace_period,
                &is_recurring,
                &active,
                &resident_id,
                &description,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
