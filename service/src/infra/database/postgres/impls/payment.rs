//! Payment [`Transaction`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{payment, Transaction},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns selected for a payment [`Transaction`].
const COLUMNS: &str = "\
    id, category_id, resident_id, \
    amount, amount_currency, method, status, \
    external_ref, paid_at, created_at";

/// Restores a payment [`Transaction`] from the provided [`Row`].
fn from_row(row: &Row) -> Transaction {
    Transaction {
        id: row.get("id"),
        category_id: row.get("category_id"),
        resident_id: row.get("resident_id"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("amount_currency"),
        },
        method: row.get("method"),
        status: row.get("status"),
        external_ref: row.get("external_ref"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Transaction>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transaction>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payment_transactions \
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

impl<C> Database<Select<By<Vec<Transaction>, read::payment::ForResident>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Transaction>, read::payment::ForResident>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::payment::ForResident { resident_id } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM payment_transactions \
             WHERE resident_id = $1::UUID \
             ORDER BY created_at DESC, id DESC",
        );
        Ok(self
            .query(&sql, &[&resident_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::payment::Settled, read::payment::SettledBy>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::payment::Settled;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::payment::Settled, read::payment::SettledBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::payment::SettledBy {
            category_id,
            resident_id,
            period,
        } = by.into_inner();

        let completed = payment::Status::Completed;
        let mut ps: Vec<&(dyn ToSql + Sync)> =
            vec![&category_id, &resident_id, &completed];

        let year = period.map(|p| p.year);
        let month = period.map(|p| i32::from(p.month));
        let period_idx = year.as_ref().zip(month.as_ref()).map(|(y, m)| {
            ps.push(y);
            ps.push(m);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM payment_transactions \
             WHERE category_id = $1::UUID \
               AND resident_id = $2::UUID \
               AND status = $3::INT2 \
               AND paid_at IS NOT NULL \
                   {period_filtering} \
             LIMIT 1",
            period_filtering =
                period_idx.into_iter().format_with("", |idx, f| {
                    let month_idx = idx;
                    let year_idx = idx - 1;
                    f(&format_args!(
                        "AND EXTRACT(YEAR FROM paid_at)::INT4 = \
                         ${year_idx}::INT4 \
                         AND EXTRACT(MONTH FROM paid_at)::INT4 = \
                         ${month_idx}::INT4"
                    ))
                }),
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|r| read::payment::Settled(r.is_some()))
    }
}

impl<C> Database<Insert<Transaction>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Transaction>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(transaction))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Transaction>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transaction): Update<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transaction {
            id,
            category_id,
            resident_id,
            amount,
            method,
            status,
            external_ref,
            paid_at,
            created_at,
        } = transaction;

        let amount_currency = amount.currency;
        let amount = amount.amount;

        const SQL: &str = "\
            INSERT INTO payment_transactions (\
                id, category_id, resident_id, \
                amount, amount_currency, method, status, \
                external_ref, paid_at, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, $6::INT2, $7::INT2, \
                $8::VARCHAR, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                external_ref = EXCLUDED.external_ref, \
                paid_at = EXCLUDED.paid_at";
        self.exec(
            SQL,
            &[
                &id,
                &category_id,
                &resident_id,
                &amount,
                &amount_currency,
                &method,
                &status,
                &external_ref,
                &paid_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<By<Transaction, payment::CreationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Transaction, payment::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline: payment::CreationDateTime = by.into_inner();

        // Abandoned gateway redirects never settle: PENDING transactions
        // older than the deadline are failed in bulk.
        const SQL: &str = "\
            UPDATE payment_transactions \
            SET status = $1::INT2 \
            WHERE status = $2::INT2 \
              AND created_at < $3::TIMESTAMPTZ";
        self.exec(
            SQL,
            &[
                &payment::Status::Failed,
                &payment::Status::Pending,
                &deadline,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Lock<By<Transaction, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Transaction, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        // Row lock is held until the surrounding transaction commits.
        const SQL: &str = "\
            SELECT id \
            FROM payment_transactions \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
