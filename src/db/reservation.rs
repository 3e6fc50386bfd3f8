//! Reservation storage.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ReservationStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: String,
    pub guest_id: String,
    pub guest_name: Option<String>,
    pub room_id: String,
    pub room_number: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub num_guests: Option<i64>,
    pub status: Option<String>,
    pub total_amount: Option<f64>,
    pub amount_paid: Option<f64>,
    pub payment_status: Option<String>,
    pub special_requests: Option<String>,
}

/// Reservation body for create and (whole-record) update.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub guest_id: String,
    pub guest_name: Option<String>,
    pub room_id: String,
    pub room_number: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub num_guests: Option<i64>,
    pub status: Option<String>,
    pub total_amount: Option<f64>,
    pub amount_paid: Option<f64>,
    pub payment_status: Option<String>,
    pub special_requests: Option<String>,
}

macro_rules! reservation_columns {
    () => {
        "id, guest_id, guest_name, room_id, room_number, check_in_date, check_out_date, num_guests, status, total_amount, amount_paid, payment_status, special_requests"
    };
}

impl ReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Reservation>, sqlx::Error> {
        sqlx::query_as(concat!(
            "SELECT ",
            reservation_columns!(),
            " FROM reservations ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as(concat!(
            "SELECT ",
            reservation_columns!(),
            " FROM reservations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, new: &NewReservation) -> Result<Reservation, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(concat!(
            "INSERT INTO reservations (",
            reservation_columns!(),
            ") VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&id)
        .bind(&new.guest_id)
        .bind(&new.guest_name)
        .bind(&new.room_id)
        .bind(&new.room_number)
        .bind(&new.check_in_date)
        .bind(&new.check_out_date)
        .bind(new.num_guests)
        .bind(&new.status)
        .bind(new.total_amount)
        .bind(new.amount_paid)
        .bind(&new.payment_status)
        .bind(&new.special_requests)
        .execute(&self.pool)
        .await?;

        self.get(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Replace every field of a reservation. Returns `None` if it does not exist.
    pub async fn replace(
        &self,
        id: &str,
        new: &NewReservation,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reservations SET
                guest_id = ?, guest_name = ?, room_id = ?, room_number = ?,
                check_in_date = ?, check_out_date = ?, num_guests = ?, status = ?,
                total_amount = ?, amount_paid = ?, payment_status = ?, special_requests = ?
             WHERE id = ?",
        )
        .bind(&new.guest_id)
        .bind(&new.guest_name)
        .bind(&new.room_id)
        .bind(&new.room_number)
        .bind(&new.check_in_date)
        .bind(&new.check_out_date)
        .bind(new.num_guests)
        .bind(&new.status)
        .bind(new.total_amount)
        .bind(new.amount_paid)
        .bind(&new.payment_status)
        .bind(&new.special_requests)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a reservation, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Option<Reservation>, sqlx::Error> {
        let Some(reservation) = self.get(id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(reservation))
    }
}
