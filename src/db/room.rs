//! Room storage.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct RoomStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Cleaning,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Cleaning => "cleaning",
        }
    }

    fn from_db(s: &str) -> Self {
        match s {
            "occupied" => RoomStatus::Occupied,
            "cleaning" => RoomStatus::Cleaning,
            _ => RoomStatus::Available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub room_type: String,
    pub floor: i64,
    pub price_per_night: Option<f64>,
    pub status: RoomStatus,
    pub max_guests: Option<String>,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    pub room_type: String,
    pub floor: i64,
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub status: RoomStatus,
    pub max_guests: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomUpdate {
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub floor: Option<i64>,
    pub price_per_night: Option<f64>,
    pub status: Option<RoomStatus>,
    pub max_guests: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub image_url: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: String,
    room_number: String,
    room_type: String,
    floor: i64,
    price_per_night: Option<f64>,
    status: String,
    max_guests: Option<String>,
    amenities: String,
    image_url: Option<String>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            room_number: row.room_number,
            room_type: row.room_type,
            floor: row.floor,
            price_per_night: row.price_per_night,
            status: RoomStatus::from_db(&row.status),
            max_guests: row.max_guests,
            amenities: serde_json::from_str(&row.amenities).unwrap_or_default(),
            image_url: row.image_url,
        }
    }
}

fn encode_amenities(amenities: &[String]) -> String {
    serde_json::to_string(amenities).unwrap_or_else(|_| "[]".to_string())
}

macro_rules! room_columns {
    () => {
        "id, room_number, room_type, floor, price_per_night, status, max_guests, amenities, image_url"
    };
}

impl RoomStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Room>, sqlx::Error> {
        let rows: Vec<RoomRow> = sqlx::query_as(concat!(
            "SELECT ",
            room_columns!(),
            " FROM rooms ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Room>, sqlx::Error> {
        let row: Option<RoomRow> =
            sqlx::query_as(concat!("SELECT ", room_columns!(), " FROM rooms WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Room::from))
    }

    pub async fn get_by_number(&self, room_number: &str) -> Result<Option<Room>, sqlx::Error> {
        let row: Option<RoomRow> = sqlx::query_as(concat!(
            "SELECT ",
            room_columns!(),
            " FROM rooms WHERE room_number = ?"
        ))
        .bind(room_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Room::from))
    }

    pub async fn create(&self, new: &NewRoom) -> Result<Room, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO rooms (id, room_number, room_type, floor, price_per_night, status, max_guests, amenities, image_url)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.room_number)
        .bind(&new.room_type)
        .bind(new.floor)
        .bind(new.price_per_night)
        .bind(new.status.as_str())
        .bind(&new.max_guests)
        .bind(encode_amenities(&new.amenities))
        .bind(&new.image_url)
        .execute(&self.pool)
        .await?;

        self.get(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update. Returns the updated room, or `None` if it does not exist.
    pub async fn update(&self, id: &str, update: &RoomUpdate) -> Result<Option<Room>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rooms SET
                room_number = COALESCE(?, room_number),
                room_type = COALESCE(?, room_type),
                floor = COALESCE(?, floor),
                price_per_night = COALESCE(?, price_per_night),
                status = COALESCE(?, status),
                max_guests = COALESCE(?, max_guests),
                amenities = COALESCE(?, amenities),
                image_url = COALESCE(?, image_url)
             WHERE id = ?",
        )
        .bind(&update.room_number)
        .bind(&update.room_type)
        .bind(update.floor)
        .bind(update.price_per_night)
        .bind(update.status.map(|s| s.as_str()))
        .bind(&update.max_guests)
        .bind(update.amenities.as_deref().map(encode_amenities))
        .bind(&update.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a room, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Option<Room>, sqlx::Error> {
        let Some(room) = self.get(id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(room))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    use super::*;

    #[tokio::test]
    async fn test_amenities_round_trip_and_default_status() {
        let db = Database::open(":memory:").await.unwrap();
        let new: NewRoom = serde_json::from_value(serde_json::json!({
            "room_number": "101",
            "room_type": "double",
            "floor": 1,
            "amenities": ["wifi", "minibar"]
        }))
        .unwrap();

        let room = db.rooms().create(&new).await.unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.amenities, vec!["wifi", "minibar"]);

        let update = RoomUpdate {
            status: Some(RoomStatus::Cleaning),
            ..Default::default()
        };
        let room = db.rooms().update(&room.id, &update).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Cleaning);
        assert_eq!(room.amenities.len(), 2);

        assert!(db.rooms().get_by_number("101").await.unwrap().is_some());
    }

    #[test]
    fn test_unknown_status_rejected_on_input() {
        let result: Result<NewRoom, _> = serde_json::from_value(serde_json::json!({
            "room_number": "102",
            "room_type": "single",
            "floor": 1,
            "status": "flooded"
        }));
        assert!(result.is_err());
    }
}
