//! Hotel storage.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct HotelStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub star_rating: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub star_rating: i64,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub star_rating: Option<i64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

macro_rules! hotel_columns {
    () => {
        "id, name, address, city, country, phone, email, star_rating, image_url, description, created_at, updated_at"
    };
}

impl HotelStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Hotel>, sqlx::Error> {
        sqlx::query_as(concat!(
            "SELECT ",
            hotel_columns!(),
            " FROM hotels ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Hotel>, sqlx::Error> {
        sqlx::query_as(concat!("SELECT ", hotel_columns!(), " FROM hotels WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn exists_with_name_and_address(
        &self,
        name: &str,
        address: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM hotels WHERE name = ? AND address = ?")
                .bind(name)
                .bind(address)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    pub async fn create(&self, new: &NewHotel) -> Result<Hotel, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO hotels (id, name, address, city, country, phone, email, star_rating, image_url, description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.country)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(new.star_rating)
        .bind(&new.image_url)
        .bind(&new.description)
        .execute(&self.pool)
        .await?;

        self.get(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update. Returns the updated hotel, or `None` if it does not exist.
    pub async fn update(&self, id: &str, update: &HotelUpdate) -> Result<Option<Hotel>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE hotels SET
                name = COALESCE(?, name),
                address = COALESCE(?, address),
                city = COALESCE(?, city),
                country = COALESCE(?, country),
                phone = COALESCE(?, phone),
                email = COALESCE(?, email),
                star_rating = COALESCE(?, star_rating),
                image_url = COALESCE(?, image_url),
                description = COALESCE(?, description),
                updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.address)
        .bind(&update.city)
        .bind(&update.country)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(update.star_rating)
        .bind(&update.image_url)
        .bind(&update.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a hotel, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Option<Hotel>, sqlx::Error> {
        let Some(hotel) = self.get(id).await? else {
            return Ok(None);
        };
        let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(hotel))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    use super::*;

    fn sample(name: &str) -> NewHotel {
        NewHotel {
            name: name.to_string(),
            address: "1 Harbour St".to_string(),
            city: "Sydney".to_string(),
            country: "Australia".to_string(),
            phone: "+61 2 0000 0000".to_string(),
            email: "front@harbour.test".to_string(),
            star_rating: 4,
            image_url: None,
            description: Some("Waterfront".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let db = Database::open(":memory:").await.unwrap();
        let hotels = db.hotels();

        let hotel = hotels.create(&sample("Harbour View")).await.unwrap();
        assert!(
            hotels
                .exists_with_name_and_address("Harbour View", "1 Harbour St")
                .await
                .unwrap()
        );

        let update = HotelUpdate {
            star_rating: Some(5),
            ..Default::default()
        };
        let updated = hotels.update(&hotel.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.star_rating, 5);
        assert_eq!(updated.name, "Harbour View");
        assert_eq!(updated.description.as_deref(), Some("Waterfront"));

        let deleted = hotels.delete(&hotel.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, hotel.id);
        assert!(hotels.get(&hotel.id).await.unwrap().is_none());
        assert!(hotels.delete(&hotel.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = Database::open(":memory:").await.unwrap();
        let result = db
            .hotels()
            .update("missing", &HotelUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
