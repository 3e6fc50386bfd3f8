mod hotel;
mod reservation;
mod room;
mod user;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use hotel::{Hotel, HotelStore, HotelUpdate, NewHotel};
pub use reservation::{NewReservation, Reservation, ReservationStore};
pub use room::{NewRoom, Room, RoomStatus, RoomStore, RoomUpdate};
pub use user::{NewUser, Profile, UnknownRole, User, UserRole, UserStore};

/// Whether an error is a UNIQUE constraint violation.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let pool = if path == ":memory:" {
            // Every connection to sqlite::memory: is a separate database,
            // so keep exactly one alive for the lifetime of the pool.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&format!("sqlite:{}?mode=rwc", path))
                .await?
        };

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        if version < 2 {
            self.migrate_v2().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                // Email is compared exactly as stored (no NOCASE)
                "CREATE TABLE users (
                    id TEXT PRIMARY KEY NOT NULL,
                    full_name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    phone TEXT,
                    role TEXT NOT NULL DEFAULT 'user',
                    refresh_token TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_users_refresh_token ON users(refresh_token)",
            ],
        )
        .await
    }

    async fn migrate_v2(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            2,
            &[
                "CREATE TABLE hotels (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    address TEXT NOT NULL,
                    city TEXT NOT NULL,
                    country TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    email TEXT NOT NULL,
                    star_rating INTEGER NOT NULL,
                    image_url TEXT,
                    description TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                    UNIQUE (name, address)
                )",
                "CREATE INDEX idx_hotels_created_at ON hotels(created_at)",
                "CREATE TABLE rooms (
                    id TEXT PRIMARY KEY NOT NULL,
                    room_number TEXT UNIQUE NOT NULL,
                    room_type TEXT NOT NULL,
                    floor INTEGER NOT NULL,
                    price_per_night REAL,
                    status TEXT NOT NULL DEFAULT 'available',
                    max_guests TEXT,
                    amenities TEXT NOT NULL DEFAULT '[]',
                    image_url TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE TABLE reservations (
                    id TEXT PRIMARY KEY NOT NULL,
                    guest_id TEXT NOT NULL,
                    guest_name TEXT,
                    room_id TEXT NOT NULL,
                    room_number TEXT,
                    check_in_date TEXT,
                    check_out_date TEXT,
                    num_guests INTEGER,
                    status TEXT,
                    total_amount REAL,
                    amount_paid REAL,
                    payment_status TEXT,
                    special_requests TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_reservations_guest_id ON reservations(guest_id)",
            ],
        )
        .await
    }

    /// Get the user (credential) store.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Get the hotel store.
    pub fn hotels(&self) -> HotelStore {
        HotelStore::new(self.pool.clone())
    }

    /// Get the room store.
    pub fn rooms(&self) -> RoomStore {
        RoomStore::new(self.pool.clone())
    }

    /// Get the reservation store.
    pub fn reservations(&self) -> ReservationStore {
        ReservationStore::new(self.pool.clone())
    }

    /// Cheap liveness check; returns the database's current UTC time.
    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user<'a>(email: &'a str) -> NewUser<'a> {
        NewUser {
            full_name: "Alice Example",
            email,
            password_hash: "$argon2id$placeholder",
            phone: Some("+1 555 0100"),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let created = db.users().create(&new_user("alice@test.com")).await.unwrap();

        let user = db
            .users()
            .get_by_email("alice@test.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.full_name, "Alice Example");
        assert_eq!(user.role, UserRole::User);
        assert!(user.refresh_token.is_none());

        let user = db.users().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(user.email, "alice@test.com");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let db = Database::open(":memory:").await.unwrap();
        db.users().create(&new_user("alice@test.com")).await.unwrap();

        assert!(
            db.users()
                .get_by_email("Alice@test.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = Database::open(":memory:").await.unwrap();

        db.users().create(&new_user("alice@test.com")).await.unwrap();
        let err = db
            .users()
            .create(&new_user("alice@test.com"))
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_set_and_clear_refresh_token() {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.users().create(&new_user("alice@test.com")).await.unwrap();

        assert!(db.users().set_refresh_token(&user.id, "tok-1").await.unwrap());
        let found = db
            .users()
            .get_by_refresh_token("tok-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        // Overwrite drops the previous value
        db.users().set_refresh_token(&user.id, "tok-2").await.unwrap();
        assert!(
            db.users()
                .get_by_refresh_token("tok-1")
                .await
                .unwrap()
                .is_none()
        );

        assert!(!db.users().clear_refresh_token("tok-1").await.unwrap());
        assert!(db.users().clear_refresh_token("tok-2").await.unwrap());
        let user = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert!(user.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_set_refresh_token_unknown_user() {
        let db = Database::open(":memory:").await.unwrap();
        assert!(!db.users().set_refresh_token("missing", "tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_refresh_token_for_principal() {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.users().create(&new_user("alice@test.com")).await.unwrap();

        assert!(!db.users().clear_refresh_token_for(&user.id).await.unwrap());

        db.users().set_refresh_token(&user.id, "tok-1").await.unwrap();
        assert!(db.users().clear_refresh_token_for(&user.id).await.unwrap());
        let user = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert!(user.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_unknown_stored_role_is_an_error() {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.users().create(&new_user("alice@test.com")).await.unwrap();
        sqlx::query("UPDATE users SET role = 'staff' WHERE id = ?")
            .bind(&user.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let err = db.users().get_by_id(&user.id).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
        assert!(db.users().list().await.is_err());
    }

    #[tokio::test]
    async fn test_ping() {
        let db = Database::open(":memory:").await.unwrap();
        db.ping().await.unwrap();
    }
}
