pub mod connection;
pub mod entities;
pub mod repositories;

use sea_orm::{DatabaseConnection, DbErr};

pub use repositories::SnapshotRepository;

pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let connection = connection::connect_and_migrate(database_url).await?;
        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Ledger storage backed by this database.
    pub fn snapshots(&self) -> SnapshotRepository {
        SnapshotRepository::new(self.connection.clone())
    }
}
