pub mod messages;
pub mod repository;
pub mod users;

#[cfg(test)]
pub mod memory;

pub use repository::*;

use mongodb::{Client, Collection, Database};
use std::error::Error;
use std::time::Duration;

pub const USERS: &str = "users";
pub const MESSAGES: &str = "messages";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        // Nenhuma chamada ao banco pode travar o event loop indefinidamente
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("chat-app");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // users(email) - unique, enforces one account per email
        let users = self.collection::<mongodb::bson::Document>(USERS);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let messages = self.collection::<mongodb::bson::Document>(MESSAGES);

        // messages(senderId, receiverId, createdAt) - conversation history
        let conversation_index = IndexModel::builder()
            .keys(doc! { "senderId": 1, "receiverId": 1, "createdAt": 1 })
            .build();

        match messages.create_index(conversation_index).await {
            Ok(_) => log::info!("   ✅ Index created: messages(senderId, receiverId, createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // messages(receiverId, seen) - unseen counters
        let unseen_index = IndexModel::builder()
            .keys(doc! { "receiverId": 1, "seen": 1 })
            .build();

        match messages.create_index(unseen_index).await {
            Ok(_) => log::info!("   ✅ Index created: messages(receiverId, seen)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
