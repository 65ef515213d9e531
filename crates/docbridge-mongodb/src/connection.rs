//! MongoDB connection management with pool pass-through and health checking

use std::time::Duration;

use bson::{doc, Document as BsonDocument};
use docbridge_common::{BridgeError, Result};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};

/// Driver pool settings forwarded into `ClientOptions`. The bridge keeps no
/// pool of its own.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections kept open by the driver
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the driver pool
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed
    pub max_idle_time: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: Some(5),
            max_pool_size: Some(20),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("docbridge".to_string()),
        }
    }
}

/// One constructed client plus the default database named by the URI
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database: Database,
    database_name: String,
}

impl Connection {
    /// Connects with default pool settings
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_config(connection_string, PoolConfig::default()).await
    }

    /// Connects with explicit pool settings
    pub async fn with_config(connection_string: &str, config: PoolConfig) -> Result<Self> {
        let mut client_options = ClientOptions::parse(connection_string).await?;

        if let Some(min) = config.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = config.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = config.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = config.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = config.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = config.app_name {
            client_options.app_name = Some(app);
        }

        // Pin the stable server API for cross-version compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;

        let database = client.default_database().ok_or_else(|| {
            BridgeError::Connection(
                "no default database specified in connection string".to_string(),
            )
        })?;

        let database_name = database.name().to_string();

        Ok(Self {
            client,
            database,
            database_name,
        })
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Get an untyped collection by physical name
    pub fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }

    /// Check if the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => Err(BridgeError::Connection(format!("ping failed: {}", e))),
        }
    }

    /// Database statistics, as reported by the `dbStats` command
    pub async fn stats(&self) -> Result<BsonDocument> {
        let result = self.database.run_command(doc! { "dbStats": 1 }).await?;
        Ok(result)
    }

    /// List all collection names in the default database
    pub async fn list_collection_names(&self) -> Result<Vec<String>> {
        let names = self.database.list_collection_names().await?;
        Ok(names)
    }

    /// Releases the client. A forced shutdown does not wait for in-flight
    /// operations to complete.
    pub async fn shutdown(self, forced: bool) {
        self.client.shutdown().immediate(forced).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.min_pool_size, Some(5));
        assert_eq!(config.max_pool_size, Some(20));
        assert_eq!(config.app_name, Some("docbridge".to_string()));
    }

    #[test]
    fn test_custom_pool_config() {
        let config = PoolConfig {
            min_pool_size: Some(2),
            max_pool_size: Some(50),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: Some(Duration::from_secs(5)),
            server_selection_timeout: Some(Duration::from_secs(10)),
            app_name: Some("my-app".to_string()),
        };
        assert_eq!(config.min_pool_size, Some(2));
        assert_eq!(config.max_pool_size, Some(50));
    }

    #[test]
    fn test_connect_requires_database_name() {
        let err = tokio_test::block_on(Connection::new("mongodb://localhost:27017")).unwrap_err();
        assert!(matches!(err, BridgeError::Connection(_)));
    }
}
