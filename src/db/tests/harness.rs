//! Test harness for database repository testing
//!
//! Provides utilities for setting up test databases:
//! - SQLite: Fast in-memory databases loaded from a fixture script
//! - PostgreSQL: Testcontainers-based instances, one isolated schema per test
//! - MySQL: Testcontainers-based instances, one isolated database per test

use sqlx::SqlitePool;

/// Create an in-memory SQLite pool for testing
pub async fn create_sqlite_pool() -> SqlitePool {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

/// Run a multi-statement fixture script against the pool
pub async fn load_sqlite_fixture(pool: &SqlitePool, script: &str) {
    sqlx::raw_sql(script)
        .execute(pool)
        .await
        .expect("Failed to load SQLite fixture");
}

/// PostgreSQL test harness using testcontainers
#[cfg(feature = "database-postgres")]
pub mod postgres {
    use std::sync::OnceLock;

    use sqlx::PgPool;
    use testcontainers_modules::{
        postgres::Postgres,
        testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner},
    };
    use tokio::sync::OnceCell;

    /// Shared container state - initialized once per test run
    struct SharedContainer {
        #[allow(dead_code)] // Test infrastructure: keeps container alive
        container: ContainerAsync<Postgres>,
        connection_string: String,
    }

    /// Global shared container - lazily initialized on first use
    static SHARED_CONTAINER: OnceLock<OnceCell<SharedContainer>> = OnceLock::new();

    async fn get_shared_container() -> &'static SharedContainer {
        let cell = SHARED_CONTAINER.get_or_init(OnceCell::new);
        cell.get_or_init(|| async {
            let container = Postgres::default()
                .with_tag("17-alpine")
                .start()
                .await
                .expect("Failed to start PostgreSQL container");

            let host = container.get_host().await.expect("Failed to get host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("Failed to get port");

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            SharedContainer {
                container,
                connection_string,
            }
        })
        .await
    }

    /// Create a uniquely named schema and a pool whose search_path points at it.
    ///
    /// Returns the pool and the schema name, which tests pass to the catalog.
    pub async fn create_isolated_postgres_pool() -> (PgPool, String) {
        let shared = get_shared_container().await;

        let admin_pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&shared.connection_string)
            .await
            .expect("Failed to connect to PostgreSQL");

        let schema_name = format!("test_{}", uuid::Uuid::new_v4().simple());

        sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema_name))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test schema");

        let isolated_url = format!(
            "{}?options=-c search_path={}",
            shared.connection_string, schema_name
        );

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&isolated_url)
            .await
            .expect("Failed to connect to isolated schema");

        (pool, schema_name)
    }

    pub async fn load_postgres_fixture(pool: &PgPool, script: &str) {
        sqlx::raw_sql(script)
            .execute(pool)
            .await
            .expect("Failed to load PostgreSQL fixture");
    }
}

/// MySQL test harness using testcontainers
#[cfg(feature = "database-mysql")]
pub mod mysql {
    use std::sync::OnceLock;

    use sqlx::MySqlPool;
    use testcontainers_modules::{
        mysql::Mysql,
        testcontainers::{ContainerAsync, runners::AsyncRunner},
    };
    use tokio::sync::OnceCell;

    struct SharedContainer {
        #[allow(dead_code)] // Test infrastructure: keeps container alive
        container: ContainerAsync<Mysql>,
        /// Server URL without a database path
        server_url: String,
    }

    static SHARED_CONTAINER: OnceLock<OnceCell<SharedContainer>> = OnceLock::new();

    async fn get_shared_container() -> &'static SharedContainer {
        let cell = SHARED_CONTAINER.get_or_init(OnceCell::new);
        cell.get_or_init(|| async {
            let container = Mysql::default()
                .start()
                .await
                .expect("Failed to start MySQL container");

            let host = container.get_host().await.expect("Failed to get host");
            let port = container
                .get_host_port_ipv4(3306)
                .await
                .expect("Failed to get port");

            SharedContainer {
                container,
                server_url: format!("mysql://root@{}:{}", host, port),
            }
        })
        .await
    }

    /// Create a uniquely named database and a pool connected to it.
    ///
    /// Returns the pool and the database name, which is the schema tests
    /// pass to the catalog.
    pub async fn create_isolated_mysql_pool() -> (MySqlPool, String) {
        let shared = get_shared_container().await;

        let admin_pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&format!("{}/test", shared.server_url))
            .await
            .expect("Failed to connect to MySQL");

        let database = format!("test_{}", uuid::Uuid::new_v4().simple());

        sqlx::query(&format!("CREATE DATABASE `{}`", database))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test database");

        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(2)
            .connect(&format!("{}/{}", shared.server_url, database))
            .await
            .expect("Failed to connect to isolated database");

        (pool, database)
    }

    pub async fn load_mysql_fixture(pool: &MySqlPool, script: &str) {
        sqlx::raw_sql(script)
            .execute(pool)
            .await
            .expect("Failed to load MySQL fixture");
    }
}
