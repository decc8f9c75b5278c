use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::{product, stock_transaction};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    opt.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    if config.is_sqlite() {
        // SQLite has a single writer; one pooled connection that is never
        // recycled also keeps `sqlite::memory:` databases alive.
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(config.max_connections.max(1))
            .min_connections(1)
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8));
    }

    let db = Database::connect(opt).await?;
    db.get_schema_registry("inventory_core::entity::*")
        .sync(&db)
        .await?;

    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure the secondary indexes the hot queries rely on exist.
///
/// Schema sync only creates unique indexes, so these are created by hand.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // History paging: WHERE product_id = ? ORDER BY timestamp DESC
    let history = Index::create()
        .if_not_exists()
        .name("idx_transactions_product_timestamp")
        .table(stock_transaction::Entity)
        .col(stock_transaction::Column::ProductId)
        .col(stock_transaction::Column::Timestamp)
        .to_owned();
    create_index(db, "idx_transactions_product_timestamp", &history).await;

    // Category listing
    let by_category = Index::create()
        .if_not_exists()
        .name("idx_products_category")
        .table(product::Entity)
        .col(product::Column::CategoryId)
        .to_owned();
    create_index(db, "idx_products_category", &by_category).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}
