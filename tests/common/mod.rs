use std::sync::Arc;

use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

use querysieve::{CachedSchemaProvider, DbSchemaProvider, SchemaProvider, ScopeRegistry};

/// In-memory SQLite database with the test schema and seed rows.
pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    db.execute_unprepared(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            status TEXT NOT NULL,
            age INTEGER NOT NULL
        )",
    )
    .await?;
    db.execute_unprepared(
        "CREATE TABLE user_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            bio TEXT NOT NULL
        )",
    )
    .await?;
    db.execute_unprepared(
        "CREATE TABLE orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            amount INTEGER NOT NULL
        )",
    )
    .await?;

    db.execute_unprepared(
        "INSERT INTO users (id, name, status, age) VALUES
            (1, 'Alice', 'active', 30),
            (2, 'Bob', 'inactive', 25),
            (3, 'Carol', 'active', 41),
            (4, 'Dave', 'pending', 35),
            (5, 'Erin', 'active', 28)",
    )
    .await?;
    db.execute_unprepared(
        "INSERT INTO user_profiles (id, user_id, bio) VALUES
            (1, 1, 'climber'),
            (2, 2, 'runner'),
            (3, 3, 'writer')",
    )
    .await?;
    db.execute_unprepared(
        "INSERT INTO orders (id, user_id, status, amount) VALUES
            (1, 1, 'open', 100),
            (2, 1, 'closed', 250),
            (3, 2, 'open', 75),
            (4, 3, 'shipped', 10),
            (5, 3, 'open', 20)",
    )
    .await?;

    Ok(db)
}

/// Schema provider over the live connection, cached the way a process
/// would share it.
pub fn schema_provider(db: &DatabaseConnection) -> Arc<dyn SchemaProvider> {
    Arc::new(CachedSchemaProvider::new(DbSchemaProvider::new(db.clone())))
}

/// The scopes the test entity exposes.
pub fn scope_registry() -> Arc<ScopeRegistry> {
    let mut registry = ScopeRegistry::new();
    registry.register("ofStatus", |stmt, args| {
        if let Some(status) = args.first().and_then(serde_json::Value::as_str) {
            stmt.and_where(Expr::col((Alias::new("users"), Alias::new("status"))).eq(status));
        }
    });
    registry.register("ageBetween", |stmt, args| {
        if let (Some(low), Some(high)) = (
            args.first().and_then(serde_json::Value::as_i64),
            args.get(1).and_then(serde_json::Value::as_i64),
        ) {
            stmt.and_where(Expr::col((Alias::new("users"), Alias::new("age"))).between(low, high));
        }
    });
    Arc::new(registry)
}
