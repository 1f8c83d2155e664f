// For the time being, the diesel doesn't play well without macro use, see also: https://github.com/diesel-rs/diesel/issues/1894
#[macro_use]
extern crate diesel;

use diesel::{connection::SimpleConnection, prelude::*};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub mod admins;
pub mod banners;
pub mod cart;
pub mod enums;
pub mod error;
pub mod ids;
pub mod money;
pub mod products;
pub mod quotations;
#[rustfmt::skip]
mod schema;
pub mod seed;
pub mod shop_orders;
pub mod test_utils;
pub mod towing;
pub mod transactions;
pub mod users;
pub mod vehicles;
pub mod workshops;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Enum representing order
pub enum Order {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Bring a fresh connection up to the current schema. Foreign keys are a per-connection setting in SQLite.
pub fn prepare(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {}", e))?;
    Ok(())
}

// Row id of the last INSERT on this connection
pub(crate) fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>(
        "last_insert_rowid()",
    ))
    .get_result::<i32>(conn)
}

// Trimmed text or nothing
pub(crate) fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Deserialize a field that may be absent (`None`), explicitly null (`Some(None)`), or set (`Some(Some(_))`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Deserialize an explicit null as the type's default, such as an empty list.
/// Use together with `#[serde(default)]`.
pub fn null_as_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: serde::Deserialize<'de> + Default,
    D: serde::Deserializer<'de>,
{
    let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Accept a text field the clients sometimes send as a bare number, such as a model year.
/// Use together with `#[serde(default)]`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    let raw: Option<Raw> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.map(|r| match r {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
