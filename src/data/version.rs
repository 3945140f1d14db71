//! Server version query.

use sqlx::PgConnection;

/// The only statement the probe ever issues. Fixed, parameterless and read-only.
pub const VERSION_QUERY: &str = "SELECT version()";

/// Fetch the server's version banner, e.g. `PostgreSQL 15.4 on x86_64-pc-linux-gnu, ...`.
pub async fn server_version(conn: &mut PgConnection) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>(VERSION_QUERY)
        .fetch_one(conn)
        .await
}
