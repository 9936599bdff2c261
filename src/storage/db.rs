use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};

use crate::core::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Registers the user on first contact, refreshing the username after.
pub fn ensure_user(conn: &Connection, telegram_id: i64, username: Option<&str>) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (telegram_id, username) VALUES (?1, ?2)
         ON CONFLICT(telegram_id) DO UPDATE SET username = excluded.username",
        params![telegram_id, username],
    )?;
    Ok(())
}

/// Remembers the contact details a completed order collected.
pub fn update_user_contacts(
    conn: &Connection,
    telegram_id: i64,
    phone: &str,
    email: &str,
) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET phone = ?2, email = ?3 WHERE telegram_id = ?1",
        params![telegram_id, phone, email],
    )?;
    Ok(())
}

/// Every registered user id, for broadcast fan-out.
pub fn list_user_ids(conn: &Connection) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT telegram_id FROM users ORDER BY telegram_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}
