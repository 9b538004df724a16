use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};

use super::*;

/// Ticket and reply-mode tables behind one SQLite connection.
///
/// Every call runs on the blocking pool and takes the connection lock, so all
/// reads and writes are serialised.
#[derive(Clone)]
pub(super) struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub(super) fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create db dir {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub(super) fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow!("database lock poisoned: {}", e))?;
            f(&conn)
        })
        .await
        .context("sqlite task join failed")?
    }

    pub(super) async fn create_ticket(&self, user_id: u64) -> Result<TicketId> {
        self.call(move |conn| insert_ticket_sync(conn, user_id)).await
    }

    pub(super) async fn ticket_user(&self, ticket_id: TicketId) -> Result<Option<u64>> {
        self.call(move |conn| ticket_user_sync(conn, ticket_id)).await
    }

    pub(super) async fn set_pending_reply(&self, admin_id: u64, ticket_id: TicketId) -> Result<()> {
        self.call(move |conn| set_pending_reply_sync(conn, admin_id, ticket_id))
            .await
    }

    pub(super) async fn pending_reply(&self, admin_id: u64) -> Result<Option<TicketId>> {
        self.call(move |conn| pending_reply_sync(conn, admin_id)).await
    }

    pub(super) async fn clear_pending_reply(&self, admin_id: u64) -> Result<()> {
        self.call(move |conn| clear_pending_reply_sync(conn, admin_id))
            .await
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS tickets (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_reply_state (
  admin_id INTEGER PRIMARY KEY,
  ticket_id INTEGER
);
"#,
    )
    .context("create schema")?;
    Ok(())
}

// Telegram ids fit in 52 bits, so the i64 column round-trips them.
fn insert_ticket_sync(conn: &Connection, user_id: u64) -> Result<TicketId> {
    conn.execute(
        "INSERT INTO tickets(user_id) VALUES (?1)",
        params![user_id as i64],
    )
    .context("insert ticket")?;
    Ok(conn.last_insert_rowid())
}

fn ticket_user_sync(conn: &Connection, ticket_id: TicketId) -> Result<Option<u64>> {
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM tickets WHERE id=?1",
            params![ticket_id],
            |row| row.get(0),
        )
        .optional()
        .context("select ticket user")?;
    Ok(user_id.map(|id| id as u64))
}

fn set_pending_reply_sync(conn: &Connection, admin_id: u64, ticket_id: TicketId) -> Result<()> {
    conn.execute(
        "INSERT INTO admin_reply_state(admin_id, ticket_id) VALUES (?1, ?2)
         ON CONFLICT(admin_id) DO UPDATE SET ticket_id=excluded.ticket_id",
        params![admin_id as i64, ticket_id],
    )
    .context("upsert reply state")?;
    Ok(())
}

fn pending_reply_sync(conn: &Connection, admin_id: u64) -> Result<Option<TicketId>> {
    let ticket_id: Option<Option<TicketId>> = conn
        .query_row(
            "SELECT ticket_id FROM admin_reply_state WHERE admin_id=?1",
            params![admin_id as i64],
            |row| row.get(0),
        )
        .optional()
        .context("select reply state")?;
    Ok(ticket_id.flatten())
}

fn clear_pending_reply_sync(conn: &Connection, admin_id: u64) -> Result<()> {
    conn.execute(
        "DELETE FROM admin_reply_state WHERE admin_id=?1",
        params![admin_id as i64],
    )
    .context("delete reply state")?;
    Ok(())
}
