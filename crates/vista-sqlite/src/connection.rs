//! SQLite connection management
//!
//! A single connection behind `Arc<Mutex<_>>`. Reads run on tokio's
//! blocking pool; dropping the awaiting future interrupts the statement.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use parking_lot::Mutex;
use rusqlite::{Connection, InterruptHandle, OpenFlags};
use std::sync::Arc;
use tracing::{debug, info};

/// Thread-safe SQLite connection wrapper
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open a connection with the given configuration
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, read_only = config.read_only, "Opening SQLite connection");

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else if config.read_only {
            Connection::open_with_flags(
                &config.path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("Failed to create directory: {}", e))
                })?;
            }
            Connection::open(&config.path)?
        };

        let pool = Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        };
        pool.with_connection(|conn| pool.configure_pragmas(conn))?;

        Ok(pool)
    }

    /// In-memory database, mostly for tests
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Execute a closure with the connection
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Execute a closure with mutable access to the connection
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Run `f` on the blocking pool.
    ///
    /// If the returned future is dropped before `f` finishes, the running
    /// statement is interrupted and `f` observes `SQLITE_INTERRUPT`; if `f`
    /// has not started yet it never runs.
    pub async fn read<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let guard = CancelOnDrop::default();
        let state = Arc::clone(&guard.state);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            if !state.begin(conn.get_interrupt_handle()) {
                return Err(SqliteError::Cancelled);
            }
            let result = f(&conn);
            // Must happen while the connection is still locked, so a late
            // interrupt cannot hit the next caller's statement
            state.finish();
            result
        })
        .await
        .map_err(|e| SqliteError::Pool(e.to_string()))?
    }

    fn configure_pragmas(&self, conn: &Connection) -> SqliteResult<()> {
        debug!("Configuring SQLite pragmas");

        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};",
            self.config.busy_timeout_ms
        ))?;
        conn.execute_batch(&format!("PRAGMA cache_size = {};", self.config.cache_size))?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;

        if self.config.read_only {
            conn.execute_batch("PRAGMA query_only = ON;")?;
        }

        Ok(())
    }
}

#[derive(Default)]
enum Phase {
    #[default]
    Pending,
    Running(InterruptHandle),
    Done,
    Cancelled,
}

#[derive(Default)]
struct CancelState {
    phase: Mutex<Phase>,
}

impl CancelState {
    /// Returns false when the caller already gave up
    fn begin(&self, handle: InterruptHandle) -> bool {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Pending => {
                *phase = Phase::Running(handle);
                true
            }
            _ => false,
        }
    }

    fn finish(&self) {
        *self.phase.lock() = Phase::Done;
    }

    fn cancel(&self) {
        let mut phase = self.phase.lock();
        match std::mem::replace(&mut *phase, Phase::Cancelled) {
            Phase::Running(handle) => {
                debug!("Interrupting abandoned SQLite statement");
                handle.interrupt();
            }
            Phase::Done => *phase = Phase::Done,
            Phase::Pending | Phase::Cancelled => {}
        }
    }
}

#[derive(Default)]
struct CancelOnDrop {
    state: Arc<CancelState>,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.state.cancel();
    }
}
