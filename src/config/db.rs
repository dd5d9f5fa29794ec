// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Build, shape and health-check the PostgreSQL connection pool

use crate::config::local::log_execution_start;
use crate::config::DbConfig;
use crate::errors::InitError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Connection;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Fixed pool limits
/// DOCUMENTATION: Sized for a single function instance, which handles
/// few concurrent requests and may be frozen between invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolShape {
    /// Maximum open connections
    pub max_open: u32,
    /// Maximum connections kept idle
    pub max_idle: u32,
    /// Idle connections older than this are closed
    pub max_idle_time: Duration,
    /// Bound on waiting for a connection, including the liveness probe
    pub acquire_timeout: Duration,
}

impl Default for PoolShape {
    fn default() -> Self {
        Self {
            max_open: 5,
            max_idle: 3,
            max_idle_time: Duration::from_secs(5 * 60),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolShape {
    fn pool_options(&self, idle: IdleLimit) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(0)
            .idle_timeout(self.max_idle_time)
            .acquire_timeout(self.acquire_timeout)
            // Released connections beyond max_idle are closed, not parked
            .after_release(move |_conn, _meta| {
                let keep = idle.keeps_released();
                Box::pin(async move { Ok(keep) })
            })
    }
}

/// Caps how many released connections go back to the idle queue
/// DOCUMENTATION: The release hook lives inside the pool, so the pool is
/// attached after it is built and detached again on close.
#[derive(Debug, Clone)]
struct IdleLimit {
    max_idle: u32,
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl IdleLimit {
    fn new(max_idle: u32) -> Self {
        Self {
            max_idle,
            pool: Arc::new(RwLock::new(None)),
        }
    }

    fn attach(&self, pool: &PgPool) {
        if let Ok(mut slot) = self.pool.write() {
            *slot = Some(pool.clone());
        }
    }

    fn detach(&self) {
        if let Ok(mut slot) = self.pool.write() {
            *slot = None;
        }
    }

    /// Whether a connection being released may join the idle queue
    fn keeps_released(&self) -> bool {
        match self.pool.read() {
            Ok(slot) => match slot.as_ref() {
                Some(pool) => pool.num_idle() < self.max_idle as usize,
                None => true,
            },
            Err(_) => true,
        }
    }
}

/// Shared connection pool handle
/// DOCUMENTATION: Clones share the same underlying pool
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: PgPool,
    shape: PoolShape,
    idle: IdleLimit,
}

impl DbPool {
    /// Open a pool without touching the network
    pub(crate) fn lazy(options: PgConnectOptions, shape: PoolShape) -> Self {
        let idle = IdleLimit::new(shape.max_idle);
        let pool = shape.pool_options(idle.clone()).connect_lazy_with(options);
        idle.attach(&pool);

        Self { pool, shape, idle }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn shape(&self) -> PoolShape {
        self.shape
    }

    /// Round-trip a ping through a pooled connection
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await
    }

    /// Close every pooled connection and refuse further acquires
    pub async fn close(&self) {
        self.idle.detach();
        self.pool.close().await;
    }
}

/// Turn the configuration into driver connect options
/// DOCUMENTATION: The port must be a valid TCP port number
pub fn connect_options(config: &DbConfig) -> Result<PgConnectOptions, InitError> {
    let port: u16 = config
        .port
        .parse()
        .map_err(|e| InitError::PoolOpen(format!("invalid port {:?}: {}", config.port, e)))?;

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(port)
        .database(&config.dbname)
        .username(&config.user)
        .password(&config.password))
}

/// Initialize PostgreSQL connection pool
/// DOCUMENTATION: Opens lazily, applies the shape, then proves liveness.
/// A pool that fails the probe is closed and never handed out.
pub async fn init_db_pool(config: &DbConfig, shape: PoolShape) -> Result<DbPool, InitError> {
    log::info!("Connecting to database with descriptor: {}", config.descriptor());

    let options = connect_options(config).map_err(|e| {
        log::error!("Rejected connection descriptor: {}", e);
        e
    })?;
    let db = DbPool::lazy(options, shape);

    if let Err(e) = db.ping().await {
        log::error!("Error pinging the database: {}", e);
        db.close().await;
        return Err(InitError::Liveness(e));
    }

    log::info!(
        "Database successfully pinged (max_open={}, max_idle={}, max_idle_time={}s)",
        shape.max_open,
        shape.max_idle,
        shape.max_idle_time.as_secs()
    );
    Ok(db)
}

/// Read the configuration from the environment and build the pool
pub async fn connect_to_database() -> Result<DbPool, InitError> {
    log_execution_start("connect_to_database");

    let config = DbConfig::from_env()?;
    init_db_pool(&config, PoolShape::default()).await
}
