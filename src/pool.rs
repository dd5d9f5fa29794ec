// src/pool.rs
// DOCUMENTATION: Instance-scoped pool registry
// PURPOSE: Initialize the shared pool once per execution instance and hand
// the same handle to every invocation the instance serves

use crate::config::{connect_to_database, DbPool};
use crate::errors::{FunctionError, InitError};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lifecycle of the pool within one execution instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

type InitOutcome = Result<DbPool, Arc<InitError>>;

/// Clears the started flag unless the initializer ran to completion
struct StartedGuard<'a>(&'a AtomicBool);

impl<'a> StartedGuard<'a> {
    fn arm(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }

    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for StartedGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Once-only slot for the pool handle
/// DOCUMENTATION: The first caller runs the initializer; concurrent callers
/// wait for it and observe the same outcome. Ready and Failed are both
/// terminal, so a failed cold start stays failed until the host recycles
/// the instance. If the initializing caller is dropped mid-flight the cell
/// returns to Uninitialized and the next caller starts over.
pub struct PoolCell {
    outcome: OnceCell<InitOutcome>,
    started: AtomicBool,
}

impl PoolCell {
    pub const fn new() -> Self {
        Self {
            outcome: OnceCell::const_new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> PoolState {
        match self.outcome.get() {
            Some(Ok(_)) => PoolState::Ready,
            Some(Err(_)) => PoolState::Failed,
            None if self.started.load(Ordering::Acquire) => PoolState::Initializing,
            None => PoolState::Uninitialized,
        }
    }

    /// Run `init` unless an earlier call already did, and return its outcome
    pub async fn get_or_initialize<F, Fut>(&self, init: F) -> Result<&DbPool, Arc<InitError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DbPool, InitError>>,
    {
        let outcome = self
            .outcome
            .get_or_init(|| async move {
                let guard = StartedGuard::arm(&self.started);
                let outcome = init().await.map_err(|e| {
                    log::error!("Error connecting the database ({}): {}", e.kind(), e);
                    Arc::new(e)
                });
                guard.disarm();
                outcome
            })
            .await;

        outcome.as_ref().map_err(Arc::clone)
    }

    /// The ready pool, or a clear unavailability error
    pub fn get(&self) -> Result<&DbPool, FunctionError> {
        match self.outcome.get() {
            Some(Ok(db)) => Ok(db),
            Some(Err(e)) => Err(FunctionError::from(Arc::clone(e))),
            None => Err(FunctionError::PoolUnavailable(
                "database pool not initialized".to_string(),
            )),
        }
    }
}

impl Default for PoolCell {
    fn default() -> Self {
        Self::new()
    }
}

static INSTANCE_POOL: PoolCell = PoolCell::new();

/// Initialize the process-wide pool from the environment
/// Called at cold start; later calls return the stored outcome
pub async fn initialize() -> Result<&'static DbPool, Arc<InitError>> {
    INSTANCE_POOL.get_or_initialize(connect_to_database).await
}

pub fn instance_pool() -> &'static PoolCell {
    &INSTANCE_POOL
}

pub fn instance_state() -> PoolState {
    INSTANCE_POOL.state()
}
