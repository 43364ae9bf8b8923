//! Load Coordinator Module
//!
//! Collapses concurrent backing-store loads for the same key into a single
//! flight. The first caller to miss on a key becomes the flight's leader and
//! runs the loader; callers arriving while the flight is up join it and wait
//! for the leader's outcome. Once a flight settles, its record is gone: a
//! later call always starts a fresh, independent load. Outcomes are never
//! cached here; caching results is the store's job.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::loader::Loader;

/// The settled result of one backing-store load, fanned out to all waiters.
type LoadOutcome = Result<String>;

/// One record per key with a load currently in flight. The channel settles
/// exactly once, from `None` to `Some(outcome)`.
type FlightTable = HashMap<String, watch::Receiver<Option<LoadOutcome>>>;

// == Flight Group ==
/// Single-flight load coordinator.
///
/// The flight table sits behind its own lock, separate from the store's,
/// and the lock is only ever held for table lookup/insert/remove. The loader
/// itself always runs outside it, so distinct keys load fully in parallel.
#[derive(Debug, Default)]
pub struct FlightGroup {
    flights: Mutex<FlightTable>,
}

/// What a caller turned out to be for its key's flight.
enum Role {
    /// First caller in: runs the loader and broadcasts the outcome
    Leader(watch::Sender<Option<LoadOutcome>>),
    /// Arrived while a flight was up: waits for the leader's outcome
    Joiner(watch::Receiver<Option<LoadOutcome>>),
}

impl FlightGroup {
    // == Constructor ==
    /// Creates a new coordinator with no flights in progress.
    pub fn new() -> Self {
        Self::default()
    }

    // == Load ==
    /// Performs (or joins) the single in-flight load for `key`.
    ///
    /// Exactly one call to `loader.load` is made per flight, no matter how
    /// many callers wait on it; every waiter receives a clone of the same
    /// outcome, success or failure.
    pub async fn load(&self, key: &str, loader: &dyn Loader) -> LoadOutcome {
        let role = {
            let mut flights = self.lock();
            match flights.get(key) {
                Some(rx) => Role::Joiner(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    flights.insert(key.to_string(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                debug!(key, "leading backing-store load");

                // The record must disappear even if this future is dropped
                // mid-load, or the key would be wedged for every later call.
                let record = RecordGuard { group: self, key };
                let outcome = loader.load(key).await;

                // Retire the record before broadcasting, so a caller that
                // arrives after completion starts a fresh flight.
                drop(record);
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
            Role::Joiner(mut rx) => {
                debug!(key, "joining in-flight load");

                match rx.wait_for(|outcome| outcome.is_some()).await {
                    Ok(settled) => match settled.as_ref() {
                        Some(outcome) => outcome.clone(),
                        None => Err(Self::abandoned(key)),
                    },
                    // The leader's future was dropped before settling.
                    Err(_) => Err(Self::abandoned(key)),
                }
            }
        }
    }

    // == In Flight ==
    /// Returns the number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, FlightTable> {
        // A poisoned table only means some flight panicked; the table itself
        // is still a valid map, so recover the guard.
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn abandoned(key: &str) -> CacheError {
        CacheError::load_failed(key, "in-flight load abandoned before completion")
    }
}

// == Record Guard ==
/// Removes a flight record from the table when dropped.
struct RecordGuard<'a> {
    group: &'a FlightGroup,
    key: &'a str,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        self.group.lock().remove(self.key);
    }
}
