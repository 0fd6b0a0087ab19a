//! Trigger adapter that owns the first-run flag.

use crate::error::Result;
use crate::event::ReservationEvent;
use crate::orchestrator::{BatchReport, Orchestrator};
use crate::source::Source;
use parking_lot::Mutex;
use tally_core::Table;

/// Hands batches to an [`Orchestrator`], flagging exactly one successful
/// batch as the first run.
///
/// The first-run batch holds the setup gate until it returns, so batches
/// arriving concurrently wait for the sink tables to exist. If the first run
/// fails, the gate stays pending and the next batch retries the setup.
#[derive(Debug)]
pub struct BatchRunner {
    orchestrator: Orchestrator,
    setup_pending: Mutex<bool>,
}

impl BatchRunner {
    /// The next batch performs first-run setup.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            setup_pending: Mutex::new(true),
        }
    }

    /// For sinks that were already set up by an earlier process.
    pub fn resume(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            setup_pending: Mutex::new(false),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// True until a first-run batch has succeeded. Waits for a first run
    /// that is in progress.
    pub fn is_first_run(&self) -> bool {
        *self.setup_pending.lock()
    }

    pub fn run(&self, table: Table) -> Result<BatchReport> {
        let mut pending = self.setup_pending.lock();
        if *pending {
            let result = self.orchestrator.run_batch(table, true);
            *pending = result.is_err();
            return result;
        }
        drop(pending);
        self.orchestrator.run_batch(table, false)
    }

    pub fn run_source(&self, source: &dyn Source) -> Result<BatchReport> {
        self.run(source.fetch()?)
    }

    /// Runs a one-row batch for a single transported event.
    pub fn handle_event(&self, event: ReservationEvent) -> Result<BatchReport> {
        self.run(event.into_table()?)
    }

    pub fn handle_json(&self, json: &str) -> Result<BatchReport> {
        self.handle_event(ReservationEvent::from_json(json)?)
    }
}
