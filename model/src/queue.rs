use anyhow::Result;
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use feed::Snapshot;

use crate::{CycleSummary, Engine};

/// Snapshots arrive whenever pollers and timers finish, possibly while a reconciliation pass is
/// still running. They wait here, and get reconciled strictly one at a time, in arrival order.
pub struct CycleQueue {
    tx: UnboundedSender<Snapshot>,
    rx: UnboundedReceiver<Snapshot>,
}

/// Handed to producers. Cheap to clone.
#[derive(Clone)]
pub struct CycleSender(UnboundedSender<Snapshot>);

impl CycleQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CycleSender {
        CycleSender(self.tx.clone())
    }

    /// Runs every pending snapshot through the engine, one after another. Returns the summary of
    /// each pass.
    pub fn drain(&mut self, engine: &mut Engine) -> Vec<CycleSummary> {
        let mut results = Vec::new();
        // Err means nothing is pending right now. The queue holds its own sender, so the channel
        // never closes.
        while let Ok(Some(snapshot)) = self.rx.try_next() {
            results.push(engine.run_cycle(&snapshot));
        }
        results
    }
}

impl Default for CycleQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleSender {
    pub fn push(&self, snapshot: Snapshot) -> Result<()> {
        self.0
            .unbounded_send(snapshot)
            .map_err(|err| anyhow!("Can't queue snapshot: {err}"))
    }
}
