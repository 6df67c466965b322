//! Deferred Callback Queue and Render Queue.
//!
//! Both queues drain with snapshot-then-clear: the live queue is reset
//! before the snapshot is processed, so anything appended while draining
//! lands in the next flush.

use std::fmt;

use crate::error::RenderError;
use crate::host::Host;
use crate::types::InstanceId;

use super::Engine;

// =============================================================================
// Deferred Callback Queue
// =============================================================================

/// Closure run once the whole pass has materialized.
pub type DeferredCallback<H> = Box<dyn FnOnce(&mut Engine<H>) -> Result<(), RenderError>>;

/// A post-mount action.
pub enum Deferred<H: Host> {
    /// Plain closure (ref attachment).
    Callback(DeferredCallback<H>),
    /// Invoke the instance's `did_mount`.
    DidMount(InstanceId),
}

impl<H: Host> fmt::Debug for Deferred<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Callback(_) => f.write_str("Deferred::Callback(..)"),
            Deferred::DidMount(id) => write!(f, "Deferred::DidMount({id})"),
        }
    }
}

/// Entries are sequence-numbered. A mark stays valid across drains.
pub struct DeferredQueue<H: Host> {
    entries: Vec<(u64, Deferred<H>)>,
    next_seq: u64,
}

impl<H: Host> Default for DeferredQueue<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<H: Host> DeferredQueue<H> {
    pub fn push(&mut self, entry: Deferred<H>) {
        self.entries.push((self.next_seq, entry));
        self.next_seq += 1;
    }

    pub fn push_callback(&mut self, f: impl FnOnce(&mut Engine<H>) -> Result<(), RenderError> + 'static) {
        self.push(Deferred::Callback(Box::new(f)));
    }

    /// Snapshot the entries and leave the queue empty.
    pub fn take(&mut self) -> Vec<Deferred<H>> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Position of the next push.
    pub fn mark(&self) -> u64 {
        self.next_seq
    }

    /// Drop every entry pushed at or after `mark`. Returns how many went.
    pub fn discard_since(&mut self, mark: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(seq, _)| *seq < mark);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Render Queue
// =============================================================================

/// Instances that requested a state change while enabled.
#[derive(Debug, Default)]
pub struct RenderQueue {
    items: Vec<InstanceId>,
}

impl RenderQueue {
    pub fn push(&mut self, id: InstanceId) {
        self.items.push(id);
    }

    pub fn take(&mut self) -> Vec<InstanceId> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
