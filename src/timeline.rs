//! Ordered, deduplicated history of step events for one session.
//!
//! Ingestion is crash-proof by contract: a frame that does not parse
//! into a step event is dropped without touching any state, and a
//! duplicate delivery of an already-seen event is dropped the same way.
//! Order is arrival order; the `timestamp` field is display data, not an
//! ordering key (FIFO delivery is the channel's guarantee).

use std::collections::HashSet;

use tracing::debug;

use crate::types::StepEvent;

/// Append-only, insertion-ordered, unique by `filename`.
#[derive(Debug, Default)]
pub struct Timeline {
    events: Vec<StepEvent>,
    seen: HashSet<String>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw channel frame and ingest it.
    ///
    /// Returns the newly appended event, or `None` when the frame was
    /// malformed or a duplicate. Neither case mutates the timeline.
    pub fn ingest_raw(&mut self, raw: &str) -> Option<&StepEvent> {
        let event: StepEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(err) => {
                debug!(error = %err, "dropping malformed frame");
                return None;
            }
        };
        if self.ingest(event) {
            self.events.last()
        } else {
            None
        }
    }

    /// Ingest an already-parsed event. Returns false for duplicates.
    pub fn ingest(&mut self, event: StepEvent) -> bool {
        if event.filename.is_empty() || !self.seen.insert(event.filename.clone()) {
            debug!(filename = %event.filename, "dropping duplicate event");
            return false;
        }
        self.events.push(event);
        true
    }

    /// Ingest a synchronous snapshot, applying the same dedup rules
    /// (first occurrence wins).
    pub fn seed(&mut self, snapshot: Vec<StepEvent>) {
        for event in snapshot {
            self.ingest(event);
        }
    }

    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&StepEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
