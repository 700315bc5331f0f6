//! In-memory backend.
//!
//! Holds a single frame behind a shared handle. Clones of a `MemoryBackend`
//! see the same slot, so a caller can keep one clone to seed a source or to
//! inspect what a sink received.

use super::{Batch, DataBackend};
use crate::pipeline::channel::Payload;
use crate::pipeline::error::PipelineResult;
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    key: String,
    slot: Rc<RefCell<Option<Payload>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryBackend {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_payload(key: impl Into<String>, payload: Payload) -> Self {
        let backend = Self::new(key);
        *backend.slot.borrow_mut() = Some(payload);
        backend
    }

    /// The frame currently stored.
    pub fn payload(&self) -> Option<Payload> {
        self.slot.borrow().clone()
    }

    /// Number of saves performed through any clone.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl DataBackend for MemoryBackend {
    fn load(&mut self) -> PipelineResult<Batch> {
        let payload = self.payload().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("memory slot '{}' is empty", self.key),
            )
        })?;
        Ok(Batch {
            key: self.key.clone(),
            payload,
        })
    }

    fn save(&mut self, payload: &Payload) -> PipelineResult<()> {
        *self.slot.borrow_mut() = Some(payload.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory slot {}", self.key)
    }
}
