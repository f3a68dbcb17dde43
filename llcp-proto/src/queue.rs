use std::collections::VecDeque;

use slab::Slab;

use crate::{ControlPdu, ProcHandle, ProcedureContext, ProcedureKind};

/// Pending remote procedures of one connection
///
/// Contexts live in a bounded arena and are referenced by handle; a separate FIFO of handles
/// gives the processing order. The head of the FIFO is the active procedure.
#[derive(Debug)]
pub(crate) struct ProcQueue {
    /// Arena holding every queued context
    slots: Slab<ProcedureContext>,
    /// Arrival order
    order: VecDeque<ProcHandle>,
    /// Maximum number of contexts that may exist at once
    capacity: usize,
}

impl ProcQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Allocate a context and append it to the queue
    ///
    /// Returns `None` if the pool is exhausted.
    pub(crate) fn push(&mut self, kind: ProcedureKind, pdu: ControlPdu) -> Option<ProcHandle> {
        if self.slots.len() >= self.capacity {
            return None;
        }
        let handle = ProcHandle(self.slots.insert(ProcedureContext::new(kind, pdu)));
        self.order.push_back(handle);
        Some(handle)
    }

    /// Handle of the procedure at the head of the queue
    pub(crate) fn peek(&self) -> Option<ProcHandle> {
        self.order.front().copied()
    }

    pub(crate) fn head(&self) -> Option<&ProcedureContext> {
        self.peek().and_then(|handle| self.get(handle))
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut ProcedureContext> {
        let handle = self.peek()?;
        self.get_mut(handle)
    }

    pub(crate) fn get(&self, handle: ProcHandle) -> Option<&ProcedureContext> {
        self.slots.get(handle.0)
    }

    pub(crate) fn get_mut(&mut self, handle: ProcHandle) -> Option<&mut ProcedureContext> {
        self.slots.get_mut(handle.0)
    }

    /// Remove the head of the queue and release its context
    pub(crate) fn dequeue(&mut self) -> Option<ProcedureContext> {
        let handle = self.order.pop_front()?;
        Some(self.slots.remove(handle.0))
    }

    /// Release every queued context, returning how many there were
    pub(crate) fn drain(&mut self) -> usize {
        let n = self.order.len();
        self.order.clear();
        self.slots.clear();
        n
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Queued procedures in processing order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ProcHandle, &ProcedureContext)> + '_ {
        self.order
            .iter()
            .filter_map(move |&handle| {
                self.slots.get(handle.0).map(|ctx| (handle, ctx))
            })
    }
}
