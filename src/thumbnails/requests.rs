//! Per-slot bookkeeping of in-flight thumbnail requests.
//!
//! A strip slot (a reusable visual cell) owns at most one request at a time.
//! Deliveries are applied only while their handle is still the slot's current
//! one; anything else is stale and dropped.

use std::collections::HashMap;

use tracing::trace;

use super::provider::{RequestHandle, ThumbnailDelivery};

/// Identifier of a reusable visual cell in the preview strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    handle: RequestHandle,
    index: usize,
}

/// A delivery that matched its slot's current request.
#[derive(Debug)]
pub struct AcceptedDelivery {
    pub slot: SlotId,
    pub index: usize,
    pub image: image::RgbaImage,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    slots: HashMap<SlotId, Binding>,
    by_handle: HashMap<RequestHandle, SlotId>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `handle` as the slot's request. Returns the request it replaced,
    /// which the caller must cancel.
    pub fn bind(
        &mut self,
        slot: SlotId,
        index: usize,
        handle: RequestHandle,
    ) -> Option<RequestHandle> {
        let previous = self.slots.insert(slot, Binding { handle, index });
        if let Some(prev) = previous {
            self.by_handle.remove(&prev.handle);
        }
        self.by_handle.insert(handle, slot);
        previous.map(|b| b.handle)
    }

    /// Forgets the slot's request, returning it for cancellation.
    pub fn unbind(&mut self, slot: SlotId) -> Option<RequestHandle> {
        let binding = self.slots.remove(&slot)?;
        self.by_handle.remove(&binding.handle);
        Some(binding.handle)
    }

    /// Removes every binding, returning the handles for cancellation.
    pub fn drain(&mut self) -> Vec<RequestHandle> {
        self.by_handle.clear();
        self.slots.drain().map(|(_, b)| b.handle).collect()
    }

    pub fn current(&self, slot: SlotId) -> Option<RequestHandle> {
        self.slots.get(&slot).map(|b| b.handle)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Matches a delivery against the current bindings.
    ///
    /// Cancelled, failed, and superseded deliveries return `None`.
    pub fn accept(&self, delivery: ThumbnailDelivery) -> Option<AcceptedDelivery> {
        if delivery.cancelled {
            trace!(handle = ?delivery.handle, "Dropping cancelled delivery");
            return None;
        }

        let Some(&slot) = self.by_handle.get(&delivery.handle) else {
            trace!(handle = ?delivery.handle, "Dropping stale delivery");
            return None;
        };
        let binding = self.slots.get(&slot)?;
        if binding.handle != delivery.handle || binding.index != delivery.index {
            return None;
        }

        match delivery.image {
            Ok(image) => Some(AcceptedDelivery {
                slot,
                index: binding.index,
                image,
            }),
            Err(e) => {
                trace!(handle = ?delivery.handle, error = %e, "Dropping failed delivery");
                None
            }
        }
    }
}
