use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::axis::{Axis, ScaleKind};
use crate::core::shared_range::{RangeId, SharedRange};
use crate::error::PlotResult;
use crate::ticks::tick_set::TickSet;

/// Identity of one published tick computation: the range generation plus
/// every axis parameter the selection depends on. Axes sharing a range cell
/// with equal keys converge on the same published tick set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickKey {
    pub generation: u64,
    pub scale: ScaleKind,
    pub device_min: i32,
    pub device_max: i32,
    pub flipped: bool,
}

impl TickKey {
    #[must_use]
    pub fn for_axis(axis: &Axis) -> Self {
        Self {
            generation: axis.shared_range().generation(),
            scale: axis.scale(),
            device_min: axis.device_min(),
            device_max: axis.device_max(),
            flipped: axis.is_flipped(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    subscribers: usize,
    published: Option<(TickKey, TickSet)>,
}

/// Publish/subscribe registry coordinating tick sets across axes that share
/// a range cell.
///
/// Subscriptions are explicit handles keyed by the shared range's identity;
/// a slot is released when its last subscription drops, never by garbage
/// collection. Publication is eventually consistent: axes observe the
/// latest published set the next time they ask, not atomically.
#[derive(Debug, Default)]
pub struct TickRegistry {
    slots: Mutex<IndexMap<RangeId, Slot>>,
}

impl TickRegistry {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe(self: &Arc<Self>, range: &SharedRange) -> TickSubscription {
        let mut slots = self.slots.lock().expect("registry lock poisoned");
        let slot = slots.entry(range.id()).or_insert(Slot {
            subscribers: 0,
            published: None,
        });
        slot.subscribers += 1;
        trace!(range_id = ?range.id(), subscribers = slot.subscribers, "tick subscription added");
        TickSubscription {
            registry: Arc::clone(self),
            range_id: range.id(),
        }
    }

    /// Published tick set for `key`, if the slot holds a matching one.
    #[must_use]
    pub fn lookup(&self, subscription: &TickSubscription, key: TickKey) -> Option<TickSet> {
        let slots = self.slots.lock().expect("registry lock poisoned");
        let slot = slots.get(&subscription.range_id)?;
        let (published_key, ticks) = slot.published.as_ref()?;
        (*published_key == key).then(|| ticks.clone())
    }

    pub fn publish(&self, subscription: &TickSubscription, key: TickKey, ticks: TickSet) {
        let mut slots = self.slots.lock().expect("registry lock poisoned");
        if let Some(slot) = slots.get_mut(&subscription.range_id) {
            slot.published = Some((key, ticks));
        }
    }

    /// Lookup-or-compute: returns the published set when its key matches the
    /// axis snapshot, otherwise runs `compute` once and publishes the result
    /// for the other subscribed axes.
    pub fn ticks_for<F>(
        &self,
        subscription: &TickSubscription,
        axis: &Axis,
        compute: F,
    ) -> PlotResult<TickSet>
    where
        F: FnOnce() -> PlotResult<TickSet>,
    {
        let key = TickKey::for_axis(axis);
        if let Some(ticks) = self.lookup(subscription, key) {
            trace!(range_id = ?subscription.range_id, "tick set served from registry");
            return Ok(ticks);
        }
        let ticks = compute()?;
        self.publish(subscription, key, ticks.clone());
        Ok(ticks)
    }

    #[must_use]
    pub fn subscriber_count(&self, range_id: RangeId) -> usize {
        self.slots
            .lock()
            .expect("registry lock poisoned")
            .get(&range_id)
            .map_or(0, |slot| slot.subscribers)
    }

    fn release(&self, range_id: RangeId) {
        let mut slots = self.slots.lock().expect("registry lock poisoned");
        if let Some(slot) = slots.get_mut(&range_id) {
            slot.subscribers = slot.subscribers.saturating_sub(1);
            if slot.subscribers == 0 {
                slots.shift_remove(&range_id);
                debug!(?range_id, "tick registry slot released");
            }
        }
    }
}

/// Handle an axis holds while it participates in shared tick computation.
/// Dropping it releases the registry slot.
#[derive(Debug)]
pub struct TickSubscription {
    registry: Arc<TickRegistry>,
    range_id: RangeId,
}

impl TickSubscription {
    #[must_use]
    pub fn range_id(&self) -> RangeId {
        self.range_id
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.registry.release(self.range_id);
    }
}
