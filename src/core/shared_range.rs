use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::datum_range::DatumRange;
use crate::error::PlotResult;

static NEXT_RANGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one shared range cell.
///
/// Attached handles alias the same id; detaching mints a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeId(u64);

impl RangeId {
    fn next() -> Self {
        Self(NEXT_RANGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct RangeCell {
    range: DatumRange,
    generation: u64,
}

/// Explicit shared-ownership handle over a mutable range.
///
/// Multiple axes displaying the same data interval hold attached handles to
/// one cell; a range change through any handle is observed by all of them.
/// `attach` is a pointer copy, `detach` is a deep copy into a fresh cell.
/// The interior lock keeps handles `Send + Sync` so background loaders can
/// hold one while results are marshalled back to the paint thread.
#[derive(Debug, Clone)]
pub struct SharedRange {
    id: RangeId,
    cell: Arc<RwLock<RangeCell>>,
}

impl SharedRange {
    #[must_use]
    pub fn new(range: DatumRange) -> Self {
        Self {
            id: RangeId::next(),
            cell: Arc::new(RwLock::new(RangeCell {
                range,
                generation: 0,
            })),
        }
    }

    #[must_use]
    pub fn id(&self) -> RangeId {
        self.id
    }

    /// Aliases this handle: both handles observe the same cell.
    #[must_use]
    pub fn attach(&self) -> SharedRange {
        self.clone()
    }

    /// Copies the current range into an independent fresh cell.
    #[must_use]
    pub fn detach(&self) -> SharedRange {
        SharedRange::new(self.get())
    }

    #[must_use]
    pub fn get(&self) -> DatumRange {
        self.cell.read().expect("range lock poisoned").range
    }

    /// Generation counter bumped on every mutation; staleness probes compare
    /// generations instead of range values.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.cell.read().expect("range lock poisoned").generation
    }

    /// Replaces the shared range, bumping the generation.
    pub fn set(&self, range: DatumRange) -> PlotResult<()> {
        let mut cell = self.cell.write().expect("range lock poisoned");
        cell.range = range;
        cell.generation += 1;
        trace!(id = self.id.0, generation = cell.generation, %range, "shared range replaced");
        Ok(())
    }

    #[must_use]
    pub fn is_attached_to(&self, other: &SharedRange) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}
