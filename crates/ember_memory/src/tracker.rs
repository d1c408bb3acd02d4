//! Allocation tracking context
//!
//! One `MemoryTracker` is constructed at startup and a handle to it is
//! injected into every container at construction. All tracked allocation
//! and deallocation reports its byte count here, tagged by [`Category`],
//! and `validate_shutdown` checks that every ownership-bearing category
//! balanced out before the process tears down.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::Category;

/// Shared counter state behind the tracker handles.
///
/// Single-threaded by design: counters are `Cell`s and the handle is an
/// `Rc`, so the tracker is `!Send`/`!Sync` and cross-thread use fails to
/// compile rather than corrupting the balances.
struct Counters {
    total: Cell<usize>,
    per_category: [Cell<usize>; Category::COUNT],
}

impl Drop for Counters {
    fn drop(&mut self) {
        // Last handle gone. Not a panic path — validate_shutdown is the
        // contractual check — but leaks that slipped past it get logged.
        for category in Category::ALL {
            let bytes = self.per_category[category.index()].get();
            if bytes > 0 && category.requires_balance() {
                tracing::error!(
                    category = %category,
                    bytes,
                    "tracker dropped with unbalanced allocations"
                );
            }
        }
    }
}

/// Handle to the allocation tracking context.
///
/// Cloning is cheap (reference-counted); every clone observes the same
/// counters. Containers hold a clone so their destructors can report the
/// bytes they release.
#[derive(Clone)]
pub struct MemoryTracker {
    state: Rc<Counters>,
}

impl MemoryTracker {
    /// Create a tracking context with all balances at zero.
    pub fn new() -> Self {
        Self {
            state: Rc::new(Counters {
                total: Cell::new(0),
                per_category: std::array::from_fn(|_| Cell::new(0)),
            }),
        }
    }

    /// Record `bytes` of freshly allocated memory under `category`.
    ///
    /// Pure bookkeeping — no memory is allocated here. `Category::Unknown`
    /// is not a valid tag and aborts.
    pub fn register(&self, category: Category, bytes: usize) {
        assert!(
            category != Category::Unknown,
            "allocations must be tagged with a real category"
        );
        let slot = &self.state.per_category[category.index()];
        slot.set(slot.get() + bytes);
        self.state.total.set(self.state.total.get() + bytes);
    }

    /// Record the release of `bytes` previously registered under `category`.
    ///
    /// Releasing more than the category's live balance means a block was
    /// double-freed or mis-tagged; that corrupts the accounting, so it
    /// aborts immediately.
    pub fn unregister(&self, category: Category, bytes: usize) {
        assert!(
            category != Category::Unknown,
            "deallocations must be tagged with a real category"
        );
        let slot = &self.state.per_category[category.index()];
        let Some(remaining) = slot.get().checked_sub(bytes) else {
            panic!(
                "released {} bytes under '{}' but only {} are live",
                bytes,
                category,
                slot.get()
            );
        };
        slot.set(remaining);
        self.state.total.set(self.state.total.get() - bytes);
    }

    /// Total live tracked bytes across all categories.
    #[inline]
    pub fn total_allocated(&self) -> usize {
        self.state.total.get()
    }

    /// Live tracked bytes for one category.
    #[inline]
    pub fn allocated_in(&self, category: Category) -> usize {
        self.state.per_category[category.index()].get()
    }

    /// Snapshot of the current balances for diagnostic reporting.
    ///
    /// Only categories with a non-zero balance are listed.
    pub fn report(&self) -> MemoryReport {
        let categories = Category::ALL
            .iter()
            .filter_map(|&category| {
                let bytes = self.allocated_in(category);
                (bytes > 0).then_some(CategoryUsage { category, bytes })
            })
            .collect();
        MemoryReport {
            total_allocated: self.total_allocated(),
            categories,
        }
    }

    /// Check that every ownership-bearing category has returned to a zero
    /// balance.
    ///
    /// Call this once at shutdown, after all containers are gone. A leak is
    /// reported as an error rather than aborting so the host can decide how
    /// to surface it; the runtime treats it as fatal.
    pub fn validate_shutdown(&self) -> Result<(), ShutdownError> {
        let leaks: Vec<CategoryUsage> = Category::ALL
            .iter()
            .filter(|c| c.requires_balance())
            .filter_map(|&category| {
                let bytes = self.allocated_in(category);
                (bytes > 0).then_some(CategoryUsage { category, bytes })
            })
            .collect();

        if leaks.is_empty() {
            tracing::debug!("shutdown validation passed, all balances at zero");
            Ok(())
        } else {
            Err(ShutdownError::LeakedAllocations { leaks })
        }
    }
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTracker")
            .field("total_allocated", &self.total_allocated())
            .finish()
    }
}

/// Live byte count for one category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub bytes: usize,
}

impl fmt::Display for CategoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} bytes", self.category, self.bytes)
    }
}

/// Snapshot of tracker balances, for logs or export.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryReport {
    pub total_allocated: usize,
    pub categories: Vec<CategoryUsage>,
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes live", self.total_allocated)?;
        for usage in &self.categories {
            write!(f, "; {}", usage)?;
        }
        Ok(())
    }
}

/// Errors reported by shutdown validation.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("ownership-bearing categories leaked: {}", list_leaks(.leaks))]
    LeakedAllocations { leaks: Vec<CategoryUsage> },
}

impl ShutdownError {
    /// The leaked categories with their live byte counts.
    pub fn leaks(&self) -> &[CategoryUsage] {
        match self {
            ShutdownError::LeakedAllocations { leaks } => leaks,
        }
    }
}

fn list_leaks(leaks: &[CategoryUsage]) -> String {
    let parts: Vec<String> = leaks.iter().map(|l| l.to_string()).collect();
    parts.join(", ")
}
