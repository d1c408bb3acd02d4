//! Ember Engine memory core
//!
//! Every heap block the engine owns flows through one tracked funnel,
//! tagged by allocation [`Category`] and counted, so per-category leak
//! totals can be validated at shutdown. On top of the funnel sit the four
//! owning primitives the engine uses instead of a general container
//! library:
//!
//! - [`DynArray`] — growable, contiguous, tracked sequence
//! - [`FixedArray`] — inline compile-time-sized sequence (untracked)
//! - [`OwnedPtr`] — single-owner heap value with optional release hook
//! - [`RawStorage`] — uninitialized tracked slots with placement semantics
//!
//! The whole core is single-threaded: the tracker handle is `Rc`-based and
//! refuses to cross threads at compile time.

mod block;
mod category;
mod dyn_array;
mod fixed_array;
mod owned_ptr;
mod storage;
mod tracker;

pub use block::TrackedBlock;
pub use category::Category;
pub use dyn_array::{DynArray, GROWTH_FACTOR};
pub use fixed_array::FixedArray;
pub use owned_ptr::OwnedPtr;
pub use storage::RawStorage;
pub use tracker::{CategoryUsage, MemoryReport, MemoryTracker, ShutdownError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
