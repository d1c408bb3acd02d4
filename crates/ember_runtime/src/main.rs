//! Ember Engine Runtime
//!
//! Minimal binary that boots the memory core, runs a container workout in
//! place of the real engine loop, and validates the tracker at shutdown.

use anyhow::{bail, Result};

use ember_memory::{Category, DynArray, FixedArray, MemoryTracker, OwnedPtr, RawStorage};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Ember Engine v{}", ember_memory::VERSION);

    let tracker = MemoryTracker::new();
    run(&tracker);

    tracing::info!(report = %tracker.report(), "memory state before shutdown");

    // The tracker reports leaks as a result; the runtime treats them as fatal.
    if let Err(err) = tracker.validate_shutdown() {
        tracing::error!(%err, "shutdown validation failed");
        bail!(err);
    }

    tracing::info!("shutdown validation passed");
    Ok(())
}

/// Stand-in for the engine boot: exercise each owning primitive and release
/// everything before returning.
fn run(tracker: &MemoryTracker) {
    let mut frame_times = DynArray::new(tracker);
    for frame in 0..64u32 {
        frame_times.push_back(frame as f64 * 16.6);
    }
    frame_times.downsize(32);
    frame_times.remove_at(0);
    tracing::info!(
        frames = frame_times.len(),
        capacity = frame_times.capacity(),
        "frame history populated"
    );

    let clear_color: FixedArray<f32, 4> = FixedArray::splat(0.0);
    tracing::debug!(color = ?clear_color.as_slice(), "clear color");

    let settings = OwnedPtr::new_in(tracker, Category::SmartPointer, [1920u32, 1080]);
    tracing::info!(width = settings[0], height = settings[1], "display mode");

    let mut staging = RawStorage::<u8>::empty(tracker, Category::LinearAllocator);
    staging.allocate(4096);
    tracing::debug!(bytes = staging.len(), "staging storage reserved");

    tracing::info!(live_bytes = tracker.total_allocated(), "workout complete");
}
