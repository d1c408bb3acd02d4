//! Allocation categories
//!
//! Every tracked allocation is tagged with the logical purpose of the memory
//! it backs. Categories are a tracking dimension only — they carry no type
//! information and exist so leak totals can be asserted per purpose at
//! shutdown.

use serde::Serialize;

/// Logical purpose of a tracked allocation.
///
/// The set is closed: adding a category means extending this enum, `ALL`,
/// and (if the new category owns its allocations) `requires_balance`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Category {
    /// Sentinel for untagged memory. Never valid in tracking calls.
    Unknown = 0,
    Array = 1,
    DynamicArray = 2,
    Hashmap = 3,
    Queue = 4,
    Tree = 5,
    String = 6,
    Engine = 7,
    Renderer = 8,
    Entity = 9,
    EntityNode = 10,
    Scene = 11,
    SmartPointer = 12,
    LinearAllocator = 13,
}

impl Category {
    /// Number of categories, i.e. the size of the per-category counter table.
    pub const COUNT: usize = 14;

    /// Every category, in counter-table order.
    pub const ALL: [Category; Self::COUNT] = [
        Category::Unknown,
        Category::Array,
        Category::DynamicArray,
        Category::Hashmap,
        Category::Queue,
        Category::Tree,
        Category::String,
        Category::Engine,
        Category::Renderer,
        Category::Entity,
        Category::EntityNode,
        Category::Scene,
        Category::SmartPointer,
        Category::LinearAllocator,
    ];

    /// Index into the per-category counter table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this category's balance must be zero when the tracker is
    /// validated at shutdown.
    ///
    /// These are the categories backed by an owning container or owner type;
    /// a non-zero balance at teardown means some owner never released its
    /// storage. Subsystem-level categories (Engine, Renderer, ...) are
    /// long-lived tags whose teardown order the host controls, so they are
    /// exempt.
    #[inline]
    pub const fn requires_balance(self) -> bool {
        matches!(
            self,
            Category::Array
                | Category::DynamicArray
                | Category::Hashmap
                | Category::Queue
                | Category::Tree
                | Category::String
                | Category::SmartPointer
        )
    }

    /// Human-readable label for reports and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::Array => "array",
            Category::DynamicArray => "dynamic-array",
            Category::Hashmap => "hashmap",
            Category::Queue => "queue",
            Category::Tree => "tree",
            Category::String => "string",
            Category::Engine => "engine",
            Category::Renderer => "renderer",
            Category::Entity => "entity",
            Category::EntityNode => "entity-node",
            Category::Scene => "scene",
            Category::SmartPointer => "smart-pointer",
            Category::LinearAllocator => "linear-allocator",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
