//! Type registry port and the built-in default category table

use mirror_core::types::EntityTypeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category a type falls into, with its built-in default track
/// distance. `Unknown` carries the sentinel -1: nothing can be said about
/// the type, so removal is always allowed without capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Animal,
    Monster,
    Misc,
    Other,
    Unknown,
}

impl Category {
    /// Built-in default track distance for this category, in blocks.
    pub fn default_range(&self) -> i32 {
        match self {
            Category::Animal => 48,
            Category::Monster => 48,
            Category::Misc => 32,
            Category::Other => 64,
            Category::Unknown => -1,
        }
    }

    /// Group name used for per-group enablement and display.
    pub fn group_name(&self) -> &'static str {
        match self {
            Category::Animal => "Animals",
            Category::Monster => "Monsters",
            Category::Misc => "Misc.",
            Category::Other => "Other",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}

/// External registry of known types, consulted as a provider of
/// classification defaults. Providers are registered in order at session
/// start; the first one that knows a type wins.
pub trait TypeRegistry: Send + Sync {
    /// Whether this registry can classify the type at all.
    fn is_known_type(&self, type_id: &EntityTypeId) -> bool;

    /// Default category for a known type. Only called when
    /// [`is_known_type`](Self::is_known_type) returned true.
    fn lookup_default_category(&self, type_id: &EntityTypeId) -> Category;
}

/// Table-backed registry used by tests across the workspace.
pub mod testing {
    use super::*;
    use std::collections::BTreeMap;

    /// Registry over a fixed type table.
    #[derive(Debug, Default, Clone)]
    pub struct TableRegistry {
        entries: BTreeMap<EntityTypeId, Category>,
    }

    impl TableRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, type_id: impl Into<EntityTypeId>, category: Category) -> Self {
            self.entries.insert(type_id.into(), category);
            self
        }
    }

    impl TypeRegistry for TableRegistry {
        fn is_known_type(&self, type_id: &EntityTypeId) -> bool {
            self.entries.contains_key(type_id)
        }

        fn lookup_default_category(&self, type_id: &EntityTypeId) -> Category {
            self.entries
                .get(type_id)
                .copied()
                .unwrap_or(Category::Unknown)
        }
    }
}
