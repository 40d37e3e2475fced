//! Track-distance and enablement resolution
//!
//! Resolution order for a type's track distance: in `Server` mode a distance
//! the remote pushed wins; in `User` mode a local override wins; everything
//! else falls back to the built-in category table. An unrecognized type is
//! logged once and classifies to the unknown group with distance -1.

use crate::config::{ClassificationConfig, TrackDistanceMode};
use crate::registry::{Category, TypeRegistry};
use mirror_capability::CapabilitySet;
use mirror_core::types::EntityTypeId;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Derived classification for one type. Never persisted; recomputed per
/// query from the current policy inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub group: String,
    pub track_distance: i32,
    pub enabled: bool,
}

/// The classification policy for one session.
pub struct ClassificationPolicy {
    config: ClassificationConfig,
    /// Ordered providers; the first registry that knows a type wins.
    registries: Vec<Box<dyn TypeRegistry>>,
    warned: Mutex<HashSet<EntityTypeId>>,
}

impl ClassificationPolicy {
    /// Assemble the policy with its ordered providers. The provider list is
    /// fixed for the session's lifetime.
    pub fn new(config: ClassificationConfig, registries: Vec<Box<dyn TypeRegistry>>) -> Self {
        Self {
            config,
            registries,
            warned: Mutex::new(HashSet::new()),
        }
    }

    fn category_of(&self, type_id: &EntityTypeId) -> Category {
        for registry in &self.registries {
            if registry.is_known_type(type_id) {
                return registry.lookup_default_category(type_id);
            }
        }
        self.warn_once(type_id);
        Category::Unknown
    }

    fn warn_once(&self, type_id: &EntityTypeId) {
        if self.warned.lock().insert(type_id.clone()) {
            tracing::warn!(%type_id, "no registry recognizes this type; treating as unknown");
        }
    }

    /// Whether capture of this type is enabled: its group and the single
    /// type are independently toggleable, both default to enabled.
    pub fn enabled(&self, type_id: &EntityTypeId) -> bool {
        let category = self.category_of(type_id);
        self.config.group_enabled(category.group_name())
            && self.config.type_enabled(type_id.as_str())
    }

    /// Classify a type against the current capability snapshot.
    pub fn classify(&self, type_id: &EntityTypeId, caps: &CapabilitySet) -> ClassificationResult {
        let category = self.category_of(type_id);

        let track_distance = match self.config.mode {
            TrackDistanceMode::Server => caps
                .entity_range(type_id)
                .unwrap_or_else(|| category.default_range()),
            TrackDistanceMode::User => self
                .config
                .type_track_distance(type_id.as_str())
                .unwrap_or_else(|| category.default_range()),
            TrackDistanceMode::Default => category.default_range(),
        };

        ClassificationResult {
            group: category.group_name().to_owned(),
            track_distance,
            enabled: self.enabled(type_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroupConfig, TypeConfig};
    use crate::registry::testing::TableRegistry;
    use mirror_capability::{DefaultPolicy, NegotiationEffect};

    fn policy_with(config: ClassificationConfig) -> ClassificationPolicy {
        let registry = TableRegistry::new()
            .with("Creeper", Category::Monster)
            .with("Cow", Category::Animal)
            .with("ItemFrame", Category::Misc);
        ClassificationPolicy::new(config, vec![Box::new(registry)])
    }

    fn caps_with_range(type_id: &str, range: i32) -> CapabilitySet {
        let mut caps = CapabilitySet::new(DefaultPolicy::Permissive);
        caps.apply(NegotiationEffect::Grant {
            booleans: vec![],
            integers: vec![],
            entity_ranges: vec![(EntityTypeId::from(type_id), range)],
        });
        caps
    }

    #[test]
    fn server_mode_prefers_the_pushed_distance() {
        let policy = policy_with(ClassificationConfig::default());
        let caps = caps_with_range("Creeper", 96);

        let result = policy.classify(&EntityTypeId::from("Creeper"), &caps);
        assert_eq!(result.track_distance, 96);
        assert_eq!(result.group, "Monsters");
    }

    #[test]
    fn server_mode_falls_back_to_the_default_table() {
        let policy = policy_with(ClassificationConfig::default());
        let caps = CapabilitySet::new(DefaultPolicy::Permissive);

        let result = policy.classify(&EntityTypeId::from("Cow"), &caps);
        assert_eq!(result.track_distance, 48);
        let result = policy.classify(&EntityTypeId::from("ItemFrame"), &caps);
        assert_eq!(result.track_distance, 32);
    }

    #[test]
    fn user_mode_prefers_the_local_override() {
        let mut config = ClassificationConfig {
            mode: TrackDistanceMode::User,
            ..Default::default()
        };
        config.types.insert(
            "Creeper".to_owned(),
            TypeConfig {
                enabled: true,
                track_distance: Some(200),
            },
        );
        let policy = policy_with(config);
        // A pushed range must not win in user mode.
        let caps = caps_with_range("Creeper", 96);

        let result = policy.classify(&EntityTypeId::from("Creeper"), &caps);
        assert_eq!(result.track_distance, 200);
    }

    #[test]
    fn unknown_type_gets_the_sentinel_distance() {
        let policy = policy_with(ClassificationConfig::default());
        let caps = CapabilitySet::new(DefaultPolicy::Permissive);

        let result = policy.classify(&EntityTypeId::from("ModdedDragon"), &caps);
        assert_eq!(result.group, "Unknown");
        assert_eq!(result.track_distance, -1);
    }

    #[test]
    fn group_and_type_enablement_are_independent() {
        let mut config = ClassificationConfig::default();
        config
            .groups
            .insert("Monsters".to_owned(), GroupConfig { enabled: false });
        let policy = policy_with(config);

        assert!(!policy.enabled(&EntityTypeId::from("Creeper")));
        assert!(policy.enabled(&EntityTypeId::from("Cow")));

        let mut config = ClassificationConfig::default();
        config.types.insert(
            "Cow".to_owned(),
            TypeConfig {
                enabled: false,
                track_distance: None,
            },
        );
        let policy = policy_with(config);
        assert!(!policy.enabled(&EntityTypeId::from("Cow")));
    }

    #[test]
    fn first_registry_wins() {
        let first = TableRegistry::new().with("Creeper", Category::Misc);
        let second = TableRegistry::new().with("Creeper", Category::Monster);
        let policy = ClassificationPolicy::new(
            ClassificationConfig::default(),
            vec![Box::new(first), Box::new(second)],
        );
        let caps = CapabilitySet::new(DefaultPolicy::Permissive);

        let result = policy.classify(&EntityTypeId::from("Creeper"), &caps);
        assert_eq!(result.group, "Misc.");
        assert_eq!(result.track_distance, 32);
    }
}
