//! Villager career resolution
//!
//! A merchant UI shows a localized profession title; recovering the numeric
//! career id for persistence means matching that title's translation key
//! against a fixed per-profession table. Partial matches are never inferred;
//! anything outside the table is a reported, non-fatal error.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Career names per profession id, mapping the title's translation key to
/// the numeric career id.
static CAREERS: Lazy<BTreeMap<i32, BTreeMap<&'static str, i32>>> = Lazy::new(|| {
    let mut table = BTreeMap::new();
    table.insert(
        0, // farmer
        BTreeMap::from([
            ("entity.Villager.farmer", 1),
            ("entity.Villager.fisherman", 2),
            ("entity.Villager.shepherd", 3),
            ("entity.Villager.fletcher", 4),
        ]),
    );
    table.insert(
        1, // librarian
        BTreeMap::from([
            ("entity.Villager.librarian", 1),
            ("entity.Villager.cartographer", 2),
        ]),
    );
    table.insert(2, BTreeMap::from([("entity.Villager.cleric", 1)]));
    table.insert(
        3, // blacksmith
        BTreeMap::from([
            ("entity.Villager.armor", 1),
            ("entity.Villager.weapon", 2),
            ("entity.Villager.tool", 3),
        ]),
    );
    table.insert(
        4, // butcher
        BTreeMap::from([
            ("entity.Villager.butcher", 1),
            ("entity.Villager.leather", 2),
        ]),
    );
    table.insert(5, BTreeMap::from([("entity.Villager.nitwit", 1)]));
    table
});

/// Why a career could not be resolved. All variants are user-visible
/// warnings; the rest of the capture still commits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CareerError {
    /// The profession id has no known careers.
    #[error("profession {profession} has no known careers")]
    UnknownProfession { profession: i32 },

    /// The displayed title is not one of the profession's known careers.
    #[error("'{key}' is not a known career of profession {profession}")]
    UnknownTitle { key: String, profession: i32 },

    /// The UI's display name was not a plain translation key.
    #[error("display name is not a translation key: {value}")]
    NotATranslationKey { value: String },
}

impl From<CareerError> for mirror_core::MirrorError {
    fn from(err: CareerError) -> Self {
        mirror_core::MirrorError::classification(err.to_string())
    }
}

/// Resolve the numeric career id for a profession and displayed title key.
pub fn career_for(profession: i32, title_key: &str) -> Result<i32, CareerError> {
    let careers = CAREERS
        .get(&profession)
        .ok_or(CareerError::UnknownProfession { profession })?;
    careers
        .get(title_key)
        .copied()
        .ok_or_else(|| CareerError::UnknownTitle {
            key: title_key.to_owned(),
            profession,
        })
}
