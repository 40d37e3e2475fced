//! Container views and open-container sessions
//!
//! A [`ContainerView`] is what the host's extraction ports hand us when a
//! container UI closes: the UI kind, the container's own slots (observer
//! inventory already trimmed), any auxiliary numeric fields the port pulled
//! from the UI, and merchant-specific data where applicable.

use mirror_core::position::BlockPos;
use mirror_core::record::AuxFields;
use mirror_core::types::{ContainerId, EntityRef, EntityTypeId, SlotSnapshot};

/// Slot count of one physical chest half.
pub const CHEST_SLOTS: usize = 27;

/// Kind of container UI being displayed, as classified by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiKind {
    Chest,
    BrewingStand,
    Furnace,
    Dispenser,
    Hopper,
    Beacon,
    Merchant,
    /// Inventory of a rideable storage carrier.
    CarrierInventory,
    /// The creative-mode item picker; never captured.
    Creative,
    /// Anything the host could not classify.
    Other(String),
}

/// Display name attached to a merchant UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayName {
    /// A plain translation key, resolvable against the career table.
    TranslationKey(String),
    /// Any other component; career resolution reports and skips it.
    Opaque(String),
}

/// Merchant-specific data extracted from the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantView {
    pub profession: i32,
    pub display_name: DisplayName,
    /// The displayed trade list, stored opaquely in the entity payload.
    pub trades: serde_json::Value,
}

/// Everything extracted from a closing container UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerView {
    pub id: ContainerId,
    pub ui_kind: UiKind,
    /// The container's own slots; observer inventory slots are already
    /// trimmed by the extraction port.
    pub slots: SlotSnapshot,
    /// Auxiliary numeric fields (brew time, burn time, fuel, ...).
    pub aux: AuxFields,
    pub merchant: Option<MerchantView>,
    /// The carrier whose inventory this UI shows, for
    /// [`UiKind::CarrierInventory`].
    pub carrier: Option<EntityRef>,
}

impl ContainerView {
    /// A minimal view with the given kind and slots.
    pub fn new(id: ContainerId, ui_kind: UiKind, slots: SlotSnapshot) -> Self {
        Self {
            id,
            ui_kind,
            slots,
            aux: AuxFields::new(),
            merchant: None,
            carrier: None,
        }
    }
}

/// What remote-held object a displayed container is backed by.
#[derive(Debug, Clone, PartialEq)]
pub enum BackingKind {
    /// A tile entity at a known position.
    TileEntity { pos: BlockPos, type_id: EntityTypeId },
    /// A tracked entity.
    Entity(EntityRef),
    /// Focus was set but resolved to nothing capturable.
    None,
}

/// Bridges one displayed container UI to its backing object. At most one is
/// active per session.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenContainerSession {
    pub container_id: ContainerId,
    pub backing: BackingKind,
    /// Snapshot to diff the final contents against; empty at open.
    pub previous_slots: SlotSnapshot,
}

impl OpenContainerSession {
    pub fn new(container_id: ContainerId, backing: BackingKind) -> Self {
        Self {
            container_id,
            backing,
            previous_slots: SlotSnapshot::new(),
        }
    }
}

/// Merge final slot contents over a previous snapshot: a filled slot wins,
/// an empty one falls back to whatever was known before.
pub fn merge_slots(previous: &SlotSnapshot, current: &SlotSnapshot) -> SlotSnapshot {
    let len = previous.len().max(current.len());
    (0..len)
        .map(|i| {
            current
                .get(i)
                .and_then(Clone::clone)
                .or_else(|| previous.get(i).and_then(Clone::clone))
        })
        .collect()
}
