//! The capture session and its trigger handlers
//!
//! One `CaptureSession` per connected session, owned by the caller and
//! passed every trigger. All triggers run on the same sequential event
//! timeline; permission is read from the current capability snapshot at the
//! moment of commit, never cached from focus time. No trigger handler lets
//! an error escape the event loop: every failure becomes a report.

use crate::container::{
    merge_slots, BackingKind, ContainerView, DisplayName, OpenContainerSession, UiKind,
    CHEST_SLOTS,
};
use crate::dispatch::{resolve, CloseHandler};
use crate::extensions::CaptureExtension;
use crate::focus::CaptureFocus;
use crate::pairing;
use crate::ports::WorldPort;
use indexmap::IndexMap;
use mirror_capability::SharedCapabilities;
use mirror_classify::{career_for, ClassificationPolicy};
use mirror_core::errors::MirrorError;
use mirror_core::position::{BlockPos, ChunkPos};
use mirror_core::record::{AuxFields, CommitRecord, CommitSink};
use mirror_core::report::{MessageKind, Report, Reporter};
use mirror_core::types::{ContainerId, EntityRef, EntityTypeId, MapId};

/// Outcome of a container-close trigger. `Unhandled` tells the caller that
/// neither the core dispatch nor any registered extension claimed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Handled,
    Unhandled,
}

/// Decision for an entity about to be removed from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// Let the removal proceed; nothing is captured.
    Allow,
    /// The entity was snapshotted and staged for its chunk's next commit.
    Staged,
}

/// World metadata recovered opportunistically from chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldMeta {
    pub seed: Option<String>,
    pub generator: Option<String>,
}

/// Everything one capture session owns. No global mutable state: the caller
/// holds this and hands it to every trigger.
pub struct CaptureSession<W, S, R> {
    caps: SharedCapabilities,
    policy: ClassificationPolicy,
    world: W,
    sink: S,
    reporter: R,
    extensions: Vec<Box<dyn CaptureExtension>>,
    enabled: bool,
    focus: CaptureFocus,
    open: Option<OpenContainerSession>,
    /// Out-of-range entity snapshots waiting for their chunk's commit.
    staged: IndexMap<ChunkPos, Vec<CommitRecord>>,
    meta: WorldMeta,
}

impl<W, S, R> CaptureSession<W, S, R>
where
    W: WorldPort,
    S: CommitSink,
    R: Reporter,
{
    /// Assemble a session. Extensions are consulted in registration order
    /// when the core dispatch declines a container close.
    pub fn new(
        caps: SharedCapabilities,
        policy: ClassificationPolicy,
        world: W,
        sink: S,
        reporter: R,
        extensions: Vec<Box<dyn CaptureExtension>>,
    ) -> Self {
        Self {
            caps,
            policy,
            world,
            sink,
            reporter,
            extensions,
            enabled: false,
            focus: CaptureFocus::None,
            open: None,
            staged: IndexMap::new(),
            meta: WorldMeta::default(),
        }
    }

    /// Begin capturing. Until this is called every trigger is a no-op.
    pub fn start(&mut self) {
        self.enabled = true;
        tracing::debug!("capture session started");
    }

    /// Whether triggers are currently being processed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// End the session: clears focus, any open container session, staged
    /// entities, recovered metadata, and the capability store.
    pub fn end(&mut self) {
        self.enabled = false;
        self.focus = CaptureFocus::None;
        self.open = None;
        self.staged.clear();
        self.meta = WorldMeta::default();
        self.caps.clear();
        tracing::debug!("capture session ended");
    }

    /// The host switched worlds under an active session. Staged state tied
    /// to the previous world is dropped and staging restarts; the
    /// connection did not change, so the capability store is untouched.
    pub fn world_changed(&mut self) {
        if !self.enabled {
            return;
        }
        self.focus = CaptureFocus::None;
        self.open = None;
        self.staged.clear();
        self.meta = WorldMeta::default();
        self.report(
            MessageKind::Info,
            "world changed; capture staging restarted",
        );
    }

    /// Current focus, for display.
    pub fn focus(&self) -> &CaptureFocus {
        &self.focus
    }

    /// Handle to the shared capability store this session reads.
    pub fn capabilities(&self) -> &SharedCapabilities {
        &self.caps
    }

    /// Recovered world metadata, for the persistence layer to pick up.
    pub fn world_meta(&self) -> &WorldMeta {
        &self.meta
    }

    fn observer_chunk(&self) -> ChunkPos {
        let (x, _, z) = self.world.observer_position();
        ChunkPos::new((x / 16.0).floor() as i32, (z / 16.0).floor() as i32)
    }

    fn report(&self, kind: MessageKind, message: impl Into<String>) {
        self.reporter.report(Report::new(kind, message));
    }

    /// Commit one record, converting a sink error into a report. Returns
    /// whether the commit was accepted.
    fn try_commit(&self, record: CommitRecord) -> bool {
        match self.sink.commit(record) {
            Ok(()) => true,
            Err(err) => {
                self.report(MessageKind::Error, MirrorError::from(err).to_string());
                false
            }
        }
    }

    // ---- trigger: focus sampling -------------------------------------

    /// Update the focus from the latest look target. No side effects beyond
    /// the focus field.
    pub fn focus_sample(&mut self, target: CaptureFocus) {
        if !self.enabled {
            return;
        }
        self.focus = target;
    }

    // ---- trigger: container opened -----------------------------------

    /// A container UI opened. A capture bridge is created only when the
    /// focus resolves to something whose classification permits container
    /// capture; otherwise the matching close is a no-op.
    pub fn container_opened(&mut self, id: ContainerId) {
        if !self.enabled {
            return;
        }
        if let Some(stale) = self.open.take() {
            // At most one open session; a second open supersedes the first.
            self.report(
                MessageKind::GuiClosedWarning,
                format!(
                    "container {} closed implicitly without a final snapshot",
                    stale.container_id.0
                ),
            );
        }

        let backing = match &self.focus {
            CaptureFocus::None => return,
            CaptureFocus::Entity(entity) => {
                if !self.policy.enabled(&entity.type_id) {
                    return;
                }
                BackingKind::Entity(entity.clone())
            }
            CaptureFocus::Block(pos) => match self.world.tile_type_at(*pos) {
                Some(type_id) => BackingKind::TileEntity {
                    pos: *pos,
                    type_id,
                },
                // Focus was on a block with no loaded tile entity; keep the
                // bridge so the close can report it.
                None => BackingKind::None,
            },
        };

        self.open = Some(OpenContainerSession::new(id, backing));
    }

    // ---- trigger: container closed -----------------------------------

    /// A container UI closed with its final contents.
    pub fn container_closed(&mut self, view: ContainerView) -> CloseOutcome {
        if !self.enabled {
            return CloseOutcome::Handled;
        }
        if view.ui_kind == UiKind::Creative {
            // Nothing remote backs the creative picker.
            return CloseOutcome::Handled;
        }

        // The observer's own mount first: closing the ridden carrier's
        // inventory captures that carrier regardless of focus.
        if let (Some(ridden), UiKind::CarrierInventory) = (self.world.riding(), &view.ui_kind) {
            if view.carrier.as_ref().map(|c| c.id) == Some(ridden.id) {
                if self.open.as_ref().map(|o| o.container_id) == Some(view.id) {
                    self.open = None;
                }
                return self.capture_carrier(&ridden, &view, "ridden carrier");
            }
        }

        let open = match self.open.take() {
            Some(open) if open.container_id == view.id => open,
            other => {
                self.open = other;
                return self.close_unclaimed(&view);
            }
        };

        let Some(handler) = resolve(&open.backing, &view.ui_kind) else {
            if let BackingKind::None = open.backing {
                self.report(
                    MessageKind::GuiClosedWarning,
                    "could not resolve the tile entity behind the closed container",
                );
                return CloseOutcome::Handled;
            }
            return self.close_unclaimed(&view);
        };

        match handler {
            CloseHandler::Chest => self.capture_chest(&open, &view),
            CloseHandler::EnderOverlay => self.capture_ender_overlay(&open, &view),
            CloseHandler::SingleTile => self.capture_single_tile(&open, &view),
            CloseHandler::TravelingContainer => self.capture_traveling(&open, &view),
            CloseHandler::MerchantCareer => self.capture_merchant(&open, &view),
            CloseHandler::CarrierContainer => match &open.backing {
                BackingKind::Entity(entity) => {
                    let entity = entity.clone();
                    self.capture_carrier(&entity, &view, "carrier")
                }
                _ => self.close_unclaimed(&view),
            },
        }
    }

    fn close_unclaimed(&self, view: &ContainerView) -> CloseOutcome {
        for extension in &self.extensions {
            if extension.on_container_unclaimed(&self.focus, view) {
                tracing::debug!(extension = extension.id(), "extension claimed container close");
                return CloseOutcome::Handled;
            }
        }
        self.report(
            MessageKind::GuiClosedWarning,
            format!("container {} closed without a known capture path", view.id.0),
        );
        CloseOutcome::Unhandled
    }

    /// Permission gate for tile-backed captures, at the moment of commit.
    fn containers_denied(&self, pos: BlockPos) -> bool {
        if self.caps.read(|set| set.can_save_containers(pos.chunk())) {
            return false;
        }
        self.report(
            MessageKind::GuiClosedInfo,
            "the remote authority does not allow saving containers here",
        );
        true
    }

    /// Permission gate for entity-backed captures, at the moment of commit.
    fn entities_denied(&self, chunk: ChunkPos) -> bool {
        if self.caps.read(|set| set.can_save_entities(chunk)) {
            return false;
        }
        self.report(
            MessageKind::GuiClosedInfo,
            "the remote authority does not allow saving entities here",
        );
        true
    }

    fn capture_chest(&mut self, open: &OpenContainerSession, view: &ContainerView) -> CloseOutcome {
        let BackingKind::TileEntity { pos, type_id } = &open.backing else {
            return CloseOutcome::Unhandled;
        };
        if self.containers_denied(*pos) {
            return CloseOutcome::Handled;
        }

        let slots = merge_slots(&open.previous_slots, &view.slots);
        if view.slots.len() > CHEST_SLOTS {
            // The displayed view spans two physical halves.
            let pair = match pairing::resolve_pair(&self.world, *pos, type_id) {
                Ok(pair) => pair,
                Err(err) => {
                    self.report(MessageKind::Error, err.to_string());
                    return CloseOutcome::Handled;
                }
            };
            let k = slots.len() / 2;
            let committed = self.try_commit(CommitRecord::TileEntity {
                pos: pair.first,
                kind: type_id.clone(),
                slots: slots[..k].to_vec(),
                aux: AuxFields::new(),
            }) && self.try_commit(CommitRecord::TileEntity {
                pos: pair.second,
                kind: type_id.clone(),
                slots: slots[k..].to_vec(),
                aux: AuxFields::new(),
            });
            if committed {
                self.report(
                    MessageKind::GuiClosedInfo,
                    format!("saved paired chest at {} and {}", pair.first, pair.second),
                );
            }
        } else {
            if self.try_commit(CommitRecord::TileEntity {
                pos: *pos,
                kind: type_id.clone(),
                slots,
                aux: AuxFields::new(),
            }) {
                self.report(MessageKind::GuiClosedInfo, format!("saved chest at {pos}"));
            }
        }
        CloseOutcome::Handled
    }

    fn capture_ender_overlay(
        &mut self,
        open: &OpenContainerSession,
        view: &ContainerView,
    ) -> CloseOutcome {
        let BackingKind::TileEntity { pos, type_id } = &open.backing else {
            return CloseOutcome::Unhandled;
        };
        if self.containers_denied(*pos) {
            return CloseOutcome::Handled;
        }

        // Only the overlapping prefix is meaningful: the remote view and
        // the local ender inventory can disagree on size.
        let n = view.slots.len().min(self.world.ender_inventory_size());
        if self.try_commit(CommitRecord::TileEntity {
            pos: *pos,
            kind: type_id.clone(),
            slots: view.slots[..n].to_vec(),
            aux: AuxFields::new(),
        }) {
            self.report(
                MessageKind::GuiClosedInfo,
                format!("saved ender chest contents at {pos}"),
            );
        }
        CloseOutcome::Handled
    }

    fn capture_single_tile(
        &mut self,
        open: &OpenContainerSession,
        view: &ContainerView,
    ) -> CloseOutcome {
        let BackingKind::TileEntity { pos, type_id } = &open.backing else {
            return CloseOutcome::Unhandled;
        };
        if self.containers_denied(*pos) {
            return CloseOutcome::Handled;
        }

        if self.try_commit(CommitRecord::TileEntity {
            pos: *pos,
            kind: type_id.clone(),
            slots: merge_slots(&open.previous_slots, &view.slots),
            aux: view.aux.clone(),
        }) {
            self.report(
                MessageKind::GuiClosedInfo,
                format!("saved {type_id} at {pos}"),
            );
        }
        CloseOutcome::Handled
    }

    fn capture_traveling(
        &mut self,
        open: &OpenContainerSession,
        view: &ContainerView,
    ) -> CloseOutcome {
        let BackingKind::Entity(entity) = &open.backing else {
            return CloseOutcome::Unhandled;
        };
        if self.entities_denied(entity.chunk()) {
            return CloseOutcome::Handled;
        }

        // The backing entity's stored inventory is overwritten wholesale;
        // partial diffs are not meaningful for a container that moves.
        let payload = serde_json::json!({
            "inventory": serde_json::to_value(&view.slots).unwrap_or_default(),
        });
        if self.try_commit(CommitRecord::Entity {
            entity: entity.clone(),
            payload,
        }) {
            self.report(MessageKind::GuiClosedInfo, format!("saved {entity}"));
        }
        CloseOutcome::Handled
    }

    fn capture_merchant(
        &mut self,
        open: &OpenContainerSession,
        view: &ContainerView,
    ) -> CloseOutcome {
        let BackingKind::Entity(entity) = &open.backing else {
            return CloseOutcome::Unhandled;
        };
        if self.entities_denied(entity.chunk()) {
            return CloseOutcome::Handled;
        }
        let Some(merchant) = &view.merchant else {
            self.report(
                MessageKind::GuiClosedWarning,
                "merchant UI closed without extractable trade data",
            );
            return CloseOutcome::Handled;
        };

        let mut payload = serde_json::json!({ "trades": merchant.trades.clone() });

        // Career resolution can fail without discarding the capture: the
        // trades still commit, the career is simply left unset.
        let career = match &merchant.display_name {
            DisplayName::TranslationKey(key) => career_for(merchant.profession, key),
            DisplayName::Opaque(value) => Err(mirror_classify::CareerError::NotATranslationKey {
                value: value.clone(),
            }),
        };
        match career {
            Ok(career) => {
                payload["career"] = serde_json::json!(career);
                self.report(
                    MessageKind::GuiClosedInfo,
                    format!("resolved villager career {career}"),
                );
            }
            Err(err) => self.report(MessageKind::GuiClosedWarning, err.to_string()),
        }

        if self.try_commit(CommitRecord::Entity {
            entity: entity.clone(),
            payload,
        }) {
            self.report(MessageKind::GuiClosedInfo, format!("saved {entity}"));
        }
        CloseOutcome::Handled
    }

    fn capture_carrier(
        &mut self,
        entity: &EntityRef,
        view: &ContainerView,
        label: &str,
    ) -> CloseOutcome {
        if self.entities_denied(entity.chunk()) {
            return CloseOutcome::Handled;
        }
        let payload = serde_json::json!({
            "inventory": serde_json::to_value(&view.slots).unwrap_or_default(),
        });
        if self.try_commit(CommitRecord::Entity {
            entity: entity.clone(),
            payload,
        }) {
            self.report(MessageKind::GuiClosedInfo, format!("saved {label} {entity}"));
        }
        CloseOutcome::Handled
    }

    // ---- trigger: chunk unloaded -------------------------------------

    /// A chunk is no longer needed by the client. Both outcomes, flushed or
    /// not, are reported distinctly.
    pub fn chunk_unloaded(&mut self, chunk: ChunkPos) {
        if !self.enabled {
            return;
        }
        let observer = self.observer_chunk();
        if !self.caps.read(|set| set.can_save_chunk(chunk, observer)) {
            self.report(
                MessageKind::ChunkUnloaded,
                format!("chunk {chunk} was not saved"),
            );
            return;
        }
        if self.try_commit(CommitRecord::Chunk { chunk }) {
            // Entities staged for this chunk ride along with its commit,
            // but only if entity capture is still allowed here now.
            if let Some(staged) = self.staged.swap_remove(&chunk) {
                if self.caps.read(|set| set.can_save_entities(chunk)) {
                    for record in staged {
                        self.try_commit(record);
                    }
                } else {
                    self.report(
                        MessageKind::RemoveEntity,
                        format!(
                            "discarding {} staged entities for chunk {chunk}: entity capture denied",
                            staged.len()
                        ),
                    );
                }
            }
            self.report(MessageKind::ChunkUnloaded, format!("chunk {chunk} saved"));
        }
    }

    // ---- trigger: entity about to be removed -------------------------

    /// An entity is about to be removed from the world. Out-of-range
    /// removals are snapshotted now and staged for the next commit of their
    /// chunk; in-range removals lose nothing and proceed unrecorded.
    pub fn entity_about_to_be_removed(&mut self, entity: &EntityRef) -> RemovalDecision {
        if !self.enabled {
            return RemovalDecision::Allow;
        }
        if !self.caps.read(|set| set.can_save_entities(entity.chunk())) {
            return RemovalDecision::Allow;
        }
        if !self.policy.enabled(&entity.type_id) {
            self.report(
                MessageKind::RemoveEntity,
                format!("allowing removal of {entity}: disabled by preference"),
            );
            return RemovalDecision::Allow;
        }

        let classified = self
            .caps
            .read(|set| self.policy.classify(&entity.type_id, set));
        if classified.track_distance < 0 {
            self.report(
                MessageKind::RemoveEntity,
                format!("allowing removal of {entity}: unrecognized track distance"),
            );
            return RemovalDecision::Allow;
        }

        let (ox, _, oz) = self.world.observer_position();
        let distance = entity.horizontal_distance_to(ox, oz);
        if distance > f64::from(classified.track_distance) {
            let record = CommitRecord::Entity {
                entity: entity.clone(),
                payload: self.world.snapshot_entity(entity),
            };
            self.staged.entry(entity.chunk()).or_default().push(record);
            self.report(
                MessageKind::RemoveEntity,
                format!(
                    "saving {entity}: distance {distance:.1} exceeds track distance {}",
                    classified.track_distance
                ),
            );
            return RemovalDecision::Staged;
        }

        self.report(
            MessageKind::RemoveEntity,
            format!(
                "allowing removal of {entity}: distance {distance:.1} within track distance {}",
                classified.track_distance
            ),
        );
        RemovalDecision::Allow
    }

    // ---- trigger: block event ----------------------------------------

    /// A block event arrived. Only percussion instruments carry state worth
    /// synthesizing into a tile record: the pitch parameter, reduced modulo
    /// its valid domain.
    pub fn block_event(&mut self, pos: BlockPos, block_type: &EntityTypeId, param: i32) {
        if !self.enabled {
            return;
        }
        if !self.caps.read(|set| set.can_save_tile_entities(pos.chunk())) {
            return;
        }
        if block_type.as_str() != "NoteBlock" {
            return;
        }

        let note = param.rem_euclid(25);
        let mut aux = AuxFields::new();
        aux.insert("note".to_owned(), note);
        if self.try_commit(CommitRecord::TileEntity {
            pos,
            kind: block_type.clone(),
            slots: Vec::new(),
            aux,
        }) {
            self.report(
                MessageKind::BlockEvent,
                format!("saved note block at {pos} with note {note}"),
            );
        }
    }

    // ---- trigger: map data -------------------------------------------

    /// A map image arrived from the remote.
    pub fn map_received(&mut self, id: MapId, image_data: Vec<u8>) {
        if !self.enabled {
            return;
        }
        if !self.caps.read(|set| set.can_save_maps()) {
            return;
        }
        if self.try_commit(CommitRecord::Map { id, image_data }) {
            self.report(MessageKind::MapSaved, format!("saved map {}", id.0));
        }
    }

    // ---- trigger: chat observed --------------------------------------

    /// A chat line arrived; the world seed is recoverable from the output
    /// of the seed command.
    pub fn chat_observed(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let Some(seed) = text.strip_prefix("Seed: ") else {
            return;
        };
        self.meta.seed = Some(seed.to_owned());
        if self.meta.generator.is_none() {
            self.meta.generator = Some("default".to_owned());
            self.report(
                MessageKind::Info,
                format!("world seed set to {seed}; generator defaulted"),
            );
        } else {
            self.report(MessageKind::Info, format!("world seed set to {seed}"));
        }
    }
}
