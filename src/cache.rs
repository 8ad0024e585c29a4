//! Projection cache: denormalized, read-optimized JSON views derived from
//! the canonical snapshot.
//!
//! Projections live in a second durable slot, keyed by logical file path
//! ("users.json", "dashboard-summary.json", "moves/move_<id>.json"). The
//! whole set is regenerated after every mutation; there is no incremental
//! invalidation, which is acceptable because regeneration is
//! O(moves x boxes x items) over a small snapshot. A missing key means the
//! cache has not been warmed yet, never an error.

use std::path::Path;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::logging::OperationTimer;
use crate::models::{BoxDetail, DashboardSummary, Move, MoveDetail, Snapshot};

/// Read-optimized projection store over a durable key-value slot
#[derive(Clone)]
pub struct ProjectionCache {
    slot: sled::Db,
}

impl ProjectionCache {
    /// Open (or create) the projection slot at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let slot = sled::open(path)?;
        Ok(Self { slot })
    }

    /// Logical key for a per-move detail projection
    #[must_use]
    pub fn move_detail_key(move_id: &str) -> String {
        format!("moves/move_{move_id}.json")
    }

    /// Rebuild every projection from the given snapshot.
    ///
    /// Idempotent: the same snapshot produces identical projections except
    /// for the embedded `last_updated` timestamp in the dashboard summary.
    pub fn generate_all(&self, snapshot: &Snapshot) -> Result<()> {
        let _timer = OperationTimer::new("cache_generate_all");
        self.slot.clear()?;

        self.write("users.json", &snapshot.users)?;
        self.write("moves.json", &snapshot.moves)?;
        self.write("boxes.json", &snapshot.boxes)?;
        self.write("items.json", &snapshot.items)?;

        let summary = DashboardSummary {
            total_moves: snapshot.moves.len(),
            active_boxes: snapshot.boxes.len(),
            unverified_items: snapshot.items.len(),
            flagged_users: snapshot.users.iter().filter(|u| u.is_flagged).count(),
            last_updated: Utc::now(),
        };
        self.write("dashboard-summary.json", &summary)?;

        for move_record in &snapshot.moves {
            let detail = Self::build_move_detail(snapshot, move_record);
            self.write(&Self::move_detail_key(&move_record.id), &detail)?;
        }

        self.slot.flush()?;
        debug!(
            moves = snapshot.moves.len(),
            boxes = snapshot.boxes.len(),
            items = snapshot.items.len(),
            "Projections regenerated from snapshot"
        );
        Ok(())
    }

    /// Look up a previously generated projection by logical key.
    ///
    /// Returns `None` when the key is absent (cache not warmed), never an
    /// error for a miss.
    pub fn read_file(&self, key: &str) -> Result<Option<Value>> {
        match self.slot.get(key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Typed read of the dashboard summary projection
    pub fn read_summary(&self) -> Result<Option<DashboardSummary>> {
        self.read_typed("dashboard-summary.json")
    }

    /// Typed read of the flat moves projection
    pub fn read_moves(&self) -> Result<Option<Vec<Move>>> {
        self.read_typed("moves.json")
    }

    /// Typed read of a per-move detail projection
    pub fn read_move_detail(&self, move_id: &str) -> Result<Option<MoveDetail>> {
        self.read_typed(&Self::move_detail_key(move_id))
    }

    fn read_typed<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.slot.get(key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn write<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_vec(value)?;
        self.slot.insert(key.as_bytes(), raw)?;
        Ok(())
    }

    /// Join a move with its boxes and each box's items by parent-id filtering
    fn build_move_detail(snapshot: &Snapshot, move_record: &Move) -> MoveDetail {
        let boxes = snapshot
            .boxes
            .iter()
            .filter(|b| b.move_id == move_record.id)
            .map(|b| BoxDetail {
                box_record: b.clone(),
                items: snapshot
                    .items
                    .iter()
                    .filter(|i| i.box_id == b.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        MoveDetail {
            move_record: move_record.clone(),
            boxes,
        }
    }
}
