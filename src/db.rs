//! Canonical data store: the single source of truth for users, moves,
//! boxes, and items.
//!
//! The whole [`Snapshot`] is held under one key in a dedicated sled slot
//! and overwritten on every save. There are no partial writes; readers
//! always see a complete snapshot, and an absent key is a valid empty
//! default rather than an error.

use std::path::Path;

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::{
    CountType, Item, Move, MoveBox, MoveStatus, PhotoRecord, ProtectionTier, Snapshot, User,
    UserRole,
};

const SNAPSHOT_KEY: &[u8] = b"snapshot";

/// Snapshot store over a durable key-value slot
#[derive(Clone)]
pub struct Database {
    slot: sled::Db,
}

impl Database {
    /// Open (or create) the snapshot slot at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let slot = sled::open(path)?;
        Ok(Self { slot })
    }

    /// Read the current snapshot, defaulting to empty collections when no
    /// prior data exists.
    pub fn get(&self) -> Result<Snapshot> {
        match self.slot.get(SNAPSHOT_KEY)? {
            Some(raw) => Ok(bincode::deserialize(&raw)?),
            None => Ok(Snapshot::default()),
        }
    }

    /// Serialize and persist the full snapshot, overwriting any prior value
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let raw = bincode::serialize(snapshot)?;
        self.slot.insert(SNAPSHOT_KEY, raw)?;
        self.slot.flush()?;
        Ok(())
    }

    /// Wipe the slot and write an empty snapshot. Destructive.
    pub fn migrate(&self) -> Result<()> {
        self.slot.clear()?;
        self.save(&Snapshot::default())?;
        info!("Snapshot slot cleared and reset to empty collections");
        Ok(())
    }

    /// Wipe the slot and populate fixed demonstration data. Destructive.
    pub fn seed(&self) -> Result<Snapshot> {
        self.migrate()?;

        let now = Utc::now();

        let admin = User {
            id: "u-admin".to_string(),
            phone: Some("admin".to_string()),
            company_name: None,
            role: UserRole::Admin,
            is_flagged: false,
            created_at: now,
        };
        let customer = User {
            id: "u-1".to_string(),
            phone: Some("555-0101".to_string()),
            company_name: None,
            role: UserRole::Customer,
            is_flagged: false,
            created_at: now,
        };
        let company = User {
            id: "u-corp".to_string(),
            phone: Some("555-9999".to_string()),
            company_name: Some("Stellar Relocation LLC".to_string()),
            role: UserRole::Company,
            is_flagged: false,
            created_at: now,
        };

        let move1 = Move {
            id: "m-1".to_string(),
            customer_id: customer.id.clone(),
            assigned_company_id: Some(company.id.clone()),
            status: MoveStatus::Packing,
            protection_tier: Some(ProtectionTier::Enhanced),
            protection_price: Some(249.00),
            platform_fee: Some(37.35),
            claim_opened_at: None,
            claim_resolution: None,
            created_at: now - Duration::days(1),
        };

        let photo = PhotoRecord {
            id: "p-1".to_string(),
            original_url: "https://picsum.photos/seed/box1/1200/800".to_string(),
            thumbnail_url: "https://picsum.photos/seed/box1/300/200".to_string(),
            created_at: now,
        };

        let box1 = MoveBox {
            id: "b-1".to_string(),
            move_id: move1.id.clone(),
            name: "Kitchen - Glassware".to_string(),
            photos: vec![photo],
            qr_code: None,
            damage_report: None,
            created_at: now - Duration::hours(12),
        };

        let item1 = Item {
            id: "i-1".to_string(),
            box_id: box1.id.clone(),
            name: "Wine Glasses".to_string(),
            description: "Crystal set of 6".to_string(),
            count_type: CountType::Breakable,
            quantity: 6,
            weight: None,
            photos: Vec::new(),
            damage_report: None,
            created_at: now - Duration::hours(12) + Duration::minutes(2),
        };

        let snapshot = Snapshot {
            users: vec![admin, customer, company],
            moves: vec![move1],
            boxes: vec![box1],
            items: vec![item1],
        };

        self.save(&snapshot)?;
        info!("Seeded demonstration data: admin, customer, company, one active move");
        Ok(snapshot)
    }
}
