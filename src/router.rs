//! The mock backend gateway: the only path to the canonical store.
//!
//! Every operation takes the requesting user last, runs the relevant
//! [`crate::policy`] predicate, mutates the snapshot, persists it, and
//! regenerates the projection cache before returning. Reads are served
//! from the cache where a projection exists.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::cache::ProjectionCache;
use crate::db::Database;
use crate::error::{BoxguardError, Result};
use crate::models::{
    ClaimResolution, CountType, DamageReport, DashboardSummary, Item, Move, MoveBox, MoveDetail,
    MoveStatus, NewItem, NewMove, ProtectionTier, ResolveClaim, Snapshot, UpdateItem, User,
    UserRole,
};
use crate::photos::PhotoStore;
use crate::policy;

/// Platform's cut of the protection price
pub const PLATFORM_CUT_PERCENT: f64 = 0.15;

/// Encode the QR payload for a printed box label.
///
/// A placeholder for real cryptographic signing. The payload is the fixed
/// prefix plus a slice of the box id, base64-encoded without padding.
#[must_use]
pub fn qr_payload(box_id: &str) -> String {
    let short = box_id.get(..8).unwrap_or(box_id);
    STANDARD_NO_PAD.encode(format!("SECURE-BOX-{short}"))
}

/// Role-checked gateway over the store, cache, and photo port
pub struct Router {
    db: Database,
    cache: ProjectionCache,
    photos: Box<dyn PhotoStore>,
}

impl Router {
    /// Assemble the gateway from its collaborators
    #[must_use]
    pub fn new(db: Database, cache: ProjectionCache, photos: Box<dyn PhotoStore>) -> Self {
        Self { db, cache, photos }
    }

    /// Regenerate all projections from the current snapshot. Call after
    /// seeding or when the cache slot may be stale.
    pub fn warm_cache(&self) -> Result<()> {
        let snapshot = self.db.get()?;
        self.cache.generate_all(&snapshot)
    }

    /// Dashboard aggregate counts; zeroed defaults when the cache is cold
    pub fn get_dashboard(&self, _requester: &User) -> Result<DashboardSummary> {
        Ok(self.cache.read_summary()?.unwrap_or_else(DashboardSummary::empty))
    }

    /// Moves visible to the requester: own for customers, assigned for
    /// companies, all for admins.
    pub fn list_moves(&self, requester: &User) -> Result<Vec<Move>> {
        let all = self.cache.read_moves()?.unwrap_or_default();
        Ok(all
            .into_iter()
            .filter(|m| policy::can_view_move(requester, m))
            .collect())
    }

    /// Denormalized move detail from the cache
    pub fn get_move_detail(&self, move_id: &str, requester: &User) -> Result<MoveDetail> {
        let detail = self
            .cache
            .read_move_detail(move_id)?
            .ok_or_else(|| BoxguardError::NotFound(format!("Move {move_id} not in cache")))?;

        if !policy::can_view_move(requester, &detail.move_record) {
            return Err(BoxguardError::AccessDenied(
                "Requester may not view this move".to_string(),
            ));
        }
        Ok(detail)
    }

    /// Create a new move; company and admin only
    #[instrument(skip(self, payload, requester), fields(requester = %requester.id))]
    pub fn create_move(&self, payload: NewMove, requester: &User) -> Result<Move> {
        if !policy::can_create_move(requester) {
            return Err(BoxguardError::AccessDenied(
                "Only companies and admins may create moves".to_string(),
            ));
        }

        let assigned_company_id = payload.assigned_company_id.or_else(|| {
            (requester.role == UserRole::Company).then(|| requester.id.clone())
        });

        let new_move = Move {
            id: Uuid::new_v4().to_string(),
            customer_id: payload.customer_id,
            assigned_company_id,
            status: MoveStatus::Created,
            protection_tier: payload.protection_tier,
            protection_price: payload.protection_price,
            platform_fee: payload.protection_price.map(|p| p * PLATFORM_CUT_PERCENT),
            claim_opened_at: None,
            claim_resolution: None,
            created_at: Utc::now(),
        };

        let mut snapshot = self.db.get()?;
        snapshot.moves.push(new_move.clone());
        self.persist(&snapshot)?;
        info!(move_id = %new_move.id, "Move created");
        Ok(new_move)
    }

    /// Create a box on a move, uploading each supplied photo payload
    #[instrument(skip(self, photos, requester), fields(requester = %requester.id))]
    pub async fn create_box(
        &self,
        move_id: &str,
        name: &str,
        photos: &[String],
        requester: &User,
    ) -> Result<MoveBox> {
        let mut snapshot = self.db.get()?;
        let move_record = find_move(&snapshot, move_id)?.clone();

        if !policy::can_write_inventory(requester, &move_record) {
            return Err(BoxguardError::AccessDenied(
                "Write access to this move's inventory denied".to_string(),
            ));
        }

        let mut uploaded = Vec::with_capacity(photos.len());
        for payload in photos {
            uploaded.push(self.photos.upload(payload).await?);
        }

        let box_id = Uuid::new_v4().to_string();
        let new_box = MoveBox {
            qr_code: Some(qr_payload(&box_id)),
            id: box_id,
            move_id: move_id.to_string(),
            name: name.to_string(),
            photos: uploaded,
            damage_report: None,
            created_at: Utc::now(),
        };

        snapshot.boxes.push(new_box.clone());
        self.persist(&snapshot)?;
        info!(box_id = %new_box.id, move_id, "Box created");
        Ok(new_box)
    }

    /// Log an item in a box; absent fields fall back to safe defaults
    #[instrument(skip(self, data, requester), fields(requester = %requester.id))]
    pub fn add_item(&self, box_id: &str, data: NewItem, requester: &User) -> Result<Item> {
        let mut snapshot = self.db.get()?;
        let parent_move_id = find_box(&snapshot, box_id)?.move_id.clone();
        let move_record = find_move(&snapshot, &parent_move_id)?.clone();

        if !policy::can_write_inventory(requester, &move_record) {
            return Err(BoxguardError::AccessDenied(
                "Write access to this move's inventory denied".to_string(),
            ));
        }

        let new_item = Item {
            id: Uuid::new_v4().to_string(),
            box_id: box_id.to_string(),
            name: data.name.unwrap_or_else(|| "Generic Item".to_string()),
            description: data.description.unwrap_or_default(),
            count_type: data.count_type.unwrap_or(CountType::Exact),
            quantity: data.quantity.unwrap_or(1).max(1),
            weight: data.weight,
            photos: Vec::new(),
            damage_report: None,
            created_at: Utc::now(),
        };

        snapshot.items.push(new_item.clone());
        self.persist(&snapshot)?;
        info!(item_id = %new_item.id, box_id, "Item logged");
        Ok(new_item)
    }

    /// Edit an existing item in place; absent fields are left unchanged
    #[instrument(skip(self, data, requester), fields(requester = %requester.id))]
    pub fn update_item(&self, item_id: &str, data: UpdateItem, requester: &User) -> Result<Item> {
        let mut snapshot = self.db.get()?;
        let box_id = find_item(&snapshot, item_id)?.box_id.clone();
        let parent_move_id = find_box(&snapshot, &box_id)?.move_id.clone();
        let move_record = find_move(&snapshot, &parent_move_id)?.clone();

        if !policy::can_write_inventory(requester, &move_record) {
            return Err(BoxguardError::AccessDenied(
                "Write access to this move's inventory denied".to_string(),
            ));
        }

        let item_record = find_item_mut(&mut snapshot, item_id)?;
        if let Some(name) = data.name {
            item_record.name = name;
        }
        if let Some(description) = data.description {
            item_record.description = description;
        }
        if let Some(count_type) = data.count_type {
            item_record.count_type = count_type;
        }
        if let Some(quantity) = data.quantity {
            item_record.quantity = quantity.max(1);
        }
        if let Some(weight) = data.weight {
            item_record.weight = Some(weight);
        }

        let updated = item_record.clone();
        self.persist(&snapshot)?;
        info!(item_id, "Item updated");
        Ok(updated)
    }

    /// Change a move's status along the transition table
    #[instrument(skip(self, requester), fields(requester = %requester.id))]
    pub fn update_move_status(
        &self,
        move_id: &str,
        status: MoveStatus,
        requester: &User,
    ) -> Result<Move> {
        let mut snapshot = self.db.get()?;
        let move_record = find_move_mut(&mut snapshot, move_id)?;

        if !policy::can_update_status(requester, move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to update move status".to_string(),
            ));
        }
        if !move_record.status.can_transition_to(status) {
            return Err(BoxguardError::InvalidTransition {
                from: move_record.status.to_string(),
                to: status.to_string(),
            });
        }

        move_record.status = status;
        let updated = move_record.clone();
        self.persist(&snapshot)?;
        info!(move_id, status = %updated.status, "Move status updated");
        Ok(updated)
    }

    /// Open a damage claim against a move
    #[instrument(skip(self, requester), fields(requester = %requester.id))]
    pub fn open_claim(&self, move_id: &str, requester: &User) -> Result<Move> {
        let mut snapshot = self.db.get()?;
        let move_record = find_move_mut(&mut snapshot, move_id)?;

        if !policy::can_update_status(requester, move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to open a claim on this move".to_string(),
            ));
        }
        if !move_record.status.can_transition_to(MoveStatus::Claim) {
            return Err(BoxguardError::InvalidTransition {
                from: move_record.status.to_string(),
                to: MoveStatus::Claim.to_string(),
            });
        }

        move_record.status = MoveStatus::Claim;
        move_record.claim_opened_at = Some(Utc::now());
        let updated = move_record.clone();
        self.persist(&snapshot)?;
        info!(move_id, "Claim opened");
        Ok(updated)
    }

    /// Resolve an open claim with a payout record. The duration is derived
    /// from the claim-open timestamp when one was recorded.
    #[instrument(skip(self, payload, requester), fields(requester = %requester.id))]
    pub fn resolve_claim(
        &self,
        move_id: &str,
        payload: ResolveClaim,
        requester: &User,
    ) -> Result<Move> {
        let mut snapshot = self.db.get()?;
        let move_record = find_move_mut(&mut snapshot, move_id)?;

        if !policy::can_update_status(requester, move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to resolve this move's claim".to_string(),
            ));
        }
        if !move_record
            .status
            .can_transition_to(MoveStatus::ClaimResolved)
        {
            return Err(BoxguardError::InvalidTransition {
                from: move_record.status.to_string(),
                to: MoveStatus::ClaimResolved.to_string(),
            });
        }

        let resolution_date = Utc::now();
        let duration_days = move_record
            .claim_opened_at
            .map_or(0, |opened| (resolution_date - opened).num_days());

        move_record.status = MoveStatus::ClaimResolved;
        move_record.claim_resolution = Some(ClaimResolution {
            payout_amount: payload.payout_amount,
            payer: payload.payer,
            resolution_date,
            outcome_notes: payload.outcome_notes,
            duration_days,
        });
        let updated = move_record.clone();
        self.persist(&snapshot)?;
        info!(move_id, "Claim resolved");
        Ok(updated)
    }

    /// Upgrade a move to enhanced protection at the given price
    #[instrument(skip(self, requester), fields(requester = %requester.id))]
    pub fn upgrade_protection(&self, move_id: &str, price: f64, requester: &User) -> Result<Move> {
        if price <= 0.0 {
            return Err(BoxguardError::Validation(
                "Protection price must be positive".to_string(),
            ));
        }

        let mut snapshot = self.db.get()?;
        let move_record = find_move_mut(&mut snapshot, move_id)?;

        if !policy::can_upgrade_protection(requester, move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to upgrade this move's protection".to_string(),
            ));
        }

        move_record.protection_tier = Some(ProtectionTier::Enhanced);
        move_record.protection_price = Some(price);
        move_record.platform_fee = Some(price * PLATFORM_CUT_PERCENT);
        let updated = move_record.clone();
        self.persist(&snapshot)?;
        info!(move_id, price, "Protection tier upgraded");
        Ok(updated)
    }

    /// Attach a damage report to a box
    pub fn attach_box_damage(
        &self,
        box_id: &str,
        report: DamageReport,
        requester: &User,
    ) -> Result<MoveBox> {
        let mut snapshot = self.db.get()?;
        let parent_move_id = find_box(&snapshot, box_id)?.move_id.clone();
        let move_record = find_move(&snapshot, &parent_move_id)?.clone();

        if !policy::can_write_inventory(requester, &move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to report damage on this move".to_string(),
            ));
        }

        let box_record = find_box_mut(&mut snapshot, box_id)?;
        box_record.damage_report = Some(report);
        let updated = box_record.clone();
        self.persist(&snapshot)?;
        Ok(updated)
    }

    /// Attach a damage report to an item
    pub fn attach_item_damage(
        &self,
        item_id: &str,
        report: DamageReport,
        requester: &User,
    ) -> Result<Item> {
        let mut snapshot = self.db.get()?;
        let box_id = find_item(&snapshot, item_id)?.box_id.clone();
        let parent_move_id = find_box(&snapshot, &box_id)?.move_id.clone();
        let move_record = find_move(&snapshot, &parent_move_id)?.clone();

        if !policy::can_write_inventory(requester, &move_record) {
            return Err(BoxguardError::AccessDenied(
                "Permission denied to report damage on this move".to_string(),
            ));
        }

        let item_record = find_item_mut(&mut snapshot, item_id)?;
        item_record.damage_report = Some(report);
        let updated = item_record.clone();
        self.persist(&snapshot)?;
        Ok(updated)
    }

    /// List all user accounts; admin only
    pub fn list_users(&self, requester: &User) -> Result<Vec<User>> {
        if !policy::can_manage_users(requester) {
            return Err(BoxguardError::AccessDenied(
                "User administration requires the admin role".to_string(),
            ));
        }
        Ok(self.db.get()?.users)
    }

    /// Change a user's role; admin only
    #[instrument(skip(self, requester), fields(requester = %requester.id))]
    pub fn update_user_role(
        &self,
        user_id: &str,
        new_role: UserRole,
        requester: &User,
    ) -> Result<User> {
        if !policy::can_manage_users(requester) {
            return Err(BoxguardError::AccessDenied(
                "User administration requires the admin role".to_string(),
            ));
        }

        let mut snapshot = self.db.get()?;
        let user = find_user_mut(&mut snapshot, user_id)?;
        user.role = new_role;
        let updated = user.clone();
        self.persist(&snapshot)?;
        info!(user_id, role = %updated.role, "User role updated");
        Ok(updated)
    }

    /// Toggle a user's review flag; admin only. Idempotent under
    /// double-negation.
    #[instrument(skip(self, requester), fields(requester = %requester.id))]
    pub fn toggle_user_flag(&self, user_id: &str, requester: &User) -> Result<User> {
        if !policy::can_manage_users(requester) {
            return Err(BoxguardError::AccessDenied(
                "User administration requires the admin role".to_string(),
            ));
        }

        let mut snapshot = self.db.get()?;
        let user = find_user_mut(&mut snapshot, user_id)?;
        user.is_flagged = !user.is_flagged;
        let updated = user.clone();
        self.persist(&snapshot)?;
        Ok(updated)
    }

    /// Persist the snapshot, then rebuild every projection from it
    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        self.db.save(snapshot)?;
        self.cache.generate_all(snapshot)
    }
}

fn find_move<'a>(snapshot: &'a Snapshot, move_id: &str) -> Result<&'a Move> {
    snapshot
        .moves
        .iter()
        .find(|m| m.id == move_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Move {move_id}")))
}

fn find_move_mut<'a>(snapshot: &'a mut Snapshot, move_id: &str) -> Result<&'a mut Move> {
    snapshot
        .moves
        .iter_mut()
        .find(|m| m.id == move_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Move {move_id}")))
}

fn find_box<'a>(snapshot: &'a Snapshot, box_id: &str) -> Result<&'a MoveBox> {
    snapshot
        .boxes
        .iter()
        .find(|b| b.id == box_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Box {box_id}")))
}

fn find_box_mut<'a>(snapshot: &'a mut Snapshot, box_id: &str) -> Result<&'a mut MoveBox> {
    snapshot
        .boxes
        .iter_mut()
        .find(|b| b.id == box_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Box {box_id}")))
}

fn find_item<'a>(snapshot: &'a Snapshot, item_id: &str) -> Result<&'a Item> {
    snapshot
        .items
        .iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Item {item_id}")))
}

fn find_item_mut<'a>(snapshot: &'a mut Snapshot, item_id: &str) -> Result<&'a mut Item> {
    snapshot
        .items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("Item {item_id}")))
}

fn find_user_mut<'a>(snapshot: &'a mut Snapshot, user_id: &str) -> Result<&'a mut User> {
    snapshot
        .users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| BoxguardError::NotFound(format!("User {user_id}")))
}
