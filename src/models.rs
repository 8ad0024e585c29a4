//! Data models for the moving-inventory domain
//!
//! This module contains all data structures used throughout the application:
//! users, moves, boxes, items, photo records, claim resolutions, the
//! persisted snapshot, and the denormalized cache projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal role assigned to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// End customer documenting their own move
    Customer,
    /// Moving company assigned to moves
    Company,
    /// Platform administrator
    Admin,
}

impl UserRole {
    /// Wire value for this role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "company" => Ok(Self::Company),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Lifecycle status of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// Engagement created, nothing packed yet
    Created,
    /// Customer is documenting boxes and items
    Packing,
    /// Liability document generated
    FormGenerated,
    /// Customer has signed the liability document
    SignedCustomer,
    /// Mover has counter-signed
    SignedMover,
    /// Damage claim opened against the move
    Claim,
    /// Claim resolved with a payout record
    ClaimResolved,
    /// Move finished
    Completed,
}

impl MoveStatus {
    /// Wire value for this status
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Packing => "packing",
            Self::FormGenerated => "form_generated",
            Self::SignedCustomer => "signed_customer",
            Self::SignedMover => "signed_mover",
            Self::Claim => "claim",
            Self::ClaimResolved => "claim_resolved",
            Self::Completed => "completed",
        }
    }

    /// Whether `next` is a legal successor of this status.
    ///
    /// The move lifecycle is an explicit graph rather than a free-for-all:
    /// created -> packing -> form_generated -> signed_customer ->
    /// signed_mover -> completed, with the claim path branching off
    /// signed_mover or completed. A self-transition is accepted as a no-op.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Created, Self::Packing)
                | (Self::Packing, Self::FormGenerated)
                | (Self::FormGenerated, Self::SignedCustomer)
                | (Self::SignedCustomer, Self::SignedMover)
                | (Self::SignedMover, Self::Completed)
                | (Self::SignedMover, Self::Claim)
                | (Self::Completed, Self::Claim)
                | (Self::Claim, Self::ClaimResolved)
                | (Self::ClaimResolved, Self::Completed)
        )
    }
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "packing" => Ok(Self::Packing),
            "form_generated" => Ok(Self::FormGenerated),
            "signed_customer" => Ok(Self::SignedCustomer),
            "signed_mover" => Ok(Self::SignedMover),
            "claim" => Ok(Self::Claim),
            "claim_resolved" => Ok(Self::ClaimResolved),
            "completed" => Ok(Self::Completed),
            other => Err(format!("Unknown move status: {other}")),
        }
    }
}

/// Declared precision for an item's quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountType {
    /// Individually counted valuables (TVs, laptops, artwork)
    #[serde(rename = "exact")]
    Exact,
    /// Fragile items where an approximate count is acceptable
    #[serde(rename = "broken")]
    Breakable,
    /// Bulk items (utensils, books, toys) counted approximately
    #[serde(rename = "other")]
    Misc,
}

impl CountType {
    /// Wire value for this count classification
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Breakable => "broken",
            Self::Misc => "other",
        }
    }
}

impl fmt::Display for CountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "broken" | "breakable" => Ok(Self::Breakable),
            "other" | "misc" => Ok(Self::Misc),
            other => Err(format!("Unknown count type: {other}")),
        }
    }
}

/// Liability protection tier purchased for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionTier {
    /// Base coverage
    Standard,
    /// Upgraded coverage
    Enhanced,
}

/// Who pays out a resolved claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payer {
    /// Third-party insurer
    Insurance,
    /// The moving company itself
    Company,
}

/// A registered user (customer, company, or admin)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Phone number used as the login identifier
    pub phone: Option<String>,
    /// Company display name (company accounts only)
    pub company_name: Option<String>,
    /// Portal role
    pub role: UserRole,
    /// Flagged for admin review
    #[serde(default)]
    pub is_flagged: bool,
    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

/// Payout record attached to a move with a resolved claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResolution {
    /// Payout amount in dollars
    pub payout_amount: f64,
    /// Which party funded the payout
    pub payer: Payer,
    /// When the claim was resolved
    pub resolution_date: DateTime<Utc>,
    /// Free-text outcome narrative
    pub outcome_notes: String,
    /// Days from claim open to resolution
    pub duration_days: i64,
}

/// A relocation engagement between a customer and a moving company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Unique identifier
    pub id: String,
    /// Owning customer
    pub customer_id: String,
    /// Assigned moving company, if any
    pub assigned_company_id: Option<String>,
    /// Lifecycle status
    pub status: MoveStatus,
    /// Liability protection tier
    pub protection_tier: Option<ProtectionTier>,
    /// Price paid for protection
    pub protection_price: Option<f64>,
    /// Platform's cut of the protection price
    pub platform_fee: Option<f64>,
    /// When a damage claim was opened, if any
    pub claim_opened_at: Option<DateTime<Utc>>,
    /// Resolution record for a settled claim
    pub claim_resolution: Option<ClaimResolution>,
    /// Timestamp when the move was created
    pub created_at: DateTime<Utc>,
}

/// Uploaded photo reference pair returned by the photo service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Unique identifier
    pub id: String,
    /// Full-size image reference
    pub original_url: String,
    /// Thumbnail image reference
    pub thumbnail_url: String,
    /// Capture/upload timestamp
    pub created_at: DateTime<Utc>,
}

/// Free-text damage report attachable to a box or an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Description of the damage
    pub description: String,
    /// Supporting photos
    pub photos: Vec<PhotoRecord>,
    /// Timestamp when the report was filed
    pub created_at: DateTime<Utc>,
}

/// A physical container documented with photos, belonging to one move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveBox {
    /// Unique identifier
    pub id: String,
    /// Owning move
    pub move_id: String,
    /// Display name ("Kitchen - Glassware")
    pub name: String,
    /// Ordered photo records
    pub photos: Vec<PhotoRecord>,
    /// Encoded QR payload for the printed label
    pub qr_code: Option<String>,
    /// Damage report, if filed
    pub damage_report: Option<DamageReport>,
    /// Timestamp when the box was created
    pub created_at: DateTime<Utc>,
}

/// An individual cataloged object within a box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: String,
    /// Owning box
    pub box_id: String,
    /// Item name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Declared count precision
    pub count_type: CountType,
    /// Quantity (always at least 1)
    pub quantity: u32,
    /// Weight in pounds, if declared
    pub weight: Option<f64>,
    /// Ordered photo records
    pub photos: Vec<PhotoRecord>,
    /// Damage report, if filed
    pub damage_report: Option<DamageReport>,
    /// Timestamp when the item was logged
    pub created_at: DateTime<Utc>,
}

/// The canonical collections, persisted wholesale on every mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All registered users
    pub users: Vec<User>,
    /// All moves
    pub moves: Vec<Move>,
    /// All boxes
    pub boxes: Vec<MoveBox>,
    /// All items
    pub items: Vec<Item>,
}

/// Dashboard aggregate counts projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Total number of moves
    pub total_moves: usize,
    /// Total number of boxes
    pub active_boxes: usize,
    /// Total number of items
    pub unverified_items: usize,
    /// Users flagged for review
    pub flagged_users: usize,
    /// When the projection was generated
    pub last_updated: DateTime<Utc>,
}

impl DashboardSummary {
    /// Zeroed summary for a cold cache
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_moves: 0,
            active_boxes: 0,
            unverified_items: 0,
            flagged_users: 0,
            last_updated: Utc::now(),
        }
    }
}

/// A box with its items embedded (denormalized projection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDetail {
    /// The box record
    #[serde(flatten)]
    pub box_record: MoveBox,
    /// Items belonging to this box, in insertion order
    pub items: Vec<Item>,
}

/// A move with its boxes and their items embedded (denormalized projection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDetail {
    /// The move record
    #[serde(flatten)]
    pub move_record: Move,
    /// Boxes belonging to this move, in insertion order
    pub boxes: Vec<BoxDetail>,
}

/// Data for creating a new move
#[derive(Debug, Clone)]
pub struct NewMove {
    /// Owning customer
    pub customer_id: String,
    /// Assigned moving company
    pub assigned_company_id: Option<String>,
    /// Protection tier, if purchased up front
    pub protection_tier: Option<ProtectionTier>,
    /// Protection price; the platform fee is derived from it
    pub protection_price: Option<f64>,
}

/// Data for logging a new item; absent fields fall back to safe defaults
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Item name (defaults to "Generic Item")
    pub name: Option<String>,
    /// Free-text description (defaults to empty)
    pub description: Option<String>,
    /// Count precision (defaults to exact)
    pub count_type: Option<CountType>,
    /// Quantity (defaults to 1, floored at 1)
    pub quantity: Option<u32>,
    /// Weight in pounds
    pub weight: Option<f64>,
}

/// Data for editing an existing item; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    /// New item name
    pub name: Option<String>,
    /// New free-text description
    pub description: Option<String>,
    /// New count precision
    pub count_type: Option<CountType>,
    /// New quantity (floored at 1)
    pub quantity: Option<u32>,
    /// New weight in pounds
    pub weight: Option<f64>,
}

/// Payload for resolving an open claim
#[derive(Debug, Clone)]
pub struct ResolveClaim {
    /// Payout amount in dollars
    pub payout_amount: f64,
    /// Which party funds the payout
    pub payer: Payer,
    /// Free-text outcome narrative
    pub outcome_notes: String,
}
