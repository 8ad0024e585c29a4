//! Authorization policy: one pure predicate per operation, taking the
//! requester and the target resource.
//!
//! Keeping the matrix in standalone functions makes it testable without a
//! store behind it. Role checks here are deliberately simple equality and
//! ownership tests; there is no token or session model in this system.

use crate::models::{Move, User, UserRole};

/// Whether the requester may see this move in a listing or detail view
#[must_use]
pub fn can_view_move(requester: &User, move_record: &Move) -> bool {
    match requester.role {
        UserRole::Admin => true,
        UserRole::Customer => move_record.customer_id == requester.id,
        UserRole::Company => move_record.assigned_company_id.as_deref() == Some(&requester.id),
    }
}

/// Whether the requester may create boxes or log items on this move
#[must_use]
pub fn can_write_inventory(requester: &User, move_record: &Move) -> bool {
    match requester.role {
        UserRole::Admin => true,
        UserRole::Customer => move_record.customer_id == requester.id,
        UserRole::Company => false,
    }
}

/// Whether the requester may create a new move
#[must_use]
pub fn can_create_move(requester: &User) -> bool {
    matches!(requester.role, UserRole::Company | UserRole::Admin)
}

/// Whether the requester may change this move's status or work its claim
#[must_use]
pub fn can_update_status(requester: &User, move_record: &Move) -> bool {
    match requester.role {
        UserRole::Admin => true,
        UserRole::Company => move_record.assigned_company_id.as_deref() == Some(&requester.id),
        UserRole::Customer => false,
    }
}

/// Whether the requester may upgrade this move's protection tier
#[must_use]
pub fn can_upgrade_protection(requester: &User, move_record: &Move) -> bool {
    match requester.role {
        UserRole::Admin => true,
        UserRole::Customer => move_record.customer_id == requester.id,
        UserRole::Company => false,
    }
}

/// Whether the requester may list or modify user accounts
#[must_use]
pub fn can_manage_users(requester: &User) -> bool {
    requester.role == UserRole::Admin
}
