use chrono::Utc;
use tempfile::{tempdir, TempDir};

use boxguard::cache::ProjectionCache;
use boxguard::db::Database;
use boxguard::error::BoxguardError;
use boxguard::models::{
    CountType, DamageReport, MoveStatus, NewItem, NewMove, Payer, ResolveClaim, UpdateItem, User,
    UserRole,
};
use boxguard::photos::PlaceholderPhotoStore;
use boxguard::router::Router;

/// Seeded router over tempdir-backed slots, plus the seeded users
fn seeded_router() -> (Router, Database, Vec<User>, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    let db = Database::open(dir.path().join("db")).expect("Failed to open snapshot slot");
    let cache =
        ProjectionCache::open(dir.path().join("cache")).expect("Failed to open projection slot");

    let snapshot = db.seed().expect("Failed to seed");
    let router = Router::new(db.clone(), cache, Box::new(PlaceholderPhotoStore));
    router.warm_cache().expect("Failed to warm cache");

    (router, db, snapshot.users, dir)
}

fn user_by_role(users: &[User], role: UserRole) -> User {
    users
        .iter()
        .find(|u| u.role == role)
        .cloned()
        .expect("seed is missing a role")
}

#[test]
fn test_list_moves_scoped_by_role() {
    let (router, _db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    assert_eq!(router.list_moves(&admin).unwrap().len(), 1);
    assert_eq!(router.list_moves(&customer).unwrap().len(), 1);
    assert_eq!(router.list_moves(&company).unwrap().len(), 1);

    // A stranger customer sees nothing
    let stranger = User {
        id: "u-stranger".to_string(),
        ..customer.clone()
    };
    assert!(router.list_moves(&stranger).unwrap().is_empty());
}

#[test]
fn test_move_detail_access_control() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);

    // Owner succeeds
    let detail = router.get_move_detail("m-1", &customer).unwrap();
    assert_eq!(detail.move_record.id, "m-1");
    assert_eq!(detail.boxes.len(), 1);
    assert_eq!(detail.boxes[0].items.len(), 1);

    // A different customer is denied
    let stranger = User {
        id: "u-stranger".to_string(),
        ..customer.clone()
    };
    let err = router.get_move_detail("m-1", &stranger).unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    // Missing moves are not-found, not denied
    let admin = user_by_role(&users, UserRole::Admin);
    let err = router.get_move_detail("m-missing", &admin).unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
}

#[tokio::test]
async fn test_create_box_requires_ownership() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    // Owner creates a box with two photos
    let photos = vec!["data:a".to_string(), "data:b".to_string()];
    let created = router
        .create_box("m-1", "Living Room - Books", &photos, &customer)
        .await
        .unwrap();
    assert_eq!(created.photos.len(), 2);
    assert!(created.qr_code.is_some());

    // The assigned company still may not write inventory
    let err = router
        .create_box("m-1", "Company Box", &[], &company)
        .await
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    // Non-owner customer is denied
    let stranger = User {
        id: "u-stranger".to_string(),
        ..customer.clone()
    };
    let err = router
        .create_box("m-1", "Sneaky Box", &[], &stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    // Unknown move is not-found
    let admin = user_by_role(&users, UserRole::Admin);
    let err = router
        .create_box("m-missing", "Orphan", &[], &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
}

#[test]
fn test_add_item_applies_defaults() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);

    let item = router
        .add_item("b-1", NewItem::default(), &customer)
        .unwrap();
    assert_eq!(item.name, "Generic Item");
    assert_eq!(item.description, "");
    assert_eq!(item.quantity, 1);
    assert!(item.weight.is_none());

    // Zero quantity is floored to 1 rather than rejected
    let item = router
        .add_item(
            "b-1",
            NewItem {
                quantity: Some(0),
                ..NewItem::default()
            },
            &customer,
        )
        .unwrap();
    assert_eq!(item.quantity, 1);
}

#[test]
fn test_add_item_access_control() {
    let (router, _db, users, _dir) = seeded_router();
    let company = user_by_role(&users, UserRole::Company);
    let customer = user_by_role(&users, UserRole::Customer);

    let err = router
        .add_item("b-1", NewItem::default(), &company)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    let stranger = User {
        id: "u-stranger".to_string(),
        ..customer.clone()
    };
    let err = router
        .add_item("b-1", NewItem::default(), &stranger)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    let err = router
        .add_item("b-missing", NewItem::default(), &customer)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
}

#[test]
fn test_update_item_edits_in_place() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);

    let updated = router
        .update_item(
            "i-1",
            UpdateItem {
                name: Some("Champagne Flutes".to_string()),
                quantity: Some(8),
                ..UpdateItem::default()
            },
            &customer,
        )
        .unwrap();
    assert_eq!(updated.name, "Champagne Flutes");
    assert_eq!(updated.quantity, 8);
    // Absent fields survive the edit
    assert_eq!(updated.description, "Crystal set of 6");
    assert_eq!(updated.count_type, CountType::Breakable);

    // Zero quantity is floored to 1, as on creation
    let updated = router
        .update_item(
            "i-1",
            UpdateItem {
                quantity: Some(0),
                ..UpdateItem::default()
            },
            &customer,
        )
        .unwrap();
    assert_eq!(updated.quantity, 1);

    // The edit lands in the cached detail projection
    let detail = router.get_move_detail("m-1", &customer).unwrap();
    assert_eq!(detail.boxes[0].items[0].name, "Champagne Flutes");
}

#[test]
fn test_update_item_access_control() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    let err = router
        .update_item("i-1", UpdateItem::default(), &company)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    let stranger = User {
        id: "u-stranger".to_string(),
        ..customer.clone()
    };
    let err = router
        .update_item("i-1", UpdateItem::default(), &stranger)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    let err = router
        .update_item("i-missing", UpdateItem::default(), &customer)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
}

#[test]
fn test_update_move_status_assignment_check() {
    let (router, _db, users, _dir) = seeded_router();
    let company = user_by_role(&users, UserRole::Company);
    let customer = user_by_role(&users, UserRole::Customer);

    // Assigned company advances the move along the lifecycle
    let updated = router
        .update_move_status("m-1", MoveStatus::FormGenerated, &company)
        .unwrap();
    assert_eq!(updated.status, MoveStatus::FormGenerated);

    // A company not assigned to the move is denied
    let other_company = User {
        id: "u-corp-other".to_string(),
        ..company.clone()
    };
    let err = router
        .update_move_status("m-1", MoveStatus::SignedCustomer, &other_company)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));

    // Customers may never change status
    let err = router
        .update_move_status("m-1", MoveStatus::SignedCustomer, &customer)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));
}

#[test]
fn test_update_move_status_transition_table() {
    let (router, _db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);

    // Seeded move is packing; jumping straight to completed is rejected
    let err = router
        .update_move_status("m-1", MoveStatus::Completed, &admin)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::InvalidTransition { .. }));

    // Self-transition is a no-op
    let updated = router
        .update_move_status("m-1", MoveStatus::Packing, &admin)
        .unwrap();
    assert_eq!(updated.status, MoveStatus::Packing);

    // Walking the full lifecycle succeeds
    for status in [
        MoveStatus::FormGenerated,
        MoveStatus::SignedCustomer,
        MoveStatus::SignedMover,
        MoveStatus::Completed,
    ] {
        router.update_move_status("m-1", status, &admin).unwrap();
    }
}

#[test]
fn test_claim_lifecycle() {
    let (router, _db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);
    let company = user_by_role(&users, UserRole::Company);

    // Claims cannot be opened mid-packing
    let err = router.open_claim("m-1", &company).unwrap_err();
    assert!(matches!(err, BoxguardError::InvalidTransition { .. }));

    for status in [
        MoveStatus::FormGenerated,
        MoveStatus::SignedCustomer,
        MoveStatus::SignedMover,
    ] {
        router.update_move_status("m-1", status, &admin).unwrap();
    }

    let opened = router.open_claim("m-1", &company).unwrap();
    assert_eq!(opened.status, MoveStatus::Claim);
    assert!(opened.claim_opened_at.is_some());

    let resolved = router
        .resolve_claim(
            "m-1",
            ResolveClaim {
                payout_amount: 450.0,
                payer: Payer::Insurance,
                outcome_notes: "Replaced broken glassware".to_string(),
            },
            &company,
        )
        .unwrap();
    assert_eq!(resolved.status, MoveStatus::ClaimResolved);
    let resolution = resolved.claim_resolution.unwrap();
    assert_eq!(resolution.payout_amount, 450.0);
    assert_eq!(resolution.payer, Payer::Insurance);
    assert_eq!(resolution.duration_days, 0);

    // claim_resolved -> claim_resolved is a self-transition, so a second
    // resolve is accepted and simply overwrites the recorded resolution
    let reresolved = router.resolve_claim(
        "m-1",
        ResolveClaim {
            payout_amount: 1.0,
            payer: Payer::Company,
            outcome_notes: String::new(),
        },
        &company,
    );
    assert!(reresolved.is_ok());
}

#[test]
fn test_create_move_computes_platform_fee() {
    let (router, _db, users, _dir) = seeded_router();
    let company = user_by_role(&users, UserRole::Company);
    let customer = user_by_role(&users, UserRole::Customer);

    let created = router
        .create_move(
            NewMove {
                customer_id: customer.id.clone(),
                assigned_company_id: None,
                protection_tier: None,
                protection_price: Some(200.0),
            },
            &company,
        )
        .unwrap();
    assert_eq!(created.status, MoveStatus::Created);
    // Company requester becomes the assignee by default
    assert_eq!(created.assigned_company_id.as_deref(), Some(company.id.as_str()));
    assert_eq!(created.platform_fee, Some(30.0));

    // Customers may not create moves
    let err = router
        .create_move(
            NewMove {
                customer_id: customer.id.clone(),
                assigned_company_id: None,
                protection_tier: None,
                protection_price: None,
            },
            &customer,
        )
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));
}

#[test]
fn test_upgrade_protection_recomputes_fee() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    let upgraded = router.upgrade_protection("m-1", 300.0, &customer).unwrap();
    assert_eq!(upgraded.protection_price, Some(300.0));
    assert_eq!(upgraded.platform_fee, Some(45.0));

    // Companies may not upgrade the customer's protection
    let err = router.upgrade_protection("m-1", 500.0, &company).unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));
}

#[test]
fn test_attach_damage_reports() {
    let (router, _db, users, _dir) = seeded_router();
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    let report = DamageReport {
        description: "Crushed corner, contents shifted".to_string(),
        photos: Vec::new(),
        created_at: Utc::now(),
    };

    let boxed = router
        .attach_box_damage("b-1", report.clone(), &customer)
        .unwrap();
    assert_eq!(
        boxed.damage_report.as_ref().map(|r| r.description.as_str()),
        Some("Crushed corner, contents shifted")
    );

    let item = router
        .attach_item_damage("i-1", report.clone(), &customer)
        .unwrap();
    assert!(item.damage_report.is_some());

    // Damage reporting follows the inventory-write rule: companies may not
    let err = router
        .attach_box_damage("b-1", report, &company)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::AccessDenied(_)));
}

#[test]
fn test_toggle_user_flag_double_negation() {
    let (router, _db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);
    let customer = user_by_role(&users, UserRole::Customer);

    assert!(!customer.is_flagged);

    let flagged = router.toggle_user_flag(&customer.id, &admin).unwrap();
    assert!(flagged.is_flagged);

    let unflagged = router.toggle_user_flag(&customer.id, &admin).unwrap();
    assert_eq!(unflagged.is_flagged, customer.is_flagged);
}

#[test]
fn test_user_administration_is_admin_only() {
    let (router, _db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);
    let customer = user_by_role(&users, UserRole::Customer);
    let company = user_by_role(&users, UserRole::Company);

    assert_eq!(router.list_users(&admin).unwrap().len(), 3);
    assert!(router.list_users(&customer).is_err());
    assert!(router.list_users(&company).is_err());

    let promoted = router
        .update_user_role(&customer.id, UserRole::Company, &admin)
        .unwrap();
    assert_eq!(promoted.role, UserRole::Company);

    // Unknown user ids are not-found rather than silently ignored
    let err = router
        .update_user_role("u-missing", UserRole::Admin, &admin)
        .unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
    let err = router.toggle_user_flag("u-missing", &admin).unwrap_err();
    assert!(matches!(err, BoxguardError::NotFound(_)));
}

#[tokio::test]
async fn test_cache_matches_direct_filtering_after_mutations() {
    let (router, db, users, _dir) = seeded_router();
    let admin = user_by_role(&users, UserRole::Admin);
    let customer = user_by_role(&users, UserRole::Customer);

    // A burst of mutations through the router
    let new_box = router
        .create_box("m-1", "Garage - Tools", &["data:x".to_string()], &customer)
        .await
        .unwrap();
    for name in ["Drill", "Hammer", "Socket Set"] {
        router
            .add_item(
                &new_box.id,
                NewItem {
                    name: Some(name.to_string()),
                    ..NewItem::default()
                },
                &customer,
            )
            .unwrap();
    }
    router
        .update_move_status("m-1", MoveStatus::FormGenerated, &admin)
        .unwrap();

    // The cached detail projection must equal direct parent-id filtering
    let detail = router.get_move_detail("m-1", &admin).unwrap();
    let snapshot = db.get().unwrap();

    let expected_boxes: Vec<_> = snapshot.boxes.iter().filter(|b| b.move_id == "m-1").collect();
    assert_eq!(detail.boxes.len(), expected_boxes.len());
    for (cached, expected) in detail.boxes.iter().zip(expected_boxes) {
        assert_eq!(&cached.box_record, expected);
        let expected_items: Vec<_> = snapshot
            .items
            .iter()
            .filter(|i| i.box_id == expected.id)
            .cloned()
            .collect();
        assert_eq!(cached.items, expected_items);
    }
    assert_eq!(detail.move_record.status, MoveStatus::FormGenerated);

    // Dashboard counts track the snapshot
    let summary = router.get_dashboard(&admin).unwrap();
    assert_eq!(summary.total_moves, snapshot.moves.len());
    assert_eq!(summary.active_boxes, snapshot.boxes.len());
    assert_eq!(summary.unverified_items, snapshot.items.len());
}
