//! Settlement protocol integration tests: oversell, idempotent replay,
//! rollback, and crash resume.

use std::collections::BTreeSet;
use std::sync::Barrier;

use coursemarket::{
    CartStore, Course, EnrollmentStore, InMemoryModelStore, InventoryLedger, ModelsExt,
    PaymentLedger, PaymentStatus, SettlementError, SettlementOrchestrator,
};

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed_course(store: &InMemoryModelStore, id: &str, capacity: u32) {
    store
        .docs::<Course>()
        .save(&Course::open(id, "inst-1", 1000, capacity))
        .unwrap();
}

fn seats(store: &InMemoryModelStore, id: &str) -> (u32, u32) {
    let course = store.docs::<Course>().get(id).unwrap().unwrap().data;
    (course.seats_available, course.enrolled_count)
}

#[test]
fn settlement_moves_cart_to_enrollment() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 5);

    let cart = CartStore::new(&store);
    cart.add("acct-1", "c10").unwrap();

    let orchestrator = SettlementOrchestrator::new(&store);
    let receipt = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10"]), 1000)
        .unwrap();

    assert!(!receipt.replayed);
    assert_eq!(receipt.courses.len(), 1);
    assert_eq!(receipt.courses[0].seats_available, 4);
    assert_eq!(receipt.courses[0].enrolled_count, 1);

    // Settled ids leave the cart and land in the enrollment set, never both.
    assert!(cart.get("acct-1").unwrap().is_empty());
    let enrollment = EnrollmentStore::new(&store);
    assert_eq!(enrollment.get("acct-1").unwrap(), ids(&["c10"]));

    let payment = PaymentLedger::new(&store).get("ch_1").unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Applied);
}

#[test]
fn replay_with_same_charge_ref_changes_nothing() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 5);

    let orchestrator = SettlementOrchestrator::new(&store);
    let first = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10"]), 1000)
        .unwrap();
    let second = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10"]), 1000)
        .unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(seats(&store, "c10"), (4, 1));
    assert_eq!(
        EnrollmentStore::new(&store).get("acct-1").unwrap().len(),
        1
    );
}

#[test]
fn oversold_rolls_back_granted_reservations() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 1);
    seed_course(&store, "c11", 0);

    let cart = CartStore::new(&store);
    cart.add("acct-1", "c10").unwrap();
    cart.add("acct-1", "c11").unwrap();

    let orchestrator = SettlementOrchestrator::new(&store);
    let err = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10", "c11"]), 2000)
        .unwrap_err();

    assert_eq!(
        err,
        SettlementError::Oversold {
            course_ids: vec!["c11".to_string()]
        }
    );

    // Inventory is back to pre-call values; nothing enrolled, cart intact.
    assert_eq!(seats(&store, "c10"), (1, 0));
    assert_eq!(seats(&store, "c11"), (0, 0));
    assert!(EnrollmentStore::new(&store).get("acct-1").unwrap().is_empty());
    assert_eq!(cart.get("acct-1").unwrap(), ids(&["c10", "c11"]));

    // The record stays at recorded with no reservations held, ready for
    // a retry with a reduced course set under a fresh charge.
    let payment = PaymentLedger::new(&store).get("ch_1").unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Recorded);
    assert!(payment.reserved.is_empty());
}

#[test]
fn oversold_names_every_full_course() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 0);
    seed_course(&store, "c11", 0);
    seed_course(&store, "c12", 3);

    let orchestrator = SettlementOrchestrator::new(&store);
    let err = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10", "c11", "c12"]), 3000)
        .unwrap_err();

    match err {
        SettlementError::Oversold { course_ids } => {
            assert_eq!(course_ids, vec!["c10".to_string(), "c11".to_string()]);
        }
        other => panic!("expected Oversold, got {other:?}"),
    }
    assert_eq!(seats(&store, "c12"), (3, 0));
}

#[test]
fn unknown_course_rolls_back_granted_reservations() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 5);

    let orchestrator = SettlementOrchestrator::new(&store);
    let err = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10", "ghost"]), 2000)
        .unwrap_err();

    assert_eq!(err, SettlementError::UnknownCourse("ghost".to_string()));
    assert_eq!(seats(&store, "c10"), (5, 0));
}

#[test]
fn empty_course_set_is_rejected() {
    let store = InMemoryModelStore::new();
    let orchestrator = SettlementOrchestrator::new(&store);
    let err = orchestrator
        .settle("ch_1", "acct-1", &BTreeSet::new(), 0)
        .unwrap_err();
    assert_eq!(err, SettlementError::EmptyCourseSet);
}

#[test]
fn charge_ref_reuse_with_different_args_is_a_conflict() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 5);
    seed_course(&store, "c11", 5);

    let orchestrator = SettlementOrchestrator::new(&store);
    orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10"]), 1000)
        .unwrap();

    let err = orchestrator
        .settle("ch_1", "acct-1", &ids(&["c11"]), 1000)
        .unwrap_err();
    assert!(matches!(err, SettlementError::ChargeRefMismatch { .. }));
}

#[test]
fn capacity_one_exactly_one_of_two_racing_settles_wins() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 1);

    let barrier = Barrier::new(2);
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["ch_a", "ch_b"]
            .iter()
            .enumerate()
            .map(|(i, charge_ref)| {
                let store = &store;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let orchestrator = SettlementOrchestrator::new(store);
                    let account = format!("acct-{i}");
                    orchestrator.settle(charge_ref, &account, &ids(&["c10"]), 1000)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    let losses: Vec<_> = results.into_iter().filter_map(|r| r.err()).collect();
    assert_eq!(losses.len(), 1);
    assert_eq!(
        losses[0],
        SettlementError::Oversold {
            course_ids: vec!["c10".to_string()]
        }
    );
    assert_eq!(seats(&store, "c10"), (0, 1));
}

#[test]
fn concurrent_settles_never_exceed_capacity() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 3);

    let barrier = Barrier::new(8);
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = &store;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let orchestrator = SettlementOrchestrator::new(store);
                    let charge_ref = format!("ch_{i}");
                    let account = format!("acct-{i}");
                    orchestrator.settle(&charge_ref, &account, &ids(&["c10"]), 1000)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 3);
    assert_eq!(seats(&store, "c10"), (0, 3));
}

#[test]
fn resume_after_partial_attempt_reserves_only_remaining_courses() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 4);
    seed_course(&store, "c11", 4);

    // A prior attempt recorded the payment, reserved c10's seat, and
    // crashed before reaching c11.
    let payments = PaymentLedger::new(&store);
    payments
        .record_if_absent("abc", "acct-1", &ids(&["c10", "c11"]), 2000)
        .unwrap();
    let inventory = InventoryLedger::new(&store);
    assert!(inventory.try_reserve("c10", 1).unwrap());
    payments.mark_reserved("abc", "c10").unwrap();

    // Retrying with the same charge_ref finishes the job.
    let orchestrator = SettlementOrchestrator::new(&store);
    let receipt = orchestrator
        .settle("abc", "acct-1", &ids(&["c10", "c11"]), 2000)
        .unwrap();
    assert!(!receipt.replayed);

    // c10 was not reserved a second time.
    assert_eq!(seats(&store, "c10"), (3, 1));
    assert_eq!(seats(&store, "c11"), (3, 1));

    let payment = payments.get("abc").unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Applied);
    assert_eq!(
        EnrollmentStore::new(&store).get("acct-1").unwrap(),
        ids(&["c10", "c11"])
    );
}

#[test]
fn already_enrolled_course_is_not_reserved_again() {
    let store = InMemoryModelStore::new();
    seed_course(&store, "c10", 4);
    seed_course(&store, "c11", 4);

    let orchestrator = SettlementOrchestrator::new(&store);
    orchestrator
        .settle("ch_1", "acct-1", &ids(&["c10"]), 1000)
        .unwrap();

    // A second charge that includes the already-owned course only takes
    // a seat for the new one.
    orchestrator
        .settle("ch_2", "acct-1", &ids(&["c10", "c11"]), 2000)
        .unwrap();

    assert_eq!(seats(&store, "c10"), (3, 1));
    assert_eq!(seats(&store, "c11"), (3, 1));
}
