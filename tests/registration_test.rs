//! Registration semantics tests
//!
//! Covers the participant state machine end to end: capacity bound,
//! duplicate and membership checks, status gating, first-come-first-served
//! ordering, and the concurrent last-seat race.

mod helpers;

use assert_matches::assert_matches;
use proptest::prelude::*;

use helpers::*;
use skillhub::models::ids::{UserId, WorkshopId};
use skillhub::models::workshop::WorkshopStatus;
use skillhub::SkillhubError;

#[tokio::test]
async fn test_register_missing_workshop() {
    let ctx = TestContext::new();

    let result = ctx.service.register(WorkshopId::new(), UserId::new()).await;
    assert_matches!(result, Err(SkillhubError::WorkshopNotFound { .. }));
}

#[tokio::test]
async fn test_register_cancel_round_trip() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(5), vec![], UserId::new())
        .await
        .unwrap();

    let user = UserId::new();
    let before = workshop.participants.clone();

    let after_register = ctx.service.register(workshop.id, user).await.unwrap();
    assert_eq!(after_register.participants, vec![user]);

    let after_cancel = ctx
        .service
        .cancel_registration(workshop.id, user)
        .await
        .unwrap();
    assert_eq!(after_cancel.participants, before);
}

#[tokio::test]
async fn test_duplicate_registration_leaves_participants_unchanged() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(5), vec![], UserId::new())
        .await
        .unwrap();

    let user = UserId::new();
    ctx.service.register(workshop.id, user).await.unwrap();

    let result = ctx.service.register(workshop.id, user).await;
    assert_matches!(result, Err(SkillhubError::AlreadyRegistered { .. }));

    let stored = ctx.service.get_workshop(workshop.id).await.unwrap();
    assert_eq!(stored.participants, vec![user]);
}

#[tokio::test]
async fn test_full_workshop_rejects_registration() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(1), vec![], UserId::new())
        .await
        .unwrap();

    let seated = UserId::new();
    ctx.service.register(workshop.id, seated).await.unwrap();

    let result = ctx.service.register(workshop.id, UserId::new()).await;
    assert_matches!(result, Err(SkillhubError::WorkshopFull { .. }));

    let stored = ctx.service.get_workshop(workshop.id).await.unwrap();
    assert_eq!(stored.participants, vec![seated]);
}

#[tokio::test]
async fn test_cancel_without_registration() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(5), vec![], UserId::new())
        .await
        .unwrap();

    let result = ctx
        .service
        .cancel_registration(workshop.id, UserId::new())
        .await;
    assert_matches!(result, Err(SkillhubError::NotRegistered { .. }));
}

#[tokio::test]
async fn test_only_upcoming_workshops_accept_mutations() {
    let ctx = TestContext::new();
    let instructor = UserId::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(5), vec![], instructor)
        .await
        .unwrap();

    let registered = UserId::new();
    ctx.service.register(workshop.id, registered).await.unwrap();

    ctx.service
        .update_status(workshop.id, WorkshopStatus::InProgress, instructor)
        .await
        .unwrap();

    let result = ctx.service.register(workshop.id, UserId::new()).await;
    assert_matches!(result, Err(SkillhubError::InvalidState { .. }));

    let result = ctx.service.cancel_registration(workshop.id, registered).await;
    assert_matches!(result, Err(SkillhubError::InvalidState { .. }));
}

/// One free seat, two simultaneous registrations. Exactly one may win;
/// the loser gets the capacity rejection, never a duplicate seat.
#[tokio::test]
async fn test_concurrent_registration_for_last_seat() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(2), vec![], UserId::new())
        .await
        .unwrap();

    // Take all but one seat up front.
    ctx.service.register(workshop.id, UserId::new()).await.unwrap();

    let user_a = UserId::new();
    let user_b = UserId::new();
    let service_a = ctx.service.clone();
    let service_b = ctx.service.clone();
    let id = workshop.id;

    let (result_a, result_b) = tokio::join!(
        tokio::spawn(async move { service_a.register(id, user_a).await }),
        tokio::spawn(async move { service_b.register(id, user_b).await }),
    );
    let result_a = result_a.unwrap();
    let result_b = result_b.unwrap();

    let successes = [&result_a, &result_b]
        .iter()
        .filter(|result| result.is_ok())
        .count();
    assert_eq!(successes, 1, "exactly one registration may take the last seat");

    let loser = if result_a.is_ok() { result_b } else { result_a };
    assert_matches!(loser, Err(SkillhubError::WorkshopFull { .. }));

    let stored = ctx.service.get_workshop(workshop.id).await.unwrap();
    assert_eq!(stored.participants.len(), 2);
}

#[tokio::test]
async fn test_capacity_one_scenario() {
    let ctx = TestContext::new();
    let workshop = ctx
        .service
        .create_workshop(create_request(1), vec![], UserId::new())
        .await
        .unwrap();

    let user_a = UserId::new();
    let user_b = UserId::new();

    // A takes the only seat.
    let after_a = ctx.service.register(workshop.id, user_a).await.unwrap();
    assert_eq!(after_a.participants, vec![user_a]);
    assert_eq!(after_a.status, WorkshopStatus::Upcoming);

    // B is turned away.
    let result = ctx.service.register(workshop.id, user_b).await;
    assert_matches!(result, Err(SkillhubError::WorkshopFull { .. }));

    // A cancels, freeing the seat.
    let after_cancel = ctx
        .service
        .cancel_registration(workshop.id, user_a)
        .await
        .unwrap();
    assert!(after_cancel.participants.is_empty());

    // Now B gets in.
    let after_b = ctx.service.register(workshop.id, user_b).await.unwrap();
    assert_eq!(after_b.participants, vec![user_b]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Capacity invariant: no sequence of register/cancel operations can
    /// push the participant list past max_participants.
    #[test]
    fn prop_participants_never_exceed_capacity(
        ops in proptest::collection::vec((any::<bool>(), 0usize..6), 1..40),
        capacity in 1i32..4,
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let ctx = TestContext::new();
            let workshop = ctx
                .service
                .create_workshop(create_request(capacity), vec![], UserId::new())
                .await
                .unwrap();

            let users: Vec<UserId> = (0..6).map(|_| UserId::new()).collect();

            for (register, user_index) in ops {
                let user = users[user_index];
                let result = if register {
                    ctx.service.register(workshop.id, user).await
                } else {
                    ctx.service.cancel_registration(workshop.id, user).await
                };
                // Rejections are expected; infrastructure errors are not.
                if let Err(err) = result {
                    prop_assert!(err.is_client_error(), "unexpected error: {err}");
                }

                let stored = ctx.service.get_workshop(workshop.id).await.unwrap();
                prop_assert!(stored.participants.len() as i32 <= capacity);

                // Uniqueness holds too.
                let mut seen = stored.participants.clone();
                seen.sort_by_key(|id| id.0);
                seen.dedup();
                prop_assert_eq!(seen.len(), stored.participants.len());
            }
            Ok(())
        })?;
    }
}
