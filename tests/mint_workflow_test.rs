//! Mint workflow integration tests.
//!
//! Exercises the single and bulk mint workflows against in-memory stores
//! and the mock gateway, without going through HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use nft_event_service::AppState;
use nft_event_service::auth::{AuthUser, Role};
use nft_event_service::mint;
use nft_event_service::solana::MockMintGateway;
use nft_event_service::store::{MintRecordFilter, PageRequest};
use nft_event_service::types::{
    Event, EventId, Metadata, MintRecord, MintStatus, NftTemplate, Participant, ParticipantId,
    ParticipantStatus, UserId,
};
use std::sync::Arc;

struct Fixture {
    state: AppState,
    creator: AuthUser,
    event_id: EventId,
    participant_id: ParticipantId,
}

fn user(role: Role) -> AuthUser {
    AuthUser {
        user_id: UserId::new(),
        role,
    }
}

async fn seed_event(state: &AppState, creator: UserId, participants: Vec<Participant>) -> EventId {
    let template = NftTemplate::new(
        "Attendance Certificate".to_string(),
        None,
        "/uploads/cert.png".to_string(),
        Metadata::new(),
        creator,
    );
    state.templates.insert(&template).await.unwrap();

    let mut event = Event::new(
        "Rust Meetup".to_string(),
        Some("Monthly meetup".to_string()),
        template.id,
        Metadata::new(),
        None,
        None,
        creator,
    );
    event.participants = participants;
    state.events.insert(&event).await.unwrap();
    event.id
}

async fn fixture() -> Fixture {
    let state = AppState::in_memory("test-secret");
    let creator = user(Role::User);
    let participant = Participant::new(
        Some(UserId::new()),
        Some("4Nd1mYvRzSoq...".to_string()),
        None,
    );
    let participant_id = participant.id;
    let event_id = seed_event(&state, creator.user_id, vec![participant]).await;
    Fixture {
        state,
        creator,
        event_id,
        participant_id,
    }
}

async fn ledger_len(state: &AppState) -> u64 {
    let (_, total) = state
        .mint_records
        .list(MintRecordFilter::default(), PageRequest::clamped(1, 10))
        .await
        .unwrap();
    total
}

#[tokio::test]
async fn single_mint_marks_participant_and_appends_record() {
    let fx = fixture().await;

    let outcome =
        mint::mint_for_participant(&fx.state, &fx.creator, fx.event_id, fx.participant_id)
            .await
            .unwrap();

    assert_eq!(outcome.participant.status, ParticipantStatus::Minted);
    assert!(outcome.participant.minted_at.is_some());
    assert_eq!(outcome.mint_record.status, MintStatus::Success);
    assert_eq!(outcome.mint_record.tx_hash.as_deref(), Some(outcome.tx_hash.as_str()));
    assert!(outcome.tx_hash.starts_with("mock_tx_"));
    assert!(outcome.mint_address.starts_with("mock_mint_"));

    // The roster mutation was persisted.
    let event = fx.state.events.get(fx.event_id).await.unwrap().unwrap();
    let participant = event.participant(fx.participant_id).unwrap();
    assert_eq!(participant.status, ParticipantStatus::Minted);
    assert!(participant.minted_at.is_some());

    assert_eq!(ledger_len(&fx.state).await, 1);
}

#[tokio::test]
async fn repeat_mint_is_rejected_without_a_second_record() {
    let fx = fixture().await;

    mint::mint_for_participant(&fx.state, &fx.creator, fx.event_id, fx.participant_id)
        .await
        .unwrap();
    let err = mint::mint_for_participant(&fx.state, &fx.creator, fx.event_id, fx.participant_id)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "CONFLICT");
    assert_eq!(ledger_len(&fx.state).await, 1);
}

#[tokio::test]
async fn unknown_participant_leaves_everything_untouched() {
    let fx = fixture().await;

    let err = mint::mint_for_participant(&fx.state, &fx.creator, fx.event_id, ParticipantId::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(ledger_len(&fx.state).await, 0);

    let event = fx.state.events.get(fx.event_id).await.unwrap().unwrap();
    assert_eq!(
        event.participant(fx.participant_id).unwrap().status,
        ParticipantStatus::Pending
    );
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let fx = fixture().await;

    let err = mint::mint_for_participant(&fx.state, &fx.creator, EventId::new(), fx.participant_id)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stranger_cannot_mint_for_foreign_event() {
    let fx = fixture().await;
    let stranger = user(Role::User);

    let err = mint::mint_for_participant(&fx.state, &stranger, fx.event_id, fx.participant_id)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(ledger_len(&fx.state).await, 0);
}

#[tokio::test]
async fn admin_can_mint_for_foreign_event() {
    let fx = fixture().await;
    let admin = user(Role::Admin);

    let outcome = mint::mint_for_participant(&fx.state, &admin, fx.event_id, fx.participant_id)
        .await
        .unwrap();
    assert_eq!(outcome.participant.status, ParticipantStatus::Minted);
}

#[tokio::test]
async fn failing_gateway_surfaces_message_and_writes_nothing() {
    let fx = fixture().await;
    let state = fx
        .state
        .clone()
        .with_mint_gateway(Arc::new(MockMintGateway::failing("insufficient funds")));

    let err = mint::mint_for_participant(&state, &fx.creator, fx.event_id, fx.participant_id)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code(), "UPSTREAM_FAILURE");
    assert_eq!(ledger_len(&state).await, 0);

    let event = state.events.get(fx.event_id).await.unwrap().unwrap();
    assert_eq!(
        event.participant(fx.participant_id).unwrap().status,
        ParticipantStatus::Pending
    );
}

#[tokio::test]
async fn participant_without_address_fails_at_the_gateway() {
    let state = AppState::in_memory("test-secret");
    let creator = user(Role::User);
    let participant = Participant::new(None, None, Some("alice@example.com".to_string()));
    let participant_id = participant.id;
    let event_id = seed_event(&state, creator.user_id, vec![participant]).await;

    let err = mint::mint_for_participant(&state, &creator, event_id, participant_id)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.code(), "UPSTREAM_FAILURE");

    let event = state.events.get(event_id).await.unwrap().unwrap();
    assert_eq!(
        event.participant(participant_id).unwrap().status,
        ParticipantStatus::Pending
    );
}

#[tokio::test]
async fn bulk_mint_isolates_per_item_failures() {
    let state = AppState::in_memory("test-secret");
    let creator = user(Role::User);

    let pending = Participant::new(None, Some("addr1".to_string()), None);
    let mut minted = Participant::new(None, Some("addr2".to_string()), None);
    minted.status = ParticipantStatus::Minted;
    minted.minted_at = Some(Utc::now());
    let missing_id = ParticipantId::new();

    let ids = vec![pending.id, minted.id, missing_id];
    let event_id = seed_event(&state, creator.user_id, vec![pending.clone(), minted]).await;

    let report = mint::bulk_mint(&state, &creator, event_id, &ids)
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].participant_id, pending.id);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("already minted"));
    assert!(report.errors[1].contains("not found"));
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.success, 1);
    assert_eq!(report.summary.failed, 2);

    // Only the pending participant transitioned, and it was persisted.
    let event = state.events.get(event_id).await.unwrap().unwrap();
    assert_eq!(
        event.participant(pending.id).unwrap().status,
        ParticipantStatus::Minted
    );
    assert_eq!(ledger_len(&state).await, 1);
}

#[tokio::test]
async fn bulk_mint_reports_gateway_failures_in_the_errors_list() {
    let state = AppState::in_memory("test-secret")
        .with_mint_gateway(Arc::new(MockMintGateway::failing("insufficient funds")));
    let creator = user(Role::User);

    let first = Participant::new(None, Some("addr1".to_string()), None);
    let second = Participant::new(None, Some("addr2".to_string()), None);
    let ids = vec![first.id, second.id];
    let event_id = seed_event(&state, creator.user_id, vec![first.clone(), second]).await;

    let report = mint::bulk_mint(&state, &creator, event_id, &ids)
        .await
        .unwrap();

    assert!(!report.success);
    assert!(report.results.is_empty());
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains(&format!("Mint failed for participant {}", first.id)));
    assert!(report.errors[0].contains("insufficient funds"));
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.success, 0);
    assert_eq!(report.summary.failed, 2);

    // No ledger entries and no status transitions, but the event document
    // still gets its single post-loop write.
    assert_eq!(ledger_len(&state).await, 0);
    let event = state.events.get(event_id).await.unwrap().unwrap();
    assert!(
        event
            .participants
            .iter()
            .all(|p| p.status == ParticipantStatus::Pending)
    );
}

#[tokio::test]
async fn bulk_mint_with_no_successes_reports_failure() {
    let fx = fixture().await;

    let report = mint::bulk_mint(
        &fx.state,
        &fx.creator,
        fx.event_id,
        &[ParticipantId::new(), ParticipantId::new()],
    )
    .await
    .unwrap();

    assert!(!report.success);
    assert!(report.results.is_empty());
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.summary.failed, 2);
}

#[tokio::test]
async fn bulk_mint_checks_authorization_before_any_item() {
    let fx = fixture().await;
    let stranger = user(Role::User);

    let err = mint::bulk_mint(&fx.state, &stranger, fx.event_id, &[fx.participant_id])
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(ledger_len(&fx.state).await, 0);
}

#[tokio::test]
async fn mint_stats_totals_match_the_breakdown() {
    let state = AppState::in_memory("test-secret");
    let event_a = EventId::new();
    let event_b = EventId::new();

    for (event, status) in [
        (event_a, MintStatus::Success),
        (event_a, MintStatus::Success),
        (event_a, MintStatus::Failed),
        (event_b, MintStatus::Pending),
    ] {
        let record = MintRecord::new(None, event, status, None);
        state.mint_records.append(&record).await.unwrap();
    }

    let all = mint::mint_stats(&state, None).await.unwrap();
    assert_eq!(all.total_minted, 2);
    assert_eq!(all.total_pending, 1);
    assert_eq!(all.total_failed, 1);
    let breakdown_total: u64 = all.breakdown.iter().map(|c| c.count).sum();
    assert_eq!(breakdown_total, 4);

    let scoped = mint::mint_stats(&state, Some(event_a)).await.unwrap();
    assert_eq!(scoped.total_minted, 2);
    assert_eq!(scoped.total_pending, 0);
    assert_eq!(scoped.total_failed, 1);
}

#[tokio::test]
async fn mint_history_pages_newest_first() {
    let state = AppState::in_memory("test-secret");
    let event = EventId::new();
    let base = Utc::now();

    let mut oldest = MintRecord::new(None, event, MintStatus::Success, None);
    oldest.created_at = base - Duration::minutes(2);
    let mut middle = MintRecord::new(None, event, MintStatus::Success, None);
    middle.created_at = base - Duration::minutes(1);
    let mut newest = MintRecord::new(None, event, MintStatus::Success, None);
    newest.created_at = base;

    for record in [&oldest, &middle, &newest] {
        state.mint_records.append(record).await.unwrap();
    }

    let page1 = mint::mint_history(
        &state,
        MintRecordFilter::default(),
        PageRequest::clamped(1, 2),
    )
    .await
    .unwrap();
    assert_eq!(page1.records.len(), 2);
    assert_eq!(page1.records[0].id, newest.id);
    assert_eq!(page1.records[1].id, middle.id);
    assert_eq!(page1.pagination.total, 3);
    assert_eq!(page1.pagination.pages, 2);

    let page2 = mint::mint_history(
        &state,
        MintRecordFilter::default(),
        PageRequest::clamped(2, 2),
    )
    .await
    .unwrap();
    assert_eq!(page2.records.len(), 1);
    assert_eq!(page2.records[0].id, oldest.id);
}
