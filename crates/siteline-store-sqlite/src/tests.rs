//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use uuid::Uuid;

use siteline_core::{
  assessment::{AssessmentStatus, NewAssessment, Tier},
  payment::{PaymentRecord, PaymentStatus},
  report::{ProjectSnapshot, ReportContent, ReportSummary},
  score::{self, Answers},
  store::AssessmentStore,
  token::{TOKEN_ALPHABET, TOKEN_LEN},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn answers(pairs: &[(&str, &str)]) -> Answers {
  pairs
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn new_assessment() -> NewAssessment {
  let a = answers(&[
    ("lot_size", "large"),
    ("primary_use", "rental"),
    ("budget_range", "luxury"),
    ("financing", "approved"),
  ]);
  let record = score::score(&a);
  NewAssessment::new(a, record)
}

fn report() -> ReportContent {
  ReportContent {
    summary: ReportSummary {
      key_findings:     vec!["finding".to_string()],
      project_snapshot: ProjectSnapshot {
        estimated_cost:       "$150,000 - $200,000".to_string(),
        estimated_timeline:   "6-8 months".to_string(),
        permit_difficulty:    "Moderate".to_string(),
        return_on_investment: "7-10 years".to_string(),
      },
    },
  }
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_round_trip() {
  let s = store().await;

  let (created, token) = s.create(new_assessment()).await.unwrap();
  assert_eq!(created.status, AssessmentStatus::Processing);
  assert_eq!(created.tier, Tier::Tier1);
  assert_eq!(created.score.total, 83);
  assert!(created.report.is_none());

  let fetched = s.get(created.assessment_id).await.unwrap().unwrap();
  assert_eq!(fetched.assessment_id, created.assessment_id);
  assert_eq!(fetched.answers, created.answers);
  assert_eq!(fetched.score, created.score);
  assert_eq!(fetched.status, AssessmentStatus::Processing);
  assert_eq!(fetched.user_id, None);

  assert_eq!(token.assessment_id, created.assessment_id);
  assert_eq!(token.expires_at, created.created_at + Duration::days(90));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_preserves_owning_user() {
  let s = store().await;

  let mut new = new_assessment();
  new.user_id = Some("user-42".to_string());
  let (created, _) = s.create(new).await.unwrap();

  let fetched = s.get(created.assessment_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id.as_deref(), Some("user-42"));
}

#[tokio::test]
async fn generated_tokens_are_well_formed_and_distinct() {
  let s = store().await;

  let (_, t1) = s.create(new_assessment()).await.unwrap();
  let (_, t2) = s.create(new_assessment()).await.unwrap();

  for t in [&t1.token, &t2.token] {
    assert_eq!(t.len(), TOKEN_LEN);
    assert!(t.bytes().all(|b| TOKEN_ALPHABET.contains(&b)), "token: {t}");
  }
  assert_ne!(t1.token, t2.token);
}

// ─── Token resolution and expiry ─────────────────────────────────────────────

#[tokio::test]
async fn resolve_token_returns_linked_assessment() {
  let s = store().await;
  let (created, token) = s.create(new_assessment()).await.unwrap();

  let resolved = s
    .resolve_token(&token.token, Utc::now())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(resolved.assessment_id, created.assessment_id);
}

#[tokio::test]
async fn resolve_unknown_token_returns_none() {
  let s = store().await;
  assert!(
    s.resolve_token("nosuchtoken1", Utc::now())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn expired_token_is_invisible_before_the_sweep_runs() {
  let s = store().await;
  let (_, token) = s.create(new_assessment()).await.unwrap();

  // Logical expiry: one second past the deadline, sweeper never ran.
  let after_expiry = token.expires_at + Duration::seconds(1);
  assert!(
    s.resolve_token(&token.token, after_expiry)
      .await
      .unwrap()
      .is_none()
  );

  // Still resolvable just before the deadline.
  let before_expiry = token.expires_at - Duration::seconds(1);
  assert!(
    s.resolve_token(&token.token, before_expiry)
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn sweep_removes_only_expired_tokens() {
  let s = store().await;

  let mut short = new_assessment();
  short.token_ttl = Duration::days(1);
  let (_, short_token) = s.create(short).await.unwrap();
  let (kept, kept_token) = s.create(new_assessment()).await.unwrap();

  let now = Utc::now() + Duration::days(2);
  let deleted = s.sweep_expired_tokens(now).await.unwrap();
  assert_eq!(deleted, 1);

  // The expired token row is physically gone; even a pre-expiry clock
  // cannot resolve it any more.
  assert!(
    s.resolve_token(&short_token.token, Utc::now())
      .await
      .unwrap()
      .is_none()
  );
  // The live token and its assessment are untouched.
  let resolved = s.resolve_token(&kept_token.token, now).await.unwrap().unwrap();
  assert_eq!(resolved.assessment_id, kept.assessment_id);

  // Nothing left to delete: a repeat sweep is a no-op.
  assert_eq!(s.sweep_expired_tokens(now).await.unwrap(), 0);
}

#[tokio::test]
async fn token_deletion_leaves_the_assessment_intact() {
  let s = store().await;

  let mut new = new_assessment();
  new.token_ttl = Duration::days(1);
  let (created, _) = s.create(new).await.unwrap();

  s.sweep_expired_tokens(Utc::now() + Duration::days(2))
    .await
    .unwrap();

  assert!(s.get(created.assessment_id).await.unwrap().is_some());
}

// ─── Status transitions ──────────────────────────────────────────────────────

#[tokio::test]
async fn mark_completed_sets_report_and_timestamp() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();

  let applied = s.mark_completed(created.assessment_id, report()).await.unwrap();
  assert!(applied);

  let fetched = s.get(created.assessment_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssessmentStatus::Completed);
  assert_eq!(fetched.report, Some(report()));
  assert!(fetched.processed_at.is_some());
  assert!(fetched.error_detail.is_none());
}

#[tokio::test]
async fn mark_error_sets_detail() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();

  let applied = s
    .mark_error(created.assessment_id, "downstream timeout".to_string())
    .await
    .unwrap();
  assert!(applied);

  let fetched = s.get(created.assessment_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssessmentStatus::Error);
  assert_eq!(fetched.error_detail.as_deref(), Some("downstream timeout"));
  assert!(fetched.report.is_none());
}

#[tokio::test]
async fn terminal_transitions_are_idempotent() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();

  assert!(s.mark_completed(created.assessment_id, report()).await.unwrap());

  // A worker retry after completion changes nothing.
  let mut retry = report();
  retry.summary.key_findings = vec!["a different finding".to_string()];
  assert!(!s.mark_completed(created.assessment_id, retry).await.unwrap());

  // Neither does a late failure report.
  assert!(
    !s.mark_error(created.assessment_id, "too late".to_string())
      .await
      .unwrap()
  );

  let fetched = s.get(created.assessment_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssessmentStatus::Completed);
  assert_eq!(fetched.report, Some(report()));
  assert!(fetched.error_detail.is_none());
}

#[tokio::test]
async fn racing_terminal_transitions_settle_exactly_one() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();
  let id = created.assessment_id;

  // A worker completing and a timeout path erroring at the same moment:
  // exactly one transition lands, the other is a no-op.
  let (completed, errored) = tokio::join!(
    s.mark_completed(id, report()),
    s.mark_error(id, "timed out".to_string()),
  );
  let completed = completed.unwrap();
  let errored = errored.unwrap();
  assert!(completed ^ errored, "completed={completed} errored={errored}");

  let fetched = s.get(id).await.unwrap().unwrap();
  assert!(fetched.status.is_terminal());
  match fetched.status {
    AssessmentStatus::Completed => {
      assert!(fetched.report.is_some());
      assert!(fetched.error_detail.is_none());
    }
    AssessmentStatus::Error => {
      assert!(fetched.report.is_none());
      assert!(fetched.error_detail.is_some());
    }
    AssessmentStatus::Processing => unreachable!(),
  }
}

#[tokio::test]
async fn transitions_on_missing_assessment_error() {
  let s = store().await;
  let id = Uuid::new_v4();

  assert!(matches!(
    s.mark_completed(id, report()).await.unwrap_err(),
    crate::Error::AssessmentNotFound(_)
  ));
  assert!(matches!(
    s.mark_error(id, "x".to_string()).await.unwrap_err(),
    crate::Error::AssessmentNotFound(_)
  ));
  assert!(matches!(
    s.upgrade_tier(id, Tier::Tier2, Utc::now()).await.unwrap_err(),
    crate::Error::AssessmentNotFound(_)
  ));
}

// ─── Tier upgrades ───────────────────────────────────────────────────────────

#[tokio::test]
async fn upgrade_tier_is_monotone() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();
  let id = created.assessment_id;

  assert!(s.upgrade_tier(id, Tier::Tier2, Utc::now()).await.unwrap());
  let fetched = s.get(id).await.unwrap().unwrap();
  assert_eq!(fetched.tier, Tier::Tier2);
  assert!(fetched.paid_at.is_some());

  // Same tier again: no-op.
  assert!(!s.upgrade_tier(id, Tier::Tier2, Utc::now()).await.unwrap());
  // Downgrade attempt: no-op.
  assert!(!s.upgrade_tier(id, Tier::Tier1, Utc::now()).await.unwrap());
  assert_eq!(s.get(id).await.unwrap().unwrap().tier, Tier::Tier2);

  // Strictly higher still lands.
  assert!(s.upgrade_tier(id, Tier::Tier3, Utc::now()).await.unwrap());
  assert_eq!(s.get(id).await.unwrap().unwrap().tier, Tier::Tier3);
}

#[tokio::test]
async fn stored_tier_is_the_max_of_any_call_order() {
  let orders: [&[Tier]; 4] = [
    &[Tier::Tier3, Tier::Tier2, Tier::Tier2],
    &[Tier::Tier2, Tier::Tier3, Tier::Tier1],
    &[Tier::Tier1, Tier::Tier1, Tier::Tier2],
    &[Tier::Tier2, Tier::Tier2, Tier::Tier3, Tier::Tier3],
  ];

  for seq in orders {
    let s = store().await;
    let (created, _) = s.create(new_assessment()).await.unwrap();
    for &tier in seq {
      let _ = s.upgrade_tier(created.assessment_id, tier, Utc::now()).await.unwrap();
    }
    let expected = seq.iter().copied().max().unwrap();
    let stored = s.get(created.assessment_id).await.unwrap().unwrap().tier;
    assert_eq!(stored, expected, "sequence: {seq:?}");
  }
}

#[tokio::test]
async fn tier_can_change_after_completion() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();
  let id = created.assessment_id;

  s.mark_completed(id, report()).await.unwrap();
  assert!(s.upgrade_tier(id, Tier::Tier3, Utc::now()).await.unwrap());

  let fetched = s.get(id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssessmentStatus::Completed);
  assert_eq!(fetched.tier, Tier::Tier3);
}

// ─── Payment ledger ──────────────────────────────────────────────────────────

fn payment(session_id: &str, assessment_id: Uuid) -> PaymentRecord {
  PaymentRecord {
    session_id:    session_id.to_string(),
    assessment_id,
    amount_total:  14900,
    currency:      "usd".to_string(),
    status:        PaymentStatus::Completed,
    created_at:    Utc::now(),
  }
}

#[tokio::test]
async fn duplicate_session_id_is_not_recorded_twice() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();
  let id = created.assessment_id;

  assert!(s.record_payment(payment("cs_123", id)).await.unwrap());
  assert!(!s.record_payment(payment("cs_123", id)).await.unwrap());

  let ledger = s.payments_for(id).await.unwrap();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger[0].session_id, "cs_123");
  assert_eq!(ledger[0].amount_total, 14900);
  assert_eq!(ledger[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn distinct_sessions_append_separately() {
  let s = store().await;
  let (created, _) = s.create(new_assessment()).await.unwrap();
  let id = created.assessment_id;

  assert!(s.record_payment(payment("cs_a", id)).await.unwrap());
  assert!(s.record_payment(payment("cs_b", id)).await.unwrap());

  assert_eq!(s.payments_for(id).await.unwrap().len(), 2);
}
