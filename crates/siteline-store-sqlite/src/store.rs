//! [`SqliteStore`] — the SQLite implementation of [`AssessmentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use siteline_core::{
  assessment::{Assessment, AssessmentStatus, NewAssessment, Tier},
  payment::PaymentRecord,
  report::ReportContent,
  store::AssessmentStore,
  token::{self, PublicTokenRecord},
};

use crate::{
  encode::{
    encode_dt, encode_payment_status, encode_status, encode_tier, encode_uuid,
    RawAssessment, RawPayment,
  },
  schema::SCHEMA,
  Error, Result,
};

/// How many fresh tokens to try before declaring the RNG broken.
const TOKEN_RETRY_LIMIT: usize = 8;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Siteline assessment store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements execute on one worker thread, which is what linearizes the
/// conditional updates below.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Probe for row existence after a conditional UPDATE changed nothing.
fn assessment_exists(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM assessments WHERE assessment_id = ?1",
        rusqlite::params![id_str],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// ─── AssessmentStore impl ────────────────────────────────────────────────────

impl AssessmentStore for SqliteStore {
  type Error = Error;

  async fn create(
    &self,
    new: NewAssessment,
  ) -> Result<(Assessment, PublicTokenRecord)> {
    let assessment = Assessment {
      assessment_id: Uuid::new_v4(),
      answers:       new.answers,
      score:         new.score,
      status:        AssessmentStatus::Processing,
      tier:          Tier::Tier1,
      report:        None,
      error_detail:  None,
      created_at:    Utc::now(),
      processed_at:  None,
      paid_at:       None,
      user_id:       new.user_id,
    };
    let expires_at = assessment.created_at + new.token_ttl;

    let id_str       = encode_uuid(assessment.assessment_id);
    let answers_json = serde_json::to_string(&assessment.answers)?;
    let score_json   = serde_json::to_string(&assessment.score)?;
    let status_str   = encode_status(assessment.status).to_owned();
    let tier_str     = encode_tier(assessment.tier).to_owned();
    let created_str  = encode_dt(assessment.created_at);
    let expires_str  = encode_dt(expires_at);
    let user_id      = assessment.user_id.clone();

    // Both rows land in one transaction: a token must never exist without
    // its assessment, nor the other way round, at creation time.
    let token = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO assessments (
             assessment_id, answers_json, score_json, status, tier,
             created_at, user_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            answers_json,
            score_json,
            status_str,
            tier_str,
            created_str,
            user_id,
          ],
        )?;

        let mut rng = rand::thread_rng();
        let mut token = None;
        for _ in 0..TOKEN_RETRY_LIMIT {
          let candidate = token::generate(&mut rng);
          match tx.execute(
            "INSERT INTO public_tokens (token, assessment_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![candidate, id_str, created_str, expires_str],
          ) {
            Ok(_) => {
              token = Some(candidate);
              break;
            }
            // PRIMARY KEY collision: regenerate.
            Err(rusqlite::Error::SqliteFailure(e, _))
              if e.code == rusqlite::ErrorCode::ConstraintViolation => {}
            Err(e) => return Err(e.into()),
          }
        }

        let Some(token) = token else {
          // Roll the assessment row back too; the pair is all-or-nothing.
          tx.rollback()?;
          return Ok(None);
        };

        tx.commit()?;
        Ok(Some(token))
      })
      .await?
      .ok_or(Error::TokenSpaceExhausted)?;

    let record = PublicTokenRecord {
      token,
      assessment_id: assessment.assessment_id,
      created_at: assessment.created_at,
      expires_at,
    };

    Ok((assessment, record))
  }

  async fn mark_completed(&self, id: Uuid, report: ReportContent) -> Result<bool> {
    let id_str      = encode_uuid(id);
    let report_json = serde_json::to_string(&report)?;
    let at_str      = encode_dt(Utc::now());

    let (applied, exists) = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE assessments
           SET status = 'completed', report_json = ?2, processed_at = ?3
           WHERE assessment_id = ?1 AND status = 'processing'",
          rusqlite::params![id_str, report_json, at_str],
        )?;
        let exists = changed > 0 || assessment_exists(conn, &id_str)?;
        Ok((changed > 0, exists))
      })
      .await?;

    if !exists {
      return Err(Error::AssessmentNotFound(id));
    }
    Ok(applied)
  }

  async fn mark_error(&self, id: Uuid, detail: String) -> Result<bool> {
    let id_str = encode_uuid(id);

    let (applied, exists) = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE assessments
           SET status = 'error', error_detail = ?2
           WHERE assessment_id = ?1 AND status = 'processing'",
          rusqlite::params![id_str, detail],
        )?;
        let exists = changed > 0 || assessment_exists(conn, &id_str)?;
        Ok((changed > 0, exists))
      })
      .await?;

    if !exists {
      return Err(Error::AssessmentNotFound(id));
    }
    Ok(applied)
  }

  async fn upgrade_tier(
    &self,
    id: Uuid,
    tier: Tier,
    paid_at: DateTime<Utc>,
  ) -> Result<bool> {
    let id_str   = encode_uuid(id);
    let tier_str = encode_tier(tier).to_owned();
    let at_str   = encode_dt(paid_at);

    // 'tier1' < 'tier2' < 'tier3' sorts lexicographically in rank order,
    // so the strict-upgrade guard is a plain TEXT comparison.
    let (applied, exists) = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE assessments
           SET tier = ?2, paid_at = ?3
           WHERE assessment_id = ?1 AND tier < ?2",
          rusqlite::params![id_str, tier_str, at_str],
        )?;
        let exists = changed > 0 || assessment_exists(conn, &id_str)?;
        Ok((changed > 0, exists))
      })
      .await?;

    if !exists {
      return Err(Error::AssessmentNotFound(id));
    }
    Ok(applied)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Assessment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAssessment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT assessment_id, answers_json, score_json, status, tier,
                      report_json, error_detail, created_at, processed_at,
                      paid_at, user_id
               FROM assessments WHERE assessment_id = ?1",
              rusqlite::params![id_str],
              RawAssessment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssessment::into_assessment).transpose()
  }

  async fn resolve_token(
    &self,
    token: &str,
    now: DateTime<Utc>,
  ) -> Result<Option<Assessment>> {
    let token_str = token.to_owned();
    let now_str   = encode_dt(now);

    let raw: Option<RawAssessment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT a.assessment_id, a.answers_json, a.score_json, a.status,
                      a.tier, a.report_json, a.error_detail, a.created_at,
                      a.processed_at, a.paid_at, a.user_id
               FROM assessments a
               JOIN public_tokens t ON t.assessment_id = a.assessment_id
               WHERE t.token = ?1 AND t.expires_at > ?2",
              rusqlite::params![token_str, now_str],
              RawAssessment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssessment::into_assessment).transpose()
  }

  async fn record_payment(&self, record: PaymentRecord) -> Result<bool> {
    let session_id = record.session_id;
    let id_str     = encode_uuid(record.assessment_id);
    let status_str = encode_payment_status(record.status).to_owned();
    let at_str     = encode_dt(record.created_at);
    let amount     = record.amount_total;
    let currency   = record.currency;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO payments (
             session_id, assessment_id, amount_total, currency, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![session_id, id_str, amount, currency, status_str, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn payments_for(&self, assessment_id: Uuid) -> Result<Vec<PaymentRecord>> {
    let id_str = encode_uuid(assessment_id);

    let raws: Vec<RawPayment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id, assessment_id, amount_total, currency, status, created_at
           FROM payments WHERE assessment_id = ?1
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawPayment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPayment::into_record).collect()
  }

  async fn sweep_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM public_tokens WHERE expires_at < ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;

    Ok(deleted as u64)
  }
}
