//! [`SqliteStore`] — the SQLite implementation of [`HierarchyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use seaway_core::{
  history::{AttributionChange, AttributionEvent, FieldChange},
  lead::{CustomerLead, NewLead},
  phone::normalize_phone,
  profile::{AffiliateProfile, NewProfile, ProfileKind, ProfileStatus},
  relation::ManagerAgentRelation,
  store::{HierarchyStore, ReassignOutcome, ReassignRequest, RepairOutcome},
};

use crate::{
  encode::{
    RawEvent, RawLead, RawProfile, RawRelation, encode_dt, encode_lead_source,
    encode_profile_kind, encode_profile_status, encode_uuid,
  },
  error::constraint_on,
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Seaway hierarchy store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// funnel through one connection thread, which serialises concurrent repairs
/// on the same agent; a second writer that would double-assign hits the
/// partial unique index and surfaces as a retryable conflict.
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

  /// Seed the well-known head-office profile if none exists yet.
  ///
  /// Idempotent: a second call returns the existing profile untouched. The
  /// fallback resolution path attaches this profile's id to unattributed
  /// customers.
  pub async fn ensure_hq(
    &self,
    name: &str,
    affiliate_code: &str,
  ) -> Result<AffiliateProfile> {
    if let Some(existing) = self.hq_profile().await? {
      return Ok(existing);
    }
    let profile = self
      .add_profile(NewProfile::new(ProfileKind::Headquarters, name, affiliate_code))
      .await?;
    tracing::info!(hq = %profile.profile_id, "seeded head-office profile");
    Ok(profile)
  }

  async fn query_profiles(
    &self,
    where_clause: &'static str,
    param: Option<String>,
  ) -> Result<Vec<AffiliateProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM affiliate_profiles {} ORDER BY created_at",
          RawProfile::COLUMNS,
          where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawProfile::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawProfile::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn query_leads(
    &self,
    where_clause: &'static str,
    param: Option<String>,
  ) -> Result<Vec<CustomerLead>> {
    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM customer_leads {} ORDER BY created_at DESC",
          RawLead::COLUMNS,
          where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawLead::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawLead::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawLead::into_lead).collect()
  }
}

// ─── Closure-side helpers ────────────────────────────────────────────────────

/// Outcome of the repair transaction, decided on the connection thread and
/// mapped to domain errors on the async side.
enum RepairRow {
  Applied { updated: usize },
  AgentMissing,
  NotAgent,
  AgentInactive,
  ManagerMissing,
  NotManager,
  ManagerInactive,
}

enum ReassignRow {
  Done { lead_id: String, created: bool },
  AgentMissing,
  NotAgent,
  AgentInactive,
  ManagerMissing,
  NotManager,
  ManagerInactive,
}

fn profile_role(
  tx: &rusqlite::Transaction<'_>,
  id: &str,
) -> rusqlite::Result<Option<(String, String)>> {
  tx.query_row(
    "SELECT kind, status FROM affiliate_profiles WHERE profile_id = ?1",
    rusqlite::params![id],
    |r| Ok((r.get(0)?, r.get(1)?)),
  )
  .optional()
}

fn append_event(
  tx: &rusqlite::Transaction<'_>,
  lead_id: &str,
  occurred_at: &str,
  created_by: &str,
  note: Option<&str>,
  change: &AttributionChange,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let change_json =
    serde_json::to_string(change).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
  tx.execute(
    "INSERT INTO attribution_events
       (event_id, lead_id, occurred_at, created_by, note, change_json)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      lead_id,
      occurred_at,
      created_by,
      note,
      change_json,
    ],
  )?;
  Ok(())
}

fn parse_uuid_lossy(s: Option<&str>) -> Option<Uuid> {
  s.and_then(|v| Uuid::parse_str(v).ok())
}

// ─── HierarchyStore impl ─────────────────────────────────────────────────────

impl HierarchyStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn add_profile(&self, input: NewProfile) -> Result<AffiliateProfile> {
    if input.manager_profile_id.is_some() && input.kind != ProfileKind::SalesAgent {
      return Err(seaway_core::Error::ManagerOnNonAgent.into());
    }
    let phone = match &input.phone {
      Some(raw) => Some(
        normalize_phone(raw)
          .ok_or_else(|| seaway_core::Error::InvalidPhone(raw.clone()))?,
      ),
      None => None,
    };

    let profile = AffiliateProfile {
      profile_id:         Uuid::new_v4(),
      kind:               input.kind,
      status:             input.status,
      name:               input.name,
      affiliate_code:     input.affiliate_code,
      branch_label:       input.branch_label,
      phone,
      manager_profile_id: input.manager_profile_id,
      created_at:         Utc::now(),
    };

    let id_str      = encode_uuid(profile.profile_id);
    let kind_str    = encode_profile_kind(profile.kind).to_owned();
    let status_str  = encode_profile_status(profile.status).to_owned();
    let name        = profile.name.clone();
    let code        = profile.affiliate_code.clone();
    let branch      = profile.branch_label.clone();
    let phone_str   = profile.phone.clone();
    let manager_str = profile.manager_profile_id.map(encode_uuid);
    let at_str      = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO affiliate_profiles (
             profile_id, kind, status, name, affiliate_code,
             branch_label, phone, manager_profile_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, kind_str, status_str, name, code,
            branch, phone_str, manager_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if constraint_on(&e, "affiliate_code") {
          Error::Core(seaway_core::Error::DuplicateAffiliateCode(
            profile.affiliate_code.clone(),
          ))
        } else {
          Error::Database(e)
        }
      })?;

    Ok(profile)
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<AffiliateProfile>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM affiliate_profiles WHERE profile_id = ?1",
          RawProfile::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn find_profile_by_phone(
    &self,
    normalized_phone: &str,
  ) -> Result<Option<AffiliateProfile>> {
    let phone = normalized_phone.to_owned();
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM affiliate_profiles
           WHERE phone = ?1 AND status != 'terminated'
           ORDER BY created_at LIMIT 1",
          RawProfile::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![phone], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn hq_profile(&self) -> Result<Option<AffiliateProfile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM affiliate_profiles
           WHERE kind = 'headquarters' AND status = 'active'
           ORDER BY created_at LIMIT 1",
          RawProfile::COLUMNS
        );
        Ok(conn.query_row(&sql, [], RawProfile::from_row).optional()?)
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(
    &self,
    kind: Option<ProfileKind>,
  ) -> Result<Vec<AffiliateProfile>> {
    match kind {
      Some(k) => {
        self
          .query_profiles("WHERE kind = ?1", Some(encode_profile_kind(k).to_owned()))
          .await
      }
      None => self.query_profiles("", None).await,
    }
  }

  async fn set_profile_status(
    &self,
    id: Uuid,
    status: ProfileStatus,
  ) -> Result<AffiliateProfile> {
    let id_str     = encode_uuid(id);
    let status_str = encode_profile_status(status).to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE affiliate_profiles SET status = ?2 WHERE profile_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(seaway_core::Error::ProfileNotFound(id).into());
    }
    self
      .get_profile(id)
      .await?
      .ok_or_else(|| seaway_core::Error::ProfileNotFound(id).into())
  }

  // ── Relations — reads ─────────────────────────────────────────────────────

  async fn active_relation_for_agent(
    &self,
    agent_id: Uuid,
  ) -> Result<Option<ManagerAgentRelation>> {
    let agent_str = encode_uuid(agent_id);
    let raw: Option<RawRelation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM manager_agent_relations
           WHERE agent_id = ?1 AND status = 'active'",
          RawRelation::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![agent_str], RawRelation::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawRelation::into_relation).transpose()
  }

  async fn relations_for_agent(
    &self,
    agent_id: Uuid,
  ) -> Result<Vec<ManagerAgentRelation>> {
    let agent_str = encode_uuid(agent_id);
    let raws: Vec<RawRelation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM manager_agent_relations
           WHERE agent_id = ?1 ORDER BY started_at",
          RawRelation::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![agent_str], RawRelation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRelation::into_relation).collect()
  }

  async fn list_relations(&self) -> Result<Vec<ManagerAgentRelation>> {
    let raws: Vec<RawRelation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM manager_agent_relations ORDER BY started_at",
          RawRelation::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawRelation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRelation::into_relation).collect()
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  async fn add_lead(&self, input: NewLead) -> Result<CustomerLead> {
    let phone = normalize_phone(&input.customer_phone)
      .ok_or_else(|| seaway_core::Error::InvalidPhone(input.customer_phone.clone()))?;

    let lead = CustomerLead {
      lead_id:        Uuid::new_v4(),
      customer_phone: phone,
      manager_id:     input.manager_id,
      agent_id:       input.agent_id,
      stage:          input.stage,
      source:         input.source,
      created_at:     Utc::now(),
    };

    let id_str      = encode_uuid(lead.lead_id);
    let phone_str   = lead.customer_phone.clone();
    let manager_str = lead.manager_id.map(encode_uuid);
    let agent_str   = lead.agent_id.map(encode_uuid);
    let stage       = lead.stage.clone();
    let source_str  = encode_lead_source(lead.source).to_owned();
    let at_str      = encode_dt(lead.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customer_leads (
             lead_id, customer_phone, manager_id, agent_id, stage, source, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, phone_str, manager_str, agent_str, stage, source_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(lead)
  }

  async fn get_lead(&self, id: Uuid) -> Result<Option<CustomerLead>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {} FROM customer_leads WHERE lead_id = ?1", RawLead::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawLead::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawLead::into_lead).transpose()
  }

  async fn leads_for_phone(&self, normalized_phone: &str) -> Result<Vec<CustomerLead>> {
    self
      .query_leads("WHERE customer_phone = ?1", Some(normalized_phone.to_owned()))
      .await
  }

  async fn leads_for_agent(&self, agent_id: Uuid) -> Result<Vec<CustomerLead>> {
    self
      .query_leads("WHERE agent_id = ?1", Some(encode_uuid(agent_id)))
      .await
  }

  async fn list_leads(&self) -> Result<Vec<CustomerLead>> {
    self.query_leads("", None).await
  }

  // ── Transactional attribution writes ──────────────────────────────────────

  async fn repair_relation(
    &self,
    agent_id: Uuid,
    manager_id: Uuid,
    actor: &str,
  ) -> Result<RepairOutcome> {
    let agent_str   = encode_uuid(agent_id);
    let manager_str = encode_uuid(manager_id);
    let actor       = actor.to_owned();

    let row: RepairRow = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        match profile_role(&tx, &agent_str)? {
          None => return Ok(RepairRow::AgentMissing),
          Some((kind, _)) if kind != "sales_agent" => return Ok(RepairRow::NotAgent),
          Some((_, status)) if status != "active" => return Ok(RepairRow::AgentInactive),
          Some(_) => {}
        }
        match profile_role(&tx, &manager_str)? {
          None => return Ok(RepairRow::ManagerMissing),
          Some((kind, _)) if kind != "branch_manager" => {
            return Ok(RepairRow::NotManager);
          }
          Some((_, status)) if status != "active" => {
            return Ok(RepairRow::ManagerInactive);
          }
          Some(_) => {}
        }

        let now = encode_dt(Utc::now());

        // End the current relation only when it points elsewhere; an
        // already-correct relation makes the whole call a no-op on the
        // relation table (idempotent re-run, no duplicate active row).
        let current: Option<(String, String)> = tx
          .query_row(
            "SELECT relation_id, manager_id FROM manager_agent_relations
             WHERE agent_id = ?1 AND status = 'active'",
            rusqlite::params![agent_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let needs_new = match &current {
          Some((_, current_manager)) if *current_manager == manager_str => false,
          Some((relation_id, _)) => {
            tx.execute(
              "UPDATE manager_agent_relations SET status = 'ended', ended_at = ?2
               WHERE relation_id = ?1",
              rusqlite::params![relation_id, now],
            )?;
            true
          }
          None => true,
        };

        if needs_new {
          tx.execute(
            "INSERT INTO manager_agent_relations
               (relation_id, agent_id, manager_id, status, started_at, ended_at)
             VALUES (?1, ?2, ?3, 'active', ?4, NULL)",
            rusqlite::params![encode_uuid(Uuid::new_v4()), agent_str, manager_str, now],
          )?;
        }

        // Bring every stale lead in line, one history event each.
        let stale: Vec<(String, Option<String>)> = {
          let mut stmt = tx.prepare(
            "SELECT lead_id, manager_id FROM customer_leads
             WHERE agent_id = ?1 AND (manager_id IS NULL OR manager_id != ?2)",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![agent_str, manager_str], |r| {
              Ok((r.get(0)?, r.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        let manager_uuid = parse_uuid_lossy(Some(manager_str.as_str()));
        for (lead_id, old_manager) in &stale {
          tx.execute(
            "UPDATE customer_leads SET manager_id = ?2 WHERE lead_id = ?1",
            rusqlite::params![lead_id, manager_str],
          )?;
          let change = AttributionChange::Manager {
            manager_change: FieldChange {
              from: parse_uuid_lossy(old_manager.as_deref()),
              to:   manager_uuid,
            },
          };
          append_event(&tx, lead_id, &now, &actor, None, &change)?;
        }

        tx.commit()?;
        Ok(RepairRow::Applied { updated: stale.len() })
      })
      .await
      .map_err(|e| {
        if constraint_on(&e, "relations_one_active_idx") {
          Error::Core(seaway_core::Error::RelationConflict(agent_id))
        } else {
          Error::Database(e)
        }
      })?;

    match row {
      RepairRow::Applied { updated } => {
        tracing::info!(
          agent = %agent_id,
          manager = %manager_id,
          updated_leads = updated,
          "relation repair applied"
        );
        Ok(RepairOutcome { updated_lead_count: updated })
      }
      RepairRow::AgentMissing => Err(seaway_core::Error::AgentNotFound(agent_id).into()),
      RepairRow::NotAgent => Err(seaway_core::Error::NotASalesAgent(agent_id).into()),
      RepairRow::AgentInactive => {
        Err(seaway_core::Error::AgentNotActive(agent_id).into())
      }
      RepairRow::ManagerMissing => {
        Err(seaway_core::Error::ManagerNotFound(manager_id).into())
      }
      RepairRow::NotManager => {
        Err(seaway_core::Error::NotABranchManager(manager_id).into())
      }
      RepairRow::ManagerInactive => {
        Err(seaway_core::Error::ManagerNotActive(manager_id).into())
      }
    }
  }

  async fn reassign_ownership(
    &self,
    request: ReassignRequest,
  ) -> Result<ReassignOutcome> {
    let phone = normalize_phone(&request.customer_phone).ok_or_else(|| {
      seaway_core::Error::InvalidPhone(request.customer_phone.clone())
    })?;
    if request.manager_id.is_none() && request.agent_id.is_none() {
      return Err(seaway_core::Error::NothingToReassign.into());
    }

    let manager_id  = request.manager_id;
    let agent_id    = request.agent_id;
    let manager_str = manager_id.map(encode_uuid);
    let agent_str   = agent_id.map(encode_uuid);
    let created_by  = request.created_by.clone();
    let note        = request.note.clone();
    let phone_moved = phone.clone();

    let row: ReassignRow = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(agent) = &agent_str {
          match profile_role(&tx, agent)? {
            None => return Ok(ReassignRow::AgentMissing),
            Some((kind, _)) if kind != "sales_agent" => {
              return Ok(ReassignRow::NotAgent);
            }
            Some((_, status)) if status != "active" => {
              return Ok(ReassignRow::AgentInactive);
            }
            Some(_) => {}
          }
        }
        if let Some(manager) = &manager_str {
          match profile_role(&tx, manager)? {
            None => return Ok(ReassignRow::ManagerMissing),
            Some((kind, _)) if kind != "branch_manager" => {
              return Ok(ReassignRow::NotManager);
            }
            Some((_, status)) if status != "active" => {
              return Ok(ReassignRow::ManagerInactive);
            }
            Some(_) => {}
          }
        }

        let now = encode_dt(Utc::now());

        // Newest lead for the phone wins, same as the resolver's tie-break.
        let existing: Option<(String, Option<String>, Option<String>)> = tx
          .query_row(
            "SELECT lead_id, manager_id, agent_id FROM customer_leads
             WHERE customer_phone = ?1
             ORDER BY created_at DESC LIMIT 1",
            rusqlite::params![phone_moved],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let (lead_id, old_manager, old_agent, created) = match existing {
          Some((id, m, a)) => {
            match (&manager_str, &agent_str) {
              (Some(m_new), Some(a_new)) => {
                tx.execute(
                  "UPDATE customer_leads SET manager_id = ?2, agent_id = ?3
                   WHERE lead_id = ?1",
                  rusqlite::params![id, m_new, a_new],
                )?;
              }
              (Some(m_new), None) => {
                tx.execute(
                  "UPDATE customer_leads SET manager_id = ?2 WHERE lead_id = ?1",
                  rusqlite::params![id, m_new],
                )?;
              }
              (None, Some(a_new)) => {
                tx.execute(
                  "UPDATE customer_leads SET agent_id = ?2 WHERE lead_id = ?1",
                  rusqlite::params![id, a_new],
                )?;
              }
              // Ruled out before the transaction started.
              (None, None) => {}
            }
            (id, m, a, false)
          }
          None => {
            let id = encode_uuid(Uuid::new_v4());
            tx.execute(
              "INSERT INTO customer_leads (
                 lead_id, customer_phone, manager_id, agent_id, stage, source, created_at
               ) VALUES (?1, ?2, ?3, ?4, 'new', 'admin-manual', ?5)",
              rusqlite::params![id, phone_moved, manager_str, agent_str, now],
            )?;
            (id, None, None, true)
          }
        };

        let manager_change = manager_id.map(|to| FieldChange {
          from: parse_uuid_lossy(old_manager.as_deref()),
          to:   Some(to),
        });
        let agent_change = agent_id.map(|to| FieldChange {
          from: parse_uuid_lossy(old_agent.as_deref()),
          to:   Some(to),
        });
        // At least one side is present; the guard above rules out (None, None).
        if let Some(change) = AttributionChange::from_parts(manager_change, agent_change)
        {
          append_event(&tx, &lead_id, &now, &created_by, note.as_deref(), &change)?;
        }

        tx.commit()?;
        Ok(ReassignRow::Done { lead_id, created })
      })
      .await?;

    match row {
      ReassignRow::Done { lead_id, created } => {
        let lead_id = crate::encode::decode_uuid(&lead_id)?;
        tracing::info!(
          %lead_id,
          created,
          phone = %phone,
          "ownership reassigned"
        );
        Ok(ReassignOutcome { lead_id, created })
      }
      ReassignRow::AgentMissing => {
        // agent_id is present whenever this row is produced.
        Err(seaway_core::Error::AgentNotFound(agent_id.unwrap_or_default()).into())
      }
      ReassignRow::NotAgent => {
        Err(seaway_core::Error::NotASalesAgent(agent_id.unwrap_or_default()).into())
      }
      ReassignRow::AgentInactive => {
        Err(seaway_core::Error::AgentNotActive(agent_id.unwrap_or_default()).into())
      }
      ReassignRow::ManagerMissing => {
        Err(seaway_core::Error::ManagerNotFound(manager_id.unwrap_or_default()).into())
      }
      ReassignRow::NotManager => {
        Err(
          seaway_core::Error::NotABranchManager(manager_id.unwrap_or_default()).into(),
        )
      }
      ReassignRow::ManagerInactive => {
        Err(seaway_core::Error::ManagerNotActive(manager_id.unwrap_or_default()).into())
      }
    }
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn events_for_lead(&self, lead_id: Uuid) -> Result<Vec<AttributionEvent>> {
    let lead_str = encode_uuid(lead_id);
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM attribution_events
           WHERE lead_id = ?1 ORDER BY occurred_at DESC",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![lead_str], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
