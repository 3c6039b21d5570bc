//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The attribution change set
//! is stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use seaway_core::{
  history::{AttributionChange, AttributionEvent},
  lead::{CustomerLead, LeadSource},
  profile::{AffiliateProfile, ProfileKind, ProfileStatus},
  relation::{ManagerAgentRelation, RelationStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_uuid_opt(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ProfileKind ─────────────────────────────────────────────────────────────

pub fn encode_profile_kind(k: ProfileKind) -> &'static str {
  match k {
    ProfileKind::Headquarters => "headquarters",
    ProfileKind::BranchManager => "branch_manager",
    ProfileKind::SalesAgent => "sales_agent",
  }
}

pub fn decode_profile_kind(s: &str) -> Result<ProfileKind> {
  match s {
    "headquarters" => Ok(ProfileKind::Headquarters),
    "branch_manager" => Ok(ProfileKind::BranchManager),
    "sales_agent" => Ok(ProfileKind::SalesAgent),
    other => Err(Error::DateParse(format!("unknown profile kind: {other:?}"))),
  }
}

// ─── ProfileStatus ───────────────────────────────────────────────────────────

pub fn encode_profile_status(s: ProfileStatus) -> &'static str {
  match s {
    ProfileStatus::Draft => "draft",
    ProfileStatus::AwaitingApproval => "awaiting_approval",
    ProfileStatus::Active => "active",
    ProfileStatus::Suspended => "suspended",
    ProfileStatus::Terminated => "terminated",
  }
}

pub fn decode_profile_status(s: &str) -> Result<ProfileStatus> {
  match s {
    "draft" => Ok(ProfileStatus::Draft),
    "awaiting_approval" => Ok(ProfileStatus::AwaitingApproval),
    "active" => Ok(ProfileStatus::Active),
    "suspended" => Ok(ProfileStatus::Suspended),
    "terminated" => Ok(ProfileStatus::Terminated),
    other => Err(Error::DateParse(format!("unknown profile status: {other:?}"))),
  }
}

// ─── RelationStatus ──────────────────────────────────────────────────────────

pub fn encode_relation_status(s: RelationStatus) -> &'static str {
  match s {
    RelationStatus::Active => "active",
    RelationStatus::Ended => "ended",
  }
}

pub fn decode_relation_status(s: &str) -> Result<RelationStatus> {
  match s {
    "active" => Ok(RelationStatus::Active),
    "ended" => Ok(RelationStatus::Ended),
    other => Err(Error::DateParse(format!("unknown relation status: {other:?}"))),
  }
}

// ─── LeadSource ──────────────────────────────────────────────────────────────

pub fn encode_lead_source(s: LeadSource) -> &'static str {
  match s {
    LeadSource::Import => "import",
    LeadSource::SelfRegistration => "self-registration",
    LeadSource::AdminManual => "admin-manual",
  }
}

pub fn decode_lead_source(s: &str) -> Result<LeadSource> {
  match s {
    "import" => Ok(LeadSource::Import),
    "self-registration" => Ok(LeadSource::SelfRegistration),
    "admin-manual" => Ok(LeadSource::AdminManual),
    other => Err(Error::DateParse(format!("unknown lead source: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `affiliate_profiles` row.
pub struct RawProfile {
  pub profile_id:         String,
  pub kind:               String,
  pub status:             String,
  pub name:               String,
  pub affiliate_code:     String,
  pub branch_label:       Option<String>,
  pub phone:              Option<String>,
  pub manager_profile_id: Option<String>,
  pub created_at:         String,
}

impl RawProfile {
  /// Column list matching the field order of [`Self::from_row`].
  pub const COLUMNS: &'static str = "profile_id, kind, status, name, \
     affiliate_code, branch_label, phone, manager_profile_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:         row.get(0)?,
      kind:               row.get(1)?,
      status:             row.get(2)?,
      name:               row.get(3)?,
      affiliate_code:     row.get(4)?,
      branch_label:       row.get(5)?,
      phone:              row.get(6)?,
      manager_profile_id: row.get(7)?,
      created_at:         row.get(8)?,
    })
  }

  pub fn into_profile(self) -> Result<AffiliateProfile> {
    Ok(AffiliateProfile {
      profile_id:         decode_uuid(&self.profile_id)?,
      kind:               decode_profile_kind(&self.kind)?,
      status:             decode_profile_status(&self.status)?,
      name:               self.name,
      affiliate_code:     self.affiliate_code,
      branch_label:       self.branch_label,
      phone:              self.phone,
      manager_profile_id: decode_uuid_opt(self.manager_profile_id.as_deref())?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `manager_agent_relations` row.
pub struct RawRelation {
  pub relation_id: String,
  pub agent_id:    String,
  pub manager_id:  String,
  pub status:      String,
  pub started_at:  String,
  pub ended_at:    Option<String>,
}

impl RawRelation {
  pub const COLUMNS: &'static str =
    "relation_id, agent_id, manager_id, status, started_at, ended_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      relation_id: row.get(0)?,
      agent_id:    row.get(1)?,
      manager_id:  row.get(2)?,
      status:      row.get(3)?,
      started_at:  row.get(4)?,
      ended_at:    row.get(5)?,
    })
  }

  pub fn into_relation(self) -> Result<ManagerAgentRelation> {
    Ok(ManagerAgentRelation {
      relation_id: decode_uuid(&self.relation_id)?,
      agent_id:    decode_uuid(&self.agent_id)?,
      manager_id:  decode_uuid(&self.manager_id)?,
      status:      decode_relation_status(&self.status)?,
      started_at:  decode_dt(&self.started_at)?,
      ended_at:    self.ended_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `customer_leads` row.
pub struct RawLead {
  pub lead_id:        String,
  pub customer_phone: String,
  pub manager_id:     Option<String>,
  pub agent_id:       Option<String>,
  pub stage:          String,
  pub source:         String,
  pub created_at:     String,
}

impl RawLead {
  pub const COLUMNS: &'static str =
    "lead_id, customer_phone, manager_id, agent_id, stage, source, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:        row.get(0)?,
      customer_phone: row.get(1)?,
      manager_id:     row.get(2)?,
      agent_id:       row.get(3)?,
      stage:          row.get(4)?,
      source:         row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_lead(self) -> Result<CustomerLead> {
    Ok(CustomerLead {
      lead_id:        decode_uuid(&self.lead_id)?,
      customer_phone: self.customer_phone,
      manager_id:     decode_uuid_opt(self.manager_id.as_deref())?,
      agent_id:       decode_uuid_opt(self.agent_id.as_deref())?,
      stage:          self.stage,
      source:         decode_lead_source(&self.source)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `attribution_events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub lead_id:     String,
  pub occurred_at: String,
  pub created_by:  String,
  pub note:        Option<String>,
  pub change_json: String,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "event_id, lead_id, occurred_at, created_by, note, change_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      lead_id:     row.get(1)?,
      occurred_at: row.get(2)?,
      created_by:  row.get(3)?,
      note:        row.get(4)?,
      change_json: row.get(5)?,
    })
  }

  pub fn into_event(self) -> Result<AttributionEvent> {
    let change: AttributionChange = serde_json::from_str(&self.change_json)?;
    Ok(AttributionEvent {
      event_id:    decode_uuid(&self.event_id)?,
      lead_id:     decode_uuid(&self.lead_id)?,
      occurred_at: decode_dt(&self.occurred_at)?,
      created_by:  self.created_by,
      note:        self.note,
      change,
    })
  }
}
