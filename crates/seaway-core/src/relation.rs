//! Manager↔agent assignment edges.
//!
//! A relation records that an agent reported to a manager for a time window.
//! Rows are never deleted or rewritten: reassignment transitions the current
//! row to `Ended` and inserts a fresh `Active` one, so the full reporting
//! history is preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
  Active,
  Ended,
}

impl RelationStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// An agent→manager assignment for a time window.
///
/// Invariant: at most one `Active` relation per `agent_id` at any time
/// (enforced by a partial unique index in the SQLite backend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerAgentRelation {
  pub relation_id: Uuid,
  pub agent_id:    Uuid,
  pub manager_id:  Uuid,
  pub status:      RelationStatus,
  pub started_at:  DateTime<Utc>,
  pub ended_at:    Option<DateTime<Utc>>,
}
