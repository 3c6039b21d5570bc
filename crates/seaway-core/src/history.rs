//! The attribution history log.
//!
//! Every ownership-affecting write — a manual reassignment or a reconciler
//! repair — appends exactly one event per touched lead. Events are never
//! updated or deleted; corrections are always new events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A before/after pair for one ownership field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
  pub from: Option<Uuid>,
  pub to:   Option<Uuid>,
}

/// The structured diff carried by an event.
///
/// Modelled as a tagged union rather than a loose JSON blob so consumers can
/// pattern-match instead of probing optional fields. Serialised form is the
/// plain object `{"manager_change": …}` / `{"agent_change": …}` / both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributionChange {
  Both {
    manager_change: FieldChange,
    agent_change:   FieldChange,
  },
  Manager { manager_change: FieldChange },
  Agent { agent_change: FieldChange },
}

impl AttributionChange {
  /// Build a change set from the fields that actually moved.
  /// Returns `None` when neither did.
  pub fn from_parts(
    manager: Option<FieldChange>,
    agent: Option<FieldChange>,
  ) -> Option<Self> {
    match (manager, agent) {
      (Some(m), Some(a)) => Some(Self::Both { manager_change: m, agent_change: a }),
      (Some(m), None) => Some(Self::Manager { manager_change: m }),
      (None, Some(a)) => Some(Self::Agent { agent_change: a }),
      (None, None) => None,
    }
  }

  pub fn manager_change(&self) -> Option<&FieldChange> {
    match self {
      Self::Both { manager_change, .. } | Self::Manager { manager_change } => {
        Some(manager_change)
      }
      Self::Agent { .. } => None,
    }
  }

  pub fn agent_change(&self) -> Option<&FieldChange> {
    match self {
      Self::Both { agent_change, .. } | Self::Agent { agent_change } => {
        Some(agent_change)
      }
      Self::Manager { .. } => None,
    }
  }
}

/// One append-only audit row. Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionEvent {
  pub event_id:    Uuid,
  pub lead_id:     Uuid,
  /// Server-assigned timestamp; never changes after creation.
  pub occurred_at: DateTime<Utc>,
  /// Operator identity, or a fixed tag for automatic repairs.
  pub created_by:  String,
  pub note:        Option<String>,
  pub change:      AttributionChange,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_parts_picks_the_right_variant() {
    let mgr = FieldChange { from: Some(Uuid::new_v4()), to: Some(Uuid::new_v4()) };
    let agt = FieldChange { from: None, to: Some(Uuid::new_v4()) };

    assert!(matches!(
      AttributionChange::from_parts(Some(mgr), None),
      Some(AttributionChange::Manager { .. })
    ));
    assert!(matches!(
      AttributionChange::from_parts(None, Some(agt)),
      Some(AttributionChange::Agent { .. })
    ));
    assert!(matches!(
      AttributionChange::from_parts(Some(mgr), Some(agt)),
      Some(AttributionChange::Both { .. })
    ));
    assert!(AttributionChange::from_parts(None, None).is_none());
  }

  #[test]
  fn json_roundtrip_keeps_the_variant() {
    let mgr = FieldChange { from: Some(Uuid::new_v4()), to: Some(Uuid::new_v4()) };
    let agt = FieldChange { from: None, to: Some(Uuid::new_v4()) };

    for change in [
      AttributionChange::Manager { manager_change: mgr },
      AttributionChange::Agent { agent_change: agt },
      AttributionChange::Both { manager_change: mgr, agent_change: agt },
    ] {
      let json = serde_json::to_string(&change).unwrap();
      let back: AttributionChange = serde_json::from_str(&json).unwrap();
      assert_eq!(back, change, "json was: {json}");
    }
  }

  #[test]
  fn accessors_expose_both_sides() {
    let mgr = FieldChange { from: Some(Uuid::new_v4()), to: None };
    let agt = FieldChange { from: None, to: Some(Uuid::new_v4()) };
    let both = AttributionChange::Both { manager_change: mgr, agent_change: agt };

    assert_eq!(both.manager_change(), Some(&mgr));
    assert_eq!(both.agent_change(), Some(&agt));

    let only_mgr = AttributionChange::Manager { manager_change: mgr };
    assert_eq!(only_mgr.agent_change(), None);
  }
}
