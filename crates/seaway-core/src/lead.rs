//! Customer leads — which affiliate sourced or claimed a customer.
//!
//! Leads are matched to customer accounts by normalized phone number. They
//! are never deleted; manual reassignment mutates `manager_id`/`agent_id`
//! in place and appends an [`AttributionEvent`](crate::history::AttributionEvent).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a lead entered the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeadSource {
  #[default]
  #[serde(rename = "import")]
  Import,
  #[serde(rename = "self-registration")]
  SelfRegistration,
  /// Created by an operator through the admin reassignment path.
  #[serde(rename = "admin-manual")]
  AdminManual,
}

/// One customer lead.
///
/// Invariant: when `agent_id` is set, the agent's current active manager
/// should equal `manager_id`; a mismatch is what the reconciler flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerLead {
  pub lead_id:        Uuid,
  /// Normalized phone; the matching key to a customer account.
  pub customer_phone: String,
  pub manager_id:     Option<Uuid>,
  pub agent_id:       Option<Uuid>,
  /// Pipeline stage; opaque to the attribution core.
  pub stage:          String,
  pub source:         LeadSource,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`HierarchyStore::add_lead`](crate::store::HierarchyStore::add_lead).
/// `customer_phone` is the raw operator/import input; the store normalizes it
/// and rejects values that cannot be normalized.
#[derive(Debug, Clone)]
pub struct NewLead {
  pub customer_phone: String,
  pub manager_id:     Option<Uuid>,
  pub agent_id:       Option<Uuid>,
  pub stage:          String,
  pub source:         LeadSource,
}

impl NewLead {
  pub fn new(customer_phone: impl Into<String>, source: LeadSource) -> Self {
    Self {
      customer_phone: customer_phone.into(),
      manager_id: None,
      agent_id: None,
      stage: "new".to_string(),
      source,
    }
  }
}
