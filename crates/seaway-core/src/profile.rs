//! Affiliate partner profiles — the nodes of the hierarchy graph.
//!
//! A profile is one commercial entity: the head office, a branch manager, or
//! a sales agent. Profiles are never hard-deleted; removal is expressed as
//! `status = Terminated` so lead references stay resolvable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The commercial role of a partner profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
  Headquarters,
  BranchManager,
  SalesAgent,
}

/// Onboarding / account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
  Draft,
  AwaitingApproval,
  Active,
  Suspended,
  Terminated,
}

impl ProfileStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// One partner account.
///
/// `manager_profile_id` is a denormalized back-reference to the agent's
/// manager; the authoritative assignment lives in
/// [`ManagerAgentRelation`](crate::relation::ManagerAgentRelation) rows.
/// It is only legal on [`ProfileKind::SalesAgent`] profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateProfile {
  pub profile_id:         Uuid,
  pub kind:               ProfileKind,
  pub status:             ProfileStatus,
  pub name:               String,
  /// Unique, immutable once issued.
  pub affiliate_code:     String,
  /// Optional display grouping, e.g. a regional branch name.
  pub branch_label:       Option<String>,
  /// Normalized phone, when the partner is also reachable as a customer.
  pub phone:              Option<String>,
  pub manager_profile_id: Option<Uuid>,
  pub created_at:         DateTime<Utc>,
}

/// Input to [`HierarchyStore::add_profile`](crate::store::HierarchyStore::add_profile).
/// `profile_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub kind:               ProfileKind,
  pub status:             ProfileStatus,
  pub name:               String,
  pub affiliate_code:     String,
  pub branch_label:       Option<String>,
  pub phone:              Option<String>,
  pub manager_profile_id: Option<Uuid>,
}

impl NewProfile {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    kind: ProfileKind,
    name: impl Into<String>,
    affiliate_code: impl Into<String>,
  ) -> Self {
    Self {
      kind,
      status: ProfileStatus::Active,
      name: name.into(),
      affiliate_code: affiliate_code.into(),
      branch_label: None,
      phone: None,
      manager_profile_id: None,
    }
  }
}
