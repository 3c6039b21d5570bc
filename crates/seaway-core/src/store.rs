//! The `HierarchyStore` trait and supporting request/outcome types.
//!
//! The trait is implemented by storage backends (e.g. `seaway-store-sqlite`).
//! Higher layers (`seaway-api`, the resolver and reconciler in this crate)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  history::AttributionEvent,
  lead::{CustomerLead, NewLead},
  profile::{AffiliateProfile, NewProfile, ProfileKind, ProfileStatus},
  relation::ManagerAgentRelation,
};

// ─── Write request/outcome types ─────────────────────────────────────────────

/// Input to [`HierarchyStore::reassign_ownership`] — an operator-initiated
/// ownership change, not an inferred repair.
#[derive(Debug, Clone)]
pub struct ReassignRequest {
  /// Raw phone as entered by the operator; the store normalizes it.
  pub customer_phone: String,
  pub manager_id:     Option<Uuid>,
  pub agent_id:       Option<Uuid>,
  pub note:           Option<String>,
  pub created_by:     String,
}

/// Outcome of [`HierarchyStore::reassign_ownership`].
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ReassignOutcome {
  pub lead_id: Uuid,
  /// `true` when no lead existed for the phone and one was created.
  pub created: bool,
}

/// Outcome of [`HierarchyStore::repair_relation`].
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RepairOutcome {
  /// Leads whose `manager_id` was brought in line with the new relation.
  pub updated_lead_count: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the persisted affiliate hierarchy.
///
/// Relations and attribution events are append-only: reassignment ends the
/// old relation row and inserts a new one, and history events are never
/// mutated. Profiles are soft-removed via `Terminated`, never deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HierarchyStore: Send + Sync {
  type Error: std::error::Error + crate::Classify + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create and persist a new profile.
  ///
  /// Rejects a `manager_profile_id` on a non-agent profile and a duplicate
  /// `affiliate_code`.
  fn add_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<AffiliateProfile, Self::Error>> + Send + '_;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AffiliateProfile>, Self::Error>> + Send + '_;

  /// Look up a non-terminated profile by normalized phone.
  ///
  /// Used by the resolver's self-profile rule: a partner who is also a
  /// customer is authoritative over any lead-based attribution.
  fn find_profile_by_phone<'a>(
    &'a self,
    normalized_phone: &'a str,
  ) -> impl Future<Output = Result<Option<AffiliateProfile>, Self::Error>> + Send + 'a;

  /// The well-known head-office profile, if one has been seeded.
  fn hq_profile(
    &self,
  ) -> impl Future<Output = Result<Option<AffiliateProfile>, Self::Error>> + Send + '_;

  /// List all profiles, optionally filtered by kind.
  fn list_profiles(
    &self,
    kind: Option<ProfileKind>,
  ) -> impl Future<Output = Result<Vec<AffiliateProfile>, Self::Error>> + Send + '_;

  /// Transition a profile's lifecycle status (the soft-removal path).
  fn set_profile_status(
    &self,
    id: Uuid,
    status: ProfileStatus,
  ) -> impl Future<Output = Result<AffiliateProfile, Self::Error>> + Send + '_;

  // ── Relations — reads ─────────────────────────────────────────────────

  /// The agent's current `Active` relation, if any.
  fn active_relation_for_agent(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Option<ManagerAgentRelation>, Self::Error>> + Send + '_;

  /// Full relation history for an agent, `started_at` ascending.
  fn relations_for_agent(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ManagerAgentRelation>, Self::Error>> + Send + '_;

  /// All relation rows, active and ended.
  fn list_relations(
    &self,
  ) -> impl Future<Output = Result<Vec<ManagerAgentRelation>, Self::Error>> + Send + '_;

  // ── Leads ─────────────────────────────────────────────────────────────

  /// Create a lead. The phone is normalized first; input that cannot be
  /// normalized is rejected.
  fn add_lead(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<CustomerLead, Self::Error>> + Send + '_;

  fn get_lead(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CustomerLead>, Self::Error>> + Send + '_;

  /// Leads matching a normalized phone, `created_at` descending — the first
  /// element is the one that wins ownership resolution.
  fn leads_for_phone<'a>(
    &'a self,
    normalized_phone: &'a str,
  ) -> impl Future<Output = Result<Vec<CustomerLead>, Self::Error>> + Send + 'a;

  fn leads_for_agent(
    &self,
    agent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CustomerLead>, Self::Error>> + Send + '_;

  fn list_leads(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomerLead>, Self::Error>> + Send + '_;

  // ── Transactional attribution writes ──────────────────────────────────

  /// Apply an operator-approved repair: point `agent_id` at `manager_id`.
  ///
  /// Ends the agent's current relation if it points elsewhere, inserts a new
  /// `Active` relation, rewrites stale lead `manager_id`s, and appends one
  /// [`AttributionEvent`] per touched lead — atomically. Re-running with the
  /// same pair is a no-op that still succeeds.
  fn repair_relation<'a>(
    &'a self,
    agent_id: Uuid,
    manager_id: Uuid,
    actor: &'a str,
  ) -> impl Future<Output = Result<RepairOutcome, Self::Error>> + Send + 'a;

  /// Apply a manual ownership reassignment for a customer phone.
  ///
  /// Creates an `admin-manual` lead when none matches the phone, otherwise
  /// updates the newest matching lead, and appends exactly one event
  /// covering every supplied field.
  fn reassign_ownership(
    &self,
    request: ReassignRequest,
  ) -> impl Future<Output = Result<ReassignOutcome, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Attribution events for a lead, `occurred_at` descending.
  fn events_for_lead(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttributionEvent>, Self::Error>> + Send + '_;
}
