//! The ownership resolver — a read-only projection from the hierarchy store.
//!
//! Given a customer identity, derive exactly one current owner and the
//! provenance of that decision. The resolver never writes and never fails
//! for input-shape reasons: a phone that cannot be normalized degrades to
//! the head-office fallback rather than erroring, so a broken phone number
//! can never block rendering a customer detail view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  lead::CustomerLead,
  phone::normalize_phone,
  profile::{AffiliateProfile, ProfileKind, ProfileStatus},
  store::HierarchyStore,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// How the caller identifies the customer being resolved.
#[derive(Debug, Clone)]
pub enum CustomerRef {
  /// Raw phone input; normalized internally.
  Phone(String),
  /// An already-known self-registered partner profile.
  Profile(Uuid),
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Which precedence rule produced the ownership decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipSource {
  /// The customer is an affiliate partner themselves.
  #[serde(rename = "self-profile")]
  SelfProfile,
  /// The newest matching lead names a sales agent.
  #[serde(rename = "lead-agent")]
  LeadAgent,
  /// The newest matching lead names only a branch manager.
  #[serde(rename = "lead-manager")]
  LeadManager,
  /// No profile and no attributable lead; head office owns by default.
  #[serde(rename = "fallback")]
  Fallback,
}

/// The resolver's output for one customer — derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateOwnership {
  pub owner_kind:       ProfileKind,
  /// `None` only on the fallback path when no HQ profile has been seeded.
  pub owner_profile_id: Option<Uuid>,
  pub owner_name:       Option<String>,
  pub owner_code:       Option<String>,
  pub source:           OwnershipSource,
  /// When the owner is a sales agent: the agent's *current active* manager,
  /// attached for display. It does not become the owner, and it may differ
  /// from the lead's stored `manager_id`.
  pub manager_profile:  Option<AffiliateProfile>,
  pub lead_id:          Option<Uuid>,
  pub lead_stage:       Option<String>,
  pub lead_created_at:  Option<DateTime<Utc>>,
  pub normalized_phone: Option<String>,
}

impl AffiliateOwnership {
  fn fallback(hq: Option<AffiliateProfile>, phone: Option<String>) -> Self {
    Self {
      owner_kind:       ProfileKind::Headquarters,
      owner_profile_id: hq.as_ref().map(|p| p.profile_id),
      owner_name:       hq.as_ref().map(|p| p.name.clone()),
      owner_code:       hq.map(|p| p.affiliate_code),
      source:           OwnershipSource::Fallback,
      manager_profile:  None,
      lead_id:          None,
      lead_stage:       None,
      lead_created_at:  None,
      normalized_phone: phone,
    }
  }

  fn from_self_profile(
    profile: AffiliateProfile,
    manager: Option<AffiliateProfile>,
  ) -> Self {
    Self {
      owner_kind:       profile.kind,
      owner_profile_id: Some(profile.profile_id),
      owner_name:       Some(profile.name.clone()),
      owner_code:       Some(profile.affiliate_code.clone()),
      source:           OwnershipSource::SelfProfile,
      manager_profile:  manager,
      lead_id:          None,
      lead_stage:       None,
      lead_created_at:  None,
      normalized_phone: profile.phone,
    }
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Resolve the current commercial owner of a customer.
///
/// Precedence (first match wins): self-profile, lead-agent, lead-manager,
/// fallback. When several leads match the phone, the most recently created
/// one decides; older leads stay visible in history but are ignored here.
///
/// Only store access can fail; every input shape resolves to a value.
pub async fn resolve_ownership<S: HierarchyStore>(
  store: &S,
  customer: &CustomerRef,
) -> Result<AffiliateOwnership, S::Error> {
  let phone = match customer {
    CustomerRef::Profile(id) => {
      return match store.get_profile(*id).await? {
        Some(profile) if profile.status != ProfileStatus::Terminated => {
          self_profile_ownership(store, profile).await
        }
        // Unknown and terminated profiles degrade like an unmatched phone;
        // the phone path applies the same filter in `find_profile_by_phone`.
        other => Ok(AffiliateOwnership::fallback(
          store.hq_profile().await?,
          other.and_then(|p| p.phone),
        )),
      };
    }
    CustomerRef::Phone(raw) => match normalize_phone(raw) {
      Some(p) => p,
      None => {
        return Ok(AffiliateOwnership::fallback(store.hq_profile().await?, None));
      }
    },
  };

  // Rule 1: the customer is a partner themselves.
  if let Some(profile) = store.find_profile_by_phone(&phone).await? {
    return self_profile_ownership(store, profile).await;
  }

  // Rules 2 and 3: the newest lead for this phone decides.
  let leads = store.leads_for_phone(&phone).await?;
  if let Some(lead) = leads.into_iter().next() {
    if let Some(agent_id) = lead.agent_id {
      return lead_agent_ownership(store, agent_id, &lead, phone).await;
    }
    if let Some(manager_id) = lead.manager_id {
      return lead_manager_ownership(store, manager_id, &lead, phone).await;
    }
    // A lead with neither field set carries no attribution.
  }

  // Rule 4.
  Ok(AffiliateOwnership::fallback(store.hq_profile().await?, Some(phone)))
}

async fn self_profile_ownership<S: HierarchyStore>(
  store: &S,
  profile: AffiliateProfile,
) -> Result<AffiliateOwnership, S::Error> {
  let manager = if profile.kind == ProfileKind::SalesAgent {
    current_manager(store, profile.profile_id).await?
  } else {
    None
  };
  Ok(AffiliateOwnership::from_self_profile(profile, manager))
}

async fn lead_agent_ownership<S: HierarchyStore>(
  store: &S,
  agent_id: Uuid,
  lead: &CustomerLead,
  phone: String,
) -> Result<AffiliateOwnership, S::Error> {
  let agent = store.get_profile(agent_id).await?;
  let manager = current_manager(store, agent_id).await?;
  Ok(AffiliateOwnership {
    owner_kind:       ProfileKind::SalesAgent,
    owner_profile_id: Some(agent_id),
    owner_name:       agent.as_ref().map(|p| p.name.clone()),
    owner_code:       agent.map(|p| p.affiliate_code),
    source:           OwnershipSource::LeadAgent,
    manager_profile:  manager,
    lead_id:          Some(lead.lead_id),
    lead_stage:       Some(lead.stage.clone()),
    lead_created_at:  Some(lead.created_at),
    normalized_phone: Some(phone),
  })
}

async fn lead_manager_ownership<S: HierarchyStore>(
  store: &S,
  manager_id: Uuid,
  lead: &CustomerLead,
  phone: String,
) -> Result<AffiliateOwnership, S::Error> {
  let manager = store.get_profile(manager_id).await?;
  Ok(AffiliateOwnership {
    owner_kind:       ProfileKind::BranchManager,
    owner_profile_id: Some(manager_id),
    owner_name:       manager.as_ref().map(|p| p.name.clone()),
    owner_code:       manager.map(|p| p.affiliate_code),
    source:           OwnershipSource::LeadManager,
    manager_profile:  None,
    lead_id:          Some(lead.lead_id),
    lead_stage:       Some(lead.stage.clone()),
    lead_created_at:  Some(lead.created_at),
    normalized_phone: Some(phone),
  })
}

/// The agent's current manager profile, via the active relation edge.
async fn current_manager<S: HierarchyStore>(
  store: &S,
  agent_id: Uuid,
) -> Result<Option<AffiliateProfile>, S::Error> {
  match store.active_relation_for_agent(agent_id).await? {
    Some(relation) => store.get_profile(relation.manager_id).await,
    None => Ok(None),
  }
}
