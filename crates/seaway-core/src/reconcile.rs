//! The relation reconciler — batch consistency analysis over the hierarchy.
//!
//! The analysis pass is a pure function over in-memory snapshots so it can
//! be unit-tested without a store and run against a read replica. The repair
//! operation lives on [`HierarchyStore`] because it must be transactional.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  lead::CustomerLead,
  profile::{AffiliateProfile, ProfileKind},
  relation::ManagerAgentRelation,
  store::HierarchyStore,
};

// ─── Findings ────────────────────────────────────────────────────────────────

/// Why an agent appears in the missing-relations list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationIssue {
  /// A lead names an agent profile that does not exist.
  UnknownAgent,
  /// The agent has no `Active` manager relation at all.
  NoActiveManager,
  /// The lead's stored manager disagrees with the agent's current manager.
  ManagerMismatch,
}

impl fmt::Display for RelationIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = match self {
      Self::UnknownAgent => "lead references an agent profile that does not exist",
      Self::NoActiveManager => "lead references agent with no active manager relation",
      Self::ManagerMismatch => "lead manager does not match agent's current manager",
    };
    f.write_str(msg)
  }
}

/// One inconsistency, keyed by agent. `expected_manager_id` is a suggestion
/// for the operator; it is only filled in when unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingRelation {
  pub agent_id:            Uuid,
  pub agent_name:          String,
  pub agent_code:          String,
  pub reason:              RelationIssue,
  pub expected_manager_id: Option<Uuid>,
}

/// Read-only team-size aggregate per branch manager, for operator visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStats {
  pub manager_id:   Uuid,
  pub manager_name: String,
  pub manager_code: String,
  pub branch_label: Option<String>,
  /// Agents with an `Active` relation pointing at this manager.
  pub team_count:   usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSummary {
  pub total_profiles:    usize,
  /// Active relation edges.
  pub total_relations:   usize,
  /// Active sales-agent profiles.
  pub sales_agents:      usize,
  pub missing_relations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationReport {
  pub summary:           RelationSummary,
  pub missing_relations: Vec<MissingRelation>,
  pub manager_stats:     Vec<ManagerStats>,
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Run the full analysis pass over snapshots of the three tables.
///
/// Findings are de-duplicated per agent: the first offending lead decides
/// the reason. Leads pointing at suspended or terminated agents are left to
/// the profile-lifecycle screens; this pass covers active agents only.
pub fn analyze(
  profiles: &[AffiliateProfile],
  relations: &[ManagerAgentRelation],
  leads: &[CustomerLead],
) -> RelationReport {
  let profile_by_id: HashMap<Uuid, &AffiliateProfile> =
    profiles.iter().map(|p| (p.profile_id, p)).collect();

  let mut active_by_agent: HashMap<Uuid, &ManagerAgentRelation> = HashMap::new();
  let mut history_count: HashMap<Uuid, (usize, Uuid)> = HashMap::new();
  for relation in relations {
    if relation.status.is_active() {
      active_by_agent.insert(relation.agent_id, relation);
    }
    history_count
      .entry(relation.agent_id)
      .and_modify(|(n, _)| *n += 1)
      .or_insert((1, relation.manager_id));
  }

  let mut flagged: HashSet<Uuid> = HashSet::new();
  let mut missing_relations: Vec<MissingRelation> = Vec::new();

  for lead in leads {
    let Some(agent_id) = lead.agent_id else { continue };
    if flagged.contains(&agent_id) {
      continue;
    }

    let finding = match profile_by_id.get(&agent_id) {
      None => Some(MissingRelation {
        agent_id,
        agent_name: "(unknown)".to_string(),
        agent_code: String::new(),
        reason: RelationIssue::UnknownAgent,
        expected_manager_id: None,
      }),
      Some(agent) => {
        if agent.kind != ProfileKind::SalesAgent || !agent.status.is_active() {
          None
        } else {
          match active_by_agent.get(&agent_id) {
            None => Some(MissingRelation {
              agent_id,
              agent_name: agent.name.clone(),
              agent_code: agent.affiliate_code.clone(),
              reason: RelationIssue::NoActiveManager,
              expected_manager_id: expected_manager(agent, &history_count),
            }),
            Some(relation) if lead.manager_id != Some(relation.manager_id) => {
              Some(MissingRelation {
                agent_id,
                agent_name: agent.name.clone(),
                agent_code: agent.affiliate_code.clone(),
                reason: RelationIssue::ManagerMismatch,
                expected_manager_id: Some(relation.manager_id),
              })
            }
            Some(_) => None,
          }
        }
      }
    };

    if let Some(finding) = finding {
      flagged.insert(agent_id);
      missing_relations.push(finding);
    }
  }

  let manager_stats: Vec<ManagerStats> = profiles
    .iter()
    .filter(|p| p.kind == ProfileKind::BranchManager)
    .map(|manager| ManagerStats {
      manager_id:   manager.profile_id,
      manager_name: manager.name.clone(),
      manager_code: manager.affiliate_code.clone(),
      branch_label: manager.branch_label.clone(),
      team_count:   active_by_agent
        .values()
        .filter(|r| r.manager_id == manager.profile_id)
        .count(),
    })
    .collect();

  let summary = RelationSummary {
    total_profiles:    profiles.len(),
    total_relations:   active_by_agent.len(),
    sales_agents:      profiles
      .iter()
      .filter(|p| p.kind == ProfileKind::SalesAgent && p.status.is_active())
      .count(),
    missing_relations: missing_relations.len(),
  };

  RelationReport { summary, missing_relations, manager_stats }
}

/// Suggest a manager for an agent with no active relation.
///
/// The profile's own back-reference wins when set; otherwise a single
/// historical relation (active or ended) is unambiguous enough to suggest.
/// Multiple historical managers are never guessed between — the operator
/// must choose.
fn expected_manager(
  agent: &AffiliateProfile,
  history_count: &HashMap<Uuid, (usize, Uuid)>,
) -> Option<Uuid> {
  if agent.manager_profile_id.is_some() {
    return agent.manager_profile_id;
  }
  match history_count.get(&agent.profile_id) {
    Some((1, manager_id)) => Some(*manager_id),
    _ => None,
  }
}

/// Fetch the three snapshots from `store` and run [`analyze`].
pub async fn check_relations<S: HierarchyStore>(
  store: &S,
) -> Result<RelationReport, S::Error> {
  let profiles = store.list_profiles(None).await?;
  let relations = store.list_relations().await?;
  let leads = store.list_leads().await?;
  Ok(analyze(&profiles, &relations, &leads))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    lead::LeadSource,
    profile::ProfileStatus,
    relation::RelationStatus,
  };

  fn profile(kind: ProfileKind, code: &str) -> AffiliateProfile {
    AffiliateProfile {
      profile_id:         Uuid::new_v4(),
      kind,
      status:             ProfileStatus::Active,
      name:               format!("profile {code}"),
      affiliate_code:     code.to_string(),
      branch_label:       None,
      phone:              None,
      manager_profile_id: None,
      created_at:         Utc::now(),
    }
  }

  fn relation(
    agent: &AffiliateProfile,
    manager: &AffiliateProfile,
    status: RelationStatus,
  ) -> ManagerAgentRelation {
    ManagerAgentRelation {
      relation_id: Uuid::new_v4(),
      agent_id:    agent.profile_id,
      manager_id:  manager.profile_id,
      status,
      started_at:  Utc::now(),
      ended_at:    match status {
        RelationStatus::Active => None,
        RelationStatus::Ended => Some(Utc::now()),
      },
    }
  }

  fn lead(agent: Option<Uuid>, manager: Option<Uuid>) -> CustomerLead {
    CustomerLead {
      lead_id:        Uuid::new_v4(),
      customer_phone: "01012340000".to_string(),
      manager_id:     manager,
      agent_id:       agent,
      stage:          "new".to_string(),
      source:         LeadSource::Import,
      created_at:     Utc::now(),
    }
  }

  #[test]
  fn consistent_hierarchy_produces_no_findings() {
    let manager = profile(ProfileKind::BranchManager, "MGR-001");
    let agent = profile(ProfileKind::SalesAgent, "AGT-001");
    let rel = relation(&agent, &manager, RelationStatus::Active);
    let l = lead(Some(agent.profile_id), Some(manager.profile_id));

    let report = analyze(&[manager, agent], &[rel], &[l]);
    assert!(report.missing_relations.is_empty());
    assert_eq!(report.summary.missing_relations, 0);
  }

  #[test]
  fn manager_mismatch_is_flagged_with_current_manager_expected() {
    let manager_a = profile(ProfileKind::BranchManager, "MGR-A");
    let manager_b = profile(ProfileKind::BranchManager, "MGR-B");
    let agent = profile(ProfileKind::SalesAgent, "AGT-042");
    let rel = relation(&agent, &manager_a, RelationStatus::Active);
    // Lead claims manager B while the agent reports to manager A.
    let l = lead(Some(agent.profile_id), Some(manager_b.profile_id));

    let report =
      analyze(&[manager_a.clone(), manager_b, agent.clone()], &[rel], &[l]);

    assert_eq!(report.missing_relations.len(), 1);
    let finding = &report.missing_relations[0];
    assert_eq!(finding.agent_id, agent.profile_id);
    assert_eq!(finding.agent_code, "AGT-042");
    assert_eq!(finding.reason, RelationIssue::ManagerMismatch);
    assert_eq!(finding.expected_manager_id, Some(manager_a.profile_id));
  }

  #[test]
  fn no_active_relation_suggests_profile_back_reference_first() {
    let manager_a = profile(ProfileKind::BranchManager, "MGR-A");
    let manager_b = profile(ProfileKind::BranchManager, "MGR-B");
    let mut agent = profile(ProfileKind::SalesAgent, "AGT-001");
    agent.manager_profile_id = Some(manager_b.profile_id);
    // A single ended relation points at A, but the profile itself says B.
    let old = relation(&agent, &manager_a, RelationStatus::Ended);
    let l = lead(Some(agent.profile_id), None);

    let report = analyze(&[manager_a, manager_b.clone(), agent], &[old], &[l]);

    let finding = &report.missing_relations[0];
    assert_eq!(finding.reason, RelationIssue::NoActiveManager);
    assert_eq!(finding.expected_manager_id, Some(manager_b.profile_id));
  }

  #[test]
  fn single_historical_relation_is_an_unambiguous_suggestion() {
    let manager = profile(ProfileKind::BranchManager, "MGR-A");
    let agent = profile(ProfileKind::SalesAgent, "AGT-001");
    let old = relation(&agent, &manager, RelationStatus::Ended);
    let l = lead(Some(agent.profile_id), None);

    let report = analyze(&[manager.clone(), agent], &[old], &[l]);

    let finding = &report.missing_relations[0];
    assert_eq!(finding.reason, RelationIssue::NoActiveManager);
    assert_eq!(finding.expected_manager_id, Some(manager.profile_id));
  }

  #[test]
  fn ambiguous_history_yields_no_suggestion() {
    let manager_a = profile(ProfileKind::BranchManager, "MGR-A");
    let manager_b = profile(ProfileKind::BranchManager, "MGR-B");
    let agent = profile(ProfileKind::SalesAgent, "AGT-001");
    let old_a = relation(&agent, &manager_a, RelationStatus::Ended);
    let old_b = relation(&agent, &manager_b, RelationStatus::Ended);
    let l = lead(Some(agent.profile_id), None);

    let report = analyze(&[manager_a, manager_b, agent], &[old_a, old_b], &[l]);

    let finding = &report.missing_relations[0];
    assert_eq!(finding.reason, RelationIssue::NoActiveManager);
    assert_eq!(finding.expected_manager_id, None);
  }

  #[test]
  fn findings_are_deduplicated_per_agent() {
    let manager = profile(ProfileKind::BranchManager, "MGR-A");
    let agent = profile(ProfileKind::SalesAgent, "AGT-001");
    let leads = vec![
      lead(Some(agent.profile_id), None),
      lead(Some(agent.profile_id), None),
      lead(Some(agent.profile_id), None),
    ];

    let report = analyze(&[manager, agent], &[], &leads);
    assert_eq!(report.missing_relations.len(), 1);
  }

  #[test]
  fn unknown_agent_reference_is_flagged() {
    let ghost = Uuid::new_v4();
    let report = analyze(&[], &[], &[lead(Some(ghost), None)]);

    let finding = &report.missing_relations[0];
    assert_eq!(finding.agent_id, ghost);
    assert_eq!(finding.reason, RelationIssue::UnknownAgent);
    assert_eq!(finding.expected_manager_id, None);
  }

  #[test]
  fn terminated_agents_are_left_out_of_the_pass() {
    let mut agent = profile(ProfileKind::SalesAgent, "AGT-001");
    agent.status = ProfileStatus::Terminated;
    let l = lead(Some(agent.profile_id), None);

    let report = analyze(&[agent], &[], &[l]);
    assert!(report.missing_relations.is_empty());
  }

  #[test]
  fn manager_stats_count_active_teams() {
    let manager_a = profile(ProfileKind::BranchManager, "MGR-A");
    let manager_b = profile(ProfileKind::BranchManager, "MGR-B");
    let agent_1 = profile(ProfileKind::SalesAgent, "AGT-1");
    let agent_2 = profile(ProfileKind::SalesAgent, "AGT-2");
    let agent_3 = profile(ProfileKind::SalesAgent, "AGT-3");

    let relations = vec![
      relation(&agent_1, &manager_a, RelationStatus::Active),
      relation(&agent_2, &manager_a, RelationStatus::Active),
      // Ended relations do not count toward team size.
      relation(&agent_3, &manager_a, RelationStatus::Ended),
      relation(&agent_3, &manager_b, RelationStatus::Active),
    ];

    let profiles = vec![
      manager_a.clone(),
      manager_b.clone(),
      agent_1,
      agent_2,
      agent_3,
    ];
    let report = analyze(&profiles, &relations, &[]);

    let stats_a = report
      .manager_stats
      .iter()
      .find(|s| s.manager_id == manager_a.profile_id)
      .unwrap();
    let stats_b = report
      .manager_stats
      .iter()
      .find(|s| s.manager_id == manager_b.profile_id)
      .unwrap();
    assert_eq!(stats_a.team_count, 2);
    assert_eq!(stats_b.team_count, 1);

    assert_eq!(report.summary.total_profiles, 5);
    assert_eq!(report.summary.total_relations, 3);
    assert_eq!(report.summary.sales_agents, 3);
  }
}
