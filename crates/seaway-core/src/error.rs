//! Error types for `seaway-core`.

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of a failure, used by transport layers to pick a
/// status code without matching on backend-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
  /// Malformed input to a write; nothing was persisted.
  Validation,
  /// A concurrent write on the same agent lost the race; safe to retry.
  Conflict,
  NotFound,
  Internal,
}

/// Implemented by every store error type so generic consumers can classify
/// failures without knowing the backend.
pub trait Classify {
  fn fault_kind(&self) -> FaultKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("agent profile not found: {0}")]
  AgentNotFound(Uuid),

  #[error("manager profile not found: {0}")]
  ManagerNotFound(Uuid),

  #[error("lead not found: {0}")]
  LeadNotFound(Uuid),

  #[error("profile {0} is not a sales agent")]
  NotASalesAgent(Uuid),

  #[error("profile {0} is not a branch manager")]
  NotABranchManager(Uuid),

  #[error("agent {0} is not active")]
  AgentNotActive(Uuid),

  #[error("manager {0} is not active")]
  ManagerNotActive(Uuid),

  #[error("cannot normalize customer phone: {0:?}")]
  InvalidPhone(String),

  #[error("reassignment requires a manager or an agent")]
  NothingToReassign,

  #[error("only sales agents may reference a manager profile")]
  ManagerOnNonAgent,

  #[error("affiliate code already issued: {0:?}")]
  DuplicateAffiliateCode(String),

  #[error("agent {0} was reassigned concurrently; re-check and retry")]
  RelationConflict(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Classify for Error {
  fn fault_kind(&self) -> FaultKind {
    match self {
      Error::ProfileNotFound(_)
      | Error::AgentNotFound(_)
      | Error::ManagerNotFound(_)
      | Error::LeadNotFound(_) => FaultKind::NotFound,

      Error::NotASalesAgent(_)
      | Error::NotABranchManager(_)
      | Error::AgentNotActive(_)
      | Error::ManagerNotActive(_)
      | Error::InvalidPhone(_)
      | Error::NothingToReassign
      | Error::ManagerOnNonAgent
      | Error::DuplicateAffiliateCode(_) => FaultKind::Validation,

      Error::RelationConflict(_) => FaultKind::Conflict,

      Error::Serialization(_) => FaultKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
