//! Handlers for `/ownership` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ownership?phone=...` | Resolve by customer phone (raw input OK) |
//! | `GET`  | `/ownership?profile_id=...` | Resolve a self-registered partner |
//! | `POST` | `/ownership/reassign` | Body: [`ReassignBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use seaway_core::{
  ownership::{AffiliateOwnership, CustomerRef, resolve_ownership},
  store::{HierarchyStore, ReassignOutcome, ReassignRequest},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Resolve ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
  pub phone:      Option<String>,
  pub profile_id: Option<Uuid>,
}

/// `GET /ownership?phone=...` or `?profile_id=...`
///
/// Exactly one selector must be supplied. Resolution itself never 404s:
/// an unmatched customer resolves to the head-office fallback.
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ResolveParams>,
) -> Result<Json<AffiliateOwnership>, ApiError>
where
  S: HierarchyStore,
{
  let customer = match (params.phone, params.profile_id) {
    (Some(phone), None) => CustomerRef::Phone(phone),
    (None, Some(id)) => CustomerRef::Profile(id),
    _ => {
      return Err(ApiError::BadRequest(
        "supply exactly one of ?phone= or ?profile_id=".to_string(),
      ));
    }
  };

  let ownership = resolve_ownership(store.as_ref(), &customer)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ownership))
}

// ─── Reassign ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /ownership/reassign`.
#[derive(Debug, Deserialize)]
pub struct ReassignBody {
  pub customer_phone: String,
  pub manager_id:     Option<Uuid>,
  pub agent_id:       Option<Uuid>,
  pub note:           Option<String>,
  /// Operator identity recorded on the history event.
  pub created_by:     String,
}

/// `POST /ownership/reassign` — returns `{ lead_id, created }`.
pub async fn reassign<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ReassignBody>,
) -> Result<Json<ReassignOutcome>, ApiError>
where
  S: HierarchyStore,
{
  let outcome = store
    .reassign_ownership(ReassignRequest {
      customer_phone: body.customer_phone,
      manager_id:     body.manager_id,
      agent_id:       body.agent_id,
      note:           body.note,
      created_by:     body.created_by,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcome))
}
