//! Handlers for `/relations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/relations/check` | Full reconciliation report |
//! | `POST` | `/relations/repair` | Body: [`RepairBody`]; operator-approved fix |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
};
use seaway_core::{
  reconcile::{RelationReport, check_relations},
  store::HierarchyStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Check ────────────────────────────────────────────────────────────────────

/// `GET /relations/check` — run the reconciliation analysis. Read-only.
pub async fn check<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<RelationReport>, ApiError>
where
  S: HierarchyStore,
{
  let report = check_relations(store.as_ref())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(report))
}

// ─── Repair ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /relations/repair`.
#[derive(Debug, Deserialize)]
pub struct RepairBody {
  pub agent_id:   Uuid,
  pub manager_id: Uuid,
  /// Operator identity recorded on the history events. Defaults to "admin".
  pub actor:      Option<String>,
}

/// `POST /relations/repair` — returns `{ ok, updated_lead_count }`.
pub async fn repair<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RepairBody>,
) -> Result<Json<Value>, ApiError>
where
  S: HierarchyStore,
{
  let actor = body.actor.as_deref().unwrap_or("admin");
  let outcome = store
    .repair_relation(body.agent_id, body.manager_id, actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({
    "ok": true,
    "updated_lead_count": outcome.updated_lead_count,
  })))
}
