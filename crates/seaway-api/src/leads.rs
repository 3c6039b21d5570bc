//! Handlers for `/leads` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leads` | Optional `?phone=...` (raw; normalized server-side) or `?agent_id=...` |
//! | `POST` | `/leads` | Body: [`CreateBody`]; returns 201 + stored lead |
//! | `GET`  | `/leads/:id` | 404 if not found |
//! | `GET`  | `/leads/:id/history` | Attribution events, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use seaway_core::{
  history::AttributionEvent,
  lead::{CustomerLead, LeadSource, NewLead},
  phone::normalize_phone,
  store::HierarchyStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub phone:    Option<String>,
  pub agent_id: Option<Uuid>,
}

/// `GET /leads[?phone=...][&agent_id=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CustomerLead>>, ApiError>
where
  S: HierarchyStore,
{
  let leads = match (&params.phone, params.agent_id) {
    (Some(raw), _) => {
      let phone = normalize_phone(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("unusable phone: {raw:?}")))?;
      store.leads_for_phone(&phone).await
    }
    (None, Some(agent_id)) => store.leads_for_agent(agent_id).await,
    (None, None) => store.list_leads().await,
  }
  .map_err(ApiError::from_store)?;
  Ok(Json(leads))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /leads`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub customer_phone: String,
  pub manager_id:     Option<Uuid>,
  pub agent_id:       Option<Uuid>,
  pub stage:          Option<String>,
  pub source:         Option<LeadSource>,
}

impl From<CreateBody> for NewLead {
  fn from(b: CreateBody) -> Self {
    NewLead {
      customer_phone: b.customer_phone,
      manager_id:     b.manager_id,
      agent_id:       b.agent_id,
      stage:          b.stage.unwrap_or_else(|| "new".to_string()),
      source:         b.source.unwrap_or_default(),
    }
  }
}

/// `POST /leads` — returns 201 + the stored lead.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HierarchyStore,
{
  let lead = store
    .add_lead(NewLead::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(lead)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CustomerLead>, ApiError>
where
  S: HierarchyStore,
{
  let lead = store
    .get_lead(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("lead {id} not found")))?;
  Ok(Json(lead))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id/history` — attribution events, newest first.
///
/// 404s for an unknown lead so an empty history and a bad id stay
/// distinguishable.
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttributionEvent>>, ApiError>
where
  S: HierarchyStore,
{
  store
    .get_lead(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("lead {id} not found")))?;
  let events = store
    .events_for_lead(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(events))
}
