//! Handlers for `/profiles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles` | Optional `?kind=headquarters\|branch_manager\|sales_agent` |
//! | `POST` | `/profiles` | Body: [`CreateBody`]; returns 201 + stored profile |
//! | `GET`  | `/profiles/:id` | 404 if not found |
//! | `POST` | `/profiles/:id/status` | Body: `{"status":"terminated"}` — soft removal |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use seaway_core::{
  profile::{AffiliateProfile, NewProfile, ProfileKind, ProfileStatus},
  store::HierarchyStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind: Option<ProfileKind>,
}

/// `GET /profiles[?kind=<kind>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AffiliateProfile>>, ApiError>
where
  S: HierarchyStore,
{
  let profiles = store
    .list_profiles(params.kind)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(profiles))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /profiles`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub kind:               ProfileKind,
  pub name:               String,
  pub affiliate_code:     String,
  pub status:             Option<ProfileStatus>,
  pub branch_label:       Option<String>,
  pub phone:              Option<String>,
  pub manager_profile_id: Option<Uuid>,
}

impl From<CreateBody> for NewProfile {
  fn from(b: CreateBody) -> Self {
    NewProfile {
      kind:               b.kind,
      status:             b.status.unwrap_or(ProfileStatus::Active),
      name:               b.name,
      affiliate_code:     b.affiliate_code,
      branch_label:       b.branch_label,
      phone:              b.phone,
      manager_profile_id: b.manager_profile_id,
    }
  }
}

/// `POST /profiles` — returns 201 + the stored profile.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HierarchyStore,
{
  let profile = store
    .add_profile(NewProfile::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profiles/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AffiliateProfile>, ApiError>
where
  S: HierarchyStore,
{
  let profile = store
    .get_profile(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}

// ─── Status transition ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ProfileStatus,
}

/// `POST /profiles/:id/status` — body: `{"status":"suspended"}`.
///
/// Removal is `{"status":"terminated"}`; there is no DELETE route.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<AffiliateProfile>, ApiError>
where
  S: HierarchyStore,
{
  let profile = store
    .set_profile_status(id, body.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(profile))
}
