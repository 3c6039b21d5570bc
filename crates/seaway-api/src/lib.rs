//! JSON REST API for Seaway.
//!
//! Exposes an axum [`Router`] backed by any [`seaway_core::store::HierarchyStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", seaway_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod leads;
pub mod ownership;
pub mod profiles;
pub mod relations;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use seaway_core::store::HierarchyStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: HierarchyStore + 'static,
{
  Router::new()
    // Profiles
    .route("/profiles", get(profiles::list::<S>).post(profiles::create::<S>))
    .route("/profiles/{id}", get(profiles::get_one::<S>))
    .route("/profiles/{id}/status", post(profiles::set_status::<S>))
    // Leads
    .route("/leads", get(leads::list::<S>).post(leads::create::<S>))
    .route("/leads/{id}", get(leads::get_one::<S>))
    .route("/leads/{id}/history", get(leads::history::<S>))
    // Ownership
    .route("/ownership", get(ownership::resolve::<S>))
    .route("/ownership/reassign", post(ownership::reassign::<S>))
    // Relations
    .route("/relations/check", get(relations::check::<S>))
    .route("/relations/repair", post(relations::repair::<S>))
    .with_state(store)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use seaway_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::api_router;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn oneshot_json(
    store: Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    let resp = api_router(store).oneshot(req).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_profile(
    store: &Arc<SqliteStore>,
    kind: &str,
    name: &str,
    code: &str,
  ) -> Uuid {
    let (status, body) = oneshot_json(
      store.clone(),
      "POST",
      "/profiles",
      Some(json!({ "kind": kind, "name": name, "affiliate_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    Uuid::parse_str(body["profile_id"].as_str().unwrap()).unwrap()
  }

  // ── Profiles ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_profile() {
    let s = store().await;
    let id = create_profile(&s, "sales_agent", "agent one", "AGT-001").await;

    let (status, body) =
      oneshot_json(s, "GET", &format!("/profiles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affiliate_code"], "AGT-001");
    assert_eq!(body["kind"], "sales_agent");
  }

  #[tokio::test]
  async fn unknown_profile_is_404() {
    let s = store().await;
    let (status, body) =
      oneshot_json(s, "GET", &format!("/profiles/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
  }

  #[tokio::test]
  async fn duplicate_code_is_400() {
    let s = store().await;
    create_profile(&s, "sales_agent", "agent one", "AGT-001").await;

    let (status, body) = oneshot_json(
      s,
      "POST",
      "/profiles",
      Some(json!({
        "kind": "sales_agent",
        "name": "agent two",
        "affiliate_code": "AGT-001",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
  }

  #[tokio::test]
  async fn status_route_soft_removes() {
    let s = store().await;
    let id = create_profile(&s, "sales_agent", "agent one", "AGT-001").await;

    let (status, body) = oneshot_json(
      s.clone(),
      "POST",
      &format!("/profiles/{id}/status"),
      Some(json!({ "status": "terminated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "terminated");

    // Still fetchable afterwards.
    let (status, _) =
      oneshot_json(s, "GET", &format!("/profiles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Leads + history ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_lead_normalizes_phone_and_bad_phone_is_400() {
    let s = store().await;
    let (status, body) = oneshot_json(
      s.clone(),
      "POST",
      "/leads",
      Some(json!({ "customer_phone": "010-1234-0000", "source": "import" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer_phone"], "01012340000");

    let (status, _) = oneshot_json(
      s,
      "POST",
      "/leads",
      Some(json!({ "customer_phone": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn history_of_unknown_lead_is_404() {
    let s = store().await;
    let (status, _) = oneshot_json(
      s,
      "GET",
      &format!("/leads/{}/history", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Ownership ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ownership_requires_exactly_one_selector() {
    let s = store().await;
    let (status, _) = oneshot_json(s.clone(), "GET", "/ownership", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/ownership?phone=0101234000&profile_id={}", Uuid::new_v4());
    let (status, _) = oneshot_json(s, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unmatched_phone_resolves_to_fallback_not_404() {
    let s = store().await;
    let (status, body) =
      oneshot_json(s, "GET", "/ownership?phone=01099990000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["owner_kind"], "headquarters");
    assert_eq!(body["owner_profile_id"], Value::Null);
  }

  #[tokio::test]
  async fn lead_agent_resolution_end_to_end() {
    let s = store().await;
    let manager = create_profile(&s, "branch_manager", "manager", "MGR-001").await;
    let agent = create_profile(&s, "sales_agent", "agent", "AGT-001").await;

    let (status, _) = oneshot_json(
      s.clone(),
      "POST",
      "/relations/repair",
      Some(json!({ "agent_id": agent, "manager_id": manager })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = oneshot_json(
      s.clone(),
      "POST",
      "/leads",
      Some(json!({
        "customer_phone": "01012340000",
        "agent_id": agent,
        "manager_id": manager,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
      oneshot_json(s, "GET", "/ownership?phone=010-1234-0000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "lead-agent");
    assert_eq!(body["owner_profile_id"], json!(agent));
    assert_eq!(body["manager_profile"]["profile_id"], json!(manager));
  }

  #[tokio::test]
  async fn reassign_creates_lead_and_shows_up_in_history() {
    let s = store().await;
    let manager = create_profile(&s, "branch_manager", "manager", "MGR-001").await;

    let (status, body) = oneshot_json(
      s.clone(),
      "POST",
      "/ownership/reassign",
      Some(json!({
        "customer_phone": "01077770000",
        "manager_id": manager,
        "created_by": "ops@example.com",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["created"], true);
    let lead_id = body["lead_id"].as_str().unwrap().to_string();

    let (status, events) =
      oneshot_json(s, "GET", &format!("/leads/{lead_id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["created_by"], "ops@example.com");
    assert_eq!(events[0]["change"]["manager_change"]["to"], json!(manager));
  }

  #[tokio::test]
  async fn reassign_without_target_is_400() {
    let s = store().await;
    let (status, _) = oneshot_json(
      s,
      "POST",
      "/ownership/reassign",
      Some(json!({ "customer_phone": "01077770000", "created_by": "ops" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Relations ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn check_then_repair_clears_findings() {
    let s = store().await;
    let manager_a = create_profile(&s, "branch_manager", "manager a", "MGR-A").await;
    let manager_b = create_profile(&s, "branch_manager", "manager b", "MGR-B").await;
    let agent = create_profile(&s, "sales_agent", "agent", "AGT-042").await;

    oneshot_json(
      s.clone(),
      "POST",
      "/relations/repair",
      Some(json!({ "agent_id": agent, "manager_id": manager_a })),
    )
    .await;
    oneshot_json(
      s.clone(),
      "POST",
      "/leads",
      Some(json!({
        "customer_phone": "01012340000",
        "agent_id": agent,
        "manager_id": manager_b,
      })),
    )
    .await;

    let (status, report) =
      oneshot_json(s.clone(), "GET", "/relations/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["missing_relations"], 1);
    let finding = &report["missing_relations"][0];
    assert_eq!(finding["reason"], "manager_mismatch");
    assert_eq!(finding["expected_manager_id"], json!(manager_a));

    let (status, body) = oneshot_json(
      s.clone(),
      "POST",
      "/relations/repair",
      Some(json!({ "agent_id": agent, "manager_id": manager_a })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["updated_lead_count"], 1);

    let (_, report) = oneshot_json(s, "GET", "/relations/check", None).await;
    assert_eq!(report["summary"]["missing_relations"], 0);
  }

  #[tokio::test]
  async fn repair_with_swapped_roles_is_400() {
    let s = store().await;
    let manager = create_profile(&s, "branch_manager", "manager", "MGR-001").await;
    let agent = create_profile(&s, "sales_agent", "agent", "AGT-001").await;

    let (status, _) = oneshot_json(
      s,
      "POST",
      "/relations/repair",
      Some(json!({ "agent_id": manager, "manager_id": agent })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
