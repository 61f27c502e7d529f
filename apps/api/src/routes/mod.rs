pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::auth::handlers as auth;
use crate::dashboard::handlers as dashboard;
use crate::ikigai::handlers as ikigai;
use crate::mentor::handlers as mentor;
use crate::profile::handlers as profile;
use crate::projects::handlers as projects;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth and navigation
        .route("/api/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/auth/session", get(auth::handle_get_session))
        .route("/api/navigate", get(auth::handle_navigate))
        // Ikigai entries and diagram
        .route("/api/ikigai", post(ikigai::handle_save_ikigai))
        .route("/api/ikigai/section", patch(ikigai::handle_update_section))
        .route(
            "/api/ikigai/:email",
            get(ikigai::handle_get_ikigai).delete(ikigai::handle_delete_ikigai),
        )
        .route("/api/ikigai/:email/chart.svg", get(ikigai::handle_chart))
        // Ikigai dialogue
        .route(
            "/api/ikigai/dialogue",
            post(ikigai::handle_start_dialogue)
                .get(ikigai::handle_get_dialogue)
                .delete(ikigai::handle_reset_dialogue),
        )
        .route("/api/ikigai/dialogue/answer", post(ikigai::handle_answer))
        // Profile and dashboard
        .route(
            "/api/profile",
            get(profile::handle_get_profile)
                .patch(profile::handle_update_profile)
                .delete(profile::handle_delete_profile),
        )
        .route("/api/dashboard", get(dashboard::handle_dashboard))
        // Projects
        .route(
            "/api/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/api/projects/:id",
            put(projects::handle_update_project).delete(projects::handle_delete_project),
        )
        // Mentors and feedback
        .route("/api/mentors", get(mentor::handle_list_mentors))
        .route(
            "/api/feedback",
            get(mentor::handle_list_feedback).post(mentor::handle_create_feedback),
        )
        .route(
            "/api/feedback/:id/resolve",
            patch(mentor::handle_resolve_feedback),
        )
        // Admin
        .route("/api/admin/users", get(admin::handle_list_users))
        .route("/api/admin/mentors", get(admin::handle_list_mentors))
        .route(
            "/api/admin/mentors/:id/approval",
            patch(admin::handle_set_mentor_approval),
        )
        .route("/api/admin/projects", get(admin::handle_list_projects))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::session::testing::StubAuth;
    use crate::auth::session::{SessionCacheConfig, SessionStore};
    use crate::ikigai::dialogue::{DialogueRegistry, TOTAL_QUESTIONS};
    use crate::store::{MemoryStore, Store};

    const STUDENT: &str = "stu@uni.edu";
    const OTHER_STUDENT: &str = "eve@uni.edu";
    const MENTOR: &str = "men@uni.edu";
    const ADMIN: &str = "adm@uni.edu";

    const MIXED_CASE: &str = "Mix@Uni.edu";

    fn users() -> StubAuth {
        StubAuth::new()
            .with_user(STUDENT, "student")
            .with_user(OTHER_STUDENT, "student")
            .with_user(MENTOR, "mentor")
            .with_user(ADMIN, "admin")
            .with_user(MIXED_CASE, "student")
    }

    async fn app_with(auth: StubAuth) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sessions =
            SessionStore::new(Arc::new(auth), store.clone(), SessionCacheConfig::default());
        sessions.init().await;
        let router = build_router(AppState {
            store: store.clone(),
            sessions,
            dialogues: Arc::new(DialogueRegistry::new()),
        });
        (router, store)
    }

    async fn app() -> Router {
        app_with(users()).await.0
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        as_user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(email) = as_user {
            req = req.header(header::AUTHORIZATION, format!("Bearer token-{email}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn profile_id(app: &Router, email: &str) -> String {
        let (status, body) = call(app, Method::GET, "/api/profile", Some(email), None).await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_navigate_guards_admin_page() {
        let app = app().await;

        let (_, body) = call(&app, Method::GET, "/api/navigate?path=/admin", Some(STUDENT), None).await;
        assert_eq!(body["outcome"], "redirect");
        assert_eq!(body["to"], "/dashboard");

        let (_, body) = call(&app, Method::GET, "/api/navigate?path=/admin", Some(ADMIN), None).await;
        assert_eq!(body["outcome"], "render");

        let (_, body) = call(&app, Method::GET, "/api/navigate?path=/projects", None, None).await;
        assert_eq!(body["outcome"], "redirect_to_login");
        assert_eq!(body["to"], "/login");

        let (status, _) = call(&app, Method::GET, "/api/navigate?path=/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_protected_api_requires_token() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/api/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_session_endpoint_reports_state() {
        let app = app().await;
        let (_, body) = call(&app, Method::GET, "/api/auth/session", None, None).await;
        assert_eq!(body["status"], "signed_out");

        let (_, body) = call(&app, Method::GET, "/api/auth/session", Some(MENTOR), None).await;
        assert_eq!(body["status"], "signed_in");
        assert_eq!(body["profile"]["role"], "mentor");
    }

    #[tokio::test]
    async fn test_sign_in_returns_landing_page() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": MENTOR, "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["landing_page"], "/mentor");
        assert_eq!(body["access_token"], format!("token-{MENTOR}"));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": MENTOR, "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ikigai_save_creates_then_updates() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(STUDENT),
            Some(json!({ "email": STUDENT, "whatILove": ["robots"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["outcome"], "created");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(STUDENT),
            Some(json!({ "email": STUDENT, "whatILove": ["robots", "poetry"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "updated");

        let (_, body) = call(&app, Method::GET, &format!("/api/ikigai/{STUDENT}"), Some(STUDENT), None).await;
        assert_eq!(body["whatILove"], json!(["robots", "poetry"]));
    }

    #[tokio::test]
    async fn test_missing_ikigai_reads_as_empty() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, &format!("/api/ikigai/{STUDENT}"), Some(STUDENT), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["whatILove"], json!([]));
        assert_eq!(body["whatICanBePaidFor"], json!([]));
    }

    #[tokio::test]
    async fn test_students_cannot_touch_other_entries() {
        let app = app().await;
        let uri = format!("/api/ikigai/{OTHER_STUDENT}");
        let (status, _) = call(&app, Method::GET, &uri, Some(STUDENT), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(STUDENT),
            Some(json!({ "email": OTHER_STUDENT })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, Method::GET, &uri, Some(MENTOR), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_section_update_replaces_one_list() {
        let app = app().await;
        call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(STUDENT),
            Some(json!({ "email": STUDENT, "whatILove": ["a"], "whatImGoodAt": ["b"] })),
        )
        .await;
        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/ikigai/section",
            Some(STUDENT),
            Some(json!({ "email": STUDENT, "section": "whatImGoodAt", "items": ["c", "  "] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["whatILove"], json!(["a"]));
        assert_eq!(body["whatImGoodAt"], json!(["c"]));
    }

    #[tokio::test]
    async fn test_dialogue_flow_persists_answers() {
        let app = app().await;
        let (status, body) = call(&app, Method::POST, "/api/ikigai/dialogue", Some(STUDENT), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answered"], 0);
        assert_eq!(body["current_question"], "What activities make you lose track of time?");

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/ikigai/dialogue/answer",
            Some(STUDENT),
            Some(json!({ "answer": "   " })),
        )
        .await;
        assert_eq!(body["outcome"]["kind"], "ignored");
        assert_eq!(body["dialogue"]["answered"], 0);

        let mut last = Value::Null;
        for i in 0..TOTAL_QUESTIONS {
            let (status, body) = call(
                &app,
                Method::POST,
                "/api/ikigai/dialogue/answer",
                Some(STUDENT),
                Some(json!({ "answer": format!("math idea {i}") })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            last = body;
        }
        assert_eq!(last["outcome"]["kind"], "completed");
        assert_eq!(last["dialogue"]["complete"], true);

        let (_, stored) = call(&app, Method::GET, &format!("/api/ikigai/{STUDENT}"), Some(STUDENT), None).await;
        assert_eq!(stored["whatILove"].as_array().unwrap().len(), 4);
        assert_eq!(stored["whatICanBePaidFor"][3], "math idea 15");
        let summary = stored["summary"].as_str().unwrap();
        assert!(summary.ends_with("focus on a career that combines math, idea, 0."));

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ikigai/dialogue/answer",
            Some(STUDENT),
            Some(json!({ "answer": "extra" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_answer_without_dialogue_is_not_found() {
        let app = app().await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ikigai/dialogue/answer",
            Some(STUDENT),
            Some(json!({ "answer": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chart_is_svg() {
        let app = app().await;
        let req = Request::builder()
            .uri(format!("/api/ikigai/{STUDENT}/chart.svg?active=whatILove"))
            .header(header::AUTHORIZATION, format!("Bearer token-{STUDENT}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn test_admin_routes_are_admin_only() {
        let app = app().await;
        let (status, _) = call(&app, Method::GET, "/api/admin/users", Some(STUDENT), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        profile_id(&app, STUDENT).await;
        let (status, body) = call(&app, Method::GET, "/api/admin/users", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_mentor_approval_hides_mentor_from_directory() {
        let app = app().await;
        let mentor_id = profile_id(&app, MENTOR).await;

        let (_, mentors) = call(&app, Method::GET, "/api/mentors", Some(STUDENT), None).await;
        assert_eq!(mentors.as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/admin/mentors/{mentor_id}/approval"),
            Some(ADMIN),
            Some(json!({ "approved": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mentor_approved"], false);

        let (_, mentors) = call(&app, Method::GET, "/api/mentors", Some(STUDENT), None).await;
        assert!(mentors.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_projects_crud_and_filter() {
        let app = app().await;
        let project = |title: &str, status: &str| {
            json!({
                "title": title,
                "description": "",
                "status": status,
                "skills": ["Python"],
                "start_date": "2023-05-01",
                "progress": 50
            })
        };
        let (status, created) = call(
            &app,
            Method::POST,
            "/api/projects",
            Some(STUDENT),
            Some(project("AI Image Generator", "ongoing")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        call(&app, Method::POST, "/api/projects", Some(STUDENT), Some(project("Churn", "completed"))).await;

        let (_, ongoing) = call(&app, Method::GET, "/api/projects?status=ongoing", Some(STUDENT), None).await;
        assert_eq!(ongoing.as_array().unwrap().len(), 1);
        let (_, all) = call(&app, Method::GET, "/api/projects?status=all", Some(STUDENT), None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let id = created["id"].as_str().unwrap();
        let (status, _) = call(&app, Method::DELETE, &format!("/api/projects/{id}"), Some(OTHER_STUDENT), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/projects",
            Some(STUDENT),
            Some(json!({ "title": "x", "status": "planned", "start_date": "2023-01-01", "progress": 140 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_feedback_round_trip() {
        let app = app().await;
        let student_id = profile_id(&app, STUDENT).await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/feedback",
            Some(STUDENT),
            Some(json!({ "student_id": student_id, "message": "self-praise" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = call(
            &app,
            Method::POST,
            "/api/feedback",
            Some(MENTOR),
            Some(json!({ "student_id": student_id, "message": "Quantify your results." })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");

        let (_, dashboard) = call(&app, Method::GET, "/api/dashboard", Some(STUDENT), None).await;
        assert_eq!(dashboard["pending_feedback"], 1);

        let id = created["id"].as_str().unwrap();
        let (status, resolved) = call(
            &app,
            Method::PATCH,
            &format!("/api/feedback/{id}/resolve"),
            Some(STUDENT),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["status"], "resolved");
    }

    #[tokio::test]
    async fn test_delete_account_removes_profile() {
        let app = app().await;
        profile_id(&app, OTHER_STUDENT).await;
        let (status, _) = call(&app, Method::DELETE, "/api/profile", Some(OTHER_STUDENT), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, users) = call(&app, Method::GET, "/api/admin/users", Some(ADMIN), None).await;
        assert!(users
            .as_array()
            .unwrap()
            .iter()
            .all(|u| u["email"] != OTHER_STUDENT));
    }

    #[tokio::test]
    async fn test_dialogue_answer_keeps_other_categories() {
        let app = app().await;
        call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(STUDENT),
            Some(json!({
                "email": STUDENT,
                "whatTheWorldNeeds": ["clean water"],
                "summary": "drafted by hand"
            })),
        )
        .await;
        call(&app, Method::POST, "/api/ikigai/dialogue", Some(STUDENT), None).await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ikigai/dialogue/answer",
            Some(STUDENT),
            Some(json!({ "answer": "robots" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, stored) = call(&app, Method::GET, &format!("/api/ikigai/{STUDENT}"), Some(STUDENT), None).await;
        assert_eq!(stored["whatILove"], json!(["robots"]));
        assert_eq!(stored["whatTheWorldNeeds"], json!(["clean water"]));
        assert_eq!(stored["summary"], "drafted by hand");
    }

    #[tokio::test]
    async fn test_delete_account_removes_mixed_case_ikigai_entry() {
        let (app, store) = app_with(users()).await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ikigai",
            Some(MIXED_CASE),
            Some(json!({ "email": MIXED_CASE, "whatILove": ["x"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(store.get_ikigai("mix@uni.edu").await.unwrap().is_some());

        let (status, _) = call(&app, Method::DELETE, "/api/profile", Some(MIXED_CASE), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(store.get_ikigai("mix@uni.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_account_succeeds_when_upstream_sign_out_fails() {
        let (app, store) = app_with(users().with_sign_out_down()).await;
        let id = profile_id(&app, OTHER_STUDENT).await;

        let (status, _) = call(&app, Method::DELETE, "/api/profile", Some(OTHER_STUDENT), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let id = id.parse::<uuid::Uuid>().unwrap();
        assert!(store.get_profile(id).await.unwrap().is_none());
    }
}
