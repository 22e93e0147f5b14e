//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (등록, 로그인, 토큰 갱신, 로그아웃)
//! - `categories`: 카테고리 목록·트리·편집
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `likes`: 좋아요 등록
//! - `posts`: 게시글 목록·상세·검색·편집, `AppState`
//! - `tags`: 태그 목록·편집

pub mod auth;
pub mod categories;
pub mod health;
pub mod likes;
pub mod posts;
pub mod tags;

pub use categories::*;
pub use health::*;
pub use likes::*;
pub use posts::*;
pub use tags::*;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// 모든 API 라우트를 `/api` 아래에 묶은 라우터를 만듭니다.
///
/// 경로 끝의 `/`는 기존 클라이언트가 쓰던 URL 그대로입니다.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        // 게시글
        .route("/posts/", get(list_posts).post(create_post))
        .route("/posts/simple_search", get(simple_search))
        .route("/posts/{id}/", patch(update_post).delete(delete_post))
        .route("/posts/{id}/{slug}/", get(get_post_detail))
        // 좋아요
        .route("/like/", post(like_post))
        // 태그
        .route("/tags/", get(list_tags).post(create_tag))
        .route("/tags/{id}/", patch(update_tag).delete(delete_tag))
        // 카테고리
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/main/", get(list_main_categories))
        .route("/categories/main/{id}/", get(get_main_category))
        .route(
            "/categories/{id}/",
            patch(update_category).delete(delete_category),
        )
        .route("/health", get(health_check))
        .with_state(state);

    // 읽기 API는 다른 도메인의 프론트엔드에서 호출합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        middleware::auth::{issue_token, TokenKind},
    };
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    async fn test_app() -> (Router, AppState) {
        let pool = db::test_pool().await;
        let default = db::ensure_default_category(&pool, "Programming")
            .await
            .unwrap();
        let state = AppState {
            pool,
            jwt_secret: SECRET.to_string(),
            media_url: "/media/".to_string(),
            page_size: 12,
            default_category_id: default.id,
        };
        (build_router(state.clone()), state)
    }

    async fn seed(state: &AppState, req: crate::models::CreatePostRequest) -> i64 {
        db::create_post(&state.pool, &req, state.default_category_id)
            .await
            .unwrap()
            .id
    }

    fn get_from(uri: &str, ip: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        get_from(uri, "1.1.1.1")
    }

    fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "1.1.1.1")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed(mut request: Request<Body>) -> Request<Body> {
        let token = issue_token(TokenKind::Access, "editor", SECRET).unwrap();
        request
            .headers_mut()
            .insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        request
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn titles(body: &Value) -> Vec<String> {
        body["post_list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = test_app().await;
        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn anonymous_callers_only_see_public_posts() {
        let (app, state) = test_app().await;
        seed(&state, db::post_request("Public")).await;
        let mut private = db::post_request("Private");
        private.is_public = Some(false);
        let private_id = seed(&state, private).await;

        let (status, body) = send(&app, get("/api/posts/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["total_pages"], 1);
        assert_eq!(body["current_page"], 1);
        assert_eq!(titles(&body), vec!["Public"]);

        let (_, body) = send(&app, authed(get("/api/posts/"))).await;
        assert_eq!(body["count"], 2);

        let uri = format!("/api/posts/{}/private/", private_id);
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, authed(get(&uri))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_token_is_rejected_even_on_public_endpoints() {
        let (app, _) = test_app().await;
        let mut request = get("/api/posts/");
        request
            .headers_mut()
            .insert(AUTHORIZATION, "Bearer not-a-jwt".parse().unwrap());

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid_token");
    }

    #[tokio::test]
    async fn keyword_terms_are_anded() {
        let (app, state) = test_app().await;
        let mut both = db::post_request("Django tips");
        both.body = "Building an API".to_string();
        seed(&state, both).await;
        let mut django = db::post_request("Django basics");
        django.body = "templates".to_string();
        seed(&state, django).await;
        seed(&state, db::post_request("API design")).await;

        let (status, body) = send(&app, get("/api/posts/?keyword=django%20api")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Django tips"]);
    }

    #[tokio::test]
    async fn category_and_keyword_filters_combine() {
        let (app, state) = test_app().await;
        let life = db::create_category(
            &state.pool,
            &crate::models::CreateCategoryRequest {
                name: "Life".to_string(),
                category_type: crate::models::CategoryType::Main,
                parent_category: None,
            },
        )
        .await
        .unwrap();

        let mut rust_life = db::post_request("Rust in life");
        rust_life.category = Some(life.id);
        seed(&state, rust_life).await;
        let mut cooking = db::post_request("Cooking");
        cooking.category = Some(life.id);
        seed(&state, cooking).await;
        seed(&state, db::post_request("Rust at work")).await;

        let (status, body) = send(&app, get(&format!("/api/posts/?category={}", life.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        let uri = format!("/api/posts/?category={}&keyword=rust", life.id);
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Rust in life"]);
        assert_eq!(body["post_list"][0]["category"]["name"], "Life");
    }

    #[tokio::test]
    async fn repeated_tag_parameter_is_idempotent() {
        let (app, state) = test_app().await;
        let tag = db::create_tag(&state.pool, "Rust").await.unwrap();
        let mut tagged = db::post_request("Tagged");
        tagged.tags = vec![tag.id];
        seed(&state, tagged).await;
        seed(&state, db::post_request("Untagged")).await;

        let (_, once) = send(&app, get(&format!("/api/posts/?tag={}", tag.id))).await;
        let (_, twice) = send(
            &app,
            get(&format!("/api/posts/?tag={}&tag={}", tag.id, tag.id)),
        )
        .await;
        assert_eq!(titles(&once), vec!["Tagged"]);
        assert_eq!(titles(&twice), vec!["Tagged"]);
        assert_eq!(once["post_list"][0]["tags"][0]["name"], "Rust");
    }

    #[tokio::test]
    async fn invalid_list_parameters() {
        let (app, state) = test_app().await;

        let (status, body) = send(&app, get("/api/posts/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["total_pages"], 1);

        let (status, body) = send(&app, get("/api/posts/?tag=rust")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");

        seed(&state, db::post_request("Only")).await;
        let (status, _) = send(&app, get("/api/posts/?page=2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn view_count_is_distinct_per_ip_and_day() {
        let (app, state) = test_app().await;
        let id = seed(&state, db::post_request("Viewed")).await;
        let uri = format!("/api/posts/{}/viewed/", id);

        let (status, first) = send(&app, get_from(&uri, "1.1.1.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["view_counts"], 1);
        let (_, again) = send(&app, get_from(&uri, "1.1.1.1")).await;
        assert_eq!(again["view_counts"], 1);
        let (_, other) = send(&app, get_from(&uri, "2.2.2.2")).await;
        assert_eq!(other["view_counts"], 2);

        let (_, list) = send(&app, get("/api/posts/")).await;
        assert_eq!(list["post_list"][0]["view_counts"], 2);

        let (status, _) = send(&app, get("/api/posts/abc/viewed/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn detail_renders_markdown_and_category_tree() {
        let (app, state) = test_app().await;
        let mut req = db::post_request("Rendered");
        req.body = "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |".to_string();
        req.thumbnail = Some("thumbs/rendered.png".to_string());
        let id = seed(&state, req).await;

        let (_, body) = send(&app, get(&format!("/api/posts/{}/rendered/", id))).await;
        let html = body["text_to_html"].as_str().unwrap();
        assert!(html.contains("<table>"));
        assert_eq!(body["thumbnail"], "/media/thumbs/rendered.png");
        assert_eq!(body["category"]["name"], "Programming");
        assert_eq!(body["category"]["category_type"], "main");
        assert!(body["category"]["subcategories"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn like_then_duplicate_like() {
        let (app, state) = test_app().await;
        let id = seed(&state, db::post_request("Likeable")).await;
        let like = || send_json("POST", "/api/like/", json!({ "post_id": id }));

        let (status, body) = send(&app, like()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "You liked this post.");

        let (status, body) = send(&app, like()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You have already liked this post.");

        let uri = format!("/api/posts/{}/likeable/", id);
        let (_, detail) = send(&app, get_from(&uri, "1.1.1.1")).await;
        assert_eq!(detail["likes"], 1);
        assert_eq!(detail["is_liked"], true);
        let (_, detail) = send(&app, get_from(&uri, "3.3.3.3")).await;
        assert_eq!(detail["is_liked"], false);
    }

    #[tokio::test]
    async fn like_rejects_bad_payloads_and_hidden_posts() {
        let (app, state) = test_app().await;
        let mut private = db::post_request("Hidden");
        private.is_public = Some(false);
        let hidden = seed(&state, private).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/like/")
            .header("x-forwarded-for", "1.1.1.1")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");

        let (status, _) = send(
            &app,
            send_json("POST", "/api/like/", json!({ "post_id": "one" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            send_json("POST", "/api/like/", json!({ "post_id": hidden })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            send_json("POST", "/api/like/", json!({ "post_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn main_category_nests_its_subcategories() {
        let (app, _) = test_app().await;

        let (status, main) = send(
            &app,
            authed(send_json(
                "POST",
                "/api/categories/",
                json!({ "name": "Backend", "category_type": "main" }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let main_id = main["id"].as_i64().unwrap();

        let mut sub_id = 0;
        for name in ["Rust", "Go"] {
            let (status, sub) = send(
                &app,
                authed(send_json(
                    "POST",
                    "/api/categories/",
                    json!({ "name": name, "category_type": "sub", "parent_category": main_id }),
                )),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            sub_id = sub["id"].as_i64().unwrap();
        }

        let (status, tree) = send(&app, get(&format!("/api/categories/main/{}/", main_id))).await;
        assert_eq!(status, StatusCode::OK);
        let mut names: Vec<&str> = tree["subcategories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|sub| sub["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Go", "Rust"]);
        assert_eq!(tree["subcategories"][0]["parent_category"], main_id);

        let (_, mains) = send(&app, get("/api/categories/main/")).await;
        assert_eq!(mains.as_array().unwrap().len(), 2);

        let (status, _) = send(&app, get(&format!("/api/categories/main/{}/", sub_id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            authed(send_json(
                "POST",
                "/api/categories/",
                json!({ "name": "Async", "category_type": "sub", "parent_category": sub_id }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn category_list_counts_posts() {
        let (app, state) = test_app().await;
        seed(&state, db::post_request("First")).await;
        seed(&state, db::post_request("Second")).await;

        let (status, body) = send(&app, get("/api/categories/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Programming");
        assert_eq!(body[0]["post_count"], 2);
    }

    #[tokio::test]
    async fn default_category_cannot_be_deleted() {
        let (app, state) = test_app().await;
        let uri = format!("/api/categories/{}/", state.default_category_id);
        let request = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(&app, authed(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tag_writes_require_auth_and_unique_names() {
        let (app, _) = test_app().await;
        let create = || send_json("POST", "/api/tags/", json!({ "name": "Rust" }));

        let (status, body) = send(&app, create()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "missing_token");

        let (status, tag) = send(&app, authed(create())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tag["slug"], "rust");

        let (status, body) = send(&app, authed(create())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");

        let (_, tags) = send(&app, get("/api/tags/")).await;
        assert_eq!(tags[0]["name"], "Rust");
        assert_eq!(tags[0]["post_count"], 0);
    }

    #[tokio::test]
    async fn post_editing_round() {
        let (app, state) = test_app().await;
        let tag = db::create_tag(&state.pool, "Rust").await.unwrap();

        let (status, created) = send(
            &app,
            authed(send_json(
                "POST",
                "/api/posts/",
                json!({ "title": "Hello World", "body": "# Hi", "tags": [tag.id] }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["slug"], "hello-world");
        assert_eq!(created["category"]["name"], "Programming");
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            authed(send_json(
                "PATCH",
                &format!("/api/posts/{}/", id),
                json!({ "title": "Renamed" }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["slug"], "renamed");
        assert_eq!(updated["tags"][0]["name"], "Rust");

        let (status, _) = send(
            &app,
            authed(send_json(
                "POST",
                "/api/posts/",
                json!({ "title": "Broken", "tags": [999] }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/posts/{}/", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, authed(request)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, authed(get(&format!("/api/posts/{}/renamed/", id)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn simple_search_matches_titles() {
        let (app, state) = test_app().await;
        let id = seed(&state, db::post_request("Learning Rust")).await;
        seed(&state, db::post_request("Django tips")).await;

        let (status, body) = send(&app, get("/api/posts/simple_search?keyword=")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "object_list": [] }));

        let (_, body) = send(&app, get("/api/posts/simple_search")).await;
        assert_eq!(body, json!({ "object_list": [] }));

        let (_, body) = send(&app, get("/api/posts/simple_search?keyword=RUST")).await;
        assert_eq!(
            body,
            json!({ "object_list": [{ "pk": id, "name": "Learning Rust" }] })
        );
    }

    #[tokio::test]
    async fn only_the_first_editor_registers_anonymously() {
        let (app, _) = test_app().await;
        let register = |username: &str| {
            send_json(
                "POST",
                "/api/auth/register",
                json!({ "username": username, "password": "password123" }),
            )
        };

        let (status, body) = send(&app, register("admin")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "admin");
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, register("second")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut request = register("second");
        request
            .headers_mut()
            .insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            send_json(
                "POST",
                "/api/auth/login",
                json!({ "username": "admin", "password": "password123" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["refresh_token"].is_string());
    }

    #[tokio::test]
    async fn refresh_token_rotates_and_is_not_a_bearer_token() {
        let (app, _) = test_app().await;
        let (_, body) = send(
            &app,
            send_json(
                "POST",
                "/api/auth/register",
                json!({ "username": "admin", "password": "password123" }),
            ),
        )
        .await;
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

        let mut request = Request::get("/api/auth/me").body(Body::empty()).unwrap();
        request
            .headers_mut()
            .insert(AUTHORIZATION, format!("Bearer {}", refresh_token).parse().unwrap());
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid_token");

        let refresh = |token: &str| {
            send_json("POST", "/api/auth/refresh", json!({ "refresh_token": token }))
        };
        let (status, body) = send(&app, refresh(&refresh_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["refresh_token"].as_str().unwrap(), refresh_token);

        let (status, _) = send(&app, refresh(&refresh_token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
