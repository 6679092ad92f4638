//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{cors, security};
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let content_endpoint = state.content_endpoint.clone();
    let dynamic_content = post(handlers::content::post_dynamic_content)
        .options(handlers::content::preflight)
        .fallback(handlers::content::method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(cors::allow_origin_layer())
                .layer(cors::allow_methods_layer())
                .layer(cors::allow_headers_layer()),
        );

    Router::new()
        .route("/", get(handlers::pages::get_entry))
        .route("/pages/{name}", get(handlers::pages::get_page))
        .route(&content_endpoint, dynamic_content)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(security::security_headers)),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tessera_definition::{DefinitionStore, MockDefinitionStore};
    use tessera_loaders::LoaderRegistry;
    use tessera_site::Site;

    use crate::auth::SessionAuth;
    use crate::state::AppState;

    pub(crate) const TOKEN: &str = "s3cret";

    pub(crate) const INDEX: &str = r#"{
        "site": {"site": "top_bar/type_1", "title": "Portfolio", "navigationTabs": [
            {"label": "Intro", "target": "p1", "state": "scrollTo"}
        ]},
        "objects": [{"id": "c1", "container": "vertical/type_1", "objects": [
            {"id": "p1", "component": "placeholder/type_1", "dynamic": true,
             "variant": "a", "data": {"a": {"title": "Hi"}}},
            {"id": "vault", "component": "placeholder/type_1", "dynamic": true,
             "protected": true, "variant": "a", "data": {"a": {"title": "Vault"}}}
        ]}]
    }"#;

    pub(crate) fn store() -> Arc<MockDefinitionStore> {
        Arc::new(MockDefinitionStore::new().with_definition("index.json", INDEX))
    }

    pub(crate) fn state(store: &Arc<MockDefinitionStore>) -> Arc<AppState> {
        Arc::new(AppState {
            site: Site::new(
                Arc::clone(store) as Arc<dyn DefinitionStore>,
                Arc::new(LoaderRegistry::with_defaults()),
            ),
            entry: "index.json".to_owned(),
            content_endpoint: "/api/dynamic-content".to_owned(),
            auth: SessionAuth::new("tessera_session", vec![TOKEN.to_owned()]),
            version: "test".to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::test_support::{TOKEN, state, store};
    use super::*;

    async fn send(request: Request<Body>) -> Response {
        create_router(state(&store())).oneshot(request).await.unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        serde_json::from_str(&text(response).await).unwrap()
    }

    fn post_content(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/dynamic-content")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn p1_request() -> Value {
        json!({
            "componentSpec": "placeholder/type_1",
            "componentId": "p1",
            "componentData": {},
            "pageDefinition": "index.json",
        })
    }

    #[tokio::test]
    async fn test_entry_page_with_chrome() {
        let response = send(Request::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(
            headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert!(headers.contains_key(header::ETAG));
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(headers.contains_key("content-security-policy"));
        assert_eq!(headers["referrer-policy"], "same-origin");

        let html = text(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"data-dynamic="true""#));
        assert!(!html.contains(">Hi<"));
    }

    #[tokio::test]
    async fn test_page_not_modified() {
        let router = create_router(state(&store()));
        let first = router
            .clone()
            .oneshot(Request::get("/pages/index.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let etag = first.headers()[header::ETAG].clone();

        let second = router
            .oneshot(
                Request::get("/pages/index.json")
                    .header(header::IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_pages_are_404() {
        for uri in ["/pages/missing.json", "/pages/index.txt"] {
            let response = send(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_dynamic_content_success() {
        let response = send(post_content(&p1_request())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["componentId"], "p1");
        assert!(body["content"].as_str().unwrap().contains("Hi"));
        assert_eq!(body["cacheKey"].as_str().unwrap().len(), 32);
        assert!(body["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_missing_component_data() {
        let mut request = p1_request();
        request.as_object_mut().unwrap().remove("componentData");
        let response = send(post_content(&request)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("Missing required parameter: componentData")
        );
    }

    #[tokio::test]
    async fn test_traversal_spec_rejected_before_store_access() {
        let store = store();
        let mut request = p1_request();
        request["componentSpec"] = json!("../../etc/passwd");

        let response = create_router(state(&store))
            .oneshot(post_content(&request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid component specification format"
        );
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_protected_content_requires_session() {
        let mut request = p1_request();
        request["componentId"] = json!("vault");

        let response = send(post_content(&request)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Unauthorized");
        assert!(body.get("content").is_none());

        let mut authed = post_content(&request);
        authed.headers_mut().insert(
            header::COOKIE,
            format!("tessera_session={TOKEN}").parse().unwrap(),
        );
        let response = send(authed).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            json_body(response).await["content"]
                .as_str()
                .unwrap()
                .contains("Vault")
        );
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let request = Request::post("/api/dynamic-content")
            .body(Body::from("[1, 2]"))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid JSON in request body"
        );
    }

    #[tokio::test]
    async fn test_preflight_is_empty_200() {
        let request = Request::options("/api/dynamic-content")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "POST, GET, OPTIONS"
        );
        assert_eq!(text(response).await, "");
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        for method in ["GET", "PUT", "DELETE"] {
            let request = Request::builder()
                .method(method)
                .uri("/api/dynamic-content")
                .body(Body::empty())
                .unwrap();
            let response = send(request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(
                json_body(response).await["error"],
                "Only POST requests are allowed"
            );
        }
    }
}
