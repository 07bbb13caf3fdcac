pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pure calibration, no model calls
        .route("/api/v1/metrics/density", post(handlers::handle_density))
        .route(
            "/api/v1/scenes/recommend",
            post(handlers::handle_recommend_scenes),
        )
        .route(
            "/api/v1/ideal-state/prompt",
            post(handlers::handle_category_prompt),
        )
        // Generation
        .route(
            "/api/v1/scenes/generate",
            post(handlers::handle_generate_scenes),
        )
        .route(
            "/api/v1/vision/compose",
            post(handlers::handle_compose_vision),
        )
        .route(
            "/api/v1/ideal-state/generate",
            post(handlers::handle_generate_ideal_state),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::llm_client::stub::ScriptedCompletion;

    fn app(stub: ScriptedCompletion) -> Router {
        build_router(AppState {
            llm: Arc::new(stub),
            config: Config {
                anthropic_api_key: "test".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                llm_timeout: Duration::from_secs(5),
            },
            shutdown: CancellationToken::new(),
        })
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ScriptedCompletion::always("{}"))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recommend_scenes_empty_input() {
        let (status, body) = post_json(
            app(ScriptedCompletion::always("{}")),
            "/api/v1/scenes/recommend",
            json!({"story": "", "assessment_snippets": [], "prior_vision": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendation"]["tier"], "C");
        assert_eq!(body["recommendation"]["target_scenes"], 1);
        assert_eq!(body["suggest_more"], false);
    }

    #[tokio::test]
    async fn test_density_endpoint() {
        let (status, body) = post_json(
            app(ScriptedCompletion::always("{}")),
            "/api/v1/metrics/density",
            json!({"text": "I love hiking and cooking"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["ideas"], 2);
        assert_eq!(body["target_range"]["input_words"], 5);
    }

    #[tokio::test]
    async fn test_category_prompt_falls_back_for_unknown_key() {
        let (status, body) = post_json(
            app(ScriptedCompletion::always("{}")),
            "/api/v1/ideal-state/prompt",
            json!({"category": "pets", "current_state": "Two happy dogs"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "pets");
        assert!(body["prompt"].as_str().unwrap().contains("Two happy dogs"));
        assert_eq!(body["seed_questions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_output_maps_to_bad_gateway() {
        let stub = ScriptedCompletion::always("not json");
        let (status, body) = post_json(
            app(stub),
            "/api/v1/vision/compose",
            json!({"category": "health", "wants": ["energy"]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "MALFORMED_OUTPUT");
    }

    #[tokio::test]
    async fn test_empty_category_is_rejected() {
        let (status, body) = post_json(
            app(ScriptedCompletion::always("{}")),
            "/api/v1/ideal-state/generate",
            json!({"category": "  "}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
