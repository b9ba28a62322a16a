pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingest API
        .route("/api/v1/jobs/normalize", post(handlers::handle_normalize))
        // Matching API
        .route("/api/v1/match", post(handlers::handle_match))
        .route("/api/v1/match/explain", post(handlers::handle_explain))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::matching::enrichment::ReasonEnricher;
    use crate::matching::scorer::MatchResult;

    struct FixedEnricher;

    #[async_trait]
    impl ReasonEnricher for FixedEnricher {
        async fn elaborate(&self, result: &MatchResult) -> Result<String, AppError> {
            Ok(format!("Elaborated: {}", result.job.title))
        }
    }

    struct FailingEnricher;

    #[async_trait]
    impl ReasonEnricher for FailingEnricher {
        async fn elaborate(&self, _result: &MatchResult) -> Result<String, AppError> {
            Err(AppError::Llm("model not found".to_string()))
        }
    }

    struct SlowEnricher;

    #[async_trait]
    impl ReasonEnricher for SlowEnricher {
        async fn elaborate(&self, _result: &MatchResult) -> Result<String, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn app() -> Router {
        build_router(AppState::new(Config::default()))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
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
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn batches() -> Value {
        json!([
            {
                "source": "himalayas",
                "records": [
                    {
                        "title": "Python Developer",
                        "company_name": "Acme",
                        "location": "Remote",
                        "url": "https://x.com/job/1?ref=abc",
                        "salary": "$120k - $150k",
                        "skills": ["Python", "Docker"],
                        "description": "3+ years of experience with Python and Docker.",
                        "posted": "2 days ago"
                    },
                    {"company": "No Title Inc", "url": "https://x.com/job/2"}
                ]
            },
            {
                "source": "remotive",
                "records": [
                    {
                        "title": "Python Developer",
                        "url": "https://x.com/job/1?ref=xyz",
                        "location": "Remote"
                    },
                    {
                        "title": "Java Intern",
                        "url": "https://y.com/job/9",
                        "location": "Bengaluru, India",
                        "description": "Java internship"
                    }
                ]
            }
        ])
    }

    fn profile() -> Value {
        json!({
            "skills": {"python": "expert", "docker": "intermediate"},
            "experience_years": 5,
            "target_titles": ["Python Developer"],
            "desired_salary": {"amount": 130000, "currency": "USD"}
        })
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cyno-api");
    }

    #[tokio::test]
    async fn test_normalize_reports_counts() {
        let (status, body) = post_json(
            app(),
            "/api/v1/jobs/normalize",
            json!({"batches": batches(), "now": "2025-03-15T08:00:00Z"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["received"], 4);
        assert_eq!(body["dropped"], 1);
        assert_eq!(body["duplicates_removed"], 1);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
        assert_eq!(body["jobs"][0]["posted_date"], "2025-03-13");
        assert_eq!(body["jobs"][0]["salary"]["currency"], "USD");
        assert_eq!(body["jobs"][1]["job_type"], "internship");
    }

    #[tokio::test]
    async fn test_match_ranks_and_reports() {
        let (status, body) = post_json(
            app(),
            "/api/v1/match",
            json!({"batches": batches(), "profile": profile()}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["search_id"].as_str().is_some());
        assert_eq!(body["stats"]["scored"], 2);
        assert_eq!(body["ranked"][0]["job"]["title"], "Python Developer");
        assert_eq!(body["ranked"][0]["score"], 100.0);
        assert_eq!(body["ranked"][0]["recommendation"], "apply_now");
        assert_eq!(body["ranked"][0]["component_scores"]["skills"], 40.0);
    }

    #[tokio::test]
    async fn test_match_query_derives_filters() {
        let (status, body) = post_json(
            app(),
            "/api/v1/match",
            json!({"batches": batches(), "profile": profile(), "query": "java intern india"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ranked = body["ranked"].as_array().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0]["job"]["title"], "Java Intern");
    }

    #[tokio::test]
    async fn test_match_explicit_filter_overrides_query() {
        let (_, body) = post_json(
            app(),
            "/api/v1/match",
            json!({
                "batches": batches(),
                "profile": profile(),
                "query": "intern",
                "filters": {"job_type": "full_time", "limit": 1}
            }),
        )
        .await;

        let ranked = body["ranked"].as_array().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0]["job"]["job_type"], "full_time");
    }

    #[tokio::test]
    async fn test_match_negative_limit_is_validation_error() {
        let (status, body) = post_json(
            app(),
            "/api/v1/match",
            json!({"batches": [], "profile": profile(), "filters": {"limit": -1}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_explain_without_enricher_has_null_elaboration() {
        let (status, body) = post_json(
            app(),
            "/api/v1/match/explain",
            json!({
                "job": {
                    "title": "Python Developer",
                    "company": "Acme",
                    "location": "Remote",
                    "salary": null,
                    "job_type": "full_time",
                    "posted_date": null,
                    "source": "test",
                    "url": "https://acme.dev/job/1",
                    "required_skills": ["Python", "Kafka"]
                },
                "profile": profile()
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["elaboration"].is_null());
        assert_eq!(body["result"]["missing_skills"], json!(["Kafka"]));
    }

    async fn explain_with(enricher: Arc<dyn ReasonEnricher>, config: Config) -> Value {
        let app = build_router(AppState::new(config).with_enricher(enricher));
        let (status, body) = post_json(
            app,
            "/api/v1/match/explain",
            json!({
                "job": {
                    "title": "Python Developer",
                    "company": "Acme",
                    "location": "Remote",
                    "salary": null,
                    "job_type": "full_time",
                    "posted_date": null,
                    "source": "test",
                    "url": "https://acme.dev/job/1"
                },
                "profile": profile()
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_explain_uses_enricher() {
        let body = explain_with(Arc::new(FixedEnricher), Config::default()).await;
        assert_eq!(body["elaboration"], "Elaborated: Python Developer");
    }

    #[tokio::test]
    async fn test_explain_enricher_failure_degrades_to_null() {
        let body = explain_with(Arc::new(FailingEnricher), Config::default()).await;
        assert!(body["elaboration"].is_null());
        assert!(body["result"]["reason"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_explain_enricher_timeout_degrades_to_null() {
        let config = Config {
            llm_timeout: Duration::from_millis(50),
            ..Config::default()
        };
        let body = explain_with(Arc::new(SlowEnricher), config).await;
        assert!(body["elaboration"].is_null());
    }
}
