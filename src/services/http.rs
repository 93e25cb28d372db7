//! `reqwest` client for the backend and AI services.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::types::{MetricUpdate, ScoreResponse, VerificationRequest};
use super::{BackendService, MetricService, ScoringService, VerificationService};
use crate::config::ClientConfig;
use crate::error::{GreenMindError, Result};
use crate::feedback::MonitorOceanResponse;
use crate::ocean::OceanScore;
use crate::survey::{QuestionDefinition, SurveyPayload};

const SCORE_PATH: &str = "calculate_ocean";
const VERIFY_PATH: &str = "verify_survey";

/// HTTP implementation of every service trait.
#[derive(Debug, Clone)]
pub struct HttpOceanApi {
    config: ClientConfig,
    client: reqwest::Client,
}

/// Question-set responses come either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionSetBody {
    Bare(Vec<QuestionDefinition>),
    Wrapped {
        #[serde(alias = "data")]
        questions: Vec<QuestionDefinition>,
    },
}

impl HttpOceanApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send_json<B, R>(
        &self,
        service: &'static str,
        method: reqwest::Method,
        url: String,
        body: Option<&B>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        log::debug!("{} {} ({} service)", method, url, service);
        let mut req = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = extract_message(&text)
                .unwrap_or_else(|| format!("{} request to {} failed", service, url));
            log::warn!("{} service returned HTTP {}: {}", service, status, message);
            return Err(GreenMindError::Service {
                service,
                status: Some(status.as_u16()),
                message,
            });
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Pull a human-readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            let trimmed = body.trim();
            return (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
    };
    ["message", "detail", "error"].iter().find_map(|key| {
        value
            .get(*key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[async_trait]
impl ScoringService for HttpOceanApi {
    async fn score(&self, payload: &SurveyPayload) -> Result<ScoreResponse> {
        self.send_json(
            "scoring",
            reqwest::Method::POST,
            self.config.ai_url(SCORE_PATH),
            Some(payload),
        )
        .await
    }
}

#[async_trait]
impl MetricService for HttpOceanApi {
    async fn update_metric(
        &self,
        user_id: &str,
        update: &MetricUpdate,
        ocean: OceanScore,
    ) -> Result<MonitorOceanResponse> {
        let body = update.request_body(user_id, ocean);
        self.send_json(
            "metric",
            reqwest::Method::POST,
            self.config.ai_url(&update.path()),
            Some(&body),
        )
        .await
    }
}

#[async_trait]
impl VerificationService for HttpOceanApi {
    async fn verify(&self, request: &VerificationRequest) -> Result<Value> {
        self.send_json(
            "verification",
            reqwest::Method::POST,
            self.config.ai_url(VERIFY_PATH),
            Some(request),
        )
        .await
    }
}

#[async_trait]
impl BackendService for HttpOceanApi {
    async fn save_ocean(&self, user_id: &str, ocean: OceanScore) -> Result<()> {
        let body = json!({ "ocean_score": ocean });
        let _: Value = self
            .send_json(
                "backend",
                reqwest::Method::PUT,
                self.config
                    .api_url_segments(&["users", user_id, "ocean"])?
                    .to_string(),
                Some(&body),
            )
            .await?;
        Ok(())
    }

    async fn fetch_question_set(&self, set_id: &str) -> Result<Vec<QuestionDefinition>> {
        let body: QuestionSetBody = self
            .send_json::<Value, _>(
                "backend",
                reqwest::Method::GET,
                self.config
                    .api_url_segments(&["question-sets", set_id])?
                    .to_string(),
                None,
            )
            .await?;
        Ok(match body {
            QuestionSetBody::Bare(questions) | QuestionSetBody::Wrapped { questions } => questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api_for(base: &str) -> HttpOceanApi {
        HttpOceanApi::new(ClientConfig {
            api_base_url: format!("{base}/api"),
            ai_base_url: base.to_string(),
            timeout_secs: 5,
            verification_enabled: true,
        })
        .unwrap()
    }

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(extract_message(r#"{"message":"Hết hạn"}"#).as_deref(), Some("Hết hạn"));
        assert_eq!(extract_message(r#"{"detail":"bad"}"#).as_deref(), Some("bad"));
        assert_eq!(extract_message(r#"{"error":"boom"}"#).as_deref(), Some("boom"));
        assert_eq!(extract_message(r#"{"code":7}"#), None);
        assert_eq!(extract_message("gateway timeout").as_deref(), Some("gateway timeout"));
        assert_eq!(extract_message("   "), None);
    }

    #[tokio::test]
    async fn test_score_posts_payload() {
        let router = Router::new().route(
            "/calculate_ocean",
            post(|Json(body): Json<Value>| async move {
                let answered = body["answers"].as_array().map(|a| a.len()).unwrap_or(0);
                Json(json!({
                    "scores": {"O": 80, "C": 60, "E": 40, "A": 20, "N": answered},
                }))
            }),
        );
        let api = api_for(&serve(router).await);

        let payload = SurveyPayload {
            user_id: "u1".to_string(),
            answers: Vec::new(),
        };
        let resp = api.score(&payload).await.unwrap();
        assert_eq!(resp.scores.o, 80.0);
        assert_eq!(resp.scores.n, 0.0);
    }

    #[tokio::test]
    async fn test_service_error_carries_message() {
        let router = Router::new().route(
            "/calculate_ocean",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"message": "Thiếu câu trả lời"})),
                )
            }),
        );
        let api = api_for(&serve(router).await);

        let err = api
            .score(&SurveyPayload {
                user_id: "u1".to_string(),
                answers: Vec::new(),
            })
            .await
            .unwrap_err();
        match err {
            GreenMindError::Service {
                service,
                status,
                message,
            } => {
                assert_eq!(service, "scoring");
                assert_eq!(status, Some(422));
                assert_eq!(message, "Thiếu câu trả lời");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_metric_update_sends_inputs_and_score() {
        let router = Router::new().route(
            "/monitor/healthy_food_ratio",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "metric": "healthy_food_ratio",
                    "vt": body["ratio"],
                    "bt": body["ocean_score"]["C"],
                    "r": 0.2,
                    "n": body["total_meals"],
                    "contrib": 1.5,
                    "new_ocean_score": {"O": 50, "C": 56, "E": 50, "A": 50, "N": 50},
                    "mechanism_feedback": {
                        "awareness": "a", "motivation": "m",
                        "capability": "c", "opportunity": "o"
                    },
                    "reason": body["user_id"],
                }))
            }),
        );
        let api = api_for(&serve(router).await);

        let update = MetricUpdate::HealthyFoodRatio {
            healthy_meals: 2,
            total_meals: 4,
        };
        let resp = api
            .update_metric("u7", &update, OceanScore::new(0.5, 0.42, 0.5, 0.5, 0.5))
            .await
            .unwrap();

        assert_eq!(resp.vt, 0.5);
        assert_eq!(resp.bt, 0.42);
        assert_eq!(resp.n, 4);
        assert_eq!(resp.reason, "u7");
        assert_eq!(resp.new_ocean_score.c, 56.0);
    }

    #[tokio::test]
    async fn test_verify_returns_report() {
        let router = Router::new().route(
            "/verify_survey",
            post(|Json(req): Json<VerificationRequest>| async move {
                Json(json!({"model": req.model, "match": req.survey_result.o < 1.0}))
            }),
        );
        let api = api_for(&serve(router).await);

        let report = api
            .verify(&VerificationRequest {
                model: "big5".to_string(),
                user_id: "u1".to_string(),
                survey_result: OceanScore::neutral(),
            })
            .await
            .unwrap();
        assert_eq!(report["model"], "big5");
        assert_eq!(report["match"], true);
    }

    #[tokio::test]
    async fn test_save_ocean_accepts_empty_body() {
        let router = Router::new().route(
            "/api/users/u1/ocean",
            put(|Json(body): Json<Value>| async move {
                if body["ocean_score"]["O"] == 0.5 {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        );
        let api = api_for(&serve(router).await);

        api.save_ocean("u1", OceanScore::neutral()).await.unwrap();
    }

    #[tokio::test]
    async fn test_path_ids_are_percent_encoded() {
        let router = Router::new()
            .route(
                "/api/users/:user_id/ocean",
                put(|Path(user_id): Path<String>| async move {
                    if user_id == "team/u1?x#y" {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::BAD_REQUEST
                    }
                }),
            )
            .route(
                "/api/question-sets/:set_id",
                get(|Path(set_id): Path<String>| async move {
                    Json(json!([{"id": set_id, "behaviorNormalized": "yesno"}]))
                }),
            );
        let api = api_for(&serve(router).await);

        api.save_ocean("team/u1?x#y", OceanScore::neutral())
            .await
            .unwrap();
        let questions = api.fetch_question_set("sets/2024#a").await.unwrap();
        assert_eq!(questions[0].id, "sets/2024#a");
    }

    #[tokio::test]
    async fn test_fetch_question_set_bare_and_wrapped() {
        let router = Router::new()
            .route(
                "/api/question-sets/bare",
                get(|| async { Json(json!([{"_id": "q1", "behaviorNormalized": "yesno"}])) }),
            )
            .route(
                "/api/question-sets/wrapped",
                get(|| async {
                    Json(json!({"data": [
                        {"id": "q1", "trait": "O"},
                        {"id": "q2", "trait": "N"}
                    ]}))
                }),
            );
        let api = api_for(&serve(router).await);

        let bare = api.fetch_question_set("bare").await.unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].behavior_normalized, "yesno");

        let wrapped = api.fetch_question_set("wrapped").await.unwrap();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].trait_code.as_deref(), Some("N"));
    }

    #[tokio::test]
    async fn test_missing_route_is_service_error() {
        let api = api_for(&serve(Router::new()).await);
        let err = api.fetch_question_set("nope").await.unwrap_err();
        assert!(matches!(
            err,
            GreenMindError::Service {
                status: Some(404),
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(HttpOceanApi::new(config).is_err());
    }
}
