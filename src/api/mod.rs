//! HTTP routes for the scoring service.
//!
//! - `GET /`: service banner with model status
//! - `GET /health`: model status only
//! - `POST /predict`: score one appointment
//! - `GET /stats`: metrics of the loaded model's training run

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::application::ScoringService;
use crate::domain::{AppointmentRecord, RiskAssessment};
use crate::ports::FittedModel;
use crate::DnaError;

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub model_type: String,
    pub training_accuracy: f64,
    pub test_accuracy: f64,
    pub training_size: usize,
    pub dna_rate: f64,
    pub n_features: usize,
}

/// Error body returned on every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Failure of a route, rendered as a status code and `{detail}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }
}

impl From<DnaError> for ApiError {
    fn from(err: DnaError) -> Self {
        match err {
            DnaError::ModelNotLoaded(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: "Model not loaded".to_string(),
            },
            e if e.is_client_error() => Self {
                status: StatusCode::BAD_REQUEST,
                detail: e.to_string(),
            },
            e => {
                tracing::error!("Prediction failed: {}", e);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: e.to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// Build the router over a shared scoring service.
pub fn router<M>(service: Arc<ScoringService<M>>) -> Router
where
    M: FittedModel + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root::<M>))
        .route("/health", get(health::<M>))
        .route("/predict", post(predict::<M>))
        .route("/stats", get(stats::<M>))
        .layer(cors)
        .with_state(service)
}

async fn root<M: FittedModel>(
    State(service): State<Arc<ScoringService<M>>>,
) -> Json<RootResponse> {
    Json(RootResponse {
        message: "GP DNA Prediction API".to_string(),
        status: "running".to_string(),
        model_loaded: service.is_model_loaded(),
    })
}

async fn health<M: FittedModel>(
    State(service): State<Arc<ScoringService<M>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        model_loaded: service.is_model_loaded(),
    })
}

async fn predict<M: FittedModel>(
    State(service): State<Arc<ScoringService<M>>>,
    payload: Result<Json<AppointmentRecord>, JsonRejection>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let Json(record) = payload?;
    let assessment = service.predict(&record)?;
    Ok(Json(assessment))
}

async fn stats<M: FittedModel>(
    State(service): State<Arc<ScoringService<M>>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let report = service
        .report()
        .ok_or_else(|| ApiError::not_found("No training report available"))?;

    Ok(Json(StatsResponse {
        model_type: report.model_type.clone(),
        training_accuracy: report.train_accuracy,
        test_accuracy: report.test_accuracy,
        training_size: report.training_size,
        dna_rate: report.dna_rate,
        n_features: report.n_features,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSchema, TrainingReport, APPT_MODES, HCP_TYPES};
    use crate::ports::ScorerError;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct ConstantModel(f64);

    impl FittedModel for ConstantModel {
        fn n_features(&self) -> usize {
            11
        }

        fn predict_probability(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScorerError> {
            Ok(vec![self.0; rows.len()])
        }
    }

    fn ready(probability: f64) -> ScoringService<ConstantModel> {
        let records: Vec<_> = HCP_TYPES
            .iter()
            .flat_map(|h| {
                APPT_MODES.iter().map(move |m| AppointmentRecord {
                    hcp_type: (*h).into(),
                    appt_mode: (*m).into(),
                    age: 40,
                    hour: 12,
                    day_of_week: 0,
                    lead_time: 1,
                })
            })
            .collect();
        let schema = FeatureSchema::from_records(&records);
        ScoringService::new(ConstantModel(probability), schema).expect("ready service")
    }

    fn unavailable() -> ScoringService<ConstantModel> {
        ScoringService::unavailable("no model")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn predict_req(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn mental_health_video() -> serde_json::Value {
        serde_json::json!({
            "hcp_type": "Mental Health",
            "appt_mode": "Video/Online",
            "age": 22,
            "hour": 9,
            "day_of_week": 1,
            "lead_time": 20
        })
    }

    #[tokio::test]
    async fn test_root_reports_model_status() {
        let (status, body) = send(router(Arc::new(ready(0.1))), get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "GP DNA Prediction API");
        assert_eq!(body["status"], "running");
        assert_eq!(body["model_loaded"], true);

        let (_, body) = send(router(Arc::new(unavailable())), get_req("/health")).await;
        assert_eq!(body["model_loaded"], false);
    }

    #[tokio::test]
    async fn test_predict_high_risk() {
        let app = router(Arc::new(ready(0.19)));
        let (status, body) = send(app, predict_req(mental_health_video())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], 0);
        assert_eq!(body["probability"], 0.19);
        assert_eq!(body["risk_level"], "High");
        assert_eq!(body["color"], "red");
        assert_eq!(body["recommendation"], "Call patient to confirm + send SMS");
    }

    #[tokio::test]
    async fn test_predict_without_model_is_500() {
        let app = router(Arc::new(unavailable()));
        let (status, body) = send(app, predict_req(mental_health_video())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Model not loaded");
    }

    #[tokio::test]
    async fn test_predict_out_of_range_is_400() {
        let mut record = mental_health_video();
        record["age"] = serde_json::json!(130);
        let (status, body) = send(router(Arc::new(ready(0.1))), predict_req(record)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().expect("detail").contains("age"));
    }

    #[tokio::test]
    async fn test_predict_wrong_type_returns_detail() {
        let mut record = mental_health_video();
        record["age"] = serde_json::json!("old");
        let (status, body) = send(router(Arc::new(ready(0.1))), predict_req(record)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("age"));
    }

    #[tokio::test]
    async fn test_predict_missing_field_returns_detail() {
        let mut record = mental_health_video();
        record
            .as_object_mut()
            .expect("object")
            .remove("lead_time");
        let (status, body) = send(router(Arc::new(ready(0.1))), predict_req(record)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("lead_time"));
    }

    #[tokio::test]
    async fn test_predict_malformed_json_returns_detail() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from("{\"hcp_type\": "))
            .expect("request");
        let (status, body) = send(router(Arc::new(ready(0.1))), request).await;
        assert!(status.is_client_error());
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = send(router(Arc::new(ready(0.1))), get_req("/stats")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].is_string());

        let report = TrainingReport {
            model_type: "Logistic Regression".to_string(),
            training_size: 10_000,
            train_rows: 8_000,
            test_rows: 2_000,
            dna_rate: 0.079,
            train_accuracy: 0.92,
            test_accuracy: 0.91,
            n_features: 11,
            seed: 42,
            trained_at: chrono::Utc::now(),
        };
        let service = ready(0.1).with_report(Some(report));
        let (status, body) = send(router(Arc::new(service)), get_req("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_type"], "Logistic Regression");
        assert_eq!(body["training_size"], 10_000);
        assert_eq!(body["n_features"], 11);
    }
}
