//! End-to-end tests: train into a temporary directory, reload, and serve.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use dna_predictor::adapters::fs::{FsArtifactStore, DATASET_FILE, MODEL_FILE, REPORT_FILE, SCHEMA_FILE};
use dna_predictor::adapters::logistic::{LogisticConfig, LogisticModel, LogisticRegression};
use dna_predictor::application::{ScoringService, TrainingConfig, TrainingService};
use dna_predictor::domain::{AppointmentRecord, RiskLevel};

fn train(dir: &std::path::Path, rows: usize) -> FsArtifactStore {
    let store = Arc::new(FsArtifactStore::new(dir.join("model"), dir.join("data")));
    let scorer = LogisticRegression::new(LogisticConfig {
        epochs: 200,
        ..LogisticConfig::default()
    });
    let config = TrainingConfig {
        rows,
        ..TrainingConfig::default()
    };
    TrainingService::new(scorer, Arc::clone(&store))
        .run(&config)
        .expect("training should succeed");
    (*store).clone()
}

fn record(hcp: &str, mode: &str, age: i32, hour: i32, lead_time: i32) -> AppointmentRecord {
    AppointmentRecord {
        hcp_type: hcp.into(),
        appt_mode: mode.into(),
        age,
        hour,
        day_of_week: 2,
        lead_time,
    }
}

#[test]
fn test_train_writes_all_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    train(dir.path(), 2_000);

    for file in [MODEL_FILE, SCHEMA_FILE, REPORT_FILE] {
        assert!(dir.path().join("model").join(file).exists(), "missing {file}");
    }
    let csv = std::fs::read_to_string(dir.path().join("data").join(DATASET_FILE)).expect("dataset");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("hcp_type,appt_mode,age,hour,day_of_week,lead_time,dna")
    );
    assert_eq!(lines.count(), 2_000);

    let schema: Vec<String> = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("model").join(SCHEMA_FILE)).expect("schema"),
    )
    .expect("schema json");
    assert_eq!(
        schema,
        [
            "age",
            "hour",
            "day_of_week",
            "lead_time",
            "hcp_type_GP",
            "hcp_type_Mental Health",
            "hcp_type_Nurse",
            "hcp_type_Other Practice staff",
            "appt_mode_Face-to-face",
            "appt_mode_Telephone",
            "appt_mode_Video/Online",
        ]
    );
}

#[test]
fn test_trained_model_scores_requests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = train(dir.path(), 2_000);

    let service = ScoringService::<LogisticModel>::load(&store);
    assert!(service.is_model_loaded());
    assert_eq!(service.feature_count(), 11);
    let report = service.report().expect("report loaded");
    assert_eq!(report.training_size, 2_000);
    assert_eq!(report.train_rows + report.test_rows, 2_000);

    let samples = [
        record("Mental Health", "Video/Online", 22, 9, 20),
        record("Nurse", "Telephone", 50, 14, 3),
        record("Locum", "Carrier pigeon", 70, 16, 0),
    ];
    for sample in &samples {
        let assessment = service.predict(sample).expect("should score");
        assert!((0.0..=1.0).contains(&assessment.probability));
        assert!(assessment.prediction <= 1);
        assert_eq!(assessment.color, assessment.risk_level.color());
        assert_eq!(assessment.recommendation, assessment.risk_level.recommendation());
    }
}

#[test]
fn test_training_is_reproducible() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    train(a.path(), 1_000);
    train(b.path(), 1_000);

    let read = |dir: &std::path::Path| {
        std::fs::read(dir.join("data").join(DATASET_FILE)).expect("dataset")
    };
    assert_eq!(read(a.path()), read(b.path()));

    let sa = ScoringService::<LogisticModel>::load(&FsArtifactStore::new(
        a.path().join("model"),
        a.path().join("data"),
    ));
    let sb = ScoringService::<LogisticModel>::load(&FsArtifactStore::new(
        b.path().join("model"),
        b.path().join("data"),
    ));
    let sample = record("GP", "Face-to-face", 35, 11, 7);
    assert_eq!(
        sa.predict(&sample).expect("score a"),
        sb.predict(&sample).expect("score b")
    );
}

#[test]
fn test_tampered_schema_leaves_model_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = train(dir.path(), 1_000);

    let schema_path = dir.path().join("model").join(SCHEMA_FILE);
    let mut names: Vec<String> =
        serde_json::from_slice(&std::fs::read(&schema_path).expect("read")).expect("json");
    names.swap(4, 5);
    std::fs::write(&schema_path, serde_json::to_vec(&names).expect("json")).expect("write");

    let service = ScoringService::<LogisticModel>::load(&store);
    assert!(!service.is_model_loaded());
    assert!(service.predict(&record("GP", "Telephone", 40, 12, 2)).is_err());
}

#[test]
fn test_missing_artifacts_leave_model_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsArtifactStore::new(dir.path().join("model"), dir.path().join("data"));

    let service = ScoringService::<LogisticModel>::load(&store);
    assert!(!service.is_model_loaded());
    assert!(service.unavailable_reason().is_some());
    assert!(service.report().is_none());
}

#[tokio::test]
async fn test_router_over_trained_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = train(dir.path(), 2_000);
    let app = dna_predictor::api::router(Arc::new(ScoringService::<LogisticModel>::load(&store)));

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "hcp_type": "Mental Health",
                "appt_mode": "Video/Online",
                "age": 22,
                "hour": 9,
                "day_of_week": 1,
                "lead_time": 20
            })
            .to_string(),
        ))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    let level: RiskLevel = serde_json::from_value(body["risk_level"].clone()).expect("tier");
    let probability = body["probability"].as_f64().expect("probability");
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(body["color"], level.color());

    let stats = Request::builder()
        .uri("/stats")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(stats).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
