//! Client Integration Tests
//!
//! Each test serves a stub backend from an in-process Axum router on an
//! ephemeral localhost port and drives the real reqwest client against it.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use comfort_planner::client::{OPTIMIZE_PATH, PROBE_PATH};
use comfort_planner::{
    ApiClient, BackendConfig, ClientError, ComfortApi, ComfortConfig, Optimizer, RunPhase,
    SensorReading,
};

/// Serve `app` on 127.0.0.1 and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(&BackendConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: Some(10),
    })
    .unwrap()
}

fn schedule_json(hours: usize) -> Value {
    let hours: Vec<usize> = (0..hours).collect();
    json!({
        "hours": hours,
        "setpoints": hours.iter().map(|_| 21.5).collect::<Vec<_>>(),
        "outdoor": hours.iter().map(|h| 5.0 + *h as f64 * 0.5).collect::<Vec<_>>(),
        "occupancy": hours.iter().map(|_| 40).collect::<Vec<_>>(),
        "power": hours.iter().map(|_| 2.345).collect::<Vec<_>>(),
    })
}

/// Router whose optimize endpoint always answers with `status` and `body`.
fn optimize_stub(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(OPTIMIZE_PATH, post(move || async move { (status, body) }))
}

// ============================================================================
// Probe
// ============================================================================

#[tokio::test]
async fn probe_returns_oracle_values_unmodified() {
    let app = Router::new().route(
        PROBE_PATH,
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q.get("indoor").map(String::as_str), Some("22"));
            assert_eq!(q.get("occupancy").map(String::as_str), Some("50"));
            assert_eq!(q.get("outdoor").map(String::as_str), Some("20"));
            Json(json!({"hvac_power": 4.532, "naive_hvac_power": 5.0}))
        }),
    );
    let client = client_for(&serve(app).await);

    let power = client
        .probe(&SensorReading::new(22.0, 50.0, 20.0))
        .await
        .unwrap();
    assert_eq!(power.hvac_power, 4.532);
    assert_eq!(power.naive_hvac_power, 5.0);
}

#[tokio::test]
async fn probe_error_status_is_transport_error() {
    let app = Router::new().route(
        PROBE_PATH,
        get(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "indoor out of range") }),
    );
    let client = client_for(&serve(app).await);

    let err = client.probe(&SensorReading::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.to_string(), "hvac-power failed: 422 indoor out of range");
}

#[tokio::test]
async fn probe_non_json_body_is_decode_error() {
    let app = Router::new().route(PROBE_PATH, get(|| async { "<html>proxy page</html>" }));
    let client = client_for(&serve(app).await);

    let err = client.probe(&SensorReading::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { endpoint: "hvac-power", .. }));
}

#[tokio::test]
async fn probe_unreachable_backend_is_http_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let err = client.probe(&SensorReading::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}

// ============================================================================
// Optimize
// ============================================================================

#[tokio::test]
async fn optimize_sends_config_as_json_body() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let app = Router::new().route(
        OPTIMIZE_PATH,
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some(body);
                Json(json!({"ok": true, "plan": schedule_json(24)}))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let plan = client.optimize(&ComfortConfig::default()).await.unwrap();
    assert_eq!(plan, schedule_json(24));

    let body = captured.lock().unwrap().take().unwrap();
    assert_eq!(body["lat"], 43.7);
    assert_eq!(body["lon"], -79.4);
    assert_eq!(body["comfort_low"], 21.0);
    assert_eq!(body["comfort_high"], 24.0);
    assert_eq!(body["occupancy"].as_array().unwrap().len(), 24);
    assert_eq!(body["occupancy"][7], 80.0);
}

#[tokio::test]
async fn server_error_drives_run_to_failed() {
    let base = serve(optimize_stub(StatusCode::INTERNAL_SERVER_ERROR, "server error")).await;
    let optimizer = Optimizer::new(Arc::new(client_for(&base)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Failed);
    let error = state.error().unwrap();
    assert!(error.contains("500"), "error should carry the status: {error}");
    assert!(error.contains("server error"));
    assert!(state.schedule().is_none());
}

#[tokio::test]
async fn rejection_envelope_drives_run_to_failed_verbatim() {
    let base = serve(optimize_stub(
        StatusCode::OK,
        r#"{"ok": false, "error": "Missing OPENAI_API_KEY in environment"}"#,
    ))
    .await;
    let optimizer = Optimizer::new(Arc::new(client_for(&base)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(state.error(), Some("Missing OPENAI_API_KEY in environment"));
}

#[tokio::test]
async fn prose_plan_succeeds_with_raw_text() {
    let base = serve(optimize_stub(
        StatusCode::OK,
        r#"{"ok": true, "plan": "the weather looks fine today"}"#,
    ))
    .await;
    let optimizer = Optimizer::new(Arc::new(client_for(&base)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Succeeded);
    assert_eq!(state.raw_text(), Some("the weather looks fine today"));
    assert!(state.schedule().is_none());
    assert!(state.error().is_none());
}

#[tokio::test]
async fn accepted_reply_without_plan_shows_nothing() {
    let base = serve(optimize_stub(StatusCode::OK, r#"{"ok": true}"#)).await;
    let optimizer = Optimizer::new(Arc::new(client_for(&base)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Succeeded);
    assert_eq!(state.raw_text(), Some(""));
    assert!(state.schedule().is_none());
}

#[tokio::test]
async fn result_nested_in_output_text_succeeds_with_schedule() {
    let output = json!({"result": schedule_json(24).to_string()}).to_string();
    let body = json!({"ok": true, "plan": {"output": output}}).to_string();
    let app = Router::new().route(OPTIMIZE_PATH, post(move || async move { body }));
    let optimizer = Optimizer::new(Arc::new(client_for(&serve(app).await)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.schedule().map(|s| s.to_value()), Some(schedule_json(24)));
}

#[tokio::test]
async fn wrapped_json_text_plan_succeeds_with_schedule() {
    let wrapped = json!({"result": schedule_json(24).to_string()}).to_string();
    let body = json!({"ok": true, "plan": wrapped}).to_string();
    let app = Router::new().route(OPTIMIZE_PATH, post(move || async move { body }));
    let optimizer = Optimizer::new(Arc::new(client_for(&serve(app).await)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Succeeded);
    let schedule = state.schedule().unwrap();
    assert_eq!(schedule.len(), 24);
    assert!(!schedule.is_ragged());
    assert_eq!(schedule.to_value(), schedule_json(24));
}

#[tokio::test]
async fn bare_schedule_body_is_accepted() {
    let app = Router::new().route(
        OPTIMIZE_PATH,
        post(|| async { Json(schedule_json(3)) }),
    );
    let optimizer = Optimizer::new(Arc::new(client_for(&serve(app).await)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.schedule().map(|s| s.len()), Some(3));
}

#[tokio::test]
async fn non_json_success_body_becomes_raw_text() {
    let base = serve(optimize_stub(StatusCode::OK, "Final Answer: keep 21C all day")).await;
    let optimizer = Optimizer::new(Arc::new(client_for(&base)));

    let state = optimizer.run(&ComfortConfig::default()).await;
    assert_eq!(state.phase(), RunPhase::Succeeded);
    assert_eq!(state.raw_text(), Some("Final Answer: keep 21C all day"));
}

#[tokio::test]
async fn superseded_run_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let held = Arc::clone(&gate);
    let app = Router::new().route(
        OPTIMIZE_PATH,
        post(move |Json(body): Json<Value>| {
            let held = Arc::clone(&held);
            async move {
                if body["lat"] == 1.0 {
                    held.notified().await;
                    Json(json!({"ok": true, "plan": schedule_json(24)}))
                } else {
                    Json(json!({"ok": true, "plan": "fast answer"}))
                }
            }
        }),
    );
    let optimizer = Arc::new(Optimizer::new(Arc::new(client_for(&serve(app).await))));

    let slow_config = ComfortConfig {
        lat: 1.0,
        ..ComfortConfig::default()
    };
    let slow = {
        let optimizer = Arc::clone(&optimizer);
        tokio::spawn(async move { optimizer.run(&slow_config).await })
    };
    while !optimizer.state().is_running() {
        tokio::task::yield_now().await;
    }
    let first_token = optimizer.state().token().unwrap();

    let fast_config = ComfortConfig {
        lat: 2.0,
        ..ComfortConfig::default()
    };
    let fast_state = optimizer.run(&fast_config).await;
    let second_token = fast_state.token().unwrap();
    assert!(second_token > first_token);
    assert_eq!(fast_state.raw_text(), Some("fast answer"));

    // Release the slow reply; it must not overwrite the newer result.
    gate.notify_one();
    let after_slow = slow.await.unwrap();
    assert_eq!(after_slow.token(), Some(second_token));
    assert_eq!(after_slow.raw_text(), Some("fast answer"));
    assert!(optimizer.state().schedule().is_none());
}
