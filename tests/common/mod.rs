// tests/common/mod.rs

use std::sync::Arc;

use xp_ledger::{
    config::Config,
    recorder::ResultRecorder,
    routes,
    state::AppState,
    store::{MemoryResultStore, ResultStore},
    utils::jwt::sign_jwt,
};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

/// Spawns the app on a random port over the given store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app_with(store: Arc<dyn ResultStore>, strict: bool) -> String {
    let mut config = Config::for_tests(TEST_SECRET);
    config.strict_result_validation = strict;

    let state = AppState {
        recorder: ResultRecorder::new(store).strict(strict),
        config,
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

pub async fn spawn_app() -> String {
    spawn_app_with(Arc::new(MemoryResultStore::new()), false).await
}

/// A fresh 24-hex-digit user id.
pub fn new_user_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..24].to_string()
}

pub fn token_for(user_id: &str, role: &str) -> String {
    sign_jwt(user_id, role, TEST_SECRET, 600).expect("Failed to sign test token")
}

pub fn attempt(user_id: &str, score: i64, total: i64) -> serde_json::Value {
    let answers: Vec<serde_json::Value> = (0..total)
        .map(|i| {
            let correct = i < score;
            serde_json::json!({
                "questionId": format!("q{}", i),
                "questionText": format!("Which choice saves more? #{}", i),
                "userAnswer": if correct { "Buy in bulk" } else { "Buy daily" },
                "correctAnswer": "Buy in bulk",
                "isCorrect": correct
            })
        })
        .collect();

    serde_json::json!({
        "userId": user_id,
        "quizId": "smart-shopper",
        "quizTitle": "Smart Shopper",
        "score": score,
        "totalQuestions": total,
        "timeTaken": 95,
        "answers": answers
    })
}
