// tests/results_api_tests.rs

mod common;

use common::{attempt, new_user_id, spawn_app, spawn_app_with, token_for};
use std::sync::Arc;
use xp_ledger::store::MemoryResultStore;

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submitting_without_token_is_401() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/results", address))
        .json(&attempt(&new_user_id(), 1, 2))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn record_result_derives_percentage_and_xp() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let user = new_user_id();
    let token = token_for(&user, "student");

    let cases = [(9, 10, 90.0, 50), (3, 4, 75.0, 35), (1, 2, 50.0, 25), (0, 5, 0.0, 15), (10, 10, 100.0, 50)];

    for (score, total, percentage, xp) in cases {
        // Act
        let response = client
            .post(&format!("{}/api/results", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&attempt(&user, score, total))
            .send()
            .await
            .expect("Failed to execute request");

        // Assert
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["userId"], user);
        assert_eq!(body["xpEarned"], xp);
        assert!((body["percentageScore"].as_f64().unwrap() - percentage).abs() < 1e-9);
        assert!(body["id"].as_i64().is_some());
        assert!(body["completedAt"].as_str().is_some());
    }
}

#[tokio::test]
async fn client_supplied_percentage_is_overwritten() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let user = new_user_id();

    let mut payload = attempt(&user, 1, 4);
    payload["percentageScore"] = serde_json::json!(100);
    payload["xpEarned"] = serde_json::json!(500);

    let body: serde_json::Value = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&user, "student")))
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["percentageScore"].as_f64().unwrap(), 25.0);
    assert_eq!(body["xpEarned"], 15);
    assert_eq!(body["tier"], "beginning");
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let user = new_user_id();
    let token = token_for(&user, "student");

    let mut zero_questions = attempt(&user, 0, 0);
    zero_questions["totalQuestions"] = serde_json::json!(0);
    let mut negative_time = attempt(&user, 1, 2);
    negative_time["timeTaken"] = serde_json::json!(-1);
    let mut empty_title = attempt(&user, 1, 2);
    empty_title["quizTitle"] = serde_json::json!("");
    let mut wrong_type = attempt(&user, 1, 2);
    wrong_type["score"] = serde_json::json!("seven");

    for payload in [zero_questions, negative_time, empty_title, wrong_type] {
        let response = client
            .post(&format!("{}/api/results", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400, "payload {}", payload);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().is_some());
    }

    // Nothing was written.
    let history: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn malformed_user_reference_is_422() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let educator = new_user_id();

    let response = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&educator, "educator")))
        .json(&attempt("student-42", 1, 2))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn students_cannot_submit_or_read_for_others() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let alice = new_user_id();
    let bob = new_user_id();

    let forbidden = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&alice, "student")))
        .json(&attempt(&bob, 1, 2))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    let created: serde_json::Value = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&bob, "student")))
        .json(&attempt(&bob, 1, 2))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let peek = client
        .get(&format!("{}/api/results/{}", address, id))
        .header("Authorization", format!("Bearer {}", token_for(&alice, "student")))
        .send()
        .await
        .unwrap();
    assert_eq!(peek.status().as_u16(), 403);

    let staff_listing = client
        .get(&format!("{}/api/results/users/{}", address, bob))
        .header("Authorization", format!("Bearer {}", token_for(&alice, "student")))
        .send()
        .await
        .unwrap();
    assert_eq!(staff_listing.status().as_u16(), 403);
}

#[tokio::test]
async fn educator_dashboard_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student = new_user_id();
    let educator_token = token_for(&new_user_id(), "educator");

    // Educator submits on behalf of a student twice.
    for (score, total) in [(9, 10), (1, 2)] {
        let response = client
            .post(&format!("{}/api/results", address))
            .header("Authorization", format!("Bearer {}", educator_token))
            .json(&attempt(&student, score, total))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    // Act
    let listing: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/users/{}", address, student))
        .header("Authorization", format!("Bearer {}", educator_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let summary: serde_json::Value = client
        .get(&format!("{}/api/results/users/{}/summary", address, student))
        .header("Authorization", format!("Bearer {}", educator_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(listing.len(), 2);
    assert_eq!(summary["attempts"], 2);
    assert_eq!(summary["totalXp"], 75);
    assert_eq!(summary["bestPercentage"].as_f64().unwrap(), 90.0);

    // The student sees the same totals on their own summary.
    let own: serde_json::Value = client
        .get(&format!("{}/api/results/me/summary", address))
        .header("Authorization", format!("Bearer {}", token_for(&student, "student")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["totalXp"], 75);
}

#[tokio::test]
async fn concurrent_submissions_are_independent() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let user = new_user_id();
    let token = token_for(&user, "student");

    let submit = |score: i64| {
        let client = client.clone();
        let url = format!("{}/api/results", address);
        let token = token.clone();
        let payload = attempt(&user, score, 4);
        async move {
            client
                .post(&url)
                .header("Authorization", format!("Bearer {}", token))
                .json(&payload)
                .send()
                .await
                .unwrap()
                .json::<serde_json::Value>()
                .await
                .unwrap()
        }
    };

    let (a, b) = tokio::join!(submit(1), submit(4));
    assert_ne!(a["id"], b["id"]);

    let history: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);

    let mut scores: Vec<i64> = history.iter().map(|r| r["score"].as_i64().unwrap()).collect();
    scores.sort();
    assert_eq!(scores, vec![1, 4]);
}

#[tokio::test]
async fn admin_amendment_keeps_derived_fields() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student = new_user_id();

    let created: serde_json::Value = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&student, "student")))
        .json(&attempt(&student, 2, 10))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["xpEarned"], 15);

    // Students cannot amend.
    let denied = client
        .patch(&format!("{}/api/results/{}", address, id))
        .header("Authorization", format!("Bearer {}", token_for(&student, "student")))
        .json(&serde_json::json!({ "score": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    let admin_token = token_for(&new_user_id(), "admin");

    // Derived fields cannot be written directly.
    let rejected = client
        .patch(&format!("{}/api/results/{}", address, id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "xpEarned": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);

    let amended: serde_json::Value = client
        .patch(&format!("{}/api/results/{}", address, id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "score": 10, "quizTitle": "Smart Shopper (revised)" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(amended["score"], 10);
    assert_eq!(amended["quizTitle"], "Smart Shopper (revised)");
    assert_eq!(amended["percentageScore"].as_f64().unwrap(), 20.0);
    assert_eq!(amended["xpEarned"], 15);
    assert_eq!(amended["completedAt"], created["completedAt"]);

    let missing = client
        .patch(&format!("{}/api/results/{}", address, 987_654))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({ "timeTaken": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn leaderboard_ranks_by_total_xp() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let leader = new_user_id();
    let runner_up = new_user_id();

    for (user, score, total) in [(&leader, 10, 10), (&leader, 3, 4), (&runner_up, 0, 5)] {
        client
            .post(&format!("{}/api/results", address))
            .header("Authorization", format!("Bearer {}", token_for(user, "student")))
            .json(&attempt(user, score, total))
            .send()
            .await
            .unwrap();
    }

    let board: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/leaderboard?limit=5", address))
        .header("Authorization", format!("Bearer {}", token_for(&runner_up, "student")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["userId"], leader);
    assert_eq!(board[0]["totalXp"], 85);
    assert_eq!(board[0]["attempts"], 2);
    assert_eq!(board[1]["totalXp"], 15);
}

#[tokio::test]
async fn strict_mode_rejects_score_above_total() {
    let address = spawn_app_with(Arc::new(MemoryResultStore::new()), true).await;
    let client = reqwest::Client::new();
    let user = new_user_id();

    let mut payload = attempt(&user, 4, 4);
    payload["score"] = serde_json::json!(5);

    let response = client
        .post(&format!("{}/api/results", address))
        .header("Authorization", format!("Bearer {}", token_for(&user, "student")))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn history_cursor_reaches_results_with_equal_timestamps() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let user = new_user_id();
    let token = token_for(&user, "student");

    for _ in 0..3 {
        let mut payload = attempt(&user, 1, 2);
        payload["completedAt"] = serde_json::json!("2025-02-01T08:00:00Z");
        client
            .post(&format!("{}/api/results", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await
            .unwrap();
    }

    let first: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/me", address))
        .query(&[("limit", "2")])
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let cursor_at = first[1]["completedAt"].as_str().unwrap().to_string();
    let cursor_id = first[1]["id"].as_i64().unwrap().to_string();

    let rest: Vec<serde_json::Value> = client
        .get(&format!("{}/api/results/me", address))
        .query(&[
            ("limit", "2"),
            ("before", cursor_at.as_str()),
            ("beforeId", cursor_id.as_str()),
        ])
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rest.len(), 1);
    assert!(first.iter().all(|r| r["id"] != rest[0]["id"]));
}
