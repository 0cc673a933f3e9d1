// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        quiz_result::{
            LeaderboardParams, RecordResultRequest, ResultAmendment, ResultListParams, ResultView,
        },
        user::UserId,
    },
    recorder::ResultRecorder,
    utils::jwt::Claims,
};

/// Maps body parse failures onto the same `{"error": ...}` shape as everything else.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Records a completed attempt.
///
/// * Students may only submit for themselves; staff may submit for anyone.
/// * Returns 201 with the stored record, including server-derived
///   `percentageScore`, `xpEarned` and `tier`.
pub async fn record_result(
    State(recorder): State<ResultRecorder>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<RecordResultRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    // A malformed id is left for the recorder to reject as a bad reference.
    if let Ok(user_id) = UserId::parse(&req.user_id) {
        if !claims.may_act_for(&user_id) {
            tracing::warn!(
                "User {} tried to record a result for {}",
                claims.sub,
                user_id
            );
            return Err(AppError::Forbidden(
                "Cannot record results for another user".to_string(),
            ));
        }
    }

    let saved = recorder.record_result(req).await?;

    Ok((StatusCode::CREATED, Json(ResultView::from(saved))))
}

/// Fetches one record. Owner or staff only.
pub async fn get_result(
    State(recorder): State<ResultRecorder>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = recorder.get_result(id).await?;

    if !claims.may_act_for(&result.user_id) {
        return Err(AppError::Forbidden(
            "Cannot view another user's results".to_string(),
        ));
    }

    Ok(Json(ResultView::from(result)))
}

/// Lists the caller's own results, newest first.
pub async fn list_my_results(
    State(recorder): State<ResultRecorder>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ResultListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let results = recorder.list_results(&user_id, &params).await?;

    Ok(Json(
        results.into_iter().map(ResultView::from).collect::<Vec<_>>(),
    ))
}

/// XP totals and score averages for the caller.
pub async fn my_summary(
    State(recorder): State<ResultRecorder>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(recorder.summarize(&user_id).await?))
}

/// Lists any user's results. Staff only.
pub async fn list_user_results(
    State(recorder): State<ResultRecorder>,
    Path(user_id): Path<String>,
    Query(params): Query<ResultListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(&user_id)?;
    let results = recorder.list_results(&user_id, &params).await?;

    Ok(Json(
        results.into_iter().map(ResultView::from).collect::<Vec<_>>(),
    ))
}

/// Summary for any user. Staff only.
pub async fn user_summary(
    State(recorder): State<ResultRecorder>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(&user_id)?;
    Ok(Json(recorder.summarize(&user_id).await?))
}

/// Users ranked by total XP.
pub async fn get_leaderboard(
    State(recorder): State<ResultRecorder>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(recorder.leaderboard(params.limit).await?))
}

/// Corrects raw fields on a stored record. Admin only.
///
/// Derived fields are not recomputed.
pub async fn amend_result(
    State(recorder): State<ResultRecorder>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    payload: Result<Json<ResultAmendment>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let amendment = json_body(payload)?;
    let amended = recorder.amend_result(id, amendment).await?;

    tracing::info!("Admin {} amended quiz result {}", claims.sub, id);

    Ok(Json(ResultView::from(amended)))
}
