use actix_web::{get, patch, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::UserRole,
        dto::request::{ReviewRequest, SubmitAnswersRequest},
    },
};

#[post("/api/submissions/{exam_id}")]
pub async fn submit_answers(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    request: web::Json<SubmitAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Student, UserRole::Admin])?;

    let submission = state
        .submission_service
        .submit(&claims.sub, &exam_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(submission))
}

#[get("/api/submissions/me/{exam_id}")]
pub async fn get_my_submission(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Student, UserRole::Admin])?;

    let submission = state
        .submission_service
        .get_mine(&claims.sub, &exam_id)
        .await?;
    Ok(HttpResponse::Ok().json(submission))
}

#[get("/api/submissions/exam/{exam_id}")]
pub async fn list_exam_submissions(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Admin, UserRole::Faculty])?;

    let submissions = state
        .submission_service
        .list_for_exam(claims, &exam_id)
        .await?;
    Ok(HttpResponse::Ok().json(submissions))
}

#[get("/api/submissions/{id}")]
pub async fn get_submission(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let submission = state.submission_service.get(&id).await?;
    Ok(HttpResponse::Ok().json(submission))
}

#[patch("/api/submissions/{id}/review")]
pub async fn review_submission(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ReviewRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let submission = state.submission_service.review(&id, &request).await?;
    Ok(HttpResponse::Ok().json(submission))
}
