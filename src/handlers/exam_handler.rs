use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::UserRole,
        dto::{
            request::{CreateExamRequest, UpdateExamRequest, UploadTxtParams},
            response::OkResponse,
        },
    },
};

#[post("/api/exams")]
pub async fn create_exam(
    state: web::Data<AppState>,
    request: web::Json<CreateExamRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Admin, UserRole::Faculty])?;

    let exam = state
        .exam_service
        .create(&claims.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

/// The request body is the raw question file; exam metadata travels in the
/// query string.
#[post("/api/exams/upload-txt")]
pub async fn upload_txt(
    state: web::Data<AppState>,
    params: web::Query<UploadTxtParams>,
    body: String,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Admin, UserRole::Faculty])?;
    if body.trim().is_empty() {
        return Err(AppError::ValidationError("file required".to_string()));
    }

    let exam = state
        .exam_service
        .upload_txt(&claims.sub, &params, &body)
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[get("/api/exams")]
pub async fn list_exams(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin, UserRole::Student])?;

    let exams = state.exam_service.list_all().await?;
    Ok(HttpResponse::Ok().json(exams))
}

#[get("/api/exams/mine")]
pub async fn list_my_exams(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Admin, UserRole::Faculty])?;

    let exams = state.exam_service.list_mine(claims).await?;
    Ok(HttpResponse::Ok().json(exams))
}

#[get("/api/exams/code/{code}")]
pub async fn get_exam_by_code(
    state: web::Data<AppState>,
    code: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin, UserRole::Student])?;

    let exam = state.exam_service.get_view_by_code(&code).await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[get("/api/exams/{id}")]
pub async fn get_exam(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin, UserRole::Student])?;

    let exam = state.exam_service.get_view(&id).await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[put("/api/exams/{id}")]
pub async fn update_exam(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateExamRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let exam = state
        .exam_service
        .update(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(exam))
}

#[delete("/api/exams/{id}")]
pub async fn delete_exam(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Admin, UserRole::Faculty])?;

    state.exam_service.delete(claims, &id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
