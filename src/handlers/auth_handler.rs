use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::UserRole,
        dto::{
            request::{CredentialsRequest, FacultyCredentialsRequest, StudentLoginRequest},
            response::{AdminExistsResponse, OkResponse},
        },
    },
};

#[post("/api/auth/student-login")]
pub async fn student_login(
    state: web::Data<AppState>,
    request: web::Json<StudentLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.student_login(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/auth/reexam-login")]
pub async fn reexam_login(
    state: web::Data<AppState>,
    request: web::Json<StudentLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.reexam_login(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/auth/faculty-login")]
pub async fn faculty_login(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .staff_login(&request, UserRole::Faculty)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/auth/admin-login")]
pub async fn admin_login(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .staff_login(&request, UserRole::Admin)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/auth/admin-exists")]
pub async fn admin_exists(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let exists = state.auth_service.admin_exists().await?;
    Ok(HttpResponse::Ok().json(AdminExistsResponse { exists }))
}

#[post("/api/auth/admin-setup")]
pub async fn admin_setup(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let admin = state.auth_service.admin_setup(&request).await?;
    Ok(HttpResponse::Ok().json(OkResponse::with_user(admin)))
}

#[post("/api/auth/admin/faculty-set")]
pub async fn set_faculty_credentials(
    state: web::Data<AppState>,
    request: web::Json<FacultyCredentialsRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let faculty = state.staff_service.set_faculty_credentials(&request).await?;
    Ok(HttpResponse::Ok().json(OkResponse::with_user(faculty)))
}

#[get("/api/auth/admin/faculty-list")]
pub async fn list_faculty(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let faculty = state.staff_service.list_faculty().await?;
    Ok(HttpResponse::Ok().json(faculty))
}

#[delete("/api/auth/admin/faculty/{id}")]
pub async fn delete_faculty(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    state.staff_service.delete_faculty(&id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

#[get("/api/auth/admin/list")]
pub async fn list_admins(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let admins = state.staff_service.list_admins().await?;
    Ok(HttpResponse::Ok().json(admins))
}

#[post("/api/auth/admin/add")]
pub async fn add_admin(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let admin = state.staff_service.add_admin(&request).await?;
    Ok(HttpResponse::Ok().json(OkResponse::with_user(admin)))
}

#[delete("/api/auth/admin/{id}")]
pub async fn delete_admin(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let caller = auth.require(&[UserRole::Admin])?;

    state.staff_service.delete_admin(&caller.sub, &id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
