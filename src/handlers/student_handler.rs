use actix_web::{delete, get, patch, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::UserRole,
        dto::{
            request::{AddStudentRequest, UpdateProfileRequest},
            response::OkResponse,
        },
    },
};

#[get("/api/students/me")]
pub async fn get_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Student])?;

    let profile = state.student_service.get_profile(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[patch("/api/students/me")]
pub async fn update_profile(
    state: web::Data<AppState>,
    request: web::Json<UpdateProfileRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let claims = auth.require(&[UserRole::Student])?;

    let profile = state
        .student_service
        .update_profile(&claims.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[get("/api/students/admin/list")]
pub async fn list_students(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let students = state.student_service.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

#[post("/api/students/admin/add")]
pub async fn add_student(
    state: web::Data<AppState>,
    request: web::Json<AddStudentRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    let student = state.student_service.add_student(&request).await?;
    Ok(HttpResponse::Ok().json(OkResponse::with_user(student)))
}

#[delete("/api/students/admin/{id}")]
pub async fn delete_student(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    auth.require(&[UserRole::Admin])?;

    state.student_service.delete_student(&id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockExamRepository, MockUserRepository};
    use crate::test_utils::{
        fixtures::test_student,
        test_helpers::{bearer, state_with},
    };
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_profile_is_the_callers_own() {
        let student = test_student("21CS001");
        let student_id = student.id.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .withf({
                let student_id = student_id.clone();
                move |id| id == student_id
            })
            .returning(move |_| Ok(Some(student.clone())));
        let state = state_with(users, MockExamRepository::new());
        let token = bearer(&state, &student_id, UserRole::Student);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(get_profile),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/students/me")
            .insert_header(("Authorization", token))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["regNo"], "21CS001");
        assert!(body.get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn test_student_admin_routes_forbid_students() {
        let mut users = MockUserRepository::new();
        users.expect_list_by_role().never();
        let state = state_with(users, MockExamRepository::new());
        let token = bearer(&state, "student-1", UserRole::Student);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(list_students),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/students/admin/list")
            .insert_header(("Authorization", token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
