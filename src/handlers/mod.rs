pub mod auth_handler;
pub mod exam_handler;
pub mod health_handler;
pub mod monitor_handler;
pub mod student_handler;
pub mod submission_handler;

use actix_web::web;

use crate::errors::AppError;

/// Cap on JSON bodies and plain-text question uploads.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Registers every route. Literal paths go before the parameterised ones
/// they would otherwise be swallowed by.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        // auth
        .service(auth_handler::student_login)
        .service(auth_handler::reexam_login)
        .service(auth_handler::faculty_login)
        .service(auth_handler::admin_login)
        .service(auth_handler::admin_exists)
        .service(auth_handler::admin_setup)
        .service(auth_handler::set_faculty_credentials)
        .service(auth_handler::list_faculty)
        .service(auth_handler::delete_faculty)
        .service(auth_handler::list_admins)
        .service(auth_handler::add_admin)
        .service(auth_handler::delete_admin)
        // exams
        .service(exam_handler::create_exam)
        .service(exam_handler::upload_txt)
        .service(exam_handler::list_exams)
        .service(exam_handler::list_my_exams)
        .service(exam_handler::get_exam_by_code)
        .service(exam_handler::get_exam)
        .service(exam_handler::update_exam)
        .service(exam_handler::delete_exam)
        // submissions
        .service(submission_handler::get_my_submission)
        .service(submission_handler::list_exam_submissions)
        .service(submission_handler::submit_answers)
        .service(submission_handler::review_submission)
        .service(submission_handler::get_submission)
        // students
        .service(student_handler::get_profile)
        .service(student_handler::update_profile)
        .service(student_handler::list_students)
        .service(student_handler::add_student)
        .service(student_handler::delete_student)
        // proctoring
        .service(monitor_handler::tab_event)
        // health
        .service(health_handler::health_check)
        .service(health_handler::health_check_ready);
}
