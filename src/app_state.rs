use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ExamRepository, MongoExamRepository, MongoSubmissionRepository, MongoUserRepository,
        SubmissionRepository, UserRepository,
    },
    services::{
        AuthService, CodeAllocator, ExamService, ProctorBroadcaster, StaffService, StudentService,
        SubmissionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub staff_service: Arc<StaffService>,
    pub student_service: Arc<StudentService>,
    pub exam_service: Arc<ExamService>,
    pub submission_service: Arc<SubmissionService>,
    pub jwt_service: Arc<JwtService>,
    pub proctor: ProctorBroadcaster,
    pub config: Arc<Config>,
    /// `None` when running on repositories that are not Mongo-backed.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;
        let exams = Arc::new(MongoExamRepository::new(&db));
        exams.ensure_indexes().await?;
        let submissions = Arc::new(MongoSubmissionRepository::new(&db));
        submissions.ensure_indexes().await?;
        log::info!("Indexes ready on database '{}'", db.db_name());

        let mut state = Self::from_repositories(config, users, exams, submissions);
        state.db = Some(db);
        Ok(state)
    }

    /// Wires every service on top of the given repositories.
    pub fn from_repositories(
        config: Config,
        users: Arc<dyn UserRepository>,
        exams: Arc<dyn ExamRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));
        let allocator = Arc::new(CodeAllocator::new(
            exams.clone(),
            config.code_allocation_max_draws,
        ));

        Self {
            auth_service: Arc::new(AuthService::new(
                users.clone(),
                exams.clone(),
                jwt_service.clone(),
            )),
            staff_service: Arc::new(StaffService::new(users.clone())),
            student_service: Arc::new(StudentService::new(users.clone())),
            exam_service: Arc::new(ExamService::new(exams.clone(), allocator)),
            submission_service: Arc::new(SubmissionService::new(submissions, exams, users)),
            jwt_service,
            proctor: ProctorBroadcaster::new(),
            config: Arc::new(config),
            db: None,
        }
    }
}
