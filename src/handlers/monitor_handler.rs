use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    models::dto::{request::TabEventRequest, response::OkResponse},
};

/// Fire-and-forget proctoring signal; no authentication, no persistence.
#[post("/api/monitor/tab")]
pub async fn tab_event(
    state: web::Data<AppState>,
    payload: web::Json<TabEventRequest>,
) -> HttpResponse {
    state.proctor.publish(payload.into_inner());
    HttpResponse::Ok().json(OkResponse::ok())
}
