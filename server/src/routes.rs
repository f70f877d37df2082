use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse, Responder};
use shared::interaction::{RestfulError, RestfulResponse};
use tracing::trace;

use crate::restful::RESTful;

#[get("/api/v1/tasks")]
pub(crate) async fn tasks(api: web::Data<Arc<RESTful>>) -> impl Responder {
    trace!("/api/v1/tasks");
    HttpResponse::Ok().json(RestfulResponse::success(api.list_tasks()))
}

#[get("/api/v1/tasks/{index}")]
pub(crate) async fn task(
    path: web::Path<u64>,
    api: web::Data<Arc<RESTful>>,
) -> Result<impl Responder, RestfulError> {
    trace!("/api/v1/tasks/{{index}}");
    let data = api.task_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RestfulResponse::success(data)))
}

#[post("/api/v1/sync")]
pub(crate) async fn sync(api: web::Data<Arc<RESTful>>) -> Result<impl Responder, RestfulError> {
    trace!("/api/v1/sync");
    let data = api.resync().await?;
    Ok(HttpResponse::Ok().json(RestfulResponse::success(data)))
}
