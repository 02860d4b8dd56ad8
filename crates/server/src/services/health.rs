use actix_web::web::{get, resource};
use actix_web::{HttpResponse, Resource};
use serde_json::json;

pub fn configure_routes() -> Resource {
    resource("/health").route(get().to(process))
}

async fn process() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
