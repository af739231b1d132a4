use actix_web::HttpResponse;
use utoipa::OpenApi;

use crate::handlers::orders;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::ProductRequest,
        orders::OrderResponse,
        orders::ProductResponse,
    )),
    tags((name = "orders", description = "Delivery order management"))
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
