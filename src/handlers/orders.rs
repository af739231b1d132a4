use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::AppOrderService;
use crate::domain::order::{NewOrder, Order, OrderChanges, Product};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    /// Generated when omitted.
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    /// Non-negative decimal, as a JSON number or a string such as "9.99".
    #[serde(deserialize_with = "deserialize_price")]
    #[schema(value_type = f64)]
    pub price: BigDecimal,
}

/// Body of `POST /orders`. Any `id`, `created_at` or `updated_at` sent by the
/// client is ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub is_open: bool,
    pub delivery_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub products: Vec<ProductRequest>,
}

/// Body of `PATCH /orders/{id}`. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub is_open: Option<bool>,
    /// An explicit `null` clears the delivery time; omitting it keeps it.
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub delivery_time: Option<Option<DateTime<Utc>>>,
    pub delivery_address: Option<String>,
    pub products: Option<Vec<ProductRequest>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    /// Decimal rendered as a string to avoid floating-point issues.
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub is_open: bool,
    pub delivery_time: Option<DateTime<Utc>>,
    pub delivery_address: String,
    pub products: Vec<ProductResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        other => {
            return Err(de::Error::custom(format!(
                "price must be a number or a decimal string, got {other}"
            )))
        }
    };
    BigDecimal::from_str(text.trim())
        .map_err(|e| de::Error::custom(format!("invalid price '{text}': {e}")))
}

/// Marks a field as present, so `null` becomes `Some(None)` while a missing
/// field stays `None` through `#[serde(default)]`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn into_products(products: Vec<ProductRequest>) -> Vec<Product> {
    products
        .into_iter()
        .map(|p| Product {
            id: p.id.unwrap_or_else(Uuid::new_v4),
            name: p.name,
            price: p.price,
        })
        .collect()
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(body: CreateOrderRequest) -> Self {
        NewOrder {
            is_open: body.is_open,
            delivery_time: body.delivery_time,
            delivery_address: body.delivery_address,
            products: into_products(body.products),
        }
    }
}

impl From<UpdateOrderRequest> for OrderChanges {
    fn from(body: UpdateOrderRequest) -> Self {
        OrderChanges {
            is_open: body.is_open,
            delivery_time: body.delivery_time,
            delivery_address: body.delivery_address,
            products: body.products.map(into_products),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            is_open: o.is_open,
            delivery_time: o.delivery_time,
            delivery_address: o.delivery_address,
            products: o
                .products
                .into_iter()
                .map(|p| ProductResponse {
                    id: p.id,
                    name: p.name,
                    price: p.price.to_string(),
                })
                .collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns every order currently held, oldest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<AppOrderService>) -> Result<HttpResponse, AppError> {
    let orders: Vec<OrderResponse> = service
        .list_orders()?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(orders))
}

/// POST /orders
///
/// Stores a new order and answers with its freshly assigned id as plain text.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Id of the created order", body = String),
        (status = 500, description = "Malformed body or internal error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = service.create_order(body.into_inner().into())?;
    log::info!("Created order {}", id);

    Ok(HttpResponse::Ok().body(id.to_string()))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Malformed order id"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner())?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /orders/{id}
///
/// Replaces the supplied fields. An unknown id is not reported to the client:
/// the request succeeds and the store is left untouched.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated (or id unknown)"),
        (status = 400, description = "Malformed order id"),
        (status = 500, description = "Malformed body or internal error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match service.update_order(id, body.into_inner().into())? {
        Some(order) => log::info!("Updated order {} at {}", id, order.updated_at),
        None => log::warn!("PATCH for unknown order {} ignored", id),
    }

    Ok(HttpResponse::Ok().finish())
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order deleted (or id unknown)"),
        (status = 400, description = "Malformed order id"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if service.delete_order(id)? {
        log::info!("Deleted order {}", id);
    } else {
        log::warn!("DELETE for unknown order {} ignored", id);
    }

    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::json;

    use super::*;
    use crate::in_memory_service as fresh_service;

    fn widget_order() -> Value {
        json!({
            "is_open": true,
            "delivery_address": "123 Main St",
            "products": [{ "name": "Widget", "price": 10.0 }]
        })
    }

    macro_rules! init_app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data($service.clone())
                    .configure(crate::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn list_returns_empty_array_for_new_store() {
        let app = init_app!(fresh_service());

        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Vec<OrderResponse> = test::read_body_json(resp).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn create_returns_plain_id_with_json_content_type() {
        let service = fresh_service();
        let app = init_app!(service);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(widget_order())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = test::read_body(resp).await;
        let id = Uuid::parse_str(std::str::from_utf8(&body).unwrap()).expect("body is an id");

        let order = service.get_order(id).expect("order should be stored");
        assert_eq!(order.delivery_address, "123 Main St");
        assert_eq!(order.products[0].name, "Widget");
    }

    #[actix_web::test]
    async fn create_ignores_client_supplied_id_and_timestamps() {
        let service = fresh_service();
        let app = init_app!(service);
        let client_id = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "id": client_id,
                "created_at": "2000-01-01T00:00:00Z",
                "updated_at": "2000-01-01T00:00:00Z",
                "delivery_address": "somewhere"
            }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let id = Uuid::parse_str(std::str::from_utf8(&body).unwrap()).unwrap();

        assert_ne!(id, client_id);
        let order = service.get_order(id).unwrap();
        assert!(order.created_at.timestamp() > 946_684_800);
    }

    #[actix_web::test]
    async fn create_accepts_body_without_json_content_type() {
        let app = init_app!(fresh_service());

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(widget_order().to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn create_with_malformed_body_returns_500() {
        let service = fresh_service();
        let app = init_app!(service);

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(service.list_orders().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn create_with_negative_price_returns_500() {
        let service = fresh_service();
        let app = init_app!(service);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "products": [{ "name": "Refund", "price": -5 }] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(service.list_orders().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn price_is_rendered_as_decimal_string() {
        let service = fresh_service();
        let app = init_app!(service);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "products": [
                { "name": "A", "price": 9.99 },
                { "name": "B", "price": "19.99" }
            ] }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/orders").to_request();
        let body: Vec<OrderResponse> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0].products[0].price, "9.99");
        assert_eq!(body[0].products[1].price, "19.99");
    }

    #[actix_web::test]
    async fn patch_updates_only_supplied_fields() {
        let service = fresh_service();
        let app = init_app!(service);
        let id = service
            .create_order(NewOrder {
                is_open: true,
                delivery_address: "123 Main St".to_string(),
                ..Default::default()
            })
            .unwrap();
        let before = service.get_order(id).unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}"))
            .set_json(json!({
                "delivery_address": "456 Elm St",
                "updated_at": "2000-01-01T00:00:00Z"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let after = service.get_order(id).unwrap();
        assert_eq!(after.delivery_address, "456 Elm St");
        assert!(after.is_open);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[actix_web::test]
    async fn patch_null_delivery_time_unschedules_order() {
        let service = fresh_service();
        let app = init_app!(service);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "delivery_time": "2030-01-01T00:00:00Z" }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let id = Uuid::parse_str(std::str::from_utf8(&body).unwrap()).unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}"))
            .set_json(json!({ "delivery_time": null }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/orders").to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert!(list[0]["delivery_time"].is_null());
    }

    #[actix_web::test]
    async fn patch_without_delivery_time_keeps_it() {
        let service = fresh_service();
        let app = init_app!(service);
        let slot: DateTime<Utc> = "2030-01-01T00:00:00Z".parse().unwrap();
        let id = service
            .create_order(NewOrder {
                delivery_time: Some(slot),
                ..Default::default()
            })
            .unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}"))
            .set_json(json!({ "is_open": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let order = service.get_order(id).unwrap();
        assert!(order.is_open);
        assert_eq!(order.delivery_time, Some(slot));
    }

    #[actix_web::test]
    async fn patch_unknown_id_returns_200_and_changes_nothing() {
        let service = fresh_service();
        let app = init_app!(service);
        service.create_order(NewOrder::default()).unwrap();
        let snapshot = service.list_orders().unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{}", Uuid::new_v4()))
            .set_json(json!({ "is_open": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(service.list_orders().unwrap(), snapshot);
    }

    #[actix_web::test]
    async fn patch_malformed_id_returns_400_before_reading_body() {
        let app = init_app!(fresh_service());

        let req = test::TestRequest::patch()
            .uri("/orders/not-a-uuid")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{broken")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[actix_web::test]
    async fn patch_malformed_body_returns_500() {
        let service = fresh_service();
        let app = init_app!(service);
        let id = service.create_order(NewOrder::default()).unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}"))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(r#"{"is_open": "sometimes"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!service.get_order(id).unwrap().is_open);
    }

    #[actix_web::test]
    async fn delete_removes_order() {
        let service = fresh_service();
        let app = init_app!(service);
        let id = service.create_order(NewOrder::default()).unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/orders/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(service.list_orders().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_unknown_id_returns_200() {
        let service = fresh_service();
        let app = init_app!(service);
        service.create_order(NewOrder::default()).unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/orders/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(service.list_orders().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn delete_malformed_id_returns_400() {
        let service = fresh_service();
        let app = init_app!(service);
        service.create_order(NewOrder::default()).unwrap();

        let req = test::TestRequest::delete()
            .uri("/orders/12345")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(service.list_orders().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn get_order_returns_404_for_unknown_id() {
        let app = init_app!(fresh_service());

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn get_order_returns_stored_order() {
        let service = fresh_service();
        let app = init_app!(service);
        let id = service
            .create_order(NewOrder {
                delivery_address: "1 Infinite Loop".to_string(),
                ..Default::default()
            })
            .unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{id}"))
            .to_request();
        let body: OrderResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.id, id);
        assert_eq!(body.delivery_address, "1 Infinite Loop");
    }
}
