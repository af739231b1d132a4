pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;

use std::sync::Arc;

use actix_web::dev::Service;
use actix_web::http::header::{HeaderValue, CONTENT_TYPE};
use actix_web::{middleware::Logger, web, App, HttpServer};
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

pub use application::order_service::{AppOrderService, OrderService};
pub use config::Settings;
pub use infrastructure::memory_repo::InMemoryOrderRepository;

use domain::errors::DomainError;
use domain::order::{NewOrder, Product};
use domain::ports::OrderRepository;
use errors::AppError;

/// Service backed by a fresh, empty in-memory store.
pub fn in_memory_service() -> web::Data<AppOrderService> {
    let repo: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
    web::Data::new(OrderService::new(repo))
}

/// Register the order routes and the OpenAPI document on `cfg`.
///
/// The caller provides the `web::Data<AppOrderService>` app data. Every
/// response under `/orders`, errors included, is sent as `application/json`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .app_data(
                web::JsonConfig::default()
                    .content_type_required(false)
                    .error_handler(|err, _req| AppError::MalformedBody(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _req| AppError::InvalidId(err.to_string()).into()),
            )
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async move {
                    let mut res = fut.await?;
                    res.headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    Ok(res)
                }
            })
            .route("", web::get().to(handlers::orders::list_orders))
            .route("", web::post().to(handlers::orders::create_order))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}", web::patch().to(handlers::orders::update_order))
            .route("/{id}", web::delete().to(handlers::orders::delete_order)),
    )
    .route(
        "/api-docs/openapi.json",
        web::get().to(openapi::openapi_json),
    );
}

/// Insert the sample order the service historically started with.
///
/// The empty delivery address mirrors that historical startup order.
pub fn seed_demo_order(service: &AppOrderService) -> Result<Uuid, DomainError> {
    service.create_order(NewOrder {
        is_open: true,
        delivery_time: Some(Utc::now()),
        delivery_address: String::new(),
        products: vec![
            Product {
                id: Uuid::new_v4(),
                name: "Apples".to_string(),
                price: BigDecimal::from(20),
            },
            Product {
                id: Uuid::new_v4(),
                name: "Pears".to_string(),
                price: BigDecimal::from(30),
            },
        ],
    })
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: web::Data<AppOrderService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
