use delivery_orders::{build_server, in_memory_service, seed_demo_order, Settings};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let service = in_memory_service();
    if settings.seed_demo_order {
        let id = seed_demo_order(&service).map_err(std::io::Error::other)?;
        log::info!("Seeded demo order {}", id);
    }

    log::info!(
        "Starting server at http://{}:{}",
        settings.host,
        settings.port
    );

    build_server(service, &settings.host, settings.port)?.await
}
