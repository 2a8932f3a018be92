#[macro_use]
extern crate tracing;

use std::error::Error;

use actix_web::web::Data;
use actix_web::{App, HttpServer};

use campus_lib::config::Config;
use campus_lib::{course, error, health, tls};

const SERVICE_NAME: &str = "course-server";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    campus_lib::tracing::init_subscriber(SERVICE_NAME, &config)?;
    info!("tracing initialized");

    // course data survives restarts unless a reset is requested
    let reset = config.reset_on_start.unwrap_or(false);
    let (course_repo, health_check) =
        campus_repo::sqlx_repo::create_course_repos(&config.database_url, reset).await?;

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(course_repo.clone()))
            .app_data(Data::new(health_check.clone()))
            .app_data(error::json_config())
            .wrap(campus_lib::tracing::create_middleware())
            .service(health::health)
            .service(course::course_service())
    });
    server = match &config.ssl {
        None => {
            warn!("Using http");
            server.bind(&config.bind_address)?
        }
        Some(ssl_config) => {
            info!("Using https");
            let tls_config = tls::load_server_config(ssl_config)?;
            server.bind_rustls(&config.bind_address, tls_config)?
        }
    };
    info!(bind_address = %config.bind_address, "Starting server");
    server.run().await?;

    Ok(())
}
