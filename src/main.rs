use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use plant_disease_classifier::config::ServerConfig;
use plant_disease_classifier::labels::LABELS;
use plant_disease_classifier::model::{Classifier, TractClassifier};
use plant_disease_classifier::{configure_routes, cors};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    log::info!("Configuration: {:?}", config);

    let classifier = TractClassifier::load(&config.model_path, LABELS.len()).map_err(|e| {
        log::error!("Failed to load model at startup: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    log::info!(
        "Model {} ready for {} classes",
        classifier.path().display(),
        LABELS.len()
    );
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let max_payload_bytes = config.max_payload_bytes;
    let resize_mode = config.resize_mode;

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors())
            .app_data(web::Data::from(classifier.clone()))
            .configure(|cfg| configure_routes(cfg, max_payload_bytes, resize_mode))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    log::info!("Server running at http://{}:{}", config.host, config.port);
    server.bind((config.host.as_str(), config.port))?.run().await
}
