//! HTTP service classifying plant leaf photos into 38 crop/disease classes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod model;
pub mod models;
pub mod preprocess;

use actix_cors::Cors;
use actix_web::web;

use error::PredictError;
use preprocess::ResizeMode;

/// Any origin may call the API.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}

/// Registers `/predict` together with its JSON limits and resize policy.
/// The classifier itself is supplied by the caller as `web::Data<dyn Classifier>`.
pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    max_payload_bytes: usize,
    resize_mode: ResizeMode,
) {
    let json_config = web::JsonConfig::default()
        .limit(max_payload_bytes)
        .error_handler(|err, _req| PredictError::from(err).into());

    cfg.app_data(json_config)
        .app_data(web::Data::new(resize_mode))
        .service(web::resource("/predict").route(web::post().to(handlers::predict)));
}
