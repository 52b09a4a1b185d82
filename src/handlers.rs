use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::PredictError;
use crate::labels::PredictionDetails;
use crate::model::{self, Classifier};
use crate::models::{PredictRequest, PredictionResponse};
use crate::preprocess::{self, ResizeMode};

pub async fn predict(
    classifier: web::Data<dyn Classifier>,
    resize_mode: web::Data<ResizeMode>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse, PredictError> {
    let request_id = Uuid::new_v4();
    let PredictRequest { image, details } = body.into_inner();

    let encoded = match image {
        Some(encoded) if !encoded.trim().is_empty() => encoded,
        _ => {
            log::warn!("[{}] rejected: no image in request", request_id);
            return Err(PredictError::MissingField);
        }
    };
    log::info!("[{}] received {} base64 chars", request_id, encoded.len());

    let mode = **resize_mode;
    let prediction = web::block(move || -> Result<model::Prediction, PredictError> {
        let input = preprocess::prepare(&encoded, mode)?;
        Ok(model::predict(classifier.get_ref(), input)?)
    })
    .await
    .map_err(|e| PredictError::ModelInvocationFailure(e.to_string()))?
    .map_err(|e| {
        match &e {
            PredictError::ModelInvocationFailure(_) => log::error!("[{}] {}", request_id, e),
            _ => log::warn!("[{}] rejected: {}", request_id, e),
        }
        e
    })?;

    log::info!(
        "[{}] predicted {} ({}%)",
        request_id,
        prediction.label,
        prediction.confidence
    );

    Ok(HttpResponse::Ok().json(PredictionResponse {
        class_name: prediction.label.to_string(),
        confidence: prediction.confidence,
        details: details.then(|| PredictionDetails::for_class(prediction.label)),
    }))
}
