use serde::{Deserialize, Serialize};

use crate::labels::PredictionDetails;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Base64 image; kept optional so a missing field gets its own error.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub details: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PredictionDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_uses_class_key_and_omits_empty_details() {
        let response = PredictionResponse {
            class_name: "Apple___healthy".to_string(),
            confidence: 97.5,
            details: None,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "class": "Apple___healthy", "confidence": 97.5 })
        );
    }

    #[test]
    fn request_fields_are_optional() {
        let request: PredictRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.image.is_none());
        assert!(!request.details);

        let request: PredictRequest =
            serde_json::from_value(json!({ "image": "aGk=", "details": true })).unwrap();
        assert_eq!(request.image.as_deref(), Some("aGk="));
        assert!(request.details);
    }
}
