//! Class table of the plant disease model and the agronomic notes attached
//! to each predicted condition.

use serde::Serialize;

/// Model output position -> class name. Order is fixed by the training run.
pub const LABELS: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

const SEPARATOR: &str = "___";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug)]
pub struct DiseaseInfo {
    pub keyword: &'static str,
    pub severity: Severity,
    pub symptoms: &'static [&'static str],
    pub treatment: &'static [&'static str],
}

const HEALTHY: DiseaseInfo = DiseaseInfo {
    keyword: "healthy",
    severity: Severity::Low,
    symptoms: &["No visible symptoms", "Normal growth"],
    treatment: &[
        "Continue regular care",
        "Monitor regularly",
        "Maintain good practices",
    ],
};

static CATALOG: &[DiseaseInfo] = &[
    DiseaseInfo {
        keyword: "scab",
        severity: Severity::Medium,
        symptoms: &[
            "Dark spots on leaves",
            "Fruit deformation",
            "Olive-green lesions",
        ],
        treatment: &[
            "Apply fungicide (Captan, Mancozeb)",
            "Remove infected leaves",
            "Prune for air circulation",
        ],
    },
    DiseaseInfo {
        keyword: "black rot",
        severity: Severity::High,
        symptoms: &[
            "Brown spots with concentric rings",
            "Fruit mummification",
            "Leaf lesions",
        ],
        treatment: &[
            "Remove mummified fruits",
            "Apply fungicide",
            "Prune infected branches",
        ],
    },
    DiseaseInfo {
        keyword: "cedar apple rust",
        severity: Severity::Medium,
        symptoms: &[
            "Orange spots on leaves",
            "Yellow lesions",
            "Premature leaf drop",
        ],
        treatment: &[
            "Apply fungicide in spring",
            "Remove nearby cedar trees",
            "Use resistant varieties",
        ],
    },
    DiseaseInfo {
        keyword: "rot",
        severity: Severity::High,
        symptoms: &["Brown spots", "Fruit decay", "Soft tissue"],
        treatment: &[
            "Prune infected parts",
            "Apply copper fungicide",
            "Improve drainage",
        ],
    },
    DiseaseInfo {
        keyword: "rust",
        severity: Severity::Medium,
        symptoms: &["Orange-brown pustules", "Leaf yellowing", "Reduced yield"],
        treatment: &[
            "Apply fungicide (Azoxystrobin)",
            "Use resistant varieties",
            "Remove infected leaves",
        ],
    },
    DiseaseInfo {
        keyword: "blight",
        severity: Severity::High,
        symptoms: &["Brown lesions", "Rapid wilting", "Dark spots on stems"],
        treatment: &[
            "Remove infected plants",
            "Apply copper spray",
            "Rotate crops",
        ],
    },
    DiseaseInfo {
        keyword: "spot",
        severity: Severity::Medium,
        symptoms: &["Circular spots", "Leaf drop", "Yellow halos"],
        treatment: &[
            "Improve air circulation",
            "Apply bactericide",
            "Avoid overhead watering",
        ],
    },
    DiseaseInfo {
        keyword: "mildew",
        severity: Severity::Medium,
        symptoms: &["White powdery coating", "Leaf curling", "Stunted growth"],
        treatment: &[
            "Apply sulfur spray",
            "Increase plant spacing",
            "Remove infected leaves",
        ],
    },
    DiseaseInfo {
        keyword: "gray leaf spot",
        severity: Severity::Medium,
        symptoms: &[
            "Gray rectangular lesions",
            "Leaf yellowing",
            "Premature death",
        ],
        treatment: &["Apply fungicide", "Rotate crops", "Use resistant hybrids"],
    },
    DiseaseInfo {
        keyword: "common rust",
        severity: Severity::Medium,
        symptoms: &["Circular to elongate brown pustules", "Leaf yellowing"],
        treatment: &[
            "Apply fungicide if severe",
            "Plant resistant hybrids",
            "Monitor regularly",
        ],
    },
    DiseaseInfo {
        keyword: "northern leaf blight",
        severity: Severity::High,
        symptoms: &["Long gray-green lesions", "Leaf death", "Yield loss"],
        treatment: &[
            "Apply fungicide",
            "Use resistant varieties",
            "Bury crop residue",
        ],
    },
    DiseaseInfo {
        keyword: "esca",
        severity: Severity::High,
        symptoms: &["Tiger stripe pattern", "Leaf necrosis", "Berry shrivel"],
        treatment: &[
            "Prune infected wood",
            "Apply wound protectants",
            "Remove dead vines",
        ],
    },
    DiseaseInfo {
        keyword: "bacterial spot",
        severity: Severity::Medium,
        symptoms: &["Small dark spots", "Yellow halos", "Leaf drop"],
        treatment: &[
            "Apply copper bactericide",
            "Use disease-free seeds",
            "Avoid overhead irrigation",
        ],
    },
    DiseaseInfo {
        keyword: "early blight",
        severity: Severity::Medium,
        symptoms: &[
            "Concentric ring spots",
            "Lower leaf yellowing",
            "Target-like lesions",
        ],
        treatment: &[
            "Apply fungicide (Chlorothalonil)",
            "Remove infected leaves",
            "Mulch around plants",
        ],
    },
    DiseaseInfo {
        keyword: "late blight",
        severity: Severity::Critical,
        symptoms: &["Water-soaked lesions", "White mold", "Rapid plant death"],
        treatment: &[
            "Apply fungicide immediately",
            "Remove infected plants",
            "Improve air circulation",
        ],
    },
    DiseaseInfo {
        keyword: "leaf scorch",
        severity: Severity::Medium,
        symptoms: &["Purple-brown spots", "Leaf margins brown", "Reduced vigor"],
        treatment: &[
            "Remove infected leaves",
            "Apply fungicide",
            "Improve drainage",
        ],
    },
    DiseaseInfo {
        keyword: "leaf mold",
        severity: Severity::Medium,
        symptoms: &[
            "Yellow spots on upper leaf",
            "Olive-green mold below",
            "Leaf curling",
        ],
        treatment: &["Reduce humidity", "Apply fungicide", "Increase ventilation"],
    },
    DiseaseInfo {
        keyword: "septoria",
        severity: Severity::Medium,
        symptoms: &["Small circular spots", "Gray centers", "Black specks"],
        treatment: &["Apply fungicide", "Remove lower leaves", "Mulch soil"],
    },
    DiseaseInfo {
        keyword: "spider mites",
        severity: Severity::Medium,
        symptoms: &["Yellow stippling", "Fine webbing", "Leaf bronzing"],
        treatment: &["Apply miticide", "Spray with water", "Use predatory mites"],
    },
    DiseaseInfo {
        keyword: "target spot",
        severity: Severity::Medium,
        symptoms: &["Concentric rings", "Brown lesions", "Defoliation"],
        treatment: &["Apply fungicide", "Rotate crops", "Remove debris"],
    },
    DiseaseInfo {
        keyword: "mosaic virus",
        severity: Severity::High,
        symptoms: &["Mottled leaves", "Stunted growth", "Distorted fruit"],
        treatment: &[
            "Remove infected plants",
            "Control aphids",
            "Use resistant varieties",
        ],
    },
    DiseaseInfo {
        keyword: "yellow leaf curl",
        severity: Severity::High,
        symptoms: &["Upward leaf curling", "Yellowing", "Stunted growth"],
        treatment: &[
            "Control whiteflies",
            "Remove infected plants",
            "Use reflective mulch",
        ],
    },
];

impl DiseaseInfo {
    /// Picks the most specific catalog entry whose keyword occurs in the
    /// condition, so "Late blight" resolves to `late blight`, not `blight`.
    /// Conditions with no matching keyword get the `healthy` entry.
    pub fn lookup(condition: &str) -> &'static DiseaseInfo {
        let condition = condition.to_lowercase();
        if condition.contains(HEALTHY.keyword) {
            return &HEALTHY;
        }
        CATALOG
            .iter()
            .filter(|info| condition.contains(info.keyword))
            .max_by_key(|info| info.keyword.len())
            .unwrap_or(&HEALTHY)
    }
}

/// A class name split into the crop and the observed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabel {
    pub crop: String,
    pub condition: String,
}

impl ClassLabel {
    pub fn parse(raw: &str) -> Self {
        let (crop, condition) = match raw.split_once(SEPARATOR) {
            Some((crop, condition)) => (crop, condition),
            None => (raw, HEALTHY.keyword),
        };

        let crop = crop
            .replace('_', " ")
            .replace(['(', ')'], "")
            .trim()
            .to_string();
        let mut condition = condition.replace('_', " ").trim().to_string();
        if condition.is_empty() {
            condition = HEALTHY.keyword.to_string();
        }

        Self { crop, condition }
    }

    pub fn is_healthy(&self) -> bool {
        self.condition.to_lowercase().contains(HEALTHY.keyword)
    }
}

/// Extra fields attached to a prediction when the client asks for them.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionDetails {
    pub name: String,
    pub description: String,
    pub crop: String,
    pub condition: String,
    pub healthy: bool,
    pub severity: Severity,
    pub symptoms: Vec<&'static str>,
    pub treatment: Vec<&'static str>,
}

impl PredictionDetails {
    pub fn for_class(raw: &str) -> Self {
        let label = ClassLabel::parse(raw);
        let info = DiseaseInfo::lookup(&label.condition);
        let healthy = label.is_healthy();
        let (name, description) = if healthy {
            (
                format!("Healthy {}", label.crop),
                "Plant appears healthy with no visible diseases".to_string(),
            )
        } else {
            (
                format!("{} - {}", label.crop, label.condition),
                format!("Detected {}", label.condition),
            )
        };

        Self {
            name,
            description,
            healthy,
            crop: label.crop,
            condition: label.condition,
            severity: info.severity,
            symptoms: info.symptoms.to_vec(),
            treatment: info.treatment.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_crop_and_condition() {
        for raw in LABELS {
            let label = ClassLabel::parse(raw);
            assert!(!label.crop.is_empty(), "{raw}");
            assert!(!label.condition.is_empty(), "{raw}");
        }
    }

    #[test]
    fn parse_cleans_crop_and_condition() {
        let label = ClassLabel::parse("Corn_(maize)___Common_rust_");
        assert_eq!(label.crop, "Corn maize");
        assert_eq!(label.condition, "Common rust");
        assert!(!label.is_healthy());

        let label = ClassLabel::parse("Pepper,_bell___healthy");
        assert_eq!(label.crop, "Pepper, bell");
        assert!(label.is_healthy());
    }

    #[test]
    fn label_without_separator_is_healthy() {
        let label = ClassLabel::parse("Mystery_plant");
        assert_eq!(label.crop, "Mystery plant");
        assert!(label.is_healthy());
    }

    #[test]
    fn lookup_prefers_longest_keyword() {
        assert_eq!(DiseaseInfo::lookup("Late blight").keyword, "late blight");
        assert_eq!(DiseaseInfo::lookup("Late blight").severity, Severity::Critical);
        assert_eq!(
            DiseaseInfo::lookup("Northern Leaf Blight").keyword,
            "northern leaf blight"
        );
        assert_eq!(
            DiseaseInfo::lookup("Cercospora leaf spot Gray leaf spot").keyword,
            "gray leaf spot"
        );
        assert_eq!(DiseaseInfo::lookup("healthy").severity, Severity::Low);
    }

    #[test]
    fn unmatched_condition_falls_back_to_healthy_entry() {
        let info = DiseaseInfo::lookup("Haunglongbing (Citrus greening)");
        assert_eq!(info.keyword, "healthy");
        assert_eq!(info.severity, Severity::Low);

        let details = PredictionDetails::for_class("Orange___Haunglongbing_(Citrus_greening)");
        assert_eq!(details.severity, Severity::Low);
        assert_eq!(details.symptoms, vec!["No visible symptoms", "Normal growth"]);
        assert!(!details.healthy);
    }

    #[test]
    fn details_for_healthy_class() {
        let details = PredictionDetails::for_class("Cherry_(including_sour)___healthy");
        assert_eq!(details.name, "Healthy Cherry including sour");
        assert_eq!(
            details.description,
            "Plant appears healthy with no visible diseases"
        );
        assert!(details.healthy);
    }

    #[test]
    fn details_for_diseased_class() {
        let details = PredictionDetails::for_class("Tomato___Tomato_Yellow_Leaf_Curl_Virus");
        assert_eq!(details.crop, "Tomato");
        assert_eq!(details.name, "Tomato - Tomato Yellow Leaf Curl Virus");
        assert_eq!(details.description, "Detected Tomato Yellow Leaf Curl Virus");
        assert!(!details.healthy);
        assert_eq!(details.severity, Severity::High);
        assert!(details.treatment.contains(&"Control whiteflies"));
    }
}
