use std::path::{Path, PathBuf};

use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::ModelError;
use crate::labels::LABELS;
use crate::preprocess::INPUT_SIZE;

/// Something that maps a `1x224x224x3` image tensor to one score per class.
///
/// Implementations are shared by every HTTP worker at once, hence the
/// `Send + Sync` bound.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, ModelError>;
}

/// ONNX model compiled once into an immutable tract plan. Each `run` builds
/// its own execution state, so concurrent calls need no lock.
pub struct TractClassifier {
    plan: TypedRunnableModel<TypedModel>,
    path: PathBuf,
}

impl TractClassifier {
    pub fn load(path: impl AsRef<Path>, num_classes: usize) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let load_err = |e: TractError| ModelError::Load {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let side = INPUT_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, side, side, 3)),
            )
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?;

        if let Some(shape) = model.output_fact(0).map_err(load_err)?.shape.as_concrete() {
            let actual: usize = shape.iter().product();
            if actual != num_classes {
                return Err(ModelError::OutputShape {
                    expected: num_classes,
                    actual,
                });
            }
        }

        let plan = model.into_runnable().map_err(load_err)?;
        log::info!("loaded model from {}", path.display());

        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Classifier for TractClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let tensor: Tensor = input.into();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| ModelError::Inference("model returned no outputs".to_string()))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;

        Ok(scores.iter().copied().collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub label: &'static str,
    pub confidence: f64,
}

/// Runs the classifier and reduces its scores to the best label.
pub fn predict(classifier: &dyn Classifier, input: Array4<f32>) -> Result<Prediction, ModelError> {
    let scores = classifier.classify(input)?;
    if scores.len() != LABELS.len() {
        return Err(ModelError::OutputShape {
            expected: LABELS.len(),
            actual: scores.len(),
        });
    }

    let (index, score) = top_prediction(&scores)?;
    Ok(Prediction {
        index,
        label: LABELS[index],
        confidence: confidence_percent(score),
    })
}

/// Index and value of the highest finite score; the first index wins ties.
pub fn top_prediction(scores: &[f32]) -> Result<(usize, f32), ModelError> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| score.is_finite())
        .fold(None, |best, (index, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((index, score)),
        })
        .ok_or(ModelError::NoScore)
}

/// Score as a percentage in `[0, 100]`, rounded to one decimal.
pub fn confidence_percent(score: f32) -> f64 {
    let percent = (f64::from(score) * 100.0).clamp(0.0, 100.0);
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Fixed(Vec<f32>);

    impl Classifier for Fixed {
        fn classify(&self, _input: Array4<f32>) -> Result<Vec<f32>, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn blank_input() -> Array4<f32> {
        Array4::zeros((1, 224, 224, 3))
    }

    // ReduceMean over H and W, then a 3x38 projection: red favours the last
    // class, green the first.
    fn fixture_model() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mean_rgb_38.onnx")
    }

    fn solid_input(channel: usize) -> Array4<f32> {
        let mut input = blank_input();
        input.index_axis_mut(ndarray::Axis(3), channel).fill(1.0);
        input
    }

    #[test]
    fn top_prediction_picks_first_maximum() {
        assert_eq!(top_prediction(&[0.1, 0.7, 0.7, 0.2]).unwrap(), (1, 0.7));
        assert_eq!(top_prediction(&[-3.0, -1.0]).unwrap(), (1, -1.0));
    }

    #[test]
    fn top_prediction_skips_nan() {
        assert_eq!(top_prediction(&[f32::NAN, 0.2, 0.1]).unwrap(), (1, 0.2));
        assert!(matches!(top_prediction(&[f32::NAN]), Err(ModelError::NoScore)));
        assert!(matches!(top_prediction(&[]), Err(ModelError::NoScore)));
    }

    #[test]
    fn confidence_is_rounded_and_bounded() {
        assert_eq!(confidence_percent(0.873_41), 87.3);
        assert_eq!(confidence_percent(0.999_99), 100.0);
        assert_eq!(confidence_percent(1.0), 100.0);
        assert_eq!(confidence_percent(4.2), 100.0);
        assert_eq!(confidence_percent(-0.5), 0.0);
    }

    #[test]
    fn predict_maps_index_through_label_table() {
        let mut scores = vec![0.001; LABELS.len()];
        scores[30] = 0.92;
        let prediction = predict(&Fixed(scores), blank_input()).unwrap();
        assert_eq!(prediction.index, 30);
        assert_eq!(prediction.label, "Tomato___Late_blight");
        assert_eq!(prediction.confidence, 92.0);
    }

    #[test]
    fn predict_rejects_wrong_output_length() {
        let err = predict(&Fixed(vec![0.5; 10]), blank_input()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutputShape {
                expected: 38,
                actual: 10
            }
        ));
    }

    #[test]
    fn onnx_model_classifies_pinned_input_shape() {
        let classifier = TractClassifier::load(fixture_model(), LABELS.len()).unwrap();
        assert_eq!(classifier.path(), fixture_model().as_path());

        let scores = classifier.classify(blank_input()).unwrap();
        assert_eq!(scores.len(), 38);
        assert!(scores.iter().all(|score| *score == 0.0));
    }

    #[test]
    fn onnx_model_scores_drive_prediction() {
        let classifier = TractClassifier::load(fixture_model(), LABELS.len()).unwrap();

        let red = predict(&classifier, solid_input(0)).unwrap();
        assert_eq!(red.label, "Tomato___healthy");
        assert_eq!(red.confidence, 3.7);

        let green = predict(&classifier, solid_input(1)).unwrap();
        assert_eq!(green.index, 0);
        assert_eq!(green.label, "Apple___Apple_scab");
    }

    #[test]
    fn load_rejects_model_with_wrong_class_count() {
        let err = TractClassifier::load(fixture_model(), 10).err().unwrap();
        assert!(matches!(
            err,
            ModelError::OutputShape {
                expected: 10,
                actual: 38
            }
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.onnx");
        let err = TractClassifier::load(&missing, LABELS.len()).err().unwrap();
        assert!(matches!(err, ModelError::NotFound(path) if path == missing));
    }

    #[test]
    fn load_rejects_corrupt_model() {
        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"this is not a protobuf graph").unwrap();
        let err = TractClassifier::load(file.path(), LABELS.len()).err().unwrap();
        assert!(matches!(err, ModelError::Load { .. }));
    }
}
