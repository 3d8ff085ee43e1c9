// Risk scoring: standard-scaled logistic classifier over the fixed
// 11-feature schema, with bincode artifact persistence.
//
// The scoring context is built once at startup and is immutable afterwards;
// inference is lock-free and safe to share across request tasks. When no
// model could be loaded or trained, or any scoring step fails, the context
// degrades to the neutral probability instead of surfacing an error.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::FeatureVector;

/// Returned whenever no real scoring signal is available, so the verdict is
/// not biased either way.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

const BOOTSTRAP_SAMPLES: usize = 1000;
const BOOTSTRAP_TEST_FRACTION: f64 = 0.2;
const BOOTSTRAP_SEED: u64 = 42;
const TRAINING_EPOCHS: usize = 200;
const LEARNING_RATE: f64 = 0.1;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Feature vector shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("Classifier produced a non-finite probability")]
    NonFiniteProbability,

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact encoding error: {0}")]
    Encoding(String),
}

// =============================================================================
// STANDARD SCALER
// =============================================================================

/// Per-feature zero-mean / unit-variance transform, fit once on training
/// rows. Only a fitted scaler can exist; zero-variance features scale by 1
/// so degenerate columns pass through centered instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(samples: ArrayView2<'_, f64>) -> Result<Self, ScoringError> {
        if samples.nrows() == 0 {
            return Err(ScoringError::EmptyDataset);
        }

        let mean = samples
            .mean_axis(Axis(0))
            .ok_or(ScoringError::EmptyDataset)?;
        let std = samples
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });

        Ok(Self { mean, std })
    }

    pub fn transform(&self, features: ArrayView1<'_, f64>) -> Result<Array1<f64>, ScoringError> {
        if features.len() != self.mean.len() {
            return Err(ScoringError::ShapeMismatch {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }
        Ok((&features - &self.mean) / &self.std)
    }

    pub fn transform_matrix(
        &self,
        samples: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, ScoringError> {
        if samples.ncols() != self.mean.len() {
            return Err(ScoringError::ShapeMismatch {
                expected: self.mean.len(),
                actual: samples.ncols(),
            });
        }
        Ok((&samples - &self.mean) / &self.std)
    }
}

// =============================================================================
// LOGISTIC CLASSIFIER
// =============================================================================

/// Binary logistic classifier trained by batch gradient descent.
///
/// Deliberately simple: the scoring contract only needs some binary
/// probabilistic classifier over the 11-feature schema, and the trained
/// artifact is injectable, so a production deployment can replace this
/// wholesale with an externally trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticModel {
    pub fn fit(
        samples: &Array2<f64>,
        labels: &Array1<f64>,
        epochs: usize,
        learning_rate: f64,
    ) -> Self {
        let n_samples = samples.nrows() as f64;
        let mut weights = Array1::<f64>::zeros(samples.ncols());
        let mut bias = 0.0;

        for _ in 0..epochs {
            let logits = samples.dot(&weights) + bias;
            let predictions = logits.mapv(sigmoid);
            let errors = &predictions - labels;

            let weight_gradient = samples.t().dot(&errors) / n_samples;
            let bias_gradient = errors.sum() / n_samples;

            weights.scaled_add(-learning_rate, &weight_gradient);
            bias -= learning_rate * bias_gradient;
        }

        Self { weights, bias }
    }

    /// Probability mass assigned to the phishing class.
    pub fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<f64, ScoringError> {
        if features.len() != self.weights.len() {
            return Err(ScoringError::ShapeMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        Ok(sigmoid(features.dot(&self.weights) + self.bias))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// =============================================================================
// SCORING CONTEXT
// =============================================================================

struct ScoringModel {
    scaler: StandardScaler,
    classifier: LogisticModel,
}

impl ScoringModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        let raw = Array1::from(features.to_array().to_vec());
        let scaled = self.scaler.transform(raw.view())?;
        let probability = self.classifier.predict_proba(scaled.view())?;

        if !probability.is_finite() {
            return Err(ScoringError::NonFiniteProbability);
        }
        Ok(probability.clamp(0.0, 1.0))
    }
}

/// Immutable scoring state constructed once at startup and shared read-only
/// across concurrent analyses.
pub struct ScoringContext {
    model: Option<ScoringModel>,
}

impl ScoringContext {
    /// Context with no classifier: every score is the neutral probability.
    pub fn without_model() -> Self {
        Self { model: None }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Map a feature vector to a phishing probability in [0, 1].
    ///
    /// Total: scoring failures are logged and absorbed into the neutral
    /// probability, never propagated.
    pub fn score(&self, features: &FeatureVector) -> f64 {
        match &self.model {
            Some(model) => match model.predict(features) {
                Ok(probability) => probability,
                Err(e) => {
                    warn!("scoring failed, falling back to neutral probability: {}", e);
                    NEUTRAL_PROBABILITY
                },
            },
            None => NEUTRAL_PROBABILITY,
        }
    }

    /// Load persisted scaler + classifier artifacts, or train the synthetic
    /// bootstrap pair and persist them. Never fails: an unloadable and
    /// untrainable state degrades to the no-model context.
    pub fn load_or_train(model_path: &Path, scaler_path: &Path) -> Self {
        match Self::try_load(model_path, scaler_path) {
            Ok(context) => {
                info!(
                    "Loaded classifier artifacts from {} and {}",
                    model_path.display(),
                    scaler_path.display()
                );
                return context;
            },
            Err(e) => {
                debug!("no usable classifier artifacts: {}", e);
            },
        }

        info!("No existing model found, training synthetic bootstrap classifier");
        match Self::try_train_and_persist(model_path, scaler_path) {
            Ok(context) => context,
            Err(e) => {
                warn!("classifier bootstrap failed: {}; serving neutral scores", e);
                Self::without_model()
            },
        }
    }

    fn try_load(model_path: &Path, scaler_path: &Path) -> Result<Self, ScoringError> {
        let classifier: LogisticModel = read_artifact(model_path)?;
        let scaler: StandardScaler = read_artifact(scaler_path)?;
        Ok(Self {
            model: Some(ScoringModel { scaler, classifier }),
        })
    }

    /// Synthetic bootstrap: random features with random labels. This is a
    /// placeholder so the service has a complete scoring path on first boot,
    /// not meaningful training — deployments provide real artifacts.
    fn try_train_and_persist(
        model_path: &Path,
        scaler_path: &Path,
    ) -> Result<Self, ScoringError> {
        let mut rng = StdRng::seed_from_u64(BOOTSTRAP_SEED);
        let (samples, labels) = generate_synthetic_dataset(BOOTSTRAP_SAMPLES, &mut rng);

        let (train_idx, test_idx) =
            split_indices(samples.nrows(), BOOTSTRAP_TEST_FRACTION, &mut rng);
        let train_samples = samples.select(Axis(0), &train_idx);
        let train_labels = labels.select(Axis(0), &train_idx);
        let test_samples = samples.select(Axis(0), &test_idx);
        let test_labels = labels.select(Axis(0), &test_idx);

        // Scaler statistics come from the training rows only
        let scaler = StandardScaler::fit(train_samples.view())?;
        let train_scaled = scaler.transform_matrix(train_samples.view())?;
        let classifier =
            LogisticModel::fit(&train_scaled, &train_labels, TRAINING_EPOCHS, LEARNING_RATE);

        let test_scaled = scaler.transform_matrix(test_samples.view())?;
        let accuracy = holdout_accuracy(&classifier, &test_scaled, &test_labels)?;
        info!(
            "Bootstrap classifier trained on {} samples (holdout accuracy {:.2})",
            train_idx.len(),
            accuracy
        );

        write_artifact(model_path, &classifier)?;
        write_artifact(scaler_path, &scaler)?;

        Ok(Self {
            model: Some(ScoringModel { scaler, classifier }),
        })
    }
}

fn generate_synthetic_dataset(
    n_samples: usize,
    rng: &mut StdRng,
) -> (Array2<f64>, Array1<f64>) {
    let samples =
        Array2::from_shape_fn((n_samples, FeatureVector::LEN), |_| rng.gen::<f64>() * 100.0);
    let labels =
        Array1::from_shape_fn(n_samples, |_| if rng.gen::<f64>() > 0.7 { 1.0 } else { 0.0 });
    (samples, labels)
}

fn split_indices(
    n_samples: usize,
    test_fraction: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);

    let test_size = ((n_samples as f64) * test_fraction).round() as usize;
    let test_idx = indices.split_off(n_samples - test_size);
    (indices, test_idx)
}

fn holdout_accuracy(
    classifier: &LogisticModel,
    samples: &Array2<f64>,
    labels: &Array1<f64>,
) -> Result<f64, ScoringError> {
    if labels.is_empty() {
        return Err(ScoringError::EmptyDataset);
    }

    let mut correct = 0usize;
    for (row, label) in samples.outer_iter().zip(labels.iter()) {
        let predicted = classifier.predict_proba(row)? > 0.5;
        if predicted == (*label > 0.5) {
            correct += 1;
        }
    }
    Ok(correct as f64 / labels.len() as f64)
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScoringError> {
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes).map_err(|e| ScoringError::Encoding(e.to_string()))
}

fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<(), ScoringError> {
    let bytes = bincode::serialize(artifact).map_err(|e| ScoringError::Encoding(e.to_string()))?;
    fs::write(path, bytes)?;
    Ok(())
}
