//! Logistic regression adapter: Implementation of Scorer.
//!
//! Features are standardized with the training mean and standard deviation,
//! then a logistic model is fitted by full-batch gradient descent. Fitting is
//! fully deterministic: no random initialisation, no shuffling.
//!
//! The fitted parameters are plain serde data so they can be persisted by any
//! artifact store.

use serde::{Deserialize, Serialize};

use crate::ports::{check_training_input, FittedModel, Scorer, ScorerError};

/// Standard deviations below this are treated as constant columns.
const MIN_STD_DEV: f64 = 1e-12;

/// Clamp for the base-rate log-odds used to initialise the intercept.
const BASE_RATE_CLAMP: f64 = 1e-6;

/// Hyperparameters for gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on the coefficients (not the intercept)
    pub l2: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2: 1e-4,
        }
    }
}

/// Logistic regression scorer.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    config: LogisticConfig,
}

impl LogisticRegression {
    #[must_use]
    pub fn new(config: LogisticConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &LogisticConfig {
        &self.config
    }
}

/// Fitted logistic model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub n_features: usize,
    pub scaler_mean: Vec<f64>,
    pub scaler_std: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.scaler_mean)
            .zip(&self.scaler_std)
            .map(|((x, mean), std)| (x - mean) / std)
            .collect()
    }

    fn linear(&self, z: &[f64]) -> f64 {
        self.intercept
            + z.iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn column_stats(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = vec![0.0; width];
    for row in rows {
        for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
            *v += (x - m).powi(2);
        }
    }
    let std = var
        .into_iter()
        .map(|v| {
            let s = (v / n).sqrt();
            if s < MIN_STD_DEV {
                1.0
            } else {
                s
            }
        })
        .collect();

    (mean, std)
}

impl Scorer for LogisticRegression {
    type Model = LogisticModel;

    fn name(&self) -> &str {
        "Logistic Regression"
    }

    fn fit(&self, rows: &[Vec<f64>], labels: &[u8]) -> Result<LogisticModel, ScorerError> {
        let width = check_training_input(rows, labels)?;
        let n = rows.len() as f64;

        let (scaler_mean, scaler_std) = column_stats(rows, width);
        let mut model = LogisticModel {
            n_features: width,
            scaler_mean,
            scaler_std,
            coefficients: vec![0.0; width],
            intercept: 0.0,
        };

        let z: Vec<Vec<f64>> = rows.iter().map(|r| model.standardize(r)).collect();
        let y: Vec<f64> = labels.iter().map(|l| f64::from(*l)).collect();

        let base_rate = (y.iter().sum::<f64>() / n).clamp(BASE_RATE_CLAMP, 1.0 - BASE_RATE_CLAMP);
        model.intercept = (base_rate / (1.0 - base_rate)).ln();

        let LogisticConfig {
            learning_rate,
            epochs,
            l2,
        } = self.config;

        for epoch in 0..epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (zi, yi) in z.iter().zip(&y) {
                let err = sigmoid(model.linear(zi)) - yi;
                for (g, x) in grad_w.iter_mut().zip(zi) {
                    *g += err * x;
                }
                grad_b += err;
            }

            for (w, g) in model.coefficients.iter_mut().zip(&grad_w) {
                *w -= learning_rate * (g / n + l2 * *w);
            }
            model.intercept -= learning_rate * grad_b / n;

            if epoch % 100 == 0 {
                tracing::trace!(epoch, intercept = model.intercept, "gradient descent step");
            }
        }

        if !model.intercept.is_finite() || model.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ScorerError::NonFinite("fitted coefficient".into()));
        }

        tracing::debug!(
            "Fitted logistic model: n_features={}, intercept={:.4}",
            width,
            model.intercept
        );

        Ok(model)
    }
}

impl FittedModel for LogisticModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn validate(&self) -> Result<(), ScorerError> {
        for len in [
            self.scaler_mean.len(),
            self.scaler_std.len(),
            self.coefficients.len(),
        ] {
            if len != self.n_features {
                return Err(ScorerError::DimensionMismatch {
                    expected: self.n_features,
                    got: len,
                });
            }
        }
        if self.scaler_std.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ScorerError::NonFinite("scaler standard deviation".into()));
        }
        Ok(())
    }

    fn predict_probability(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ScorerError> {
        rows.iter()
            .map(|row| {
                if row.len() != self.n_features {
                    return Err(ScorerError::DimensionMismatch {
                        expected: self.n_features,
                        got: row.len(),
                    });
                }
                let p = sigmoid(self.linear(&self.standardize(row)));
                if p.is_finite() {
                    Ok(p)
                } else {
                    Err(ScorerError::NonFinite("probability".into()))
                }
            })
            .collect()
    }
}
