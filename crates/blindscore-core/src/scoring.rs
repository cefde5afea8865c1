//! Two-layer linear scoring model, evaluated under encryption
//!
//! ```text
//! hidden[i] = dot(input, hidden_weights[i])
//! output    = sum_i hidden[i] * output_weights[i] + output_bias
//! ```
//!
//! The hidden bias is carried with the model but never applied, and there is
//! no activation between the layers: the evaluated function is affine in the
//! input. Each product is rescaled right away, so the output sits at the
//! input's scale and the circuit uses two levels of the modulus chain.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, HeError};
use crate::he::HeBackend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringModel {
    pub version: String,
    pub hidden_weights: Vec<Vec<f64>>,
    /// Not applied during evaluation
    pub hidden_bias: Vec<f64>,
    pub output_weights: Vec<f64>,
    pub output_bias: f64,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScoringModel {
    pub const BUILTIN_VERSION: &'static str = "fraud-linear-v1";

    /// The model shipped with the compute party
    pub fn builtin() -> Self {
        Self {
            version: Self::BUILTIN_VERSION.to_string(),
            hidden_weights: vec![
                vec![0.01, 0.02, -0.03, 0.05, 0.01, -0.02],
                vec![-0.04, 0.03, 0.01, 0.01, 0.02, -0.01],
                vec![0.02, -0.02, 0.05, -0.03, 0.04, 0.01],
            ],
            hidden_bias: vec![0.01, -0.01, 0.005],
            output_weights: vec![0.1, -0.1, 0.15],
            output_bias: 0.05,
        }
    }

    /// Check layer shapes agree and every parameter is finite
    pub fn validate(&self) -> CoreResult<()> {
        let width = self.input_width();
        if width == 0 {
            return Err(CoreError::InvalidModel("no hidden units".into()));
        }
        if let Some(row) = self.hidden_weights.iter().position(|r| r.len() != width) {
            return Err(CoreError::InvalidModel(format!(
                "hidden row {row} has {} weights, expected {width}",
                self.hidden_weights[row].len()
            )));
        }

        let hidden = self.hidden_weights.len();
        if self.hidden_bias.len() != hidden {
            return Err(CoreError::InvalidModel(format!(
                "{} hidden biases for {hidden} hidden units",
                self.hidden_bias.len()
            )));
        }
        if self.output_weights.len() != hidden {
            return Err(CoreError::InvalidModel(format!(
                "{} output weights for {hidden} hidden units",
                self.output_weights.len()
            )));
        }

        let all_finite = self
            .hidden_weights
            .iter()
            .flatten()
            .chain(&self.hidden_bias)
            .chain(&self.output_weights)
            .chain(std::iter::once(&self.output_bias))
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(CoreError::InvalidModel("non-finite parameter".into()));
        }

        Ok(())
    }

    /// Length of the input vector the model expects
    pub fn input_width(&self) -> usize {
        self.hidden_weights.first().map_or(0, Vec::len)
    }

    /// Same function as the encrypted evaluation, in the clear
    pub fn evaluate_plain(&self, input: &[f64]) -> CoreResult<f64> {
        if input.len() != self.input_width() {
            return Err(HeError::Evaluation(format!(
                "expected {} inputs, got {}",
                self.input_width(),
                input.len()
            ))
            .into());
        }

        let output = self
            .hidden_weights
            .iter()
            .zip(&self.output_weights)
            .map(|(row, w)| w * row.iter().zip(input).map(|(a, b)| a * b).sum::<f64>())
            .sum::<f64>();
        Ok(output + self.output_bias)
    }
}

/// Evaluates a [`ScoringModel`] on encrypted input
///
/// Holds no key material; every operation works on ciphertexts and
/// plaintext weights only.
pub struct ScoringEngine<B: HeBackend> {
    backend: B,
    model: ScoringModel,
}

impl<B: HeBackend> ScoringEngine<B> {
    pub fn new(backend: B, model: ScoringModel) -> CoreResult<Self> {
        model.validate()?;
        Ok(Self { backend, model })
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    /// Score an encrypted input vector, yielding a one-slot ciphertext
    pub fn score(&self, input: &B::Ciphertext) -> CoreResult<B::Ciphertext> {
        let slots = self.backend.slot_count(input);
        if slots != self.model.input_width() {
            return Err(HeError::Evaluation(format!(
                "model {} expects {} inputs, ciphertext has {slots}",
                self.model.version,
                self.model.input_width()
            ))
            .into());
        }

        tracing::debug!(
            model = %self.model.version,
            hidden = self.model.hidden_weights.len(),
            "evaluating encrypted score"
        );

        let mut output: Option<B::Ciphertext> = None;
        for (row, weight) in self.model.hidden_weights.iter().zip(&self.model.output_weights) {
            let hidden = self.backend.rescale(&self.backend.dot_plain(input, row)?)?;
            let term = self.backend.rescale(&self.backend.mul_plain(&hidden, *weight)?)?;
            output = Some(match output {
                Some(acc) => self.backend.add(&acc, &term)?,
                None => term,
            });
        }

        let output = output.ok_or_else(|| HeError::Evaluation("model has no hidden units".into()))?;
        Ok(self.backend.add_plain(&output, self.model.output_bias)?)
    }
}
