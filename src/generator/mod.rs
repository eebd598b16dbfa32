pub mod formulas;
pub mod registry;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{QuizError, Result};
use crate::quiz::{GeneratorParams, QuestionStyle};
use crate::rng::QuestionRng;

pub use registry::GeneratorRegistry;

/// The correct answer a formula produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerValue {
    Number(f64),
    /// Physically degenerate outcome, e.g. total internal reflection
    Sentinel(&'static str),
}

/// Raw output of a formula before formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Computed {
    pub prompt: String,
    pub value: AnswerValue,
    pub explanation: Option<String>,
}

/// Final renderable question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedQuestionResult {
    pub prompt: String,
    pub style: QuestionStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Canonical answer: the value at 3 decimals, the sentinel, or "True"/"False"
    pub correct_answer: String,
    /// 0-based position of the correct option (multiple choice only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A physics formula that can synthesize a question from bounded parameters
pub trait Generator: Send + Sync {
    fn key(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// `<quantity>Min` / `<quantity>Max` bounds used when nothing overrides them
    fn default_params(&self) -> &'static [(&'static str, f64)];
    fn compute(&self, params: &ResolvedParams, rng: &mut QuestionRng) -> Result<Computed>;
}

/// Public description of a registered generator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_params: BTreeMap<String, f64>,
}

/// Defaults merged with the defined overrides of a question instance
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<String, f64>,
}

impl ResolvedParams {
    /// Overrides win over defaults; `None` overrides are dropped first
    pub fn resolve(defaults: &[(&str, f64)], overrides: &GeneratorParams) -> Self {
        let mut values: BTreeMap<String, f64> = defaults
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        for (k, v) in overrides {
            if let Some(v) = v {
                values.insert(k.clone(), *v);
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Bounds for `<quantity>Min` / `<quantity>Max`
    pub fn bounds(&self, quantity: &str) -> Result<(f64, f64)> {
        let min_key = format!("{quantity}Min");
        let max_key = format!("{quantity}Max");
        let min = self
            .get(&min_key)
            .ok_or_else(|| QuizError::validation(format!("missing parameter '{min_key}'")))?;
        let max = self
            .get(&max_key)
            .ok_or_else(|| QuizError::validation(format!("missing parameter '{max_key}'")))?;
        if !min.is_finite() || !max.is_finite() {
            return Err(QuizError::validation(format!(
                "bounds for '{quantity}' must be finite"
            )));
        }
        if min > max {
            return Err(QuizError::validation(format!(
                "'{min_key}' ({min}) is greater than '{max_key}' ({max})"
            )));
        }
        Ok((min, max))
    }

    /// Uniform draw of `quantity` inside its resolved bounds
    pub fn draw(&self, rng: &mut QuestionRng, quantity: &str) -> Result<f64> {
        self.draw_scaled(rng, quantity, 1.0)
    }

    /// Draw in a display unit `scale` times the stored unit (e.g. μC for C bounds).
    /// The returned value is in the display unit.
    pub fn draw_scaled(&self, rng: &mut QuestionRng, quantity: &str, scale: f64) -> Result<f64> {
        let (min, max) = self.bounds(quantity)?;
        Ok(rng.in_range(min * scale, max * scale))
    }
}

impl<G: Generator + ?Sized> From<&G> for GeneratorSpec {
    fn from(g: &G) -> Self {
        GeneratorSpec {
            key: g.key(),
            name: g.name(),
            description: g.description(),
            default_params: g
                .default_params()
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}
