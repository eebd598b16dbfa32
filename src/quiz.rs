//! Persisted quiz records: quizzes, their questions, and learner attempts.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::formatter::{FALSE_LABEL, TRUE_LABEL};
use crate::generator::GeneratorRegistry;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionStyle {
    #[default]
    MultipleChoice,
    FreeResponse,
    TrueFalse,
}

impl FromStr for QuestionStyle {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "multiple_choice" | "multiple-choice" => Ok(QuestionStyle::MultipleChoice),
            "free_response" | "free-response" => Ok(QuestionStyle::FreeResponse),
            "true_false" | "true-false" => Ok(QuestionStyle::TrueFalse),
            other => Err(QuizError::validation(format!(
                "unknown question style '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuizMode {
    Quiz,
    CourseMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Per-instance generator overrides; `None` means "use the generator default"
pub type GeneratorParams = BTreeMap<String, Option<f64>>;

/// A question as authored and stored.
///
/// Multiple-choice `correct_answer` holds the 1-based option number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    Static {
        prompt: String,
        style: QuestionStyle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
        correct_answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<u32>,
    },
    Dynamic {
        generator: String,
        #[serde(default)]
        params: GeneratorParams,
        #[serde(default)]
        style: QuestionStyle,
        /// Seed the question renders with; assigned on first save when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<u32>,
    },
}

impl Question {
    /// Placeholder question added by the editor
    pub fn blank() -> Self {
        Question::Static {
            prompt: "New Question".to_string(),
            style: QuestionStyle::MultipleChoice,
            options: Some(
                (1..=4)
                    .map(|n| format!("Option {n}"))
                    .collect::<Vec<String>>(),
            ),
            correct_answer: "1".to_string(),
            explanation: None,
            points: None,
        }
    }

    pub fn style(&self) -> QuestionStyle {
        match self {
            Question::Static { style, .. } | Question::Dynamic { style, .. } => *style,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Question::Dynamic { .. })
    }

    /// Checks the fields a question needs before it can be saved
    pub fn validate(&self) -> Result<()> {
        match self {
            Question::Static {
                prompt,
                style,
                options,
                correct_answer,
                ..
            } => {
                if prompt.trim().is_empty() {
                    return Err(QuizError::validation("question prompt is required"));
                }
                if correct_answer.trim().is_empty() {
                    return Err(QuizError::validation("correct answer is required"));
                }
                if *style == QuestionStyle::MultipleChoice {
                    let options = options.as_deref().unwrap_or_default();
                    if options.len() < 2 {
                        return Err(QuizError::validation(
                            "multiple choice questions need at least two options",
                        ));
                    }
                    match correct_answer.trim().parse::<usize>() {
                        Ok(n) if (1..=options.len()).contains(&n) => {}
                        _ => {
                            return Err(QuizError::validation(format!(
                                "correct answer '{correct_answer}' is not an option number between 1 and {}",
                                options.len()
                            )))
                        }
                    }
                }
                if *style == QuestionStyle::TrueFalse {
                    let answer = correct_answer.trim();
                    if !answer.eq_ignore_ascii_case(TRUE_LABEL)
                        && !answer.eq_ignore_ascii_case(FALSE_LABEL)
                    {
                        return Err(QuizError::validation(format!(
                            "true/false answer must be {TRUE_LABEL} or {FALSE_LABEL}, got '{correct_answer}'"
                        )));
                    }
                }
                Ok(())
            }
            Question::Dynamic { generator, .. } => {
                if generator.trim().is_empty() {
                    return Err(QuizError::validation("dynamic question needs a generator"));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub is_published: bool,
    pub mode: QuizMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(title: impl Into<String>, mode: QuizMode) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            subject: String::new(),
            difficulty: None,
            questions: Vec::new(),
            is_published: false,
            mode,
            course_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(QuizError::validation("quiz title is required"));
        }
        if self.questions.is_empty() {
            return Err(QuizError::validation("quiz needs at least one question"));
        }
        for (idx, q) in self.questions.iter().enumerate() {
            q.validate().map_err(|e| match e {
                QuizError::Validation(msg) => {
                    QuizError::Validation(format!("question {}: {msg}", idx + 1))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Every dynamic question must name a generator in `registry`
    pub fn check_generators(&self, registry: &GeneratorRegistry) -> Result<()> {
        for question in &self.questions {
            if let Question::Dynamic { generator, .. } = question {
                registry.get(generator)?;
            }
        }
        Ok(())
    }

    /// Case-insensitive match over title, subject and description
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.subject.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// A learner's recorded answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// 0-based option index (multiple choice and true/false)
    Choice(usize),
    /// Free text (free response)
    Text(String),
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Choice(idx) => write!(f, "#{}", idx + 1),
            Answer::Text(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub question_index: usize,
    pub selected: Option<Answer>,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Summary persisted once a session reaches its terminal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    #[serde(default)]
    pub id: String,
    pub quiz_id: String,
    pub answers: Vec<AttemptAnswer>,
    pub score: usize,
    pub total_questions: usize,
    pub elapsed_ms: i64,
    pub completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_questions)
    }
}

/// `round(score / total * 100)`; zero when there are no questions
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}
