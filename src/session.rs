//! Learner-side quiz session: Loading -> Active -> Terminal.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::error::{QuizError, Result};
use crate::formatter::{FALSE_LABEL, TRUE_LABEL};
use crate::generator::GeneratorRegistry;
use crate::quiz::{percentage, Answer, AttemptAnswer, Question, QuestionStyle, Quiz, QuizAttempt};
use crate::rng::QuestionRng;
use crate::store::QuizStore;
use crate::util::{parse_leading_number, within_tolerance};

/// Relative tolerance for numeric free-response answers
pub const FREE_RESPONSE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Terminal,
}

/// A question frozen for the lifetime of one session.
///
/// `correct_answer` follows the stored convention: the 1-based option number
/// for multiple choice, "True"/"False" for true/false, the value otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuestion {
    pub prompt: String,
    pub style: QuestionStyle,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    /// Seed used to render a dynamic question
    pub seed: Option<u64>,
}

impl RenderedQuestion {
    /// Resolve a stored question, generating dynamic ones exactly once
    pub fn render(question: &Question, registry: &GeneratorRegistry) -> Result<Self> {
        match question {
            Question::Static {
                prompt,
                style,
                options,
                correct_answer,
                explanation,
                ..
            } => Ok(Self {
                prompt: prompt.clone(),
                style: *style,
                options: match style {
                    QuestionStyle::MultipleChoice => options.clone().unwrap_or_default(),
                    QuestionStyle::TrueFalse => true_false_options(),
                    QuestionStyle::FreeResponse => Vec::new(),
                },
                correct_answer: correct_answer.clone(),
                explanation: explanation.clone(),
                seed: None,
            }),
            Question::Dynamic {
                generator,
                params,
                style,
                seed,
                ..
            } => {
                let seed = seed.unwrap_or_else(QuestionRng::fresh_seed);
                let generated = registry.generate(generator, params, *style, seed)?;
                let (options, correct_answer) = match generated.style {
                    QuestionStyle::MultipleChoice => (
                        generated.options.unwrap_or_default(),
                        generated
                            .correct_option
                            .map(|idx| (idx + 1).to_string())
                            .ok_or_else(|| {
                                QuizError::validation("generated options lost the correct answer")
                            })?,
                    ),
                    QuestionStyle::TrueFalse => (true_false_options(), generated.correct_answer),
                    QuestionStyle::FreeResponse => (Vec::new(), generated.correct_answer),
                };
                Ok(Self {
                    prompt: generated.prompt,
                    style: generated.style,
                    options,
                    correct_answer,
                    explanation: generated.explanation,
                    seed: Some(seed),
                })
            }
        }
    }

    pub fn accepts(&self, answer: &Answer) -> bool {
        match (self.style, answer) {
            (QuestionStyle::FreeResponse, Answer::Text(_)) => true,
            (QuestionStyle::FreeResponse, Answer::Choice(_)) => false,
            (_, Answer::Choice(idx)) => *idx < self.options.len(),
            (QuestionStyle::TrueFalse, Answer::Text(t)) => {
                t.eq_ignore_ascii_case(TRUE_LABEL) || t.eq_ignore_ascii_case(FALSE_LABEL)
            }
            (QuestionStyle::MultipleChoice, Answer::Text(_)) => false,
        }
    }

    /// Unanswered slots are never correct
    pub fn is_correct(&self, answer: Option<&Answer>) -> bool {
        let Some(answer) = answer else {
            return false;
        };
        match (self.style, answer) {
            // stored 1-based, selected 0-based
            (QuestionStyle::MultipleChoice, Answer::Choice(idx)) => {
                matches!(self.correct_answer.trim().parse::<usize>(), Ok(n) if n >= 1 && *idx == n - 1)
            }
            (QuestionStyle::TrueFalse, Answer::Choice(idx)) => self
                .options
                .get(*idx)
                .is_some_and(|label| label.eq_ignore_ascii_case(self.correct_answer.trim())),
            (QuestionStyle::TrueFalse, Answer::Text(t)) => {
                t.trim().eq_ignore_ascii_case(self.correct_answer.trim())
            }
            (QuestionStyle::FreeResponse, Answer::Text(t)) => {
                match self.correct_answer.trim().parse::<f64>() {
                    Ok(expected) => parse_leading_number(t)
                        .is_some_and(|given| within_tolerance(given, expected, FREE_RESPONSE_TOLERANCE)),
                    Err(_) => t.trim().eq_ignore_ascii_case(self.correct_answer.trim()),
                }
            }
            _ => false,
        }
    }
}

fn true_false_options() -> Vec<String> {
    vec![TRUE_LABEL.to_string(), FALSE_LABEL.to_string()]
}

/// Outcome of `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    Finished,
}

/// What the learner sees once the session is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub elapsed_ms: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub correct: usize,
    pub incorrect: usize,
}

impl SessionSummary {
    pub fn new(score: usize, total: usize, elapsed_ms: i64) -> Self {
        let elapsed_ms = elapsed_ms.max(0);
        Self {
            score,
            total,
            percentage: percentage(score, total),
            elapsed_ms,
            minutes: elapsed_ms / 60_000,
            seconds: (elapsed_ms % 60_000) / 1000,
            correct: score,
            incorrect: total - score,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    phase: SessionPhase,
    quiz_id: String,
    title: String,
    questions: Vec<RenderedQuestion>,
    answers: Vec<Option<Answer>>,
    current_index: usize,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    score: usize,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Loading,
            quiz_id: String::new(),
            title: String::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            started_at: None,
            ended_at: None,
            score: 0,
        }
    }

    /// Load a quiz through the gateway and start it
    pub fn begin<S: QuizStore + ?Sized>(
        store: &S,
        quiz_id: &str,
        registry: &GeneratorRegistry,
    ) -> Result<Self> {
        let quiz = store.load_quiz_by_id(quiz_id)?;
        let mut session = Self::new();
        session.start(&quiz, registry)?;
        Ok(session)
    }

    pub fn start(&mut self, quiz: &Quiz, registry: &GeneratorRegistry) -> Result<()> {
        self.start_at(quiz, registry, Utc::now())
    }

    pub fn start_at(
        &mut self,
        quiz: &Quiz,
        registry: &GeneratorRegistry,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.phase != SessionPhase::Loading {
            return Err(QuizError::InvalidState("session already started"));
        }
        if quiz.questions.is_empty() {
            return Err(QuizError::validation("quiz has no questions"));
        }

        let questions = quiz
            .questions
            .iter()
            .map(|q| RenderedQuestion::render(q, registry))
            .collect::<Result<Vec<_>>>()?;

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.quiz_id = quiz.id.clone();
        self.title = quiz.title.clone();
        self.current_index = 0;
        self.started_at = Some(now);
        self.ended_at = None;
        self.score = 0;
        self.phase = SessionPhase::Active;
        info!("started quiz '{}' with {} questions", self.title, self.questions.len());
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        match self.phase {
            SessionPhase::Active => Ok(()),
            SessionPhase::Loading => Err(QuizError::InvalidState("session has not started")),
            SessionPhase::Terminal => Err(QuizError::InvalidState("session is finished")),
        }
    }

    /// Record an answer for the current question; does not advance
    pub fn select_answer(&mut self, answer: Answer) -> Result<()> {
        self.ensure_active()?;
        let question = &self.questions[self.current_index];
        if !question.accepts(&answer) {
            return Err(QuizError::validation(format!(
                "answer {answer} does not fit a {} question",
                question.style
            )));
        }
        self.answers[self.current_index] = Some(answer);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Step> {
        self.advance_at(Utc::now())
    }

    /// Next question, or score and finish when already on the last one
    pub fn advance_at(&mut self, now: DateTime<Utc>) -> Result<Step> {
        self.ensure_active()?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            return Ok(Step::Moved(self.current_index));
        }

        self.score = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| q.is_correct(a.as_ref()))
            .count();
        self.ended_at = Some(now);
        self.phase = SessionPhase::Terminal;
        info!(
            "finished quiz '{}': {}/{}",
            self.title,
            self.score,
            self.questions.len()
        );
        Ok(Step::Finished)
    }

    /// Previous question; stays put on the first one
    pub fn go_back(&mut self) -> Result<usize> {
        self.ensure_active()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    /// Discard everything and return to Loading
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Terminal
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn questions(&self) -> &[RenderedQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<Answer>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&RenderedQuestion> {
        match self.phase {
            SessionPhase::Active => self.questions.get(self.current_index),
            _ => None,
        }
    }

    /// Answer previously recorded for the current question
    pub fn current_answer(&self) -> Option<&Answer> {
        match self.phase {
            SessionPhase::Active => self.answers[self.current_index].as_ref(),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        if self.phase != SessionPhase::Terminal {
            return None;
        }
        let (started, ended) = (self.started_at?, self.ended_at?);
        Some(SessionSummary::new(
            self.score,
            self.questions.len(),
            (ended - started).num_milliseconds(),
        ))
    }

    /// Attempt record for a finished session
    pub fn to_attempt(&self) -> Option<QuizAttempt> {
        let summary = self.summary()?;
        let answers = self
            .questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(idx, (q, a))| {
                let generated = q.seed.is_some();
                AttemptAnswer {
                    question_index: idx,
                    selected: a.clone(),
                    is_correct: q.is_correct(a.as_ref()),
                    generated_question: generated.then(|| q.prompt.clone()),
                    generated_options: (generated && !q.options.is_empty())
                        .then(|| q.options.clone()),
                    generated_answer: generated.then(|| q.correct_answer.clone()),
                    seed: q.seed,
                }
            })
            .collect();

        Some(QuizAttempt {
            id: String::new(),
            quiz_id: self.quiz_id.clone(),
            answers,
            score: summary.score,
            total_questions: summary.total,
            elapsed_ms: summary.elapsed_ms,
            completed_at: self.ended_at?,
        })
    }

    /// Persist the attempt; failures are logged and never hide the score
    pub fn record<S: QuizStore + ?Sized>(&self, store: &S) -> Option<SessionSummary> {
        let summary = self.summary()?;
        if let Some(attempt) = self.to_attempt() {
            if let Err(e) = store.record_attempt(&attempt) {
                warn!("failed to record attempt for quiz '{}': {e}", self.quiz_id);
            }
        }
        Some(summary)
    }
}
