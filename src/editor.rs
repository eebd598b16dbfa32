//! Author-mode editing of a quiz's question list.

use log::warn;

use crate::error::{QuizError, Result};
use crate::generator::GeneratorRegistry;
use crate::quiz::{Difficulty, GeneratorParams, Question, QuestionStyle, Quiz};
use crate::rng::QuestionRng;
use crate::store::QuizStore;

/// Field-level changes applied by `update_question`; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionUpdate {
    pub prompt: Option<String>,
    pub style: Option<QuestionStyle>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub params: Option<GeneratorParams>,
    pub points: Option<u32>,
}

/// In-memory draft of a quiz; `save` is the only point that touches the store
#[derive(Debug, Clone)]
pub struct QuizEditor {
    quiz: Quiz,
    current_index: usize,
}

impl QuizEditor {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current_index: 0,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn questions(&self) -> &[Question] {
        &self.quiz.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.quiz.title = title.into();
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.quiz.subject = subject.into();
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.quiz.difficulty = difficulty;
    }

    pub fn set_published(&mut self, published: bool) {
        self.quiz.is_published = published;
    }

    /// Append a placeholder question and focus it
    pub fn add_question(&mut self) -> usize {
        self.push(Question::blank())
    }

    /// Append a generated question; the key must be registered
    pub fn add_dynamic_question(
        &mut self,
        registry: &GeneratorRegistry,
        generator: &str,
        params: GeneratorParams,
        style: QuestionStyle,
    ) -> Result<usize> {
        registry.get(generator)?;
        Ok(self.push(Question::Dynamic {
            generator: generator.to_string(),
            params,
            style,
            seed: Some(QuestionRng::fresh_seed()),
            points: None,
        }))
    }

    fn push(&mut self, question: Question) -> usize {
        self.quiz.questions.push(question);
        self.current_index = self.quiz.questions.len() - 1;
        self.current_index
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut Question> {
        self.quiz
            .questions
            .get_mut(index)
            .ok_or_else(|| QuizError::validation(format!("no question at index {index}")))
    }

    pub fn remove_question(&mut self, index: usize) -> Result<Question> {
        if index >= self.quiz.questions.len() {
            return Err(QuizError::validation(format!("no question at index {index}")));
        }
        let removed = self.quiz.questions.remove(index);
        if self.current_index >= self.quiz.questions.len() {
            self.current_index = self.quiz.questions.len().saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn update_question(&mut self, index: usize, update: QuestionUpdate) -> Result<()> {
        match self.question_mut(index)? {
            Question::Static {
                prompt,
                style,
                options,
                correct_answer,
                explanation,
                points,
            } => {
                if update.params.is_some() {
                    return Err(QuizError::validation(
                        "static questions have no generator params",
                    ));
                }
                if let Some(v) = update.prompt {
                    *prompt = v;
                }
                if let Some(v) = update.style {
                    *style = v;
                }
                if let Some(v) = update.options {
                    *options = Some(v);
                }
                if let Some(v) = update.correct_answer {
                    *correct_answer = v;
                }
                if let Some(v) = update.explanation {
                    *explanation = Some(v);
                }
                if let Some(v) = update.points {
                    *points = Some(v);
                }
            }
            Question::Dynamic {
                params,
                style,
                seed,
                points,
                ..
            } => {
                if update.prompt.is_some() || update.options.is_some() || update.correct_answer.is_some() {
                    return Err(QuizError::validation(
                        "generated questions take params, not prompt/options/answer",
                    ));
                }
                if let Some(v) = update.style {
                    *style = v;
                }
                if let Some(v) = update.params {
                    *params = v;
                    // new params describe a new question instance
                    *seed = Some(QuestionRng::fresh_seed());
                }
                if let Some(v) = update.points {
                    *points = Some(v);
                }
            }
        }
        Ok(())
    }

    /// Mark the 0-based `option` as correct; stored as the 1-based option number
    pub fn set_correct_option(&mut self, index: usize, option: usize) -> Result<()> {
        match self.question_mut(index)? {
            Question::Static {
                options,
                correct_answer,
                style: QuestionStyle::MultipleChoice,
                ..
            } => {
                let count = options.as_ref().map_or(0, Vec::len);
                if option >= count {
                    return Err(QuizError::validation(format!(
                        "option {option} out of range for {count} options"
                    )));
                }
                *correct_answer = (option + 1).to_string();
                Ok(())
            }
            _ => Err(QuizError::validation(
                "only static multiple choice questions have a correct option",
            )),
        }
    }

    /// Hand the draft to the store; on failure the draft is left untouched for a retry
    pub fn save<S: QuizStore + ?Sized>(&mut self, store: &S) -> Result<&Quiz> {
        match store.save_quiz(&self.quiz) {
            Ok(saved) => {
                self.quiz = saved;
                Ok(&self.quiz)
            }
            Err(e) => {
                warn!("saving quiz '{}' failed: {e}", self.quiz.title);
                Err(e)
            }
        }
    }
}
