//! Terminal front end state for taking a quiz.

use crossterm::event::KeyEvent;
use log::debug;

use crate::quiz::{Answer, QuestionStyle};
use crate::runtime::{action_for, Action};
use crate::session::{QuizSession, SessionSummary, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Taking,
    Results,
}

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The session just reached its terminal state; record it once
    Finished,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: QuizSession,
    pub state: AppState,
    /// Free-response text for the current question
    pub input: String,
    /// Last rejected action, shown in the footer until the next key
    pub status: Option<String>,
}

impl App {
    pub fn new(session: QuizSession) -> Self {
        let mut app = Self {
            state: if session.is_finished() {
                AppState::Results
            } else {
                AppState::Taking
            },
            session,
            input: String::new(),
            status: None,
        };
        app.sync_input();
        app
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.session.summary()
    }

    fn current_style(&self) -> QuestionStyle {
        self.session
            .current_question()
            .map(|q| q.style)
            .unwrap_or_default()
    }

    // the text buffer mirrors whatever was already typed for this question
    fn sync_input(&mut self) {
        self.input = match self.session.current_answer() {
            Some(Answer::Text(t)) => t.clone(),
            _ => String::new(),
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        self.status = None;
        match self.state {
            AppState::Results => match action_for(&key, QuestionStyle::MultipleChoice) {
                Some(Action::Quit | Action::Next) => Flow::Quit,
                _ => Flow::Continue,
            },
            AppState::Taking => match action_for(&key, self.current_style()) {
                Some(action) => self.apply(action),
                None => Flow::Continue,
            },
        }
    }

    pub fn apply(&mut self, action: Action) -> Flow {
        debug!("quiz action {action:?}");
        let result = match action {
            Action::Quit => return Flow::Quit,
            Action::Choose(idx) => self.session.select_answer(Answer::Choice(idx)).map(|_| Flow::Continue),
            Action::Type(c) => {
                self.input.push(c);
                Ok(Flow::Continue)
            }
            Action::Erase => {
                self.input.pop();
                Ok(Flow::Continue)
            }
            Action::Back => self.commit_text().and_then(|_| {
                self.session.go_back()?;
                self.sync_input();
                Ok(Flow::Continue)
            }),
            Action::Next => self.commit_text().and_then(|_| match self.session.advance()? {
                Step::Moved(_) => {
                    self.sync_input();
                    Ok(Flow::Continue)
                }
                Step::Finished => {
                    self.state = AppState::Results;
                    Ok(Flow::Finished)
                }
            }),
        };

        result.unwrap_or_else(|e| {
            self.status = Some(e.to_string());
            Flow::Continue
        })
    }

    fn commit_text(&mut self) -> crate::error::Result<()> {
        if self.current_style() == QuestionStyle::FreeResponse && !self.input.trim().is_empty() {
            self.session
                .select_answer(Answer::Text(self.input.trim().to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorRegistry;
    use crate::quiz::{Question, Quiz, QuizMode};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let quiz = Quiz::new("Mixed", QuizMode::Quiz).with_questions(vec![
            Question::blank(),
            Question::Static {
                prompt: "g in m/s^2?".into(),
                style: QuestionStyle::FreeResponse,
                options: None,
                correct_answer: "9.81".into(),
                explanation: None,
                points: None,
            },
        ]);
        let mut session = QuizSession::new();
        session.start(&quiz, &GeneratorRegistry::empty()).unwrap();
        App::new(session)
    }

    #[test]
    fn keys_drive_a_session_to_results() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('1'))), Flow::Continue);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Flow::Continue);
        for c in "9.8 m/s^2".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Flow::Finished);
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.summary().unwrap().score, 2);
        assert_eq!(app.handle_key(key(KeyCode::Char('1'))), Flow::Continue);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Flow::Quit);
    }

    #[test]
    fn going_back_restores_typed_text() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('7')));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.session.current_index(), 0);
        assert!(app.input.is_empty());
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.input, "7");
        app.handle_key(key(KeyCode::Backspace));
        assert!(app.input.is_empty());
    }

    #[test]
    fn out_of_range_choice_sets_status() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('9')));
        assert!(app.status.is_some());
        assert_eq!(app.session.current_answer(), None);
        app.handle_key(key(KeyCode::Char('2')));
        assert!(app.status.is_none());
    }
}
