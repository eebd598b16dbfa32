use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kwiz::app::{App, AppState, Flow};
use kwiz::generator::GeneratorRegistry;
use kwiz::quiz::{GeneratorParams, Question, QuestionStyle, Quiz, QuizMode};
use kwiz::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use kwiz::session::QuizSession;
use kwiz::store::{QuizStore, SqliteStore};

fn key(code: KeyCode) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY.
// Drives a stored quiz from keystrokes to a recorded attempt.
#[test]
fn headless_quiz_flow_records_attempt() {
    let store = SqliteStore::open_in_memory().unwrap();
    let registry = GeneratorRegistry::builtin();
    let quiz = store
        .save_quiz(&Quiz::new("Headless", QuizMode::Quiz).with_questions(vec![
            Question::blank(),
            Question::Dynamic {
                generator: "circular-motion".into(),
                params: GeneratorParams::new(),
                style: QuestionStyle::TrueFalse,
                seed: Some(11),
                points: None,
            },
        ]))
        .unwrap();

    let session = QuizSession::begin(&store, &quiz.id, &registry).unwrap();
    let tf_correct = session.questions()[1].correct_answer.clone();
    let mut app = App::new(session);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key(KeyCode::Char('1'))).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(QuizEvent::Resize).unwrap();
    let letter = if tf_correct == "True" { 't' } else { 'f' };
    tx.send(key(KeyCode::Char(letter))).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();

    let mut finished = false;
    for _ in 0..100u32 {
        match runner.step() {
            QuizEvent::Tick | QuizEvent::Resize => {}
            QuizEvent::Key(k) => {
                if app.handle_key(k) == Flow::Finished {
                    app.session.record(&store);
                    finished = true;
                    break;
                }
            }
        }
    }

    assert!(finished, "quiz should have finished");
    assert_eq!(app.state, AppState::Results);
    let summary = app.summary().unwrap();
    assert_eq!((summary.score, summary.total, summary.percentage), (2, 2, 100));

    let attempts = store.list_attempts(&quiz.id).unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].answers[1].seed, Some(11));
}

#[test]
fn headless_quit_discards_session() {
    let store = SqliteStore::open_in_memory().unwrap();
    let quiz = store
        .save_quiz(&Quiz::new("Quit", QuizMode::Quiz).with_questions(vec![Question::blank()]))
        .unwrap();
    let session = QuizSession::begin(&store, &quiz.id, &GeneratorRegistry::builtin()).unwrap();
    let mut app = App::new(session);

    assert_eq!(app.handle_key(KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE)), Flow::Continue);
    assert_eq!(app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)), Flow::Quit);
    assert!(!app.session.is_finished());
    assert!(store.list_attempts(&quiz.id).unwrap().is_empty());
}

#[test]
fn headless_step_ticks_when_idle() {
    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );
    assert!(matches!(runner.step(), QuizEvent::Tick));
}
