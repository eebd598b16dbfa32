use std::time::Duration;

use assert_matches::assert_matches;
use kwiz::editor::{QuestionUpdate, QuizEditor};
use kwiz::export::export_attempts;
use kwiz::generator::GeneratorRegistry;
use kwiz::quiz::{Answer, GeneratorParams, Question, QuestionStyle, Quiz, QuizMode};
use kwiz::session::{QuizSession, SessionPhase, Step};
use kwiz::store::{QuizStore, SqliteStore};
use kwiz::QuizError;

fn open(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open(dir.path().join("kwiz.db"), Duration::from_millis(500)).unwrap()
}

fn authored_quiz(store: &SqliteStore, registry: &GeneratorRegistry) -> Quiz {
    let mut editor = QuizEditor::new(Quiz::new("Optics", QuizMode::Quiz));
    editor.set_subject("Physics");
    editor.add_question();
    editor
        .update_question(
            0,
            QuestionUpdate {
                prompt: Some("Speed of light in vacuum?".into()),
                options: Some(vec!["3e5 m/s".into(), "3e8 m/s".into(), "3e10 m/s".into()]),
                explanation: Some("c ≈ 299 792 458 m/s".into()),
                ..Default::default()
            },
        )
        .unwrap();
    editor.set_correct_option(0, 1).unwrap();
    editor
        .add_dynamic_question(
            registry,
            "snells-law",
            GeneratorParams::new(),
            QuestionStyle::MultipleChoice,
        )
        .unwrap();
    editor.save(store).unwrap().clone()
}

#[test]
fn authored_quiz_survives_reopen_and_renders_identically() {
    let dir = tempfile::tempdir().unwrap();
    let registry = GeneratorRegistry::builtin();
    let quiz = authored_quiz(&open(&dir), &registry);

    let store = open(&dir);
    let first = QuizSession::begin(&store, &quiz.id, &registry).unwrap();
    let second = QuizSession::begin(&store, &quiz.id, &registry).unwrap();
    assert_eq!(first.questions(), second.questions());
    assert_eq!(first.questions()[1].seed, second.questions()[1].seed);
    assert!(first.questions()[1].seed.is_some());
}

#[test]
fn full_attempt_is_scored_recorded_and_exported() {
    let dir = tempfile::tempdir().unwrap();
    let registry = GeneratorRegistry::builtin();
    let store = open(&dir);
    let quiz = authored_quiz(&store, &registry);

    let mut session = QuizSession::begin(&store, &quiz.id, &registry).unwrap();
    assert_eq!(session.phase(), SessionPhase::Active);

    session.select_answer(Answer::Choice(1)).unwrap();
    assert_eq!(session.advance().unwrap(), Step::Moved(1));
    // second question left unanswered
    assert_eq!(session.advance().unwrap(), Step::Finished);

    let summary = session.record(&store).unwrap();
    assert_eq!((summary.score, summary.total, summary.percentage), (1, 2, 50));

    // terminal sessions reject further changes
    assert_matches!(
        session.select_answer(Answer::Choice(0)),
        Err(QuizError::InvalidState(_))
    );
    assert_eq!(session.summary().unwrap().score, 1);

    let attempts = store.list_attempts(&quiz.id).unwrap();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].answers[0].is_correct);
    assert!(!attempts[0].answers[1].is_correct);
    assert!(attempts[0].answers[1].generated_question.is_some());

    let csv_path = dir.path().join("attempts.csv");
    export_attempts(&attempts, &csv_path).unwrap();
    let text = std::fs::read_to_string(csv_path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains(",1,2,50,"));
}

#[test]
fn editing_is_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let registry = GeneratorRegistry::builtin();
    let store = open(&dir);
    let quiz = authored_quiz(&store, &registry);

    let mut a = QuizEditor::new(store.load_quiz_by_id(&quiz.id).unwrap());
    let mut b = QuizEditor::new(store.load_quiz_by_id(&quiz.id).unwrap());
    a.set_title("From A");
    b.remove_question(1).unwrap();
    a.save(&store).unwrap();
    b.save(&store).unwrap();

    let stored = store.load_quiz_by_id(&quiz.id).unwrap();
    assert_eq!(stored.title, "Optics");
    assert_eq!(stored.questions.len(), 1);
}

#[test]
fn deleted_quiz_cannot_be_started() {
    let dir = tempfile::tempdir().unwrap();
    let registry = GeneratorRegistry::builtin();
    let store = open(&dir);
    let quiz = authored_quiz(&store, &registry);

    store.delete_quiz(&quiz.id).unwrap();
    assert_matches!(
        QuizSession::begin(&store, &quiz.id, &registry),
        Err(QuizError::NotFound { .. })
    );
}

#[test]
fn unknown_generator_in_stored_quiz_fails_start() {
    let store = SqliteStore::open_in_memory().unwrap();
    let quiz = store
        .save_quiz(&Quiz::new("Broken", QuizMode::Quiz).with_questions(vec![Question::Dynamic {
            generator: "warp-drive".into(),
            params: GeneratorParams::new(),
            style: QuestionStyle::FreeResponse,
            seed: None,
            points: None,
        }]))
        .unwrap();

    assert_matches!(
        QuizSession::begin(&store, &quiz.id, &GeneratorRegistry::builtin()),
        Err(QuizError::UnknownGenerator(_))
    );
}

#[test]
fn stored_question_with_degenerate_params_fails_start() {
    let store = SqliteStore::open_in_memory().unwrap();
    let params: GeneratorParams = [("radiusMin", 0.0), ("radiusMax", 0.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v)))
        .collect();
    let quiz = store
        .save_quiz(&Quiz::new("Spin", QuizMode::Quiz).with_questions(vec![Question::Dynamic {
            generator: "circular-motion".into(),
            params,
            style: QuestionStyle::MultipleChoice,
            seed: Some(1),
            points: None,
        }]))
        .unwrap();

    assert_matches!(
        QuizSession::begin(&store, &quiz.id, &GeneratorRegistry::builtin()),
        Err(QuizError::Validation(_))
    );
}
