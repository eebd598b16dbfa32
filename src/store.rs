use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::app_dirs::AppDirs;
use crate::error::{QuizError, Result};
use crate::quiz::{Question, Quiz, QuizAttempt};
use crate::rng::QuestionRng;

/// Data-access facade for quizzes and attempts.
///
/// Handles are constructed explicitly and passed to whatever needs them.
pub trait QuizStore {
    /// Fails with `NotFound` when no quiz has this id
    fn load_quiz_by_id(&self, id: &str) -> Result<Quiz>;

    /// Create (empty id) or fully replace a quiz; last writer wins
    fn save_quiz(&self, quiz: &Quiz) -> Result<Quiz>;

    fn delete_quiz(&self, id: &str) -> Result<()>;

    fn list_quizzes(&self) -> Result<Vec<Quiz>>;

    fn search_quizzes(&self, query: &str) -> Result<Vec<Quiz>> {
        Ok(self
            .list_quizzes()?
            .into_iter()
            .filter(|q| q.matches(query))
            .collect())
    }

    fn record_attempt(&self, attempt: &QuizAttempt) -> Result<QuizAttempt>;

    /// Attempts for one quiz, most recent first
    fn list_attempts(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>>;
}

pub fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Give every dynamic question without a seed a fresh one so renders are replayable
pub fn assign_missing_seeds(quiz: &mut Quiz) {
    for question in quiz.questions.iter_mut() {
        if let Question::Dynamic { seed, .. } = question {
            if seed.is_none() {
                *seed = Some(QuestionRng::fresh_seed());
            }
        }
    }
}

/// SQLite document store: each record is a JSON document plus indexed columns
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        // a locked database errors out instead of stalling forever
        conn.busy_timeout(busy_timeout)?;
        debug!("opened quiz store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Database under the per-user state directory
    pub fn open_default(busy_timeout: Duration) -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kwiz.db"));
        Self::open(path, busy_timeout)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS quizzes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                subject TEXT NOT NULL DEFAULT '',
                is_published BOOLEAN NOT NULL,
                updated_at TEXT NOT NULL,
                document TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS attempts (
                id TEXT PRIMARY KEY,
                quiz_id TEXT NOT NULL,
                score INTEGER NOT NULL,
                total_questions INTEGER NOT NULL,
                elapsed_ms INTEGER NOT NULL,
                completed_at TEXT NOT NULL,
                document TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_attempts_quiz ON attempts(quiz_id)",
            [],
        )?;

        Ok(SqliteStore { conn })
    }

    fn find_quiz(&self, id: &str) -> Result<Option<Quiz>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM quizzes WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str::<Quiz>(&d).map_err(QuizError::from))
            .transpose()
    }
}

impl QuizStore for SqliteStore {
    fn load_quiz_by_id(&self, id: &str) -> Result<Quiz> {
        self.find_quiz(id)?
            .ok_or_else(|| QuizError::quiz_not_found(id))
    }

    fn save_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        quiz.validate()?;

        let mut stored = quiz.clone();
        let now = Utc::now();
        if stored.id.is_empty() {
            stored.id = new_id();
            stored.created_at = now;
        } else if let Some(existing) = self.find_quiz(&stored.id)? {
            stored.created_at = existing.created_at;
        }
        stored.updated_at = now;
        assign_missing_seeds(&mut stored);

        let document = serde_json::to_string(&stored)?;
        self.conn.execute(
            r#"
            INSERT INTO quizzes (id, title, subject, is_published, updated_at, document)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                subject = excluded.subject,
                is_published = excluded.is_published,
                updated_at = excluded.updated_at,
                document = excluded.document
            "#,
            params![
                stored.id,
                stored.title,
                stored.subject,
                stored.is_published,
                stored.updated_at.to_rfc3339(),
                document,
            ],
        )?;
        info!("saved quiz '{}' ({})", stored.title, stored.id);
        Ok(stored)
    }

    fn delete_quiz(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM quizzes WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(QuizError::quiz_not_found(id));
        }
        tx.execute("DELETE FROM attempts WHERE quiz_id = ?1", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let mut stmt = self
            .conn
            .prepare("SELECT document FROM quizzes ORDER BY title, id")?;
        let docs = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut quizzes = Vec::new();
        for doc in docs {
            quizzes.push(serde_json::from_str(&doc?)?);
        }
        Ok(quizzes)
    }

    fn record_attempt(&self, attempt: &QuizAttempt) -> Result<QuizAttempt> {
        if attempt.quiz_id.is_empty() {
            return Err(QuizError::validation("attempt has no quiz id"));
        }
        let mut stored = attempt.clone();
        if stored.id.is_empty() {
            stored.id = new_id();
        }

        self.conn.execute(
            r#"
            INSERT INTO attempts
            (id, quiz_id, score, total_questions, elapsed_ms, completed_at, document)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stored.id,
                stored.quiz_id,
                stored.score as i64,
                stored.total_questions as i64,
                stored.elapsed_ms,
                stored.completed_at.to_rfc3339(),
                serde_json::to_string(&stored)?,
            ],
        )?;
        Ok(stored)
    }

    fn list_attempts(&self, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        let mut stmt = self.conn.prepare(
            "SELECT document FROM attempts WHERE quiz_id = ?1 ORDER BY completed_at DESC",
        )?;
        let docs = stmt.query_map([quiz_id], |row| row.get::<_, String>(0))?;

        let mut attempts = Vec::new();
        for doc in docs {
            attempts.push(serde_json::from_str(&doc?)?);
        }
        Ok(attempts)
    }
}
