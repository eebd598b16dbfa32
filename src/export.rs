use std::io;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::quiz::QuizAttempt;

/// One line of the attempts log
#[derive(Debug, Serialize)]
struct AttemptRow<'a> {
    date: String,
    attempt_id: &'a str,
    quiz_id: &'a str,
    score: usize,
    total_questions: usize,
    percentage: u32,
    elapsed_secs: String,
}

impl<'a> From<&'a QuizAttempt> for AttemptRow<'a> {
    fn from(attempt: &'a QuizAttempt) -> Self {
        Self {
            date: attempt.completed_at.to_rfc3339(),
            attempt_id: &attempt.id,
            quiz_id: &attempt.quiz_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage: attempt.percentage(),
            elapsed_secs: format!("{:.2}", attempt.elapsed_ms as f64 / 1000.0),
        }
    }
}

/// Write attempts as CSV with a header row, even when there are none
pub fn write_attempts<W: io::Write>(attempts: &[QuizAttempt], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if attempts.is_empty() {
        wtr.write_record([
            "date",
            "attempt_id",
            "quiz_id",
            "score",
            "total_questions",
            "percentage",
            "elapsed_secs",
        ])?;
    }
    for attempt in attempts {
        wtr.serialize(AttemptRow::from(attempt))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_attempts(attempts: &[QuizAttempt], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_attempts(attempts, file)?;
    info!("exported {} attempts to {}", attempts.len(), path.display());
    Ok(())
}
