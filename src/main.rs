use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kwiz::{
    app::{App, Flow},
    config::{Config, ConfigStore, FileConfigStore},
    export::export_attempts,
    generator::GeneratorRegistry,
    quiz::{GeneratorParams, QuestionStyle, Quiz},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, QuizEventSource, Runner, Ticker},
    session::{QuizSession, SessionSummary},
    store::{QuizStore, SqliteStore},
    ui::screen::current_screen,
    util::{format_number, mean},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// physics quizzes with seeded, reproducible generated questions
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Generate physics questions from formula templates, manage quizzes in a local SQLite store, and take them in the terminal."
)]
pub struct Cli {
    /// database file to use instead of the configured one
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// list the registered question generators
    Generators,

    /// generate one question from a formula template
    Generate {
        /// generator key, e.g. snells-law
        key: String,

        /// question style (defaults to the configured one)
        #[clap(short = 's', long, value_enum)]
        style: Option<QuestionStyle>,

        /// seed for a reproducible question
        #[clap(long)]
        seed: Option<u64>,

        /// parameter override as name=value; a value of `none` keeps the default
        #[clap(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, Option<f64>)>,

        /// print the question as JSON
        #[clap(long)]
        json: bool,
    },

    /// import a quiz from a JSON document
    Import { file: PathBuf },

    /// list stored quizzes
    Quizzes {
        /// case-insensitive match on title, subject or description
        #[clap(long)]
        search: Option<String>,
    },

    /// delete a quiz and its attempts
    Delete { id: String },

    /// take a quiz in the terminal
    Take { quiz_id: String },

    /// show recorded attempts for a quiz
    Attempts {
        quiz_id: String,

        /// write the attempts to a CSV file instead
        #[clap(long)]
        csv: Option<PathBuf>,
    },
}

fn parse_param(s: &str) -> Result<(String, Option<f64>), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    let value = match value.trim() {
        "" | "none" => None,
        v => Some(
            v.parse::<f64>()
                .map_err(|e| format!("bad value for {name}: {e}"))?,
        ),
    };
    Ok((name.to_string(), value))
}

fn open_store(cli: &Cli, config: &Config) -> kwiz::Result<SqliteStore> {
    match cli.db.as_ref().or(config.database_path.as_ref()) {
        Some(path) => SqliteStore::open(path, config.busy_timeout()),
        None => SqliteStore::open_default(config.busy_timeout()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = FileConfigStore::new().load();
    let registry = GeneratorRegistry::builtin();

    match &cli.command {
        Command::Generators => {
            for spec in registry.list_generators() {
                println!("{:<20} {}", spec.key, spec.name);
                println!("{:<20} {}", "", spec.description);
                let defaults = spec
                    .default_params
                    .iter()
                    .map(|(k, v)| format!("{k}={}", format_number(*v, 3)))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{:<20} {defaults}", "");
            }
        }
        Command::Generate {
            key,
            style,
            seed,
            params,
            json,
        } => {
            let params: GeneratorParams = params.iter().cloned().collect();
            let seed = seed.unwrap_or_else(kwiz::rng::QuestionRng::fresh_seed);
            let question = registry.generate(key, &params, style.unwrap_or(config.default_style), seed)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&question)?);
            } else {
                println!("{}", question.prompt);
                for (idx, option) in question.options.iter().flatten().enumerate() {
                    println!("  {}. {option}", idx + 1);
                }
                println!("answer: {}", question.correct_answer);
                if let Some(explanation) = &question.explanation {
                    println!("{explanation}");
                }
                println!("seed: {seed}");
            }
        }
        Command::Import { file } => {
            let store = open_store(&cli, &config)?;
            let quiz: Quiz = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            quiz.check_generators(&registry)?;
            let saved = store.save_quiz(&quiz)?;
            println!("{}", saved.id);
        }
        Command::Quizzes { search } => {
            let store = open_store(&cli, &config)?;
            let quizzes = match search {
                Some(q) => store.search_quizzes(q)?,
                None => store.list_quizzes()?,
            };
            for quiz in quizzes {
                println!(
                    "{}  {:<32} {:<16} {:>3} questions{}",
                    quiz.id,
                    quiz.title,
                    quiz.subject,
                    quiz.questions.len(),
                    if quiz.is_published { "" } else { "  (draft)" }
                );
            }
        }
        Command::Delete { id } => {
            let store = open_store(&cli, &config)?;
            store.delete_quiz(id)?;
            info!("deleted quiz {id}");
        }
        Command::Attempts { quiz_id, csv } => {
            let store = open_store(&cli, &config)?;
            let attempts = store.list_attempts(quiz_id)?;
            match csv {
                Some(path) => export_attempts(&attempts, path)?,
                None => {
                    for attempt in &attempts {
                        println!(
                            "{}  {}/{}  {:>3}%  {:.1}s",
                            attempt.completed_at.format("%Y-%m-%d %H:%M"),
                            attempt.score,
                            attempt.total_questions,
                            attempt.percentage(),
                            attempt.elapsed_ms as f64 / 1000.0
                        );
                    }
                    let percentages: Vec<f64> =
                        attempts.iter().map(|a| a.percentage() as f64).collect();
                    if let Some(avg) = mean(&percentages) {
                        println!("average: {}%", format_number(avg, 1));
                    }
                }
            }
        }
        Command::Take { quiz_id } => {
            if !stdin().is_tty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
            }
            let store = open_store(&cli, &config)?;
            let session = QuizSession::begin(&store, quiz_id, &registry)?;
            let mut app = App::new(session);

            enable_raw_mode()?;
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let backend = CrosstermBackend::new(stdout);
            let mut terminal = Terminal::new(backend)?;

            let runner = Runner::new(
                CrosstermEventSource::new(),
                FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
            );
            let outcome = start_tui(&mut terminal, &mut app, &runner, &store);

            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            terminal.show_cursor()?;
            let summary = outcome?;

            if let Some(summary) = summary {
                println!(
                    "{}: {}/{} ({}%) in {}m {}s",
                    app.session.title(),
                    summary.score,
                    summary.total,
                    summary.percentage,
                    summary.minutes,
                    summary.seconds
                );
            }
        }
    }

    Ok(())
}

/// Runs until the learner quits; returns the summary if the quiz was finished
fn start_tui<B: Backend, E: QuizEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    store: &dyn QuizStore,
) -> Result<Option<SessionSummary>, Box<dyn Error>> {
    terminal.draw(|f| current_screen(&app.state).render(app, f))?;

    loop {
        match runner.step() {
            QuizEvent::Tick => continue,
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => match app.handle_key(key) {
                Flow::Quit => break,
                Flow::Finished => {
                    // a failed write is logged; the learner still sees the score
                    app.session.record(store);
                }
                Flow::Continue => {}
            },
        }
        terminal.draw(|f| current_screen(&app.state).render(app, f))?;
    }

    Ok(app.summary())
}
