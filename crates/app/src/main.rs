use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use log::info;
use quiz_core::model::{CategoryId, DifficultyId, QuizSelection, SessionToken, TopicId};
use services::{ApiConfig, AuthEvent, AuthEvents, HttpQuizApi, QuizSessionService};
use storage::{SessionPersistence, Storage};

mod play;
mod render;

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
    InvalidToken { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidToken { raw } => write!(f, "invalid session token: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Parser, Debug)]
#[command(name = "quiz", version, about = "Take multiple-choice quizzes from the terminal")]
struct Cli {
    /// SQLite database holding the resumable session.
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db: String,

    /// Quiz backend base URL (overrides QUIZ_API_BASE_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for the backend (overrides QUIZ_AUTH_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Start a new quiz.
    Play {
        /// Category by name.
        #[arg(long, conflicts_with = "category_id")]
        category: Option<String>,
        /// Category by id.
        #[arg(long)]
        category_id: Option<String>,
        /// Topic id; needs --category-id and --difficulty-id.
        #[arg(long, requires_all = ["category_id", "difficulty_id"])]
        topic_id: Option<String>,
        /// Difficulty id; needs --category-id and --topic-id.
        #[arg(long, requires_all = ["category_id", "topic_id"])]
        difficulty_id: Option<String>,
    },
    /// Continue the quiz saved locally.
    Resume,
    /// Show the results of a finished quiz.
    Results { session_token: String },
    /// Forget the quiz saved locally.
    Reset,
}

impl Command {
    fn selection(&self) -> Result<QuizSelection, quiz_core::Error> {
        let Command::Play {
            category,
            category_id,
            topic_id,
            difficulty_id,
        } = self
        else {
            return Ok(QuizSelection::default());
        };

        let selection = match (category, category_id, topic_id, difficulty_id) {
            (Some(name), ..) => QuizSelection::category(name.as_str())?,
            (None, Some(cat), Some(topic), Some(difficulty)) => QuizSelection::scoped(
                cat.parse::<CategoryId>()?,
                topic.parse::<TopicId>()?,
                difficulty.parse::<DifficultyId>()?,
            ),
            (None, Some(cat), ..) => QuizSelection::CategoryId(cat.parse::<CategoryId>()?),
            (None, None, ..) => QuizSelection::default(),
        };
        Ok(selection)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn api_config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(url) = cli.api_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        config.base_url = url.to_owned();
    }
    if let Some(token) = cli.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        config.auth_token = Some(token.to_owned());
    }
    config
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Play {
        category: None,
        category_id: None,
        topic_id: None,
        difficulty_id: None,
    });

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(cli.db.clone());
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;

    let config = api_config(&cli);
    info!("using quiz backend at {}", config.base_url);

    let auth_events = Arc::new(AuthEvents::new());
    let logged_out = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&logged_out);
    auth_events.subscribe(move |event| {
        if event == AuthEvent::SessionExpired {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let api = Arc::new(HttpQuizApi::new(config, Arc::clone(&auth_events))?);
    let mut quiz = QuizSessionService::new(api, SessionPersistence::new(storage.local));

    match &command {
        Command::Play { .. } => {
            let selection = command.selection()?;
            if let Err(err) = quiz.start_quiz(&selection).await {
                return Err(play::on_failure(&mut quiz, &logged_out, err).await);
            }
            play::run(&mut quiz, &logged_out).await
        }
        Command::Resume => {
            if !quiz.resume().await {
                println!("No quiz in progress. Start one with `quiz play`.");
                return Ok(());
            }
            play::run(&mut quiz, &logged_out).await
        }
        Command::Results { session_token } => {
            let token: SessionToken =
                session_token
                    .parse()
                    .map_err(|_| ArgsError::InvalidToken {
                        raw: session_token.clone(),
                    })?;
            match quiz.results(&token).await {
                Ok(results) => {
                    render::results(&results);
                    Ok(())
                }
                Err(err) => Err(play::on_failure(&mut quiz, &logged_out, err).await),
            }
        }
        Command::Reset => {
            quiz.resume().await;
            quiz.reset().await;
            println!("Local quiz session cleared.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
