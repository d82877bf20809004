use std::fmt;
use std::path::PathBuf;

use quiz_core::model::TopicId;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTopic { raw: String },
    InvalidCatalogPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTopic { raw } => write!(f, "invalid --topic value: {raw}"),
            ArgsError::InvalidCatalogPath { raw } => write!(f, "invalid --catalog value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    List,
    Help,
}

/// Parsed command line. Environment values are defaults that flags override.
#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub catalog: Option<PathBuf>,
    pub topic: Option<TopicId>,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--catalog <file.json>] [--topic <id>]");
    eprintln!("  quiz --list [--catalog <file.json>]");
    eprintln!();
    eprintln!("Without --catalog the built-in catalog is used.");
    eprintln!("Without --topic the first topic of the catalog is used.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_CATALOG, QUIZ_TOPIC, RUST_LOG (default: warn)");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_catalog(raw: String) -> Result<PathBuf, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidCatalogPath { raw });
    }
    Ok(PathBuf::from(raw))
}

fn parse_topic(raw: String) -> Result<TopicId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidTopic { raw })
}

impl Args {
    /// Reads the process environment and arguments.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(
            std::env::args().skip(1),
            std::env::var("QUIZ_CATALOG").ok(),
            std::env::var("QUIZ_TOPIC").ok(),
        )
    }

    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env_catalog: Option<String>,
        env_topic: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut catalog = env_catalog
            .filter(|v| !v.trim().is_empty())
            .map(parse_catalog)
            .transpose()?;
        let mut topic = env_topic
            .filter(|v| !v.trim().is_empty())
            .map(parse_topic)
            .transpose()?;
        let mut command = Command::Run;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = Some(parse_catalog(require_value(&mut args, "--catalog")?)?),
                "--topic" => topic = Some(parse_topic(require_value(&mut args, "--topic")?)?),
                "--list" => command = Command::List,
                "--help" | "-h" => command = Command::Help,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            catalog,
            topic,
        })
    }
}
