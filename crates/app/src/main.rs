mod args;
mod terminal;

use std::io;

use services::{Clock, QuizCatalog};
use tracing_subscriber::EnvFilter;

use args::{Args, Command, print_usage};
use terminal::{RunOutcome, run_quiz};

fn init_logging() {
    // Logs go to stderr so the quiz itself owns stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(args: &Args) -> Result<QuizCatalog, Box<dyn std::error::Error>> {
    let catalog = match &args.catalog {
        Some(path) => QuizCatalog::from_path(path),
        None => QuizCatalog::builtin(),
    };
    catalog.map_err(|err| {
        // The only user-facing error state is a generic load failure.
        eprintln!("could not load quiz");
        err.into()
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_env().inspect_err(|_| print_usage())?;
    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    init_logging();
    let catalog = load_catalog(&args)?;

    if args.command == Command::List {
        for topic in catalog.topics() {
            println!("{:<24} {} ({} questões)", topic.id(), topic.title(), topic.bank().len());
        }
        return Ok(());
    }

    let topic_id = match &args.topic {
        Some(id) => id.clone(),
        None => catalog
            .first()
            .map(|t| t.id().clone())
            .ok_or("catalog has no topics")?,
    };
    let mut controller = catalog.start_session(&topic_id, Clock::system())?;
    if let Some(topic) = catalog.get(&topic_id) {
        println!("{}", topic.title());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    match run_quiz(&mut controller, &mut input, &mut out)? {
        RunOutcome::Finished { percentage } => {
            tracing::info!(topic = %topic_id, percentage, "quiz finished");
        }
        RunOutcome::Quit => {
            tracing::info!(topic = %topic_id, "quiz abandoned");
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
