// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
//   1. `serve`          : the HTTP API (see server/)
//   2. `chat`           : one reply, printed
//   3. `classify`       : one photo, verdict printed
//   4. `status`         : which artifacts load
//   5. `init-artifacts` : random weights for smoke tests
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{ChatArgs, ClassifyArgs, Commands, InitArgs, ServeArgs, ServiceArgs};

use crate::application::{
    classify_use_case::{ClassifyOutcome, UploadedFile},
    config::ServiceConfig,
    init_use_case::InitUseCase,
    Assistant,
};
use crate::server::{self, state::AppState};

#[derive(Parser, Debug)]
#[command(
    name = "foodbot",
    version,
    about = "Food-delivery support assistant: chat replies and spoilage checks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case. The CLI only routes, never computes.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args)         => run_serve(args).await,
            Commands::Chat(args)          => run_chat(args),
            Commands::Classify(args)      => run_classify(args),
            Commands::Status(args)        => run_status(args),
            Commands::InitArtifacts(args) => run_init(args),
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config: ServiceConfig = args.service.into();
    tracing::info!("Artifacts directory: '{}'", config.artifacts.dir.display());

    let assistant = Assistant::load(&config)?;
    server::serve(AppState::new(assistant), &args.host, args.port).await
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let assistant = Assistant::load(&args.service.into())?;
    let reply = assistant.chat.reply(&args.message)?;
    println!("{reply}");
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Cannot read '{}'", args.image.display()))?;
    let filename = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let assistant = Assistant::load(&args.service.into())?;
    let outcome = assistant.classify.classify(Some(UploadedFile { filename, bytes }))?;

    if let ClassifyOutcome::Verdict { label, probability } = &outcome {
        println!("{} (p = {:.4})", label.as_str(), probability);
    }
    println!("{}", outcome.message());
    Ok(())
}

fn run_status(args: ServiceArgs) -> Result<()> {
    let assistant = Assistant::load(&args.into())?;
    println!("{}", serde_json::to_string_pretty(&assistant.status())?);
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    let init = args.init_config();
    let config: ServiceConfig = args.service.into();
    InitUseCase::new(&config, init).execute()?;
    println!("Artifacts written to '{}'", config.artifacts.dir.display());
    Ok(())
}
