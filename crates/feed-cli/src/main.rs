mod logging;

use clap::{ArgAction, Parser, Subcommand};
use feed_core::{
    Activity, DecodedEnvelope, FeedConfig, RawResponse, Reaction, Reactionable, ReqwestSource,
    ResponseDecoder, ResponseSource, StatusCode,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "feed-cli")]
#[command(about = "Decode activity-feed payloads and replay reaction updates")]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Decode(DecodeArgs),
    React(ReactArgs),
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
struct DecodeArgs {
    #[arg(long)]
    file: PathBuf,
    /// Treat the payload as a page of activities.
    #[arg(long, action = ArgAction::SetTrue)]
    envelope: bool,
}

#[derive(clap::Args, Debug)]
struct ReactArgs {
    #[arg(long)]
    file: PathBuf,
    /// Own reaction to add, as `kind:id`. Repeatable.
    #[arg(long = "add", value_parser = parse_reaction_ref)]
    adds: Vec<Reaction>,
    /// Own reaction to delete, as `kind:id`. Repeatable.
    #[arg(long = "delete", value_parser = parse_reaction_ref)]
    deletes: Vec<Reaction>,
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
    #[arg(long)]
    path: String,
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Serialize)]
struct ActivitySummary<'a> {
    id: &'a str,
    verb: &'a str,
    reaction_counts: &'a BTreeMap<String, u64>,
}

#[derive(Serialize)]
struct PageSummary<'a> {
    results: Vec<ActivitySummary<'a>>,
    next: Option<&'a str>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => decode_command(args).await,
        Commands::React(args) => react_command(args).await,
        Commands::Fetch(args) => fetch_command(args).await,
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

async fn decode_command(args: DecodeArgs) -> Result<ExitCode, String> {
    let response = load_response(&args.file)?;
    let decoder = ResponseDecoder::new(tokio::runtime::Handle::current());

    let json = if args.envelope {
        let page = decoder
            .envelope::<Activity>(Ok(response))
            .await
            .map_err(|e| e.to_string())?;
        render(&page_summary(&page))?
    } else {
        let activity = decoder
            .value::<Activity>(Ok(response))
            .await
            .map_err(|e| e.to_string())?;
        render(&activity_summary(&activity))?
    };
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

async fn react_command(args: ReactArgs) -> Result<ExitCode, String> {
    let response = load_response(&args.file)?;
    let decoder = ResponseDecoder::new(tokio::runtime::Handle::current());
    let mut activity = decoder
        .value::<Activity>(Ok(response))
        .await
        .map_err(|e| e.to_string())?;

    for reaction in args.adds {
        activity.add_own_reaction(reaction);
    }
    for reaction in &args.deletes {
        if !activity.delete_own_reaction(reaction) {
            tracing::warn!(kind = %reaction.kind, id = %reaction.id, "no matching own reaction");
        }
    }

    println!("{}", render(activity.reactions())?);
    Ok(ExitCode::SUCCESS)
}

async fn fetch_command(args: FetchArgs) -> Result<ExitCode, String> {
    let mut config = FeedConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let source = ReqwestSource::new(config).map_err(|e| e.to_string())?;
    let outcome = source.fetch(&args.path).await;
    if let Ok(response) = &outcome {
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "server answered with a non-success status");
        }
    }

    let decoder = ResponseDecoder::new(tokio::runtime::Handle::current());
    let page = decoder
        .envelope::<Activity>(outcome)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", render(&page_summary(&page))?);
    Ok(ExitCode::SUCCESS)
}

fn load_response(path: &Path) -> Result<RawResponse, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("failed reading payload file '{}': {e}", path.display()))?;
    Ok(RawResponse::new(StatusCode::OK, bytes))
}

fn parse_reaction_ref(raw: &str) -> Result<Reaction, String> {
    match raw.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(Reaction::new(id, kind)),
        _ => Err(format!("expected kind:id, got '{raw}'")),
    }
}

fn activity_summary(activity: &Activity) -> ActivitySummary<'_> {
    ActivitySummary {
        id: &activity.id,
        verb: &activity.verb,
        reaction_counts: activity.reactions.reaction_counts(),
    }
}

fn page_summary(page: &DecodedEnvelope<Activity>) -> PageSummary<'_> {
    PageSummary {
        results: page.results.iter().map(activity_summary).collect(),
        next: page.next.as_deref(),
    }
}

fn render<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}
