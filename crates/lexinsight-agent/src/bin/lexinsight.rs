use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexinsight_agent::{AnalysisSession, EndpointTransport, GatewayTransport};
use lexinsight_core::{
    config::Config,
    document::{CaseDocument, CaseInput},
    transport::AnalysisTransport,
    types::{AnalysisProfile, HistoryItem},
    AnalysisFailure,
};
use lexinsight_domains::profile_or_default;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

#[derive(Parser)]
#[command(name = "lexinsight", version, about = "Case analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one case and print the result as JSON.
    Analyze {
        /// Case description. Read from --file when omitted.
        text: Option<String>,
        /// Read the case description from a file.
        #[arg(long, short, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Attach a supporting document (.txt, .pdf, .doc, .docx).
        #[arg(long, short)]
        document: Option<PathBuf>,
        /// Call the chat-completions gateway instead of the relay.
        #[arg(long)]
        direct: bool,
        /// Print the model's reply as streamed instead of the normalized record.
        #[arg(long)]
        raw: bool,
    },
    /// Interactive session with history.
    Session {
        #[arg(long)]
        direct: bool,
    },
}

fn transport(config: &Config, profile: &AnalysisProfile, direct: bool) -> Result<Box<dyn AnalysisTransport>, AnalysisFailure> {
    if direct {
        Ok(Box::new(GatewayTransport::from_config(config, profile.clone())?))
    } else {
        Ok(Box::new(EndpointTransport::from_config(config)?))
    }
}

/// Print progress labels to stderr as they arrive.
fn progress_printer() -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(label) = rx.recv().await {
            eprintln!("  {label}");
        }
    });
    tx
}

fn report_failure(failure: &AnalysisFailure) {
    eprintln!("{}: {}", failure.title(), failure.description());
}

fn history_line(item: &HistoryItem) -> String {
    format!(
        "{}  {}  {:<28} {:<6}  {}",
        item.id,
        item.timestamp.format("%Y-%m-%d %H:%M"),
        item.primary_domain,
        item.success_probability,
        item.input_summary.replace('\n', " ")
    )
}

async fn analyze(
    config: &Config,
    profile: AnalysisProfile,
    text: Option<String>,
    file: Option<PathBuf>,
    document: Option<PathBuf>,
    direct: bool,
    raw: bool,
) -> anyhow::Result<ExitCode> {
    let description = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => String::new(),
    };
    let mut input = CaseInput::new(description);
    if let Some(path) = document {
        input = input.with_document(CaseDocument::load(&path)?);
    }

    let transport = match transport(config, &profile, direct) {
        Ok(t) => t,
        Err(failure) => {
            report_failure(&failure);
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut session =
        AnalysisSession::new(transport, profile, config.timeout()).with_progress(progress_printer());

    match session.analyze(&input).await {
        Ok(analysis) if raw => {
            println!("{}", analysis.raw_analysis);
            Ok(ExitCode::SUCCESS)
        }
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            report_failure(&failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn session(config: &Config, profile: AnalysisProfile, direct: bool) -> anyhow::Result<ExitCode> {
    let transport = match transport(config, &profile, direct) {
        Ok(t) => t,
        Err(failure) => {
            report_failure(&failure);
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut session =
        AnalysisSession::new(transport, profile, config.timeout()).with_progress(progress_printer());

    println!("Describe the case, then finish with a line containing only '.'");
    println!("Commands: :history  :show <id>  :clear  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer: Vec<String> = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if buffer.is_empty() && trimmed.starts_with(':') {
            let (cmd, arg) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
            match cmd {
                ":quit" | ":q" => break,
                ":history" => {
                    if session.history().is_empty() {
                        println!("(no analyses yet)");
                    }
                    for item in session.history().items() {
                        println!("{}", history_line(item));
                    }
                }
                ":show" => match session.history().analysis_by_id(arg.trim()) {
                    Some(analysis) => println!("{}", serde_json::to_string_pretty(analysis)?),
                    None => println!("no analysis with id {}", arg.trim()),
                },
                ":clear" => {
                    session.history_mut().clear();
                    println!("history cleared");
                }
                other => println!("unknown command {other}"),
            }
            continue;
        }
        if trimmed != "." {
            buffer.push(line);
            continue;
        }

        let input = CaseInput::new(buffer.join("\n"));
        buffer.clear();
        match session.analyze(&input).await {
            Ok(analysis) => {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                println!("saved as {}", analysis.id);
            }
            Err(failure) => report_failure(&failure),
        }
        session.reset();
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexinsight=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let profile = profile_or_default(&config.analysis_profile);

    match cli.command {
        Command::Analyze {
            text,
            file,
            document,
            direct,
            raw,
        } => analyze(&config, profile, text, file, document, direct, raw).await,
        Command::Session { direct } => session(&config, profile, direct).await,
    }
}
