use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing_subscriber::{EnvFilter, prelude::*};
use uuid::Uuid;

use clipline_core::{
    AuditLog, ChatClient, ExtractionConfig, MediaRenderer, Orientation, PlanWriter, Provider,
    RenderPlan, ResolverConfig, SearchConfig, UsedVideoSet, build_search_client,
    caption_duration, config::pexels_api_key, extract_keywords, format_keywords_readable,
    format_timeline_readable, generate_script, get_root_log_dir, load_captions, resolve_timeline,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Groq,
    Openai,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Groq => Provider::Groq,
            CliProvider::Openai => Provider::Openai,
        }
    }
}

#[derive(Clone, Default, ValueEnum)]
enum CliOrientation {
    #[default]
    Landscape,
    Portrait,
}

impl From<CliOrientation> for Orientation {
    fn from(cli: CliOrientation) -> Self {
        match cli {
            CliOrientation::Landscape => Orientation::Landscape,
            CliOrientation::Portrait => Orientation::Portrait,
        }
    }
}

#[derive(Parser)]
#[command(name = "clipline")]
#[command(
    about = "Turn a narrated script and its timed captions into a stock-footage render plan"
)]
#[command(group(ArgGroup::new("narration").required(true).args(["script", "topic"])))]
struct Cli {
    /// Timed captions JSON: a list of {start, end, text} or a transcript with "segments"
    #[arg(short, long)]
    captions: PathBuf,

    /// Narration script file. Generated from --topic when omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Topic to write the narration script for
    #[arg(short, long)]
    topic: Option<String>,

    /// Narration audio file, recorded in the render plan
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Language model provider. Defaults to Groq when GROQ_API_KEY is set, OpenAI otherwise.
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Frame orientation of the background clips
    #[arg(long, default_value = "landscape")]
    orientation: CliOrientation,

    /// Where to write the render plan
    #[arg(short, long, default_value = "render_plan.json")]
    output: PathBuf,

    /// Root directory for audit logs of provider responses
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Do not record provider responses
    #[arg(long)]
    no_audit: bool,

    /// Log every search and reuse decision
    #[arg(short, long)]
    verbose: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,clipline_core={default_level}")));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

fn fail(spinner: &ProgressBar, message: impl std::fmt::Display) -> ! {
    spinner.finish_and_clear();
    eprintln!("{} {}", style("Error:").red().bold(), message);
    eprintln!("{}", style("No render plan was written.").dim());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let provider: Provider = cli.provider.map(Into::into).unwrap_or_else(Provider::detect);
    let orientation: Orientation = cli.orientation.into();

    // Validate API keys early
    if let Err(e) = provider.validate_api_key().and_then(|_| pexels_api_key()) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    let chat = ChatClient::new(provider)?;

    println!(
        "\n{}  {}\n",
        style("clipline").cyan().bold(),
        style("Stock Footage Planner").dim()
    );

    let run_id = Uuid::new_v4();
    let audit = if cli.no_audit {
        None
    } else {
        let root = cli.log_dir.clone().unwrap_or_else(get_root_log_dir);
        Some(AuditLog::create(&root, run_id).await?)
    };
    tracing::info!(%run_id, provider = provider.name(), "run started");

    println!("{}", style("─".repeat(60)).dim());
    let total_start = Instant::now();

    // Step 1: Script (file or generated)
    let step_start = Instant::now();
    let script = match &cli.script {
        Some(path) => {
            let script = fs::read_to_string(path).await?;
            println!(
                "{} Script loaded: {} characters {}",
                style("✓").green().bold(),
                script.len(),
                style(format!("({})", path.display())).dim()
            );
            script
        }
        None => {
            let topic = cli.topic.as_deref().unwrap_or_default();
            let spinner = create_spinner(&format!(
                "Writing script with {}...",
                chat.provider().name()
            ));
            let script = match generate_script(&chat, topic).await {
                Ok(script) => script,
                Err(e) => fail(&spinner, e),
            };
            spinner.finish_with_message(format!(
                "{} Script generated: {} characters {}",
                style("✓").green().bold(),
                script.len(),
                style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
            ));
            script
        }
    };

    // Step 2: Captions
    let captions = load_captions(&cli.captions).await?;
    let total_duration = caption_duration(&captions);
    println!(
        "{} Captions loaded: {} lines, {:.1}s",
        style("✓").green().bold(),
        captions.len(),
        total_duration
    );

    // Step 3: Keywords
    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Extracting search keywords with {}...",
        chat.provider().name()
    ));
    let keyword_segments = match extract_keywords(
        &chat,
        &script,
        &captions,
        ExtractionConfig::default(),
        audit.as_ref(),
    )
    .await
    {
        Ok(segments) => segments,
        Err(e) => fail(&spinner, e),
    };
    spinner.finish_with_message(format!(
        "{} Keywords extracted: {} segments {}",
        style("✓").green().bold(),
        keyword_segments.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));
    if cli.verbose {
        println!("{}", style(format_keywords_readable(&keyword_segments)).dim());
    }

    // Step 4: Background videos
    let step_start = Instant::now();
    let spinner = create_spinner("Searching stock videos...");
    let mut search = build_search_client(SearchConfig::default(), audit.clone())?;
    let mut used = UsedVideoSet::new();
    let timeline = resolve_timeline(
        &mut search,
        &mut used,
        &keyword_segments,
        orientation,
        ResolverConfig::default(),
    )
    .await;
    spinner.finish_with_message(format!(
        "{} Videos resolved: {} found, {} reused, {} fallback, {} unresolved {}",
        style("✓").green().bold(),
        timeline.summary.searched,
        timeline.summary.reused,
        timeline.summary.fallback,
        timeline.summary.unresolved,
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));
    println!(
        "{} Made {} unique queries ({} requests, {} failed)",
        style("✓").green().bold(),
        search.cache().len(),
        search.requests_sent(),
        search.cache().failures()
    );

    // Step 5: Render plan
    let plan = RenderPlan {
        orientation,
        audio: cli.audio.clone(),
        captions,
        segments: timeline.segments,
    };
    let plan_path = PlanWriter::new(&cli.output).render(&plan).await?;
    println!(
        "{} Merged into {} clips{}",
        style("✓").green().bold(),
        plan.segments.len(),
        if plan.unresolved() > 0 {
            style(format!(" ({} without visual)", plan.unresolved()))
                .yellow()
                .to_string()
        } else {
            String::new()
        }
    );

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    println!(
        "{} {}",
        style("Saved:").dim(),
        style(plan_path.display()).cyan()
    );
    if let Some(audit) = &audit {
        println!(
            "{} {}",
            style("Audit log:").dim(),
            style(audit.dir().display()).cyan()
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    println!("{}", format_timeline_readable(&plan.segments));

    Ok(())
}
