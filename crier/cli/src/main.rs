//! Crier CLI - changelog refresh, analysis and spoken narration

use clap::{Parser, Subcommand};
use crier_lib::analysis::{ChangelogAnalysis, GeminiAnalyzer, Sentiment};
use crier_lib::audio::{
    AudioPipeline, GeminiTts, PlaybackController, VOICE_OPTIONS, VoiceName, play_wav_bytes,
};
use crier_lib::cache::{AnalysisStore, AudioStore, HttpCacheStore, MemoryCacheStore};
use crier_lib::changelog::{
    ChangeKind, ChangelogVersion, DEFAULT_MAX_ATTEMPTS, fetch_with_retry, parse_changelog,
};
use crier_lib::orchestrator::{
    ANALYSIS_WINDOW, ChangelogOrchestrator, DEFAULT_CHANGELOG_URL, RefreshOutcome,
    summarize_recent,
};
use crier_lib::prefs::{JsonPreferenceStore, PreferenceStore, UserPreferences};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crier")]
#[command(about = "Fetch, analyze and narrate software changelogs", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the changelog and print the latest versions with analysis
    Refresh {
        /// Changelog URL to fetch [default: the Claude Code changelog]
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Base URL of a cache server for storing/reusing analyses
        #[arg(long, value_name = "URL")]
        cache_url: Option<String>,

        /// Skip AI analysis even when GEMINI_API_KEY is set
        #[arg(long)]
        no_analysis: bool,
    },

    /// Synthesize speech and play it through the system audio player
    Speak {
        /// Text to narrate (omit to narrate the latest changelog versions)
        #[arg(value_name = "TEXT")]
        text: Vec<String>,

        /// Voice to use (see `crier voices`); persisted as the new default
        #[arg(long, value_name = "VOICE")]
        voice: Option<VoiceName>,

        /// Playback speed multiplier (0.25-4.0); persisted as the new default
        #[arg(long, value_name = "SPEED")]
        speed: Option<f32>,

        /// Changelog URL to narrate when no TEXT is given
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Base URL of a cache server for storing/reusing generated audio
        #[arg(long, value_name = "URL")]
        cache_url: Option<String>,

        /// Write the WAV to a file instead of playing it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the curated voices with their tone descriptions
    Voices,
}

/// Initialize tracing subscriber based on verbosity
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // Default: WARN only to reduce stderr noise
            0 => "warn".to_string(),
            // -v: Show INFO for fetch/generation progress
            1 => "warn,crier_lib=info".to_string(),
            // -vv: Show DEBUG for crier_lib
            2 => "info,crier_lib=debug".to_string(),
            // -vvv+: Show TRACE for detailed debugging
            _ => "debug,crier_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Heading line for one parsed version. The date segment is omitted when the
/// header carried none (`date` is empty, not optional).
fn version_heading(version: &ChangelogVersion) -> String {
    if version.date.is_empty() {
        format!("{}", version.version.bold())
    } else {
        format!("{} - {}", version.version.bold(), version.date)
    }
}

fn kind_tag(kind: ChangeKind) -> String {
    match kind {
        ChangeKind::Breaking => format!("{}", "breaking".red().bold()),
        ChangeKind::Removal => format!("{}", "removal".yellow()),
        ChangeKind::Fix => format!("{}", "fix".green()),
        ChangeKind::Feature => format!("{}", "feature".cyan()),
        ChangeKind::Other => format!("{}", "other".dimmed()),
    }
}

fn print_analysis(analysis: &ChangelogAnalysis) {
    println!("\n{}", "Analysis".bold().underline());
    println!("{}", analysis.tldr);

    let categories = &analysis.categories;
    if !categories.critical_breaking_changes.is_empty() {
        println!("\n{}", "Breaking changes".red().bold());
        for change in &categories.critical_breaking_changes {
            println!("  - {}", change);
        }
    }
    if !categories.removals.is_empty() {
        println!("\n{}", "Removals".yellow().bold());
        for removal in &categories.removals {
            println!("  - {} [{:?}]: {}", removal.feature, removal.severity, removal.why);
        }
    }
    if !categories.major_features.is_empty() {
        println!("\n{}", "Major features".cyan().bold());
        for feature in &categories.major_features {
            println!("  - {}", feature);
        }
    }
    if !categories.important_fixes.is_empty() {
        println!("\n{}", "Important fixes".green().bold());
        for fix in &categories.important_fixes {
            println!("  - {}", fix);
        }
    }
    if !analysis.action_items.is_empty() {
        println!("\n{}", "Action items".bold());
        for item in &analysis.action_items {
            println!("  - {}", item);
        }
    }

    let sentiment = match analysis.sentiment {
        Sentiment::Positive => format!("{}", "positive".green()),
        Sentiment::Critical => format!("{}", "critical".red()),
        Sentiment::Neutral => format!("{}", "neutral".dimmed()),
    };
    println!("\nSentiment: {}", sentiment);
}

fn print_outcome(outcome: &RefreshOutcome) {
    println!(
        "Latest version: {} ({} versions parsed)",
        outcome.latest_version.bold(),
        outcome.versions.len()
    );

    for version in outcome.versions.iter().take(ANALYSIS_WINDOW) {
        println!("\n{}", version_heading(version));
        for item in &version.items {
            println!("  [{}] {}", kind_tag(item.kind), item.content);
        }
    }

    if let Some(analysis) = &outcome.analysis {
        print_analysis(analysis);
    }
}

async fn run_refresh<S: AnalysisStore>(
    store: S,
    url: String,
    no_analysis: bool,
) -> Result<(), String> {
    let analyzer = if no_analysis {
        None
    } else {
        match GeminiAnalyzer::new() {
            Ok(analyzer) => Some(analyzer),
            Err(error) => {
                eprintln!("{} {}", "Analysis disabled:".yellow(), error);
                None
            }
        }
    };

    let orchestrator = ChangelogOrchestrator::new(analyzer, store).with_url(url);
    let outcome = orchestrator.refresh().await;

    if let Some(error) = &outcome.error {
        return Err(error.clone());
    }

    print_outcome(&outcome);
    Ok(())
}

/// Resolve the text to narrate: explicit arguments, or the latest
/// changelog versions when none were given.
async fn resolve_speak_text(text: Vec<String>, url: &str) -> Result<String, String> {
    if !text.is_empty() {
        return Ok(text.join(" "));
    }

    let client = reqwest::Client::new();
    let markdown = fetch_with_retry(&client, url, DEFAULT_MAX_ATTEMPTS)
        .await
        .map_err(|e| e.to_string())?;
    let versions = parse_changelog(&markdown);
    if versions.is_empty() {
        return Err(format!("no versions found in changelog at {url}"));
    }
    Ok(summarize_recent(&versions))
}

async fn run_speak<C: AudioStore>(
    store: C,
    text: String,
    prefs: &UserPreferences,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let synthesizer = GeminiTts::new().map_err(|e| e.to_string())?;
    let pipeline = AudioPipeline::new(synthesizer, store);

    let label = if text.chars().count() > 40 {
        let truncated: String = text.chars().take(40).collect();
        format!("{truncated}...")
    } else {
        text.clone()
    };

    let mut controller = PlaybackController::with_speed(prefs.playback_speed);
    let token = controller.begin_generation(&label);

    let wav = match pipeline.generate(&text, prefs.voice).await {
        Ok(wav) => wav,
        Err(error) => {
            controller.fail_generation(token, error.to_string());
            return Err(error.to_string());
        }
    };

    if !controller.complete_generation(token, wav, &label) {
        // Single-shot CLI flow, so only this token was ever issued.
        return Err("generation result discarded".into());
    }

    println!(
        "Narrating with {} at {:.2}x ({:.1}s)",
        prefs.voice.as_str().bold(),
        controller.speed(),
        controller.duration()
    );

    let wav = controller
        .active_wav()
        .ok_or_else(|| "no audio buffer loaded".to_string())?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, wav)
                .await
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            println!("Wrote {}", path.display().to_string().green());
        }
        None => {
            play_wav_bytes(wav).await.map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

fn print_voices(default_voice: VoiceName) {
    println!("{}", "Voices".bold().underline());
    for option in VOICE_OPTIONS {
        let marker = if option.name == default_voice {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {:<12} {}{}",
            option.name.as_str().bold(),
            option.tone.dimmed(),
            marker.green()
        );
    }
}

/// Load preferences, apply any CLI overrides and persist them back.
fn resolve_prefs(voice: Option<VoiceName>, speed: Option<f32>) -> UserPreferences {
    let store = JsonPreferenceStore::in_home_dir();
    let mut prefs = store
        .as_ref()
        .map(|s| s.load_or_default())
        .unwrap_or_default();

    let changed = voice.is_some() || speed.is_some();
    if let Some(voice) = voice {
        prefs.voice = voice;
    }
    if let Some(speed) = speed {
        prefs.playback_speed = speed;
    }

    if changed {
        if let Some(store) = &store {
            if let Err(error) = store.save(&prefs) {
                tracing::warn!(error = %error, "Failed to persist preferences");
            }
        }
    }

    prefs
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity);

    match cli.command {
        Commands::Refresh {
            url,
            cache_url,
            no_analysis,
        } => {
            let url = url.unwrap_or_else(|| DEFAULT_CHANGELOG_URL.to_string());
            let result = match cache_url {
                Some(base) => run_refresh(HttpCacheStore::new(base), url, no_analysis).await,
                None => run_refresh(MemoryCacheStore::new(), url, no_analysis).await,
            };
            if let Err(error) = result {
                eprintln!("Refresh failed: {}", error);
                std::process::exit(1);
            }
        }

        Commands::Speak {
            text,
            voice,
            speed,
            url,
            cache_url,
            output,
        } => {
            let prefs = resolve_prefs(voice, speed);
            let url = url.unwrap_or_else(|| DEFAULT_CHANGELOG_URL.to_string());

            let text = match resolve_speak_text(text, &url).await {
                Ok(text) => text,
                Err(error) => {
                    eprintln!("Nothing to narrate: {}", error);
                    std::process::exit(1);
                }
            };

            let result = match cache_url {
                Some(base) => run_speak(HttpCacheStore::new(base), text, &prefs, output).await,
                None => run_speak(MemoryCacheStore::new(), text, &prefs, output).await,
            };
            if let Err(error) = result {
                eprintln!("Speak failed: {}", error);
                std::process::exit(1);
            }
        }

        Commands::Voices => {
            let prefs = resolve_prefs(None, None);
            print_voices(prefs.voice);
        }
    }
}
