// Parley - scripted multi-party negotiation engine
// Main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use parley::config::{resolve_settings, ExperimentSettings, SettingsOverrides};
use parley::deal::DealEvaluation;
use parley::driver::{run_experiment, score_session};
use parley::errors::classify;
use parley::logging::init_tracing;
use parley::providers::{CompletionClient, OpenAIProvider, RetryPolicy};
use parley::session::OpenMode;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Run and score scripted multi-party negotiation experiments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run (or resume) a negotiation session.
    Run(RunArgs),

    /// Score the final deal of a recorded session.
    Score(ScoreArgs),
}

/// Settings shared by both subcommands. Unset flags fall back to
/// experiment.toml in the game directory, then built-in defaults.
#[derive(Args, Clone)]
struct SessionArgs {
    /// Game directory with config.txt, scores_files/ and initial_deal.txt
    #[arg(long, default_value = "./games_descriptions/base")]
    game_dir: PathBuf,
    /// Experiment name; session files go to <game_dir>/<output_dir>/<exp_name>
    #[arg(long)]
    exp_name: Option<String>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Session history file name
    #[arg(long)]
    output_file: Option<String>,
    #[arg(long)]
    agents_num: Option<usize>,
    #[arg(long)]
    issues_num: Option<usize>,
    /// Index of the final-vote round
    #[arg(long)]
    rounds_num: Option<usize>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    session: SessionArgs,
    /// Let a moderator pick each discussion speaker
    #[arg(long)]
    moderator: bool,
    #[arg(long)]
    moderator_model: Option<String>,
    /// Sampling temperature
    #[arg(long)]
    temp: Option<f32>,
    /// History records shown to each speaker
    #[arg(long)]
    window_size: Option<usize>,
    /// Continue the session recorded at the output location
    #[arg(long, conflicts_with = "overwrite")]
    restart: bool,
    /// Discard any session recorded at the output location
    #[arg(long)]
    overwrite: bool,
    /// Run N independent trials named <exp_name>-trial-<i>
    #[arg(long, default_value = "1")]
    trials: usize,
    /// Seed for the random speaker schedule
    #[arg(long)]
    seed: Option<u64>,
    /// Completion API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
    /// OpenAI-compatible API base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Args)]
struct ScoreArgs {
    #[command(flatten)]
    session: SessionArgs,
    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,
}

impl SessionArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            exp_name: self.exp_name.clone(),
            output_dir: self.output_dir.clone(),
            output_file: self.output_file.clone(),
            agents_num: self.agents_num,
            issues_num: self.issues_num,
            rounds_num: self.rounds_num,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Score(args) => score(args),
    };

    if let Err(e) = &result {
        match classify(e) {
            Some(kind) => error!("Session aborted: {}", kind),
            None => error!("Session aborted: {:#}", e),
        }
    }
    result
}

async fn run(args: RunArgs) -> Result<()> {
    let mut overrides = args.session.overrides();
    overrides.moderator = args.moderator.then_some(true);
    overrides.moderator_model = args.moderator_model.clone();
    overrides.temperature = args.temp;
    overrides.window_size = args.window_size;
    overrides.seed = args.seed;
    overrides.api_key = args.api_key.clone();
    overrides.base_url = args.base_url.clone();

    let game_dir = args.session.game_dir.clone();
    let settings = resolve_settings(&game_dir, overrides)?;

    let client: Arc<dyn CompletionClient> = Arc::new(
        OpenAIProvider::new(settings.resolve_api_key()?, settings.api.base_url.clone())?
            .with_retry_policy(RetryPolicy::default().with_max_attempts(settings.api.max_attempts)),
    );

    let mode = if args.restart {
        OpenMode::Resume
    } else if args.overwrite {
        OpenMode::Overwrite
    } else {
        OpenMode::Create
    };

    for trial in 0..args.trials.max(1) {
        let trial_settings = trial_settings(&settings, trial, args.trials);
        info!("Starting experiment {}", trial_settings.exp_name);

        let report = run_experiment(&trial_settings, &game_dir, mode, client.clone()).await?;

        println!("\n=== {} ===", report.exp_name);
        println!("History: {}", report.history_path.display());
        println!(
            "Rounds run: {} (recorded: {})",
            report.rounds_run, report.rounds_recorded
        );
        if let Some(eval) = &report.evaluation {
            print_evaluation(eval);
        }
    }

    Ok(())
}

/// Settings for trial `index` of `trials`. Single runs keep the name as given.
fn trial_settings(base: &ExperimentSettings, index: usize, trials: usize) -> ExperimentSettings {
    let mut settings = base.clone();
    if trials > 1 {
        settings.exp_name = format!("{}-trial-{}", base.exp_name, index);
        settings.seed = base.seed.map(|seed| seed.wrapping_add(index as u64));
    }
    settings
}

fn score(args: ScoreArgs) -> Result<()> {
    let settings = resolve_settings(&args.session.game_dir, args.session.overrides())?;
    let eval = score_session(&settings, &args.session.game_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&eval)?);
    } else {
        print_evaluation(&eval);
    }
    Ok(())
}

fn print_evaluation(eval: &DealEvaluation) {
    println!(
        "Final deal: {} ({} issues suggested)",
        eval.deal, eval.issues_suggested
    );
    for party in &eval.scores {
        println!(
            "  {:<16} {:<8} score {:>4} / min {:>4}  {}",
            party.name,
            party.role.to_string(),
            party.score,
            party.min_score,
            if party.accepts { "accepts" } else { "rejects" }
        );
    }
    println!(
        "Verdict: {} ({} accept)",
        if eval.passed { "PASSED" } else { "FAILED" },
        eval.accepting()
    );
}
