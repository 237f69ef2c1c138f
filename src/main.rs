use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use f1_picks::config::Config;
use f1_picks::model::{EventType, RaceKey};
use f1_picks::output::{self, OutputFormat};
use f1_picks::pipeline::{self, RunOptions, SeasonRun};
use f1_picks::store::{self, LeagueTable, StandingsSnapshot};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug)]
struct InputFiles {
    /// JSON file with an array of predictions
    #[arg(short, long)]
    predictions: PathBuf,

    /// JSON file with an array of race results
    #[arg(short, long)]
    results: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every user's picks for one event
    Score {
        #[command(flatten)]
        inputs: InputFiles,

        /// Week of the season (1-24)
        #[arg(short, long)]
        week: u8,

        /// Which session of the weekend
        #[arg(short, long, value_enum, default_value_t = EventType::Race)]
        event: EventType,

        /// Only score this league
        #[arg(short, long)]
        league: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Rank league members across every scored event
    Standings {
        #[command(flatten)]
        inputs: InputFiles,

        /// Only rank this league
        #[arg(short, long)]
        league: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also save a JSON snapshot to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check predictions and results without scoring
    Validate {
        #[command(flatten)]
        inputs: InputFiles,
    },
    /// Create a config file
    Init {
        /// Write the default config without prompting
        #[arg(long)]
        defaults: bool,

        /// Overwrite an existing config (with --defaults)
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "f1-picks")]
#[command(about = "Score F1 position predictions and league standings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/f1-picks/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("f1_picks={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_valid_config(path: Option<PathBuf>) -> Config {
    let config = match f1_picks::config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = f1_picks::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    config
}

async fn run_scoring(config: &Config, inputs: &InputFiles, options: &RunOptions) -> SeasonRun {
    let (predictions, results) = match store::load_inputs(&inputs.predictions, &inputs.results).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let run = match pipeline::score_season(config, predictions, results, options).await {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Scoring failed: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    for error in &run.rejected {
        tracing::warn!("skipped: {}", error);
    }
    run
}

fn print_score(run: &SeasonRun, format: OutputFormat, use_colors: bool) {
    match format {
        OutputFormat::Json => {
            let payload: Vec<_> = run
                .leagues
                .iter()
                .flat_map(|league| {
                    league.races.iter().flat_map(move |(race, scores)| {
                        scores.iter().map(move |s| {
                            serde_json::json!({
                                "league_id": league.league.id,
                                "week_number": race.week_number,
                                "event_type": race.event_type,
                                "user_id": s.user_id,
                                "total_points": s.total_points,
                                "picks": s.picks.iter().map(|p| serde_json::json!({
                                    "position": p.position,
                                    "driver_id": p.driver_id,
                                    "actual_position": p.actual,
                                    "position_difference": p.score.position_difference,
                                    "points": p.score.points,
                                })).collect::<Vec<_>>(),
                            })
                        })
                    })
                })
                .collect();
            match serde_json::to_string_pretty(&payload) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to serialize scores: {}", e);
                    std::process::exit(EXIT_FAILURE);
                }
            }
        }
        OutputFormat::Tsv => {
            for league in &run.leagues {
                for (race, scores) in &league.races {
                    if !scores.is_empty() {
                        println!("{}", output::format_race_tsv(&league.league.id, *race, scores));
                    }
                }
            }
        }
        OutputFormat::Table => {
            for league in &run.leagues {
                let scores = league.races.first().map(|(_, s)| s.as_slice()).unwrap_or(&[]);
                let detail = format!("(max {} per event)", league.league.max_points_per_race());
                println!(
                    "{}",
                    output::format_heading(league.league.display_name(), &detail, use_colors)
                );
                println!("{}", output::format_race_table(scores, use_colors));
                println!();
            }
        }
    }
}

fn snapshot_from(run: &SeasonRun, config: &Config) -> StandingsSnapshot {
    let leagues = run
        .leagues
        .iter()
        .map(|league| LeagueTable {
            league_id: league.league.id.clone(),
            league_name: league.league.display_name().to_string(),
            standings: league.standings.clone(),
        })
        .collect();
    StandingsSnapshot::new(config.season, leagues)
}

fn print_standings(run: &SeasonRun, snapshot: &StandingsSnapshot, format: OutputFormat, use_colors: bool) {
    match format {
        OutputFormat::Json => match output::format_json(snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize standings: {}", e);
                std::process::exit(EXIT_FAILURE);
            }
        },
        OutputFormat::Tsv => {
            for table in &snapshot.leagues {
                if !table.standings.is_empty() {
                    println!("{}", output::format_standings_tsv(&table.league_id, &table.standings));
                }
            }
        }
        OutputFormat::Table => {
            for (table, league) in snapshot.leagues.iter().zip(&run.leagues) {
                let detail = format!("({} events scored)", league.races.len());
                println!("{}", output::format_heading(&table.league_name, &detail, use_colors));
                println!("{}", output::format_standings_table(&table.standings, use_colors));
                println!();
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    match cli.command {
        Commands::Init { defaults, force } => {
            let result = if defaults {
                f1_picks::config::init::write_default_config(config_path, force)
                    .map(|path| println!("Config written to {}", path.display()))
            } else {
                f1_picks::config::init::run_init_wizard(config_path)
            };
            if let Err(e) = result {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Validate { inputs } => {
            let config = load_valid_config(config_path);
            let (predictions, results) =
                match store::load_inputs(&inputs.predictions, &inputs.results).await {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        eprintln!("Input error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                };
            let counts = (predictions.len(), results.len());

            let errors = match pipeline::collect_input_errors(&config, predictions, results) {
                Ok(errors) => errors,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            if errors.is_empty() {
                println!("{} predictions and {} results are valid.", counts.0, counts.1);
            } else {
                eprintln!("Found {} problems:", errors.len());
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(EXIT_INPUT);
            }
        }
        Commands::Score {
            inputs,
            week,
            event,
            league,
            format,
        } => {
            let config = load_valid_config(config_path);
            let options = RunOptions {
                league,
                race: Some(RaceKey::new(week, event)),
            };
            let run = run_scoring(&config, &inputs, &options).await;
            print_score(&run, format, output::should_use_colors());
        }
        Commands::Standings {
            inputs,
            league,
            format,
            output: snapshot_path,
        } => {
            let config = load_valid_config(config_path);
            let options = RunOptions { league, race: None };
            let run = run_scoring(&config, &inputs, &options).await;
            let snapshot = snapshot_from(&run, &config);

            if let Some(path) = snapshot_path {
                if let Err(e) = store::save_standings(&path, &snapshot) {
                    eprintln!("Failed to save standings: {:#}", e);
                    std::process::exit(EXIT_FAILURE);
                }
            }

            print_standings(&run, &snapshot, format, output::should_use_colors());
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}
