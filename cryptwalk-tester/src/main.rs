mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cryptwalk_game::{DecisionCatalog, GameConfig};
use logic::{
    GameplayStrategy, RunRecord, SimulationConfig, aggregate_runs, resolve_seed_inputs,
    run_simulation,
};

#[derive(Debug, Parser)]
#[command(name = "cryptwalk-tester", version = "0.1.0")]
#[command(about = "Headless QA runs for Cryptwalk - plays seeded games with scripted policies")]
struct Args {
    /// Seeds to run (comma-separated integers or seed phrases)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Games to play per seed and strategy
    #[arg(long, default_value_t = 10)]
    runs: u64,

    /// Strategies to run (comma-separated: cautious, reckless, random, or all)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// Step budget per game before the run counts as stalled
    #[arg(long, default_value_t = 2_000)]
    max_steps: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Game configuration JSON (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one line per finished run
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report == "console" || args.output.is_some() {
        announce_banner();
    }

    let start_time = Instant::now();
    let game_config = load_game_config(args.config.as_deref())?;
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let catalog = DecisionCatalog::default_catalog();

    let records = run_all(&args, &game_config, catalog, &strategies, &seeds);
    write_reports(&args, &records, start_time)?;

    let broken = records.iter().filter(|record| !record.is_clean()).count();
    if broken > 0 {
        eprintln!("{}", format!("❌ {broken} run(s) broke an invariant").red());
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🕯️ Cryptwalk Automated Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn expand_strategies(input: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(input) {
        if token.eq_ignore_ascii_case("all") {
            for strategy in GameplayStrategy::ALL {
                if !strategies.contains(&strategy) {
                    strategies.push(strategy);
                }
            }
            continue;
        }
        let Some(strategy) = GameplayStrategy::from_key(&token) else {
            bail!("unknown strategy '{token}' (expected cautious, reckless, random or all)");
        };
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    if strategies.is_empty() {
        bail!("no strategies selected");
    }
    Ok(strategies)
}

fn load_game_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn run_all(
    args: &Args,
    game_config: &GameConfig,
    catalog: &DecisionCatalog,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Vec<RunRecord> {
    let mut records = Vec::new();
    for strategy in strategies {
        for seed in seeds {
            for run in 0..args.runs.max(1) {
                let config = SimulationConfig::new(*strategy, seed.wrapping_add(run))
                    .with_max_steps(args.max_steps);
                let record = run_simulation(game_config, catalog, config);
                if args.verbose {
                    println!(
                        "[{} seed {}] {} after {} steps, {} events",
                        strategy.label(),
                        record.seed,
                        record.outcome.label(),
                        record.steps,
                        record.events
                    );
                }
                records.push(record);
            }
        }
    }
    records
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_runs(records);

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, records, &aggregates)?,
        "markdown" => {
            if records.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Cryptwalk Simulation Results\n\n_No runs executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, records, &aggregates)?;
            }
        }
        _ => {
            if records.is_empty() {
                writeln!(&mut output_target, "No runs executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    records,
                    &aggregates,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
