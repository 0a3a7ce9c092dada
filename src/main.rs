//! Pocket Planner CLI
//!
//! Usage:
//!   pocket-planner [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>          Engine configuration (TOML format)
//!   -l, --lock <ID>              Keep an object in place (repeatable)
//!   -m, --max-iterations <N>     Repair pass budget
//!       --check                  Report violations and score without repairing
//!       --json                   Machine-readable output
//!   -v, --verbose                Log progress to stderr (-vv for every move)
//!   -h, --help                   Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pocket_planner::layout::report::{
    describe_movements, format_violations, pass_explanation, summary,
};
use pocket_planner::{
    optimize_request, rank_request, EngineConfig, IterationController, LayoutGraph,
    OptimizeRequest, OptimizeResponse,
};

/// Exit code for a run that ended with violations still in place
const EXIT_EXHAUSTED: i32 = 2;

#[derive(Parser)]
#[command(name = "pocket-planner")]
#[command(about = "Check and repair furniture layouts")]
struct Cli {
    /// Request JSON file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Object id the solver must not move
    #[arg(short, long = "lock", value_name = "ID")]
    lock: Vec<String>,

    /// Maximum number of repair passes
    #[arg(short, long)]
    max_iterations: Option<u32>,

    /// Only evaluate: print violations and score, change nothing
    #[arg(long)]
    check: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => fail(format!("could not encode output: {}", e)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(format!("loading config '{}': {}", path.display(), e)),
        },
        None => EngineConfig::default(),
    };

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(format!("reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(format!("reading from stdin: {}", e)),
            }
        }
    };

    let mut request = match OptimizeRequest::from_json(&source) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    request.locked_object_ids.extend(cli.lock.iter().cloned());
    if cli.max_iterations.is_some() {
        request.max_iterations = cli.max_iterations;
    }

    if cli.check {
        run_check(&request, &config, cli.json);
    } else if !request.proposals.is_empty() {
        run_ranking(&request, &config, cli.json);
    } else {
        run_repair(&request, &config, cli.json);
    }
}

fn run_check(request: &OptimizeRequest, config: &EngineConfig, json: bool) {
    let layout = match request.layout() {
        Ok(l) => l,
        Err(e) => fail(e),
    };
    let graph = LayoutGraph::classify(&layout, &request.locked_object_ids);
    let mut controller = match IterationController::new(graph, request.effective_config(config)) {
        Ok(c) => c,
        Err(e) => fail(e),
    };
    let evaluation = controller.evaluate(&layout);

    if json {
        print_json(&evaluation);
    } else {
        println!("{}", format_violations(&evaluation.violations));
        println!("Score: {:.1}/100", evaluation.score.total_score);
        if let Some(explanation) = &evaluation.score.explanation {
            println!("({})", explanation);
        }
    }
}

fn run_repair(request: &OptimizeRequest, config: &EngineConfig, json: bool) {
    let outcome = match optimize_request(request, config) {
        Ok(o) => o,
        Err(e) => fail(e),
    };

    if json {
        print_json(&OptimizeResponse::from(&outcome));
    } else {
        for (i, pass) in outcome.passes.iter().enumerate() {
            println!("Pass {}: {}\n", i + 1, pass_explanation(pass));
        }
        println!("{}", summary(&outcome));
        if let Ok(original) = request.layout() {
            let movements = describe_movements(&original, &outcome.layout);
            if !movements.is_empty() {
                println!("\nChanges:");
                for line in movements {
                    println!("  {}", line);
                }
            }
        }
    }

    if !outcome.is_success() {
        std::process::exit(EXIT_EXHAUSTED);
    }
}

fn run_ranking(request: &OptimizeRequest, config: &EngineConfig, json: bool) {
    let ranking = match rank_request(request, config) {
        Ok(r) => r,
        Err(e) => fail(e),
    };

    if json {
        print_json(&ranking.variations);
    } else {
        for (rank, variation) in ranking.variations.iter().enumerate() {
            println!(
                "{}. {} - {:.1}/100 ({} initial violation(s), {} pass(es))",
                rank + 1,
                variation.name,
                variation.total_score(),
                variation.initial_violations,
                variation.outcome.iterations
            );
            if let Some(description) = &variation.description {
                println!("   {}", description);
            }
        }
    }
    for rejected in &ranking.rejected {
        eprintln!("Rejected '{}': {}", rejected.name, rejected.reason);
    }

    if ranking.variations.is_empty() {
        std::process::exit(EXIT_EXHAUSTED);
    }
}
