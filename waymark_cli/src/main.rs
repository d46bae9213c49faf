// CLI entry point for the waymark scenario runner.
//
// Loads a JSON scenario (see `scenario.rs` for the format), applies it to a
// fresh `RouteSession`, and prints every emitted event to stdout as one JSON
// object per line. Logs go to stderr; set `RUST_LOG` to change the level.
//
// Config precedence, lowest first: built-in defaults, the scenario's own
// `config` block, `--config <PATH>`, then the individual flags.
//
// Usage:
//   waymark [OPTIONS] <SCENARIO>
//     --config <PATH>         Router config JSON file
//     --k <N>                 Neighbors per node
//     --background            Build graphs on a worker thread
//     --hidden                Start with plain markers hidden
//     --no-waypoint-nodes     Do not add waypoint positions to the graph input

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;
use waymark_core::RouteSession;
use waymark_core::config::RouterConfig;
use waymark_cli::scenario::{self, Scenario};

#[derive(Default)]
struct Args {
    scenario: Option<PathBuf>,
    config: Option<PathBuf>,
    neighbor_count: Option<usize>,
    background: bool,
    hidden: bool,
    no_waypoint_nodes: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let Some(path) = args.scenario.clone() else {
        eprintln!("Missing scenario path");
        print_usage();
        std::process::exit(1);
    };

    let loaded = match Scenario::load(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut config = loaded.config.clone().unwrap_or_default();
    if let Some(config_path) = &args.config {
        config = match RouterConfig::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };
    }
    if let Some(k) = args.neighbor_count {
        config.neighbor_count = k;
    }
    config.background_build |= args.background;
    config.markers_hidden |= args.hidden;
    if args.no_waypoint_nodes {
        config.include_waypoints_in_graph = false;
    }

    let mut session = match RouteSession::with_config(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Invalid config: {e}");
            std::process::exit(1);
        }
    };

    info!(
        scenario = %path.display(),
        commands = loaded.commands.len(),
        "replaying scenario"
    );
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match scenario::run(&mut session, &loaded.commands, &mut out) {
        Ok(events) => info!(events, phase = ?session.phase(), "scenario finished"),
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse command-line arguments. Plain `std::env::args()` matching.
fn parse_args() -> Args {
    let mut parsed = Args::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                parsed.config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--k" => {
                i += 1;
                parsed.neighbor_count =
                    Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--k requires a valid number");
                        std::process::exit(1);
                    }));
            }
            "--background" => parsed.background = true,
            "--hidden" => parsed.hidden = true,
            "--no-waypoint-nodes" => parsed.no_waypoint_nodes = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            path => {
                if parsed.scenario.is_some() {
                    eprintln!("Only one scenario path may be given");
                    std::process::exit(1);
                }
                parsed.scenario = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    parsed
}

fn print_usage() {
    println!("Usage: waymark [OPTIONS] <SCENARIO>");
    println!();
    println!("Options:");
    println!("  --config <PATH>         Router config JSON file");
    println!("  --k <N>                 Neighbors per node (default: 5)");
    println!("  --background            Build graphs on a worker thread");
    println!("  --hidden                Start with plain markers hidden");
    println!("  --no-waypoint-nodes     Do not add waypoint positions to the graph input");
    println!("  --help, -h              Show this help");
}
