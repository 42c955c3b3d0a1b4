use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use visgraph_layout::{LayoutConfig, LayoutEngine, Snapshot, StopCondition, source_for_path};

/// View height of the spatial preset when no `--config` is given.
const SPATIAL_VIEW_HEIGHT: f64 = 500.0;

#[derive(Debug, Default, PartialEq)]
struct Args {
    spatial: bool,
    steps: Option<usize>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    pretty: bool,
    hide_edges: bool,
    colored: bool,
    input: Option<PathBuf>,
}

fn usage() -> &'static str {
    "usage:\n  \
  visgraph [--3d] [--steps <n>] [--config <file.json>] [--seed <n>] [--colored] [--hide-edges] [--pretty] <topology.{json,kdl}>\n\
\n\
notes:\n\
  - without --steps the layout runs until the temperature drops to the convergence threshold.\n\
  - the final snapshot is printed as JSON to stdout; logs go to stderr (RUST_LOG, default info).\n"
}

/// `Ok(None)` means help was requested.
fn parse_args(argv: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Ok(None),
            "--3d" => args.spatial = true,
            "--pretty" => args.pretty = true,
            "--hide-edges" => args.hide_edges = true,
            "--colored" => args.colored = true,
            "--steps" => {
                let Some(n) = it.next() else {
                    bail!("--steps needs a value");
                };
                args.steps = Some(n.parse().with_context(|| format!("invalid --steps {n:?}"))?);
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    bail!("--seed needs a value");
                };
                args.seed = Some(
                    seed.parse()
                        .with_context(|| format!("invalid --seed {seed:?}"))?,
                );
            }
            "--config" => {
                let Some(path) = it.next() else {
                    bail!("--config needs a file");
                };
                args.config = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => bail!("unknown flag {other}"),
            path => {
                if args.input.is_some() {
                    bail!("only one topology file may be given");
                }
                args.input = Some(PathBuf::from(path));
            }
        }
    }

    if args.input.is_none() {
        bail!("missing topology file");
    }
    Ok(Some(args))
}

fn load_config(args: &Args) -> anyhow::Result<LayoutConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None if args.spatial => LayoutConfig::spatial(SPATIAL_VIEW_HEIGHT),
        None => LayoutConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn layout<const D: usize>(
    config: LayoutConfig,
    args: &Args,
    input: &Path,
) -> anyhow::Result<Snapshot> {
    let source = source_for_path(input);
    let mut engine = LayoutEngine::<D>::new(config, source.as_ref())
        .with_context(|| format!("failed to load {}", input.display()))?;
    if args.hide_edges {
        engine.set_all_edges_hidden(true);
    }
    if args.colored {
        engine.set_colored(true);
    }

    let until = match args.steps {
        Some(n) => StopCondition::Steps(n),
        None => StopCondition::UntilConverged,
    };
    let steps = engine.run(until);
    info!(
        steps,
        temperature = engine.temperature(),
        state = ?engine.state(),
        "layout finished"
    );
    Ok(engine.snapshot())
}

fn write_json(value: &impl Serialize, pretty: bool) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    println!();
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let Some(input) = args.input.as_deref() else {
        bail!("missing topology file");
    };
    let config = load_config(&args)?;
    debug!(?config, "layout config");

    let snapshot = if args.spatial {
        layout::<3>(config, &args, input)?
    } else {
        layout::<2>(config, &args, input)?
    };
    write_json(&snapshot, args.pretty)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            eprint!("{}", usage());
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err:#}\n\n{}", usage());
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
