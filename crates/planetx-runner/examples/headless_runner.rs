//! Headless runner: play one game with the reference solver, or benchmark it
//! over several seeds.
//!
//! ```text
//! cargo run -p planetx-runner --example headless_runner -- [SETTINGS] [--seed=SEED] [--benchmark=N]
//! ```
//!
//! `SETTINGS` is a `.ron`, `.toml` or `.json` settings file. Log verbosity
//! follows `RUST_LOG` and defaults to `info`.

use planetx_core::names::NamePool;
use planetx_data::{Settings, bundled_names, load_name_pool, load_settings};
use planetx_runner::benchmark::run_benchmark;
use planetx_runner::observer::LogObserver;
use planetx_runner::reference::ReferenceSpaceship;
use planetx_runner::controller::ships_of;
use planetx_runner::Controller;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Args {
    settings: Option<PathBuf>,
    seed: Option<String>,
    benchmark: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        settings: None,
        seed: None,
        benchmark: None,
    };
    for arg in std::env::args().skip(1) {
        if let Some(seed) = arg.strip_prefix("--seed=") {
            args.seed = Some(seed.to_string());
        } else if let Some(n) = arg.strip_prefix("--benchmark=") {
            let n = n.parse().map_err(|_| format!("invalid run count \"{n}\""))?;
            args.benchmark = Some(n);
        } else if arg.starts_with("--") {
            return Err(format!("invalid argument \"{arg}\""));
        } else if args.settings.replace(PathBuf::from(&arg)).is_some() {
            return Err("only one settings file may be given".to_string());
        }
    }
    Ok(args)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    if let Some(count) = args.benchmark {
        let names: NamePool = match &settings.names {
            Some(path) => load_name_pool(path)?,
            None => bundled_names(),
        };
        let first = settings.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..count).map(|i| first.wrapping_add(i)).collect();
        let report = run_benchmark(&seeds, &settings.world, &names, &settings.run, || {
            Box::new(ReferenceSpaceship::new())
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut controller = Controller::from_settings(
        &settings,
        ships_of::<ReferenceSpaceship>(),
        Arc::new(LogObserver),
    )?;
    if let Some(text) = &args.seed {
        controller.new_game_from_str(text)?;
    }
    tracing::info!(
        seed = controller.seed(),
        nodes = controller.world().node_count(),
        edges = controller.world().edge_count(),
        "starting game"
    );
    controller.start()?;
    if let Some(outcome) = controller.wait() {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}
