//! Headless runs over many seeds with aggregate statistics.
//!
//! With the `parallel` feature the seeds are played concurrently on the
//! rayon thread pool; each game still gets its own solver and clock threads.

use crate::observer::QuietObserver;
use crate::run::run_to_completion;
use planetx_core::config::RunConfig;
use planetx_core::generate::{WorldConfig, generate};
use planetx_core::mission::Mission;
use planetx_core::names::NamePool;
use planetx_core::phase::Spaceship;
use serde::Serialize;
use std::sync::Arc;

/// Result of one seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub seed: u64,
    pub score: i64,
    pub search_succeeded: bool,
    pub rescue_succeeded: bool,
    pub failure: Option<String>,
}

impl SeedResult {
    pub fn succeeded(&self) -> bool {
        self.search_succeeded && self.rescue_succeeded && self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub results: Vec<SeedResult>,
    pub runs: usize,
    pub successes: usize,
    pub failures: usize,
    pub mean_score: f64,
    pub min_score: i64,
    pub max_score: i64,
}

impl BenchmarkReport {
    /// Aggregate per-seed results. Scores of failed runs count as zero.
    pub fn from_results(results: Vec<SeedResult>) -> Self {
        let runs = results.len();
        let successes = results.iter().filter(|r| r.succeeded()).count();
        let scores = || results.iter().map(|r| r.score);
        let mean_score = if runs == 0 {
            0.0
        } else {
            scores().sum::<i64>() as f64 / runs as f64
        };
        Self {
            runs,
            successes,
            failures: runs - successes,
            mean_score,
            min_score: scores().min().unwrap_or(0),
            max_score: scores().max().unwrap_or(0),
            results,
        }
    }
}

/// Play one game per seed with a fresh solver from `ships` and report.
///
/// A seed whose world cannot be generated counts as a failed run with the
/// generation error as its reason.
pub fn run_benchmark<F>(
    seeds: &[u64],
    world: &WorldConfig,
    names: &NamePool,
    run: &RunConfig,
    ships: F,
) -> BenchmarkReport
where
    F: Fn() -> Box<dyn Spaceship> + Sync,
{
    let play = |&seed: &u64| play_seed(seed, world, names, run, &ships);

    #[cfg(feature = "parallel")]
    let results: Vec<SeedResult> = {
        use rayon::prelude::*;
        seeds.par_iter().map(play).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results: Vec<SeedResult> = seeds.iter().map(play).collect();

    let report = BenchmarkReport::from_results(results);
    tracing::info!(
        runs = report.runs,
        successes = report.successes,
        mean_score = report.mean_score,
        "benchmark finished"
    );
    report
}

fn play_seed<F>(seed: u64, world: &WorldConfig, names: &NamePool, run: &RunConfig, ships: &F) -> SeedResult
where
    F: Fn() -> Box<dyn Spaceship>,
{
    let failed = |reason: String| SeedResult {
        seed,
        score: 0,
        search_succeeded: false,
        rescue_succeeded: false,
        failure: Some(reason),
    };

    let graph = match generate(world, seed, names) {
        Ok(graph) => graph,
        Err(e) => {
            tracing::warn!(seed, error = %e, "world generation failed");
            return failed(e.to_string());
        }
    };
    let mission = Arc::new(Mission::new(Arc::new(graph), run.rules()));
    match run_to_completion(mission, ships(), Arc::new(QuietObserver), run) {
        Ok(outcome) => {
            tracing::debug!(seed, score = outcome.score, "seed finished");
            SeedResult {
                seed,
                score: outcome.score,
                search_succeeded: outcome.search_succeeded,
                rescue_succeeded: outcome.rescue_succeeded,
                failure: outcome.failure,
            }
        }
        Err(e) => failed(e.to_string()),
    }
}
