//! SimWorld - the driver that launches one task per rank.

use crate::config::{ConfigError, SimConfig};
use crate::error::SimError;
use crate::network::{SimNetwork, SimNetworkController};
use crate::render::render_ascii;
use crate::report::{GenerationReport, RunSummary};
use crate::seeding;

use std::sync::Arc;
use tidepool_core::{CoreError, Dimensions, Grid, KeyedDraw, Population, RankProcess};
use tidepool_env::{Communicator, LocalFabric, RunContext};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Stream of the run seed reserved for the initial ocean.
const OCEAN_STREAM: u64 = 1;

/// What every rank needs to know besides its transport.
#[derive(Debug, Clone)]
struct RankPlan {
    dims: Dimensions,
    generations: u64,
    threads: usize,
    report_interval: u64,
    display: bool,
    draw: KeyedDraw,
}

/// What the coordinator hands back when its loop ends.
struct CoordinatorOutcome {
    reports: Vec<GenerationReport>,
    final_population: Population,
}

/// The SimWorld - container for one run.
pub struct SimWorld<Ctx: RunContext> {
    /// Configuration
    pub config: SimConfig,

    /// Shared run context (clock and seed)
    pub context: Arc<Ctx>,

    /// Network controller for fault injection
    pub network_controller: Arc<SimNetworkController>,
}

impl<Ctx: RunContext> SimWorld<Ctx> {
    /// Creates a new SimWorld, rejecting invalid configurations.
    pub fn new(config: SimConfig, context: Arc<Ctx>) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            context,
            network_controller: Arc::new(SimNetworkController::new()),
        })
    }

    /// Seeds the full ocean from the run seed.
    pub fn seed_ocean(&self) -> Result<Grid, SimError> {
        let mut rng = self.context.derive_rng(OCEAN_STREAM);
        Ok(seeding::seed_ocean(self.config.dims(), self.config.mix, &mut rng)?)
    }

    /// Mortality source for this run, keyed off the run seed.
    pub fn mortality(&self) -> KeyedDraw {
        // Separate subsystem seed so mortality and seeding never share a keystream
        KeyedDraw::new(self.context.seed().wrapping_mul(0x9e3779b97f4a7c15))
    }

    /// Seeds the ocean and runs every generation.
    pub async fn run(&self) -> Result<RunSummary, SimError> {
        let ocean = self.seed_ocean()?;
        self.run_from(ocean).await
    }

    /// Runs every generation from a given initial ocean.
    pub async fn run_from(&self, ocean: Grid) -> Result<RunSummary, SimError> {
        let expected = self.config.dims();
        let actual = Dimensions::new(ocean.height(), ocean.width());
        if expected != actual {
            return Err(ConfigError::OceanMismatch { expected, actual }.into());
        }

        let plan = RankPlan {
            dims: expected,
            generations: self.config.generations,
            threads: self.config.threads,
            report_interval: self.config.report_interval,
            display: self.config.display,
            draw: self.mortality(),
        };

        info!(
            width = expected.width,
            height = expected.height,
            procs = self.config.procs,
            threads = self.config.threads,
            generations = self.config.generations,
            seed = self.context.seed(),
            "starting run"
        );

        let started = self.context.now();
        let mut ocean = Some(ocean);
        let mut ranks = JoinSet::new();
        for comm in LocalFabric::new(self.config.procs, self.config.channel_capacity) {
            let comm = SimNetwork::new(comm, self.network_controller.clone());
            let initial = if comm.rank().is_coordinator() { ocean.take() } else { None };
            ranks.spawn(rank_main(comm, plan.clone(), initial));
        }

        let mut outcome = None;
        let mut failure: Option<SimError> = None;
        while let Some(joined) = ranks.join_next().await {
            let error = match joined {
                Ok(Ok(Some(done))) => {
                    outcome = Some(done);
                    continue;
                }
                Ok(Ok(None)) => continue,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => SimError::Aborted(e.to_string()),
                Ok(Err(e)) => SimError::Core(e),
            };

            if failure.is_none() {
                warn!(error = %error, "rank failed, tearing down the run");
                ranks.abort_all();
            }
            // Peers of a failed rank see its links close; keep the first real cause
            let replace = match &failure {
                None => true,
                Some(current) => current.is_knock_on() && !error.is_knock_on(),
            };
            if replace {
                failure = Some(error);
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let outcome = outcome.ok_or_else(|| SimError::Aborted("coordinator returned no totals".into()))?;
        let elapsed = self.context.now().saturating_sub(started);

        info!(
            prey = outcome.final_population.prey,
            predators = outcome.final_population.predators,
            elapsed_secs = elapsed.as_secs_f64(),
            "run complete"
        );

        Ok(RunSummary {
            width: expected.width,
            height: expected.height,
            generations: self.config.generations,
            procs: self.config.procs,
            threads: self.config.threads,
            report_interval: self.config.report_interval,
            seed: self.context.seed(),
            elapsed_secs: elapsed.as_secs_f64(),
            messages_sent: self.network_controller.messages_sent(),
            reports: outcome.reports,
            final_population: outcome.final_population,
        })
    }
}

/// One rank's whole life: bootstrap, generation loop, periodic reports.
///
/// Every rank takes part in every reduction and gather so the collective
/// calls line up; only the coordinator keeps the results.
async fn rank_main<C: Communicator>(
    comm: C,
    plan: RankPlan,
    initial: Option<Grid>,
) -> Result<Option<CoordinatorOutcome>, CoreError> {
    let mut rank =
        RankProcess::bootstrap(comm, plan.dims, plan.threads, plan.draw, initial.as_ref()).await?;
    drop(initial);

    let mut reports = Vec::new();
    for _ in 0..plan.generations {
        rank.advance().await?;

        let generation = rank.generation();
        if generation % plan.report_interval != 0 {
            continue;
        }

        let total = rank.population().await?;
        let frame = if plan.display {
            rank.snapshot().await?.map(|ocean| render_ascii(&ocean))
        } else {
            None
        };

        if let Some(total) = total {
            info!(generation, prey = total.prey, predators = total.predators, "report");
            reports.push(GenerationReport {
                frame,
                ..GenerationReport::new(generation, total)
            });
        }
    }

    let final_population = rank.population().await?;
    debug!(
        rank = %rank.rank(),
        columns = ?rank.partition().columns,
        generation = rank.generation(),
        "rank finished"
    );

    Ok(final_population.map(|final_population| CoordinatorOutcome {
        reports,
        final_population,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_env::SystemContext;

    fn small_config() -> SimConfig {
        SimConfig {
            width: 24,
            height: 10,
            generations: 12,
            procs: 3,
            threads: 2,
            report_interval: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_sim_world_rejects_invalid_config() {
        let config = SimConfig {
            procs: 0,
            ..small_config()
        };
        let err = SimWorld::new(config, SystemContext::shared(1)).err();
        assert!(matches!(err, Some(SimError::Config(ConfigError::ZeroProcesses))));
    }

    #[test]
    fn test_seed_ocean_determinism() {
        let world1 = SimWorld::new(small_config(), SystemContext::shared(42)).unwrap();
        let world2 = SimWorld::new(small_config(), SystemContext::shared(42)).unwrap();
        let world3 = SimWorld::new(small_config(), SystemContext::shared(43)).unwrap();

        assert_eq!(world1.seed_ocean().unwrap(), world2.seed_ocean().unwrap());
        assert_ne!(world1.seed_ocean().unwrap(), world3.seed_ocean().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reports_follow_interval() {
        let world = SimWorld::new(small_config(), SystemContext::shared(7)).unwrap();
        let summary = world.run().await.unwrap();

        let generations: Vec<u64> = summary.reports.iter().map(|r| r.generation).collect();
        assert_eq!(generations, vec![4, 8, 12]);
        assert_eq!(summary.reports.last().unwrap().population(), summary.final_population);
        assert!(summary.reports.iter().all(|r| r.frame.is_none()));
        assert!(summary.messages_sent > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_display_attaches_frames() {
        let config = SimConfig {
            display: true,
            ..small_config()
        };
        let world = SimWorld::new(config, SystemContext::shared(7)).unwrap();
        let summary = world.run().await.unwrap();

        for report in &summary.reports {
            let frame = report.frame.as_ref().unwrap();
            assert_eq!(frame.lines().count(), 10);
            assert!(frame.lines().all(|line| line.len() == 24));
            assert_eq!(frame.matches('f').count() as u64, report.prey);
            assert_eq!(frame.matches('s').count() as u64, report.predators);
        }
    }

    #[tokio::test]
    async fn test_mismatched_ocean_rejected() {
        let world = SimWorld::new(small_config(), SystemContext::shared(7)).unwrap();
        let err = world.run_from(Grid::new(3, 3)).await.unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::OceanMismatch { .. })));
    }
}
