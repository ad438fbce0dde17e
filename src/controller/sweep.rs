//! Capacity sweep: the demand count grows step by step until no iteration of a step can be planned.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_derive::Serialize;

use crate::{
    config::Config,
    demand,
    error::{Error, Result},
    topology::Topology,
    transponder::TransponderCatalog,
};

use super::plan;

/// One planning attempt with a freshly synthesized demand set.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub seed: u64,
    pub succeeded: bool,
    pub total_cost: Option<f64>,
    pub lightpath_count: Option<usize>,
    pub regenerator_count: Option<usize>,
    pub drop_ratio: Option<f64>,
    /// Why the run aborted
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepStep {
    pub demand_count: usize,
    pub successes: usize,
    pub iterations: Vec<IterationRecord>,
}

impl SweepStep {
    pub fn all_failed(&self) -> bool {
        self.successes == 0
    }

    /// Mean cost over the successful iterations.
    pub fn average_cost(&self) -> Option<f64> {
        let costs: Vec<f64> = self.iterations.iter().filter_map(|i| i.total_cost).collect();
        if costs.is_empty() {
            None
        } else {
            Some(costs.iter().sum::<f64>() / costs.len() as f64)
        }
    }
}

/// Results of one case, i.e. one transponder mode and one core-originated share.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub transponder_mode: String,
    pub percentage_of_core_originated_traffic: f64,
    pub steps: Vec<SweepStep>,
    /// Demand count of the last step, the one where every iteration failed unless `max_steps` cut the sweep
    pub stopped_at: usize,
}

impl SweepReport {
    /// `single_transponder/C50` style directory of the case.
    pub fn case_dir(&self) -> String {
        format!("{}/C{}", self.transponder_mode, self.percentage_of_core_originated_traffic)
    }
}

/// Case directory of the sweep `config` describes, see [`SweepReport::case_dir`].
pub fn case_dir(config: &Config) -> String {
    format!("{}/C{}", transponder_mode(config), config.traffic.percentage_of_core_originated_traffic)
}

fn transponder_mode(config: &Config) -> &'static str {
    if config.policy.single_transponder_mode_enabled {
        "single_transponder"
    } else {
        "multiple_transponders"
    }
}

fn check_sweep_config(config: &Config) -> Result<()> {
    let sweep = &config.sweep;
    if !config.traffic.demand_filepath.is_empty() {
        return Err(Error::InvalidConfig("a sweep synthesizes its demands, `demand_filepath` must be empty".to_string()));
    }
    if sweep.start_demands == 0 || sweep.increment_demands == 0 {
        return Err(Error::InvalidConfig("`start_demands` and `increment_demands` must be positive".to_string()));
    }
    if sweep.iterations_per_step == 0 {
        return Err(Error::InvalidConfig("`iterations_per_step` must be positive".to_string()));
    }
    Ok(())
}

/// Plans `demand_count` synthesized demands once per iteration, each with its own seed drawn from `rng`.
pub fn run_step(
    config: &Config,
    topology: &Topology,
    catalog: &TransponderCatalog,
    demand_count: usize,
    rng: &mut ChaCha8Rng,
) -> Result<SweepStep> {
    let mut iterations = Vec::with_capacity(config.sweep.iterations_per_step);

    for iteration in 0..config.sweep.iterations_per_step {
        let seed = rng.gen_range(0..i64::MAX as u64);

        let mut iteration_config = config.clone();
        iteration_config.simulation.random_seed = seed;
        iteration_config.traffic.number_of_demands_to_synthesize = demand_count;

        let mut demand_rng = ChaCha8Rng::seed_from_u64(seed);
        let mut demands = demand::get_demand_list(&iteration_config, topology, &mut demand_rng)?;

        let record = match plan(&iteration_config, topology, catalog, &mut demands) {
            Ok(outcome) => IterationRecord {
                iteration,
                seed,
                succeeded: true,
                total_cost: Some(outcome.summary.total_cost),
                lightpath_count: Some(outcome.summary.lightpath_count),
                regenerator_count: Some(outcome.summary.regenerator_count),
                drop_ratio: Some(outcome.summary.drop_ratio),
                failure: None,
            },
            Err(err) if err.is_capacity_exhausted() => IterationRecord {
                iteration,
                seed,
                succeeded: false,
                total_cost: None,
                lightpath_count: None,
                regenerator_count: None,
                drop_ratio: None,
                failure: Some(err.to_string()),
            },
            Err(err) => return Err(err),
        };
        log::info!(
            "{} demands, iteration {} (seed {}): {}",
            demand_count,
            iteration,
            seed,
            if record.succeeded { "ok" } else { "failed" }
        );
        iterations.push(record);
    }

    let successes = iterations.iter().filter(|i| i.succeeded).count();
    let step = SweepStep { demand_count, successes, iterations };
    match step.average_cost() {
        Some(cost) => log::info!("{} demands: {}/{} iterations planned, average cost {}", demand_count, successes, step.iterations.len(), cost),
        None => log::info!("{} demands: every iteration failed", demand_count),
    }

    Ok(step)
}

/// Raises the demand count by `increment_demands` after every step with at least one success.
///
/// `on_step` sees each step as soon as it is done.
pub fn sweep<F>(config: &Config, topology: &Topology, catalog: &TransponderCatalog, mut on_step: F) -> Result<SweepReport>
where
    F: FnMut(&SweepStep) -> Result<()>,
{
    check_sweep_config(config)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.simulation.random_seed);
    let mut steps = vec![];
    let mut demand_count = config.sweep.start_demands;

    loop {
        let step = run_step(config, topology, catalog, demand_count, &mut rng)?;
        on_step(&step)?;

        let all_failed = step.all_failed();
        steps.push(step);
        if all_failed || steps.len() == config.sweep.max_steps {
            break;
        }
        demand_count += config.sweep.increment_demands;
    }

    log::info!("sweep stopped at {} demands", demand_count);
    Ok(SweepReport {
        transponder_mode: transponder_mode(config).to_string(),
        percentage_of_core_originated_traffic: config.traffic.percentage_of_core_originated_traffic,
        steps,
        stopped_at: demand_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // two islands, each with a CORE pair and a METRO pair
    const RING: &str = r#"
        name = "ring"
        [[node]]
        id = 0
        tags = ["CORE", "a"]
        [[node]]
        id = 1
        tags = ["CORE", "a"]
        [[node]]
        id = 2
        tags = ["CORE", "b"]
        [[node]]
        id = 3
        tags = ["CORE", "b"]
        [[node]]
        id = 4
        tags = ["METRO", "a"]
        [[node]]
        id = 5
        tags = ["METRO", "a"]
        [[node]]
        id = 6
        tags = ["METRO", "b"]
        [[node]]
        id = 7
        tags = ["METRO", "b"]

        [[link]]
        src = 0
        dst = 1
        length_km = 100.0
        tags = ["CORE"]
        [[link]]
        src = 1
        dst = 2
        length_km = 300.0
        tags = ["CORE"]
        [[link]]
        src = 2
        dst = 3
        length_km = 100.0
        tags = ["CORE"]
        [[link]]
        src = 3
        dst = 0
        length_km = 300.0
        tags = ["CORE"]
        [[link]]
        src = 4
        dst = 0
        length_km = 20.0
        tags = ["METRO"]
        [[link]]
        src = 5
        dst = 1
        length_km = 20.0
        tags = ["METRO"]
        [[link]]
        src = 4
        dst = 5
        length_km = 20.0
        tags = ["METRO"]
        [[link]]
        src = 6
        dst = 2
        length_km = 20.0
        tags = ["METRO"]
        [[link]]
        src = 7
        dst = 3
        length_km = 20.0
        tags = ["METRO"]
        [[link]]
        src = 6
        dst = 7
        length_km = 20.0
        tags = ["METRO"]
    "#;

    fn sweep_config() -> Config {
        let mut config = Config::default();
        config.network.slots_per_fiber = 150;
        config.policy.drop_ratio_limit = 0.0;
        config.sweep.enabled = true;
        config.sweep.start_demands = 2;
        config.sweep.increment_demands = 4;
        config.sweep.iterations_per_step = 3;
        config.sweep.max_steps = 50;
        config.simulation.random_seed = 7;
        config
    }

    #[test]
    fn sweep_grows_until_a_step_fails_completely() {
        let topology = Topology::from_toml_str(RING).unwrap();
        let catalog = TransponderCatalog::default_catalog();
        let config = sweep_config();

        let mut seen = vec![];
        let report = sweep(&config, &topology, &catalog, |step| {
            seen.push(step.demand_count);
            Ok(())
        })
        .unwrap();

        let last = report.steps.last().unwrap();
        assert!(last.all_failed());
        assert!(report.steps[..report.steps.len() - 1].iter().all(|s| !s.all_failed()));
        assert_eq!(report.stopped_at, last.demand_count);
        assert_eq!(seen, report.steps.iter().map(|s| s.demand_count).collect::<Vec<_>>());
        assert_eq!(seen[0], 2);
        assert!(seen.windows(2).all(|w| w[1] == w[0] + 4));
        assert_eq!(report.case_dir(), "multiple_transponders/C50");
        assert_eq!(case_dir(&config), report.case_dir());

        for step in &report.steps {
            assert_eq!(step.iterations.len(), 3);
            for record in &step.iterations {
                assert_eq!(record.succeeded, record.total_cost.is_some());
                assert_eq!(record.succeeded, record.failure.is_none());
            }
        }
    }

    #[test]
    fn sweep_is_reproducible_from_the_master_seed() {
        let topology = Topology::from_toml_str(RING).unwrap();
        let catalog = TransponderCatalog::default_catalog();
        let mut config = sweep_config();
        config.sweep.max_steps = 2;

        let a = sweep(&config, &topology, &catalog, |_| Ok(())).unwrap();
        let b = sweep(&config, &topology, &catalog, |_| Ok(())).unwrap();

        let seeds = |r: &SweepReport| r.steps.iter().flat_map(|s| s.iterations.iter().map(|i| i.seed)).collect::<Vec<_>>();
        let costs = |r: &SweepReport| r.steps.iter().map(|s| s.average_cost()).collect::<Vec<_>>();
        assert_eq!(seeds(&a), seeds(&b));
        assert_eq!(costs(&a), costs(&b));
        assert!(a.steps.len() <= 2);
    }

    #[test]
    fn sweep_needs_synthesized_demands_and_positive_steps() {
        let topology = Topology::from_toml_str(RING).unwrap();
        let catalog = TransponderCatalog::default_catalog();

        let mut config = sweep_config();
        config.traffic.demand_filepath = "files/demand/metro_core_8.toml".to_string();
        assert!(matches!(sweep(&config, &topology, &catalog, |_| Ok(())), Err(Error::InvalidConfig(_))));

        let mut config = sweep_config();
        config.sweep.increment_demands = 0;
        assert!(matches!(sweep(&config, &topology, &catalog, |_| Ok(())), Err(Error::InvalidConfig(_))));
    }
}
