//! IP-over-WDM planner
//!
//! 設定ファイルに従い、一回分のネットワーク設計、または需要数を増やす反復実験を行う

use std::{env, process};

use rsma_planner::{
    config::Config,
    controller::{self, output},
    debugger::log_alert,
    np_core::parameters::THREADS,
    Error,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Thread checking
    let num_threads = num_cpus::get();
    if num_threads < THREADS {
        log_alert(&format!("THREADS: {} is larger than num_cpus: {}.", THREADS, num_threads));
    }

    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() == 2 { args[1].as_str() } else { "./config.toml" };

    let mut config = match Config::new(config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{config_path}: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = output::init_master_dir(&mut config) {
        log::error!("{err}");
        process::exit(1);
    }

    if config.sweep.enabled {
        match controller::sweep_main(&config) {
            Ok(report) => println!("Execution stopped at {} demands", report.stopped_at),
            Err(err) => fail(&config, err),
        }
        return;
    }

    match controller::main(&config) {
        Ok(report) => {
            println!("Total cost: {}. Num lps: {}", report.total_cost, report.lightpath_count);
        }
        Err(err) => fail(&config, err),
    }
}

fn fail(config: &Config, err: Error) -> ! {
    log::error!("{err}");
    if let Err(save_err) = output::save_failure(&config.simulation.outdir, &err) {
        log::error!("{save_err}");
    }
    process::exit(1);
}
