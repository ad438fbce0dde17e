use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Local;
use fxhash::FxHashMap;
use serde_derive::Serialize;
use uuid::Uuid;

use crate::{
    config::Config,
    demand::Demand,
    error::Result,
    network::{Lightpath, Network},
    topology::Topology,
    transponder::{TransponderCatalog, TransponderID},
    utils::{generate_id, generate_uuid, output_file_from_2dvec},
};

use super::{sweep::{self, SweepReport, SweepStep}, PlanOutcome};

/// Gives the run its own directory `outdir/<topology>/<id>` and points `outdir` at it.
pub fn init_master_dir(config: &mut Config) -> Result<()> {
    // ディレクトリ名の決定
    let topology_name = Path::new(&config.network.topology)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("topology")
        .to_string();
    let master_dir = format!("./{}/{}/{}", config.simulation.outdir, topology_name, generate_id());

    // ディレクトリの作成
    fs::create_dir_all(&master_dir)?;
    config.simulation.outdir = master_dir;

    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct LightpathRecord {
    pub id: usize,
    pub src: usize,
    pub dst: usize,
    pub node_route: Vec<usize>,
    pub length_km: f64,
    pub region: String,
    pub transponder: String,
    pub modulation: String,
    pub data_rate: f64,
    pub slot_head: usize,
    pub slot_width: usize,
    pub spare_capacity: f64,
    pub demands: Vec<usize>,
    pub regenerated: bool,
}

impl LightpathRecord {
    fn new(lightpath: &Lightpath, catalog: &TransponderCatalog) -> Self {
        let segment = &lightpath.segment;
        let mut node_route = vec![segment.start().index()];
        node_route.extend(segment.edges.iter().map(|e| e.dst.index()));

        Self {
            id: lightpath.id.index(),
            src: lightpath.sd.src.index(),
            dst: lightpath.sd.dst.index(),
            node_route,
            length_km: segment.length_km(),
            region: segment.region.to_string(),
            transponder: catalog.get(lightpath.transponder).name.clone(),
            modulation: lightpath.modulation.format.clone(),
            data_rate: lightpath.modulation.data_rate,
            slot_head: lightpath.slot_head,
            slot_width: lightpath.slot_width,
            spare_capacity: lightpath.spare_capacity,
            demands: lightpath.demand_indices.clone(),
            regenerated: lightpath.regenerated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemandRecord {
    pub index: usize,
    pub src: usize,
    pub dst: usize,
    pub traffic_gbps: f64,
    pub qos: String,
    pub status: String,
    pub ip_path: Vec<usize>,
}

/// Everything written to `report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub created_at: String,
    pub topology: String,
    pub total_cost: f64,
    pub lightpath_count: usize,
    pub demand_count: usize,
    pub served_count: usize,
    pub dropped_count: usize,
    pub best_effort_count: usize,
    pub drop_ratio: f64,
    pub regenerator_count: usize,
    pub transponders_per_node: BTreeMap<usize, BTreeMap<String, usize>>,
    pub transponders_per_link: BTreeMap<String, BTreeMap<String, usize>>,
    pub transponders_per_region: BTreeMap<String, usize>,
    pub regenerator_sites: BTreeMap<usize, usize>,
    pub lightpaths: Vec<LightpathRecord>,
    pub demands: Vec<DemandRecord>,
}

impl PlanReport {
    pub fn new(topology: &Topology, catalog: &TransponderCatalog, outcome: &PlanOutcome, demands: &[Demand]) -> Self {
        let usage = &outcome.pool.usage;
        let by_name = |types: &FxHashMap<TransponderID, usize>| -> BTreeMap<String, usize> {
            types.iter().map(|(id, count)| (catalog.get(*id).name.clone(), *count)).collect()
        };

        let mut demand_records: Vec<DemandRecord> = demands
            .iter()
            .map(|d| DemandRecord {
                index: d.index,
                src: d.sd.src.index(),
                dst: d.sd.dst.index(),
                traffic_gbps: d.traffic_gbps,
                qos: d.qos.to_string(),
                status: d.status.to_string(),
                ip_path: d.ip_path.iter().map(|id| id.index()).collect(),
            })
            .collect();
        demand_records.sort_by_key(|d| d.index);

        let summary = &outcome.summary;
        Self {
            run_id: generate_uuid(),
            created_at: Local::now().to_rfc3339(),
            topology: topology.name.clone(),
            total_cost: summary.total_cost,
            lightpath_count: summary.lightpath_count,
            demand_count: summary.demand_count,
            served_count: summary.served_count,
            dropped_count: summary.dropped_count,
            best_effort_count: summary.best_effort_count,
            drop_ratio: summary.drop_ratio,
            regenerator_count: summary.regenerator_count,
            transponders_per_node: usage.per_node.iter().map(|(node, types)| (node.index(), by_name(types))).collect(),
            transponders_per_link: usage.per_link.iter().map(|(edge, types)| (format!("{}-{}", edge.src.index(), edge.dst.index()), by_name(types))).collect(),
            transponders_per_region: usage.per_region.iter().map(|(region, count)| (region.to_string(), *count)).collect(),
            regenerator_sites: usage.regenerator_sites.iter().map(|(node, count)| (node.index(), *count)).collect(),
            lightpaths: outcome.pool.lightpaths().iter().map(|lp| LightpathRecord::new(lp, catalog)).collect(),
            demands: demand_records,
        }
    }
}

/// Writes `report.json`, the effective configuration and the slot occupancy into `outdir`.
pub fn save_report(config: &Config, report: &PlanReport, network: &Network) -> Result<()> {
    let output_dir = &config.simulation.outdir;
    fs::create_dir_all(output_dir)?;

    fs::write(format!("{output_dir}/report.json"), serde_json::to_string_pretty(report)?)?;
    save_config(config, output_dir)?;
    output_file_from_2dvec(&format!("{output_dir}/occupancy.txt"), &network.occupancy_rows())?;

    log::info!("report saved to {}", output_dir);
    Ok(())
}

pub fn save_config(config: &Config, output_dir: &str) -> Result<()> {
    let toml_data = toml::Value::try_from(config)?;
    fs::write(format!("{output_dir}/config.toml"), toml::to_string_pretty(&toml_data)?)?;
    Ok(())
}

/// Records why the run aborted.
pub fn save_failure(output_dir: &str, error: &crate::error::Error) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    fs::write(format!("{output_dir}/failure.txt"), format!("{error}\n"))?;
    Ok(())
}

/// Writes `demands<N>/summary.json` for one sweep step.
pub fn save_sweep_step(config: &Config, step: &SweepStep) -> Result<()> {
    let step_dir = format!("{}/{}/demands{}", config.simulation.outdir, sweep::case_dir(config), step.demand_count);
    fs::create_dir_all(&step_dir)?;
    fs::write(format!("{step_dir}/summary.json"), serde_json::to_string_pretty(step)?)?;
    Ok(())
}

/// Writes `sweep.json` and the configuration next to the step directories.
pub fn save_sweep_report(config: &Config, report: &SweepReport) -> Result<()> {
    let case_dir = format!("{}/{}", config.simulation.outdir, report.case_dir());
    fs::create_dir_all(&case_dir)?;
    fs::write(format!("{case_dir}/sweep.json"), serde_json::to_string_pretty(report)?)?;
    save_config(config, &case_dir)?;

    log::info!("sweep saved to {}", case_dir);
    Ok(())
}
