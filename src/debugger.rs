use console::style;

use crate::{
    config::Config,
    demand::Demand,
    network::{IPLinkPool, Lightpath, Network},
    transponder::TransponderCatalog,
};

pub fn log_alert(msg: &str) {
    log::warn!("{:>8}| {}", style("ALERT").red(), style(msg).bold());
}

pub fn log_demand_assign(config: &Config, demand: &Demand, pool: &IPLinkPool) {
    if config.debug.log_demand_assign {
        // node_routeの取得
        let mut node_route: Vec<usize> = vec![demand.sd.src.index()];
        for lightpath in demand.ip_path.iter().filter_map(|id| pool.get(*id)) {
            node_route.extend(lightpath.segment.edges.iter().map(|e| e.dst.index()));
        }

        log::info!(
            "{:>8}|{:5} {} {:?} {:?}",
            style("ASSIGN").green(),
            demand.index,
            demand.qos,
            demand.ip_path.iter().map(|id| id.index()).collect::<Vec<_>>(),
            node_route
        );
    }
}

pub fn log_lightpath_create(config: &Config, lightpath: &Lightpath, catalog: &TransponderCatalog) {
    if config.debug.log_lightpath_create {
        log::info!(
            "{:>8}| {} {} | {} | {} | slot {}+{}",
            style("CREATE").yellow(),
            lightpath.id,
            lightpath.segment,
            catalog.get(lightpath.transponder).name,
            lightpath.modulation,
            lightpath.slot_head,
            lightpath.slot_width
        );
    }
}

pub fn log_demand_drop(config: &Config, demand: &Demand, dropped: usize, best_effort_total: usize) {
    if config.debug.log_demand_drop {
        log::info!(
            "{:>8}|{:5} {} ({}/{})",
            style("DROP").red(),
            demand.index,
            demand.sd,
            dropped,
            best_effort_total
        );
    }
}

pub fn log_state_matrix(config: &Config, network: &Network) {
    if config.debug.log_state_matrix {
        for (fiber_count, fiber) in network.fibers().enumerate() {
            log::info!(
                "{fiber_count:3} | {} | {} {:2}/{:2}",
                fiber.edge,
                fiber.state_matrix,
                fiber.count_used_slots(),
                fiber.total_slots()
            );
        }
    }
}
