use fxhash::FxHashMap;

use crate::{
    np_core::{parameters::TRANSPONDERS_PER_LIGHTPATH, Region, Segment},
    transponder::{Transponder, TransponderID},
    Edge, Node,
};

/// Cost and equipment counters accumulated while lightpaths are created.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    /// Transponders installed at each node, per type
    pub per_node: FxHashMap<Node, FxHashMap<TransponderID, usize>>,
    /// Lightpaths crossing each fiber, per transponder type
    pub per_link: FxHashMap<Edge, FxHashMap<TransponderID, usize>>,
    /// Transponders deployed for segments of each region
    pub per_region: FxHashMap<Region, usize>,
    /// Back-to-back transponder pairs acting as regenerators
    pub regenerator_sites: FxHashMap<Node, usize>,
    pub total_cost: f64,
    pub lightpath_count: usize,
}

impl UsageLedger {
    pub fn record_lightpath(
        &mut self,
        segment: &Segment,
        transponder_id: TransponderID,
        transponder: &Transponder,
        regenerated: bool,
    ) {
        for node in [segment.start(), segment.end()] {
            *self.per_node.entry(node).or_default().entry(transponder_id).or_insert(0) += 1;
        }
        for edge in &segment.edges {
            *self.per_link.entry(*edge).or_default().entry(transponder_id).or_insert(0) += 1;
        }
        *self.per_region.entry(segment.region).or_insert(0) += TRANSPONDERS_PER_LIGHTPATH as usize;
        if regenerated {
            *self.regenerator_sites.entry(segment.start()).or_insert(0) += 1;
        }

        self.total_cost += transponder.cost * TRANSPONDERS_PER_LIGHTPATH;
        self.lightpath_count += 1;
    }

    pub fn regenerator_count(&self) -> usize {
        self.regenerator_sites.values().sum()
    }
}
