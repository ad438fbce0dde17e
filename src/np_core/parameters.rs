pub const THREADS: usize = 16;

// For progress bars
pub const PB_TEMPLATES: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta_precise}) \t{msg}";
pub const PB_CHARS: &str = "#9876543210>-";

/// Light in fiber travels at about 200 km per millisecond (5 us/km).
pub const PROPAGATION_SPEED_KM_PER_MS: f64 = 200.0;

pub const DEFAULT_SLOTS_PER_FIBER: usize = 4950;
pub const DEFAULT_K: usize = 5;
pub const DEFAULT_DROP_RATIO_LIMIT: f64 = 0.01;
pub const DEFAULT_TRAFFIC_PER_DEMAND_GBPS: f64 = 100.0;

/// Transponders are deployed in pairs, one at each end of a lightpath.
pub const TRANSPONDERS_PER_LIGHTPATH: f64 = 2.0;
