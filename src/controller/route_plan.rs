use crate::network::{LightpathID, PlannedSegment};

/// How one segment of the chosen route is served.
#[derive(Debug, Clone)]
pub enum SegmentPlan {
    /// Existing lightpath with enough spare capacity
    Reuse(LightpathID),
    /// New lightpath, spectrum found by first fit at evaluation time
    Create(PlannedSegment),
}

/// Result of evaluating one candidate route for a demand. Nothing is committed yet.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    /// Position of the route among the demand's candidates
    pub route_index: usize,
    pub segments: Vec<SegmentPlan>,
    /// Cost of the transponders that would be installed
    pub cost: f64,
}

impl RoutePlan {
    pub fn planned_segments(&self) -> Vec<&PlannedSegment> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                SegmentPlan::Create(planned) => Some(planned),
                SegmentPlan::Reuse(_) => None,
            })
            .collect()
    }
}
