use crate::np_core::Segment;

/// Places regeneration points on `segment` for a signal reaching `reach_km`.
///
/// Walks the links accumulating length; when the next link would push the
/// accumulated length past the reach, that link is flagged (the signal is
/// regenerated at its upstream node) and the accumulator restarts with the
/// link's own length. The first link is never flagged.
///
/// Returns `None` when a single link is already longer than the reach.
pub fn compute_regenerator_positions(segment: &Segment, reach_km: f64) -> Option<Vec<bool>> {
    let mut positions = vec![false; segment.len()];
    let mut accumulated_km = 0.0;

    for (index, &length_km) in segment.lengths_km.iter().enumerate() {
        if length_km > reach_km {
            return None;
        }

        if accumulated_km + length_km > reach_km {
            positions[index] = true;
            accumulated_km = length_km;
        } else {
            accumulated_km += length_km;
        }
    }

    Some(positions)
}

pub fn count_regenerators(positions: &[bool]) -> usize {
    positions.iter().filter(|p| **p).count()
}

#[cfg(test)]
mod tests {
    use crate::{np_core::Region, Edge};

    use super::*;

    fn chain(lengths: &[f64]) -> Segment {
        let edges = (0..lengths.len()).map(|i| Edge::new(i, i + 1)).collect();
        Segment::new(edges, lengths.to_vec(), Region::Core)
    }

    #[test]
    fn regenerators_bound_every_span() {
        let segment = chain(&[400.0, 400.0, 400.0, 300.0]);
        let positions = compute_regenerator_positions(&segment, 1000.0).unwrap();

        assert_eq!(positions, vec![false, false, true, false]);
        for part in segment.split_at(&positions) {
            assert!(part.length_km() <= 1000.0);
        }
    }

    #[test]
    fn exact_reach_needs_no_regenerator() {
        let segment = chain(&[500.0, 500.0]);
        assert_eq!(compute_regenerator_positions(&segment, 1000.0), Some(vec![false, false]));
    }

    #[test]
    fn link_longer_than_reach_is_infeasible() {
        let segment = chain(&[200.0, 1200.0]);
        assert_eq!(compute_regenerator_positions(&segment, 1000.0), None);
    }
}
