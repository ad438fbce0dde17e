use std::fmt::Display;

use super::{Edge, Node, Region, SD};

/// A contiguous run of links out of a candidate route served by one transponder type.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub edges: Vec<Edge>,
    pub lengths_km: Vec<f64>,
    pub region: Region,
}

impl Segment {
    pub fn new(edges: Vec<Edge>, lengths_km: Vec<f64>, region: Region) -> Self {
        debug_assert_eq!(edges.len(), lengths_km.len());
        Self {
            edges,
            lengths_km,
            region,
        }
    }

    pub fn length_km(&self) -> f64 {
        self.lengths_km.iter().sum()
    }

    pub fn start(&self) -> Node {
        self.edges[0].src
    }

    pub fn end(&self) -> Node {
        self.edges[self.edges.len() - 1].dst
    }

    /// Endpoints of the segment, i.e. the IP link key it would be served by.
    pub fn sd(&self) -> SD {
        SD::new_from_nodes(self.start(), self.end())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Cuts the segment before every link flagged in `boundaries`.
    /// `boundaries[0]` is ignored; a segment always starts with its first link.
    pub fn split_at(&self, boundaries: &[bool]) -> Vec<Segment> {
        let mut output = vec![];
        let mut edges = vec![];
        let mut lengths = vec![];

        for (index, (edge, length)) in self.edges.iter().zip(self.lengths_km.iter()).enumerate() {
            if index > 0 && boundaries[index] {
                output.push(Segment::new(
                    std::mem::take(&mut edges),
                    std::mem::take(&mut lengths),
                    self.region,
                ));
            }
            edges.push(*edge);
            lengths.push(*length);
        }
        output.push(Segment::new(edges, lengths, self.region));

        output
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start())?;
        for edge in &self.edges {
            write!(f, " => {}", edge.dst)?;
        }
        write!(f, " [{} {:.0}km]", self.region, self.length_km())
    }
}
