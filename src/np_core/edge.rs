use std::fmt::Display;

use super::{Node, SD};

/// Represents a directed fiber link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// The node the fiber leaves from.
    pub src: Node,
    /// The node the fiber arrives at.
    pub dst: Node,
}

impl Display for Edge {
    /// Formats the edge for display.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.src, self.dst)
    }
}

impl Edge {
    /// Creates a new directed edge between nodes with the given indices.
    ///
    /// # Arguments
    ///
    /// * `src` - The index of the first node.
    /// * `dst` - The index of the second node.
    ///
    /// # Returns
    ///
    /// A new `Edge` instance representing the fiber from `src` to `dst`.
    pub fn new(src: usize, dst: usize) -> Self {
        Self {
            src: Node::new(src),
            dst: Node::new(dst),
        }
    }

    /// The same fiber span in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }

    pub fn sd(&self) -> SD {
        SD::new_from_nodes(self.src, self.dst)
    }
}
