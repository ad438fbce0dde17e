use std::fmt::Display;

use super::Node;

/// Represents an ordered node pair (demand endpoints or IP link endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SD {
    /// The source node of the pair.
    pub src: Node,
    /// The destination node of the pair.
    pub dst: Node,
}

impl Display for SD {
    /// Formats the node pair for display.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.src, self.dst)
    }
}

impl SD {
    /// Creates a new ordered pair between nodes with the given indices.
    ///
    /// # Arguments
    ///
    /// * `src` - The index of the source node.
    /// * `dst` - The index of the destination node.
    ///
    /// # Returns
    ///
    /// A new `SD` instance.
    pub fn new(src: usize, dst: usize) -> Self {
        Self {
            src: Node::new(src),
            dst: Node::new(dst),
        }
    }

    pub fn new_from_nodes(src: Node, dst: Node) -> Self {
        Self { src, dst }
    }
}

impl From<SD> for (Node, Node) {
    fn from(val: SD) -> Self {
        (val.src, val.dst)
    }
}
impl From<&SD> for (Node, Node) {
    fn from(val: &SD) -> Self {
        (val.src, val.dst)
    }
}
