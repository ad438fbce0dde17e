pub mod dist;
mod edge;
mod node;
mod region;
mod sd;
mod segment;
mod state_matrix;

pub mod parameters;

pub use edge::Edge;
pub use node::Node;
pub use region::Region;
pub use sd::SD;
pub use segment::Segment;
pub use state_matrix::StateMatrix;
