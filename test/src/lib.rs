
pub use helpers::*;
pub use test_components::{Door, WireNodes, DOOR, WIRE};
