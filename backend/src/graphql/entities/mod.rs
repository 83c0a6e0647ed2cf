// Base entities (no relations to other entities)
pub mod color;

// Entities with relations
pub mod fruit;

pub use color::*;
pub use fruit::*;
