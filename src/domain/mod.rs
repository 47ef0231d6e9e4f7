pub mod features;
pub mod model;
pub mod prediction;

pub use features::*;
pub use model::*;
pub use prediction::*;
