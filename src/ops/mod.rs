pub mod adjustments;
pub mod filters;
pub mod pipeline;
pub mod transform;
