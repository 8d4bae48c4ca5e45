pub mod icons;
pub mod progress;
pub mod render;

pub use progress::{GENERATION_STEPS, GenerationUI, StepTicker};
pub use render::CatalogLayout;
