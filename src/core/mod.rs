mod components;
mod engine;
mod solver;
mod types;

pub use components::{ComponentInput, ComponentState, InvalidComponentError, normalize};
pub use engine::simulate_plan;
pub use solver::recommend;
pub use types::{Assumptions, HorizonRun, Recommendation, YearRow};
