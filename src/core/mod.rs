mod engine;
mod solver;
mod types;

pub use engine::{MONTHS_PER_YEAR, derive_metrics, project};
pub use solver::{MAX_MONTHS_TO_GOAL, estimate_time_to_goal, goal_projection};
pub use types::{GoalProjection, Inputs, SummaryMetrics, YearlySnapshot};
