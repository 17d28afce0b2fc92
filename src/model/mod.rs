pub mod day;
pub mod plan;
pub mod time_grid;

pub use day::DayNavigator;
pub use plan::{Category, PlanDraft, PlanId, PlanItem, ValidationError};
pub use time_grid::TimeOfDay;
