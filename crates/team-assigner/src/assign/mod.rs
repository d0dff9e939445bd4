pub mod category;
pub mod reconcile;
pub mod round_robin;

pub use category::{bucketize, category_plan, Category, Criterion, PreferenceSlot};
pub use reconcile::{protect, reconcile_pair, reconcile_pairs, PairOutcome};
pub use round_robin::{assign_bucket, assign_teams, AssignmentReport, TeamCursor};
