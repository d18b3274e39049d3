pub mod kinematics;
pub mod stats;
pub mod units;

pub use kinematics::{projected_angle, safe_direction, space_angle};
pub use stats::RunningStats;
