//! Repair planning and execution.

pub mod actions;
pub mod executor;
pub mod planner;

pub use actions::{RepairAction, RepairActionType};
pub use executor::RepairExecutor;
pub use planner::{action_for_rule, RepairPlanner};
