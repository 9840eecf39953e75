pub mod execute;
pub mod execution_plan;
pub mod watchdog;

pub use self::{
    execute::{ExecError, Executor, Outcome},
    execution_plan::{CommandStage, ExecutionPlan, Pipeline, PlanError},
    watchdog::Watchdog,
};
