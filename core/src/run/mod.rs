pub mod actions;
pub mod summary;

pub use actions::{ActionInitialization, MasterRun, WorkerActions};
pub use summary::RunSummary;
