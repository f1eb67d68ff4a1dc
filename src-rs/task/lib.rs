pub mod executor;
pub mod retention;
pub mod store;
pub mod types;

pub use executor::{PipelineExecutor, ShutdownMode};
pub use retention::{spawn_sweeper, sweep_once, RetentionPolicy, SweepReport};
pub use store::{InMemoryTaskStore, TaskMutation, TaskStore};
pub use types::{Task, TaskId, TaskSnapshot, TaskStatus};
