pub use crate::config::AppConfig;
pub use crate::orchestrator::Orchestrator;
pub use crate::task::{TaskId, TaskSnapshot, TaskStatus};

pub mod handlers;
pub mod server;

pub use server::{build_router, AppServer};
