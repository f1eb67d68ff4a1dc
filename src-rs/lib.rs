pub mod config;
pub mod error;
pub mod helpers;
pub mod orchestrator;
pub mod result;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "task/lib.rs"]
pub mod task;
#[path = "lyrics/lib.rs"]
pub mod lyrics;
#[path = "analysis/lib.rs"]
pub mod analysis;
#[path = "image/lib.rs"]
pub mod image;
#[path = "api/lib.rs"]
pub mod api;

pub use config::AppConfig;
pub use orchestrator::{Orchestrator, Pipeline};
pub use result::{AnalysisRecord, ImageRecord, SongRecord, SongSummary};
pub use task::{ShutdownMode, Task, TaskId, TaskSnapshot, TaskStatus};
