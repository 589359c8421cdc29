pub mod loader;
pub mod orchestrator;
pub mod query;
mod types;

pub use loader::{build_points, load_if_absent};
pub use orchestrator::run_pipeline;
pub use query::{hit_text, search};
pub use types::{
    ContainerStatus, LoadOutcome, LoadRequest, PipelineEvent, PipelineInput, RunReport, Stage,
};
