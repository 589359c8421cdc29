use std::time::Duration;

use tracing::{info, warn};

use crate::docker::{ContainerEngine, ProcessRunner};
use crate::embed::Embedder;
use crate::error::Result;
use crate::store::{VectorStore, wait_for_service};

use super::loader::load_if_absent;
use super::types::{
    ContainerStatus, LoadOutcome, PipelineEvent, PipelineInput, RunReport, Stage,
};

const SERVICE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Run the whole bootstrap: runtime check, container, service, data load.
///
/// Each stage gates the next. Progress is reported through `on_event`; the
/// final event is always either `Completed` or `Aborted`. Only fatal errors
/// and failing readiness checks are returned as `Err`; a missing runtime is
/// reported and ends the run with `runtime_running == false`.
pub fn run_pipeline<R, F>(
    input: &PipelineInput,
    engine: &ContainerEngine<R>,
    store: &dyn VectorStore,
    make_embedder: F,
    on_event: &mut dyn FnMut(PipelineEvent),
) -> Result<RunReport>
where
    R: ProcessRunner,
    F: FnOnce() -> Result<Box<dyn Embedder>>,
{
    let mut report = RunReport::default();
    let engine_name = engine.runner().program().to_string();

    // ── Runtime ───────────────────────────────────────────────────────
    on_event(PipelineEvent::StageStarted(Stage::Runtime));
    report.runtime_running = engine.is_runtime_running();
    if !report.runtime_running {
        let reason = format!("{engine_name} is not running. Please start {engine_name} and try again.");
        warn!("{reason}");
        on_event(PipelineEvent::StageFinished {
            stage: Stage::Runtime,
            success: false,
            detail: reason.clone(),
        });
        on_event(PipelineEvent::Aborted(reason));
        return Ok(report);
    }
    on_event(PipelineEvent::StageFinished {
        stage: Stage::Runtime,
        success: true,
        detail: format!("{engine_name} is running."),
    });

    // ── Container ─────────────────────────────────────────────────────
    on_event(PipelineEvent::StageStarted(Stage::Container));
    match engine.ensure_container(&input.image, input.ports) {
        Ok(action) => {
            on_event(PipelineEvent::StageFinished {
                stage: Stage::Container,
                success: true,
                detail: format!(
                    "Container '{}' ({}) is running on port {}.",
                    action.image(),
                    short_id(action.container_id()),
                    input.ports.local
                ),
            });
            report.container = Some(ContainerStatus::Ready(action));
        }
        Err(e) if e.is_fatal() => {
            on_event(PipelineEvent::Aborted(e.to_string()));
            return Err(e);
        }
        Err(e) => {
            // Recoverable: the service may still be reachable from an
            // earlier run, so carry on and let the load stage find out.
            warn!(error = %e, image = %input.image, "container step failed");
            on_event(PipelineEvent::StageFinished {
                stage: Stage::Container,
                success: false,
                detail: e.to_string(),
            });
            report.container = Some(ContainerStatus::Failed {
                error: e.to_string(),
            });
        }
    }

    // ── Service ───────────────────────────────────────────────────────
    on_event(PipelineEvent::StageStarted(Stage::Service));
    let ready = wait_for_service(
        store,
        Duration::from_secs(input.startup_wait_secs),
        SERVICE_POLL_INTERVAL,
    );
    report.service_ready = Some(ready);
    on_event(PipelineEvent::StageFinished {
        stage: Stage::Service,
        success: ready,
        detail: if ready {
            "Vector store is reachable.".to_string()
        } else {
            format!(
                "Vector store did not answer within {}s.",
                input.startup_wait_secs
            )
        },
    });

    // ── Load ──────────────────────────────────────────────────────────
    on_event(PipelineEvent::StageStarted(Stage::Load));
    let collection = &input.load.collection;
    let outcome = match load_if_absent(store, &input.load, make_embedder) {
        Ok(outcome) => outcome,
        Err(e) => {
            on_event(PipelineEvent::Aborted(e.to_string()));
            return Err(e);
        }
    };
    let (success, detail) = match &outcome {
        LoadOutcome::AlreadyPresent => (
            true,
            format!("Collection '{collection}' exists and has content."),
        ),
        LoadOutcome::Loaded { records, .. } => (
            true,
            format!("Data was inserted into '{collection}' ({records} records)."),
        ),
        LoadOutcome::Failed { reason } => (
            false,
            format!("An error occurred while inserting data into '{collection}': {reason}"),
        ),
    };
    on_event(PipelineEvent::StageFinished {
        stage: Stage::Load,
        success,
        detail,
    });
    report.load = Some(outcome);

    info!(succeeded = report.succeeded(), "pipeline finished");
    on_event(PipelineEvent::Completed(report.clone()));
    Ok(report)
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
