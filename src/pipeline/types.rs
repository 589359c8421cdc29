use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::docker::{ContainerAction, PortMapping};

/// Everything the loader needs to fill one collection.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub collection: String,
    pub data_path: PathBuf,
    /// Column whose values are embedded; all columns go into the payload.
    pub text_column: String,
}

impl LoadRequest {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            collection: cfg.collection.clone(),
            data_path: cfg.data_path.clone(),
            text_column: cfg.text_column.clone(),
        }
    }
}

/// Result of `load_if_absent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The collection exists and already holds records; nothing was written.
    AlreadyPresent,
    Loaded { created: bool, records: usize },
    /// The load was attempted and failed; the run carries on degraded.
    Failed { reason: String },
}

/// Input to the whole bootstrap run.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub image: String,
    pub ports: PortMapping,
    pub load: LoadRequest,
    pub startup_wait_secs: u64,
}

impl PipelineInput {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            image: cfg.image.clone(),
            ports: PortMapping::new(cfg.local_port, cfg.remote_port),
            load: LoadRequest::from_config(cfg),
            startup_wait_secs: cfg.startup_wait_secs,
        }
    }
}

/// Identifies which stage of the run is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Runtime,
    Container,
    Service,
    Load,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Runtime => "runtime",
            Stage::Container => "container",
            Stage::Service => "service",
            Stage::Load => "load",
        }
    }
}

/// Container stage result as recorded in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContainerStatus {
    Ready(ContainerAction),
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub runtime_running: bool,
    pub container: Option<ContainerStatus>,
    pub service_ready: Option<bool>,
    pub load: Option<LoadOutcome>,
}

impl RunReport {
    /// Whether every attempted stage succeeded.
    pub fn succeeded(&self) -> bool {
        self.runtime_running
            && !matches!(self.container, Some(ContainerStatus::Failed { .. }))
            && !matches!(self.load, Some(LoadOutcome::Failed { .. }) | None)
    }
}

/// Events emitted by the orchestrator as it works, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    StageFinished {
        stage: Stage,
        success: bool,
        detail: String,
    },
    Completed(RunReport),
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_from_config() {
        let cfg = Config {
            local_port: 7333,
            collection: "novels".into(),
            ..Config::default()
        };
        let input = PipelineInput::from_config(&cfg);
        assert_eq!(input.ports, PortMapping::new(7333, 6333));
        assert_eq!(input.load.collection, "novels");
        assert_eq!(input.load.text_column, "combined_column");
    }

    #[test]
    fn stage_labels_match_report_names() {
        for stage in [Stage::Runtime, Stage::Container, Stage::Service, Stage::Load] {
            assert_eq!(
                serde_json::to_value(stage).unwrap(),
                serde_json::Value::String(stage.as_str().into())
            );
        }
    }

    #[test]
    fn report_success_requires_a_load_outcome() {
        let mut report = RunReport {
            runtime_running: true,
            ..RunReport::default()
        };
        assert!(!report.succeeded());
        report.load = Some(LoadOutcome::AlreadyPresent);
        assert!(report.succeeded());
        report.container = Some(ContainerStatus::Failed {
            error: "pull denied".into(),
        });
        assert!(!report.succeeded());
    }

    #[test]
    fn load_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(LoadOutcome::Loaded {
            created: true,
            records: 3,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "loaded", "created": true, "records": 3})
        );
    }
}
