use serde::Serialize;

/// Captured result of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable exit status for error messages.
    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "signal".to_string(),
        }
    }
}

/// What `ensure_container` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ContainerAction {
    /// An existing container for the image was started (or was already up).
    Started { image: String, container_id: String },
    /// The image was pulled and a new container created from it.
    Created { image: String, container_id: String },
}

impl ContainerAction {
    pub fn image(&self) -> &str {
        match self {
            ContainerAction::Started { image, .. } | ContainerAction::Created { image, .. } => image,
        }
    }

    pub fn container_id(&self) -> &str {
        match self {
            ContainerAction::Started { container_id, .. }
            | ContainerAction::Created { container_id, .. } => container_id,
        }
    }
}

/// Host-to-container port binding passed to `run -p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub local: u16,
    pub remote: u16,
}

impl PortMapping {
    pub fn new(local: u16, remote: u16) -> Self {
        Self { local, remote }
    }

    pub fn as_arg(&self) -> String {
        format!("{}:{}", self.local, self.remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_exit() {
        let ok = ProcessOutput {
            exit_code: Some(0),
            ..ProcessOutput::default()
        };
        let failed = ProcessOutput {
            exit_code: Some(125),
            ..ProcessOutput::default()
        };
        let killed = ProcessOutput::default();
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
        assert_eq!(failed.status_label(), "exit status 125");
        assert_eq!(killed.status_label(), "signal");
    }

    #[test]
    fn port_mapping_arg() {
        assert_eq!(PortMapping::new(7333, 6333).as_arg(), "7333:6333");
    }

    #[test]
    fn container_action_accessors() {
        let action = ContainerAction::Created {
            image: "qdrant/qdrant:latest".into(),
            container_id: "abc123".into(),
        };
        assert_eq!(action.image(), "qdrant/qdrant:latest");
        assert_eq!(action.container_id(), "abc123");
    }
}
