use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::engine::ContainerEngine;
use super::runner::ProcessRunner;
use super::types::{ContainerAction, PortMapping, ProcessOutput};

const IMAGE_FORMAT: &str = "{{.Repository}}:{{.Tag}}";
const ID_FORMAT: &str = "{{.ID}}";

impl<R: ProcessRunner> ContainerEngine<R> {
    /// Run a subcommand and return its stdout, treating a non-zero exit as
    /// [`Error::CommandFailed`].
    fn exec(&self, args: &[&str]) -> Result<String> {
        let output = self.runner.run(args)?;
        check(self.runner.program(), args, output)
    }

    /// First locally cached image whose `repository:tag` starts with `name`.
    ///
    /// `Ok(None)` is the normal "not present" answer.
    pub fn find_local_image(&self, name: &str) -> Result<Option<String>> {
        let listing = self.exec(&["images", "--format", IMAGE_FORMAT])?;
        let found = listing
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && line.starts_with(name))
            .map(str::to_string);
        debug!(name, ?found, "local image lookup");
        Ok(found)
    }

    /// Pull `name` and re-resolve it to its canonical tagged reference.
    pub fn pull_image(&self, name: &str) -> Result<Option<String>> {
        let output = self.runner.run(&["pull", name]).map_err(|e| Error::PullFailed {
            image: name.to_string(),
            reason: e.to_string(),
        })?;
        if !output.success() {
            return Err(Error::PullFailed {
                image: name.to_string(),
                reason: format!("{}: {}", output.status_label(), output.stderr.trim()),
            });
        }
        info!(image = name, "image pulled");
        self.find_local_image(name)
    }

    /// Start the most recent container created from `reference`.
    pub fn start_existing_container(&self, reference: &str) -> Result<String> {
        let filter = format!("ancestor={reference}");
        let listing = self.exec(&["ps", "-a", "--filter", &filter, "--format", ID_FORMAT])?;
        // `ps` lists newest first.
        let container_id = listing
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| Error::NoContainer(reference.to_string()))?
            .to_string();

        self.exec(&["start", &container_id])?;
        info!(container_id = %container_id, image = reference, "container started");
        Ok(container_id)
    }

    /// Create and start a detached container bound to `ports`.
    pub fn create_container(&self, reference: &str, ports: PortMapping) -> Result<String> {
        let mapping = ports.as_arg();
        let stdout = self.exec(&["run", "-d", "-p", &mapping, reference])?;
        let container_id = stdout.trim().to_string();
        info!(container_id = %container_id, image = reference, ports = %mapping, "container created");
        Ok(container_id)
    }

    /// Make sure a container for `name` is running.
    ///
    /// A locally present image re-uses its existing container; otherwise the
    /// image is pulled and exactly one new container is created. Never
    /// creates a container when the image was already present.
    pub fn ensure_container(&self, name: &str, ports: PortMapping) -> Result<ContainerAction> {
        if let Some(image) = self.find_local_image(name)? {
            info!(image = %image, "found local image, starting its container");
            let container_id = self.start_existing_container(&image)?;
            return Ok(ContainerAction::Started {
                image,
                container_id,
            });
        }

        info!(image = name, "image not found locally, pulling");
        let image = match self.pull_image(name)? {
            Some(image) => image,
            None => {
                warn!(image = name, "pull succeeded but image is not listed");
                return Err(Error::PullFailed {
                    image: name.to_string(),
                    reason: "image not listed after pull".into(),
                });
            }
        };

        let container_id = self.create_container(&image, ports)?;
        Ok(ContainerAction::Created {
            image,
            container_id,
        })
    }
}

fn check(program: &str, args: &[&str], output: ProcessOutput) -> Result<String> {
    if output.success() {
        return Ok(output.stdout);
    }
    Err(Error::CommandFailed {
        command: format!("{program} {}", args.join(" ")),
        status: output.status_label(),
        stderr: output.stderr.trim().to_string(),
    })
}
