// src/resolve/tool.rs
// =============================================================================
// External enumeration tool source.
//
// Runs something like `amass enum -d example.com` and reads one hostname per
// line from its stdout. Anything the tool prints on stderr is diagnostic: we
// log it and keep going.
// =============================================================================

use async_trait::async_trait;
use log::warn;
use tokio::process::Command;

use super::{Hostname, HostnameFilter, SubdomainSource};
use crate::error::ResolveError;

const SOURCE_NAME: &str = "tool";

pub struct ExternalToolSource {
    program: String,
    args: Vec<String>,
}

impl ExternalToolSource {
    // `{domain}` inside any argument is replaced with the root domain
    pub fn new(program: &str, args: Vec<String>) -> Self {
        ExternalToolSource {
            program: program.to_string(),
            args,
        }
    }

    fn args_for(&self, root_domain: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{domain}", root_domain))
            .collect()
    }
}

#[async_trait]
impl SubdomainSource for ExternalToolSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn enumerate(
        &self,
        filter: &HostnameFilter,
        root_domain: &str,
    ) -> Result<Vec<Hostname>, ResolveError> {
        let output = Command::new(&self.program)
            .args(self.args_for(root_domain))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ResolveError::Spawn {
                source_name: SOURCE_NAME.to_string(),
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!("{} exited with {}", self.program, output.status);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("{} stderr: {}", self.program, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter_map(|line| filter.accept(line)).collect())
    }
}
