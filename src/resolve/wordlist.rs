// src/resolve/wordlist.rs
// =============================================================================
// Static wordlist source: one label per line, each combined with the root
// domain. Blank lines and `#` comments are skipped.
// =============================================================================

use async_trait::async_trait;
use std::path::PathBuf;

use super::{Hostname, HostnameFilter, SubdomainSource};
use crate::error::ResolveError;

const SOURCE_NAME: &str = "wordlist";

pub struct WordlistSource {
    path: PathBuf,
}

impl WordlistSource {
    pub fn new(path: PathBuf) -> Self {
        WordlistSource { path }
    }
}

#[async_trait]
impl SubdomainSource for WordlistSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn enumerate(
        &self,
        filter: &HostnameFilter,
        root_domain: &str,
    ) -> Result<Vec<Hostname>, ResolveError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ResolveError::Io {
                source_name: SOURCE_NAME.to_string(),
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|label| !label.is_empty() && !label.starts_with('#'))
            .filter_map(|label| filter.accept(&format!("{}.{}", label, root_domain)))
            .collect())
    }
}
