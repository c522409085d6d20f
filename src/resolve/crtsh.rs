// src/resolve/crtsh.rs
// =============================================================================
// Certificate-transparency source backed by crt.sh.
//
// crt.sh answers `?q=%.example.com&output=json` with a JSON array of
// certificate records. Each record has a `name_value` field that can hold
// several names separated by newlines.
//
// Under load the service sometimes streams the objects back-to-back without
// the surrounding array (`{...}{...}`). We repair that by splitting on `}{`
// and wrapping the whole thing in brackets before giving up.
// =============================================================================

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeSet;

use super::{Hostname, HostnameFilter, SubdomainSource};
use crate::error::ResolveError;

const SOURCE_NAME: &str = "crtsh";

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: String,
}

pub struct CrtShSource {
    client: reqwest::Client,
    endpoint: String,
    include_expired: bool,
}

impl CrtShSource {
    pub fn new(client: reqwest::Client, endpoint: &str, include_expired: bool) -> Self {
        CrtShSource {
            client,
            endpoint: endpoint.to_string(),
            include_expired,
        }
    }

    // Builds the query parameters for one root domain
    fn query(&self, root_domain: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", format!("%.{}", root_domain)),
            ("output", "json".to_string()),
        ];
        if self.include_expired {
            query.push(("expired", "yes".to_string()));
        }
        query
    }
}

#[async_trait]
impl SubdomainSource for CrtShSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn enumerate(
        &self,
        filter: &HostnameFilter,
        root_domain: &str,
    ) -> Result<Vec<Hostname>, ResolveError> {
        let request_failed = |message: String| ResolveError::Request {
            source_name: SOURCE_NAME.to_string(),
            message,
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(root_domain))
            .send()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(request_failed(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        parse_response(&body, filter).map_err(|source| ResolveError::Malformed {
            source_name: SOURCE_NAME.to_string(),
            source,
        })
    }
}

// Parses a crt.sh body, repairing concatenated objects if needed
fn parse_response(body: &str, filter: &HostnameFilter) -> Result<Vec<Hostname>, serde_json::Error> {
    let entries: Vec<CrtShEntry> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("crt.sh body is not a JSON array ({}), repairing", e);
            serde_json::from_str(&repair_concatenated(body))?
        }
    };

    let names: BTreeSet<Hostname> = entries
        .iter()
        .flat_map(|entry| entry.name_value.lines())
        .filter_map(|name| filter.accept(name))
        .collect();

    Ok(names.into_iter().collect())
}

fn repair_concatenated(body: &str) -> String {
    format!("[{}]", body.trim().replace("}{", "},{"))
}
