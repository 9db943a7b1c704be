//! Server-side HTTP fetching for eager live-element initialization.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use htl::live::Fetch;

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<HttpFetcher> {
        Ok(HttpFetcher {
            client: reqwest::blocking::Client::builder()
                // A slow upstream must not stall page rendering for long.
                .timeout(Duration::from_secs(5))
                .build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} gave {status}");
        }
        Ok(response.text()?)
    }
}
