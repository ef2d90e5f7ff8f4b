//! Poly file downloads.

use std::time::Duration;

use anyhow::{Context, Result};

/// Something that turns a URL into bytes.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP(S) client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// `None` keeps reqwest's default timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("polycat/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("building HTTP client")?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("requesting {}", url))?
            .error_for_status()
            .with_context(|| format!("fetching {}", url))?;

        let bytes = response
            .bytes()
            .with_context(|| format!("reading body of {}", url))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_url_is_an_error() {
        let fetcher = HttpFetcher::new(Some(Duration::from_secs(1))).unwrap();
        let err = fetcher.fetch("not a url").unwrap_err();
        assert!(format!("{:#}", err).contains("requesting not a url"));
    }
}
