use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::ShelterError;

/// An HTTP client that only talks to approved hosts.
/// Every outbound fetch of the locator goes through it.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client with the default allowlist and the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ShelterError> {
        let domains = [
            "arcgis.com",    // ArcGIS Online feature services (services1.arcgis.com, ...)
            "localhost",
            "127.0.0.1",
        ];
        let allowlist = domains.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("shelterlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ShelterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.trim().to_ascii_lowercase());
    }

    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for host in hosts {
            self.allow_domain(host.as_ref());
        }
        self
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                let host = host.to_ascii_lowercase();
                // Check exact match or if it's a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == *allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// GET request builder for an allowed URL.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, ShelterError> {
        if !self.is_allowed(url) {
            return Err(ShelterError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SandboxClient {
        SandboxClient::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_arcgis_subdomain_allowed() {
        let c = client();
        assert!(c.is_allowed(crate::config::DEFAULT_ARCGIS_URL));
        assert!(c.is_allowed("http://127.0.0.1:8080/query"));
    }

    #[test]
    fn test_unknown_host_rejected() {
        let c = client();
        assert!(!c.is_allowed("https://example.org/shelters.json"));
        assert!(!c.is_allowed("https://notarcgis.com/x"));
        assert!(!c.is_allowed("not a url"));
        assert!(matches!(c.get("https://example.org/"), Err(ShelterError::SecurityError(_))));
    }

    #[test]
    fn test_extra_hosts() {
        let c = client().with_allowed_hosts(["Data.Baltimorecity.gov"]);
        assert!(c.is_allowed("https://data.baltimorecity.gov/resource.json"));
    }
}
