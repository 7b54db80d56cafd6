use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Finds a verified brand logo for a sender domain.
#[async_trait]
pub trait BrandLogoLookup: Send + Sync {
    async fn logo_for_domain(&self, domain: &str) -> Result<Option<String>>;
}

/// Checks whether an image exists without downloading it.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct BimiResponse {
    #[serde(default, alias = "logoUrl")]
    logo_url: Option<String>,
}

/// Asks the mail backend's `GET /api/bimi/{domain}` endpoint.
#[derive(Debug, Clone)]
pub struct HttpBrandLogoLookup {
    client: reqwest::Client,
    api_base: String,
}

impl HttpBrandLogoLookup {
    pub fn new(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BrandLogoLookup for HttpBrandLogoLookup {
    async fn logo_for_domain(&self, domain: &str) -> Result<Option<String>> {
        if !is_plain_domain(domain) {
            return Ok(None);
        }
        let url = format!("{}/api/bimi/{}", self.api_base, domain);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body = response.json::<BimiResponse>().await?;
        Ok(usable_logo(body.logo_url))
    }
}

#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: reqwest::Client,
}

impl HttpImageProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn exists(&self, url: &str) -> Result<bool> {
        let response = self.client.head(url).send().await?;
        Ok(response.status().is_success())
    }
}

fn is_plain_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn usable_logo(url: Option<String>) -> Option<String> {
    let url = url?.trim().to_string();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        Some(url)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn brand_lookup_reads_logo_url() -> Result<()> {
        let mut server = Server::new_async().await;
        let body = json!({
            "domain": "acme.com",
            "logo_url": "https://acme.com/bimi.svg",
            "verified": true
        });
        let mock = server
            .mock("GET", "/api/bimi/acme.com")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let lookup = HttpBrandLogoLookup::new(reqwest::Client::new(), &server.url());
        let logo = lookup.logo_for_domain("acme.com").await?;
        assert_eq!(logo.as_deref(), Some("https://acme.com/bimi.svg"));
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn brand_lookup_accepts_camel_case_and_rejects_unusable() -> Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/bimi/camel.io")
            .with_status(200)
            .with_body(json!({ "logoUrl": "https://camel.io/logo.svg" }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/api/bimi/nologo.io")
            .with_status(200)
            .with_body(json!({ "domain": "nologo.io", "logo_url": null, "verified": false }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/api/bimi/script.io")
            .with_status(200)
            .with_body(json!({ "logo_url": "javascript:alert(1)" }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/api/bimi/down.io")
            .with_status(503)
            .create_async()
            .await;

        let lookup = HttpBrandLogoLookup::new(reqwest::Client::new(), &server.url());
        assert_eq!(
            lookup.logo_for_domain("camel.io").await?.as_deref(),
            Some("https://camel.io/logo.svg")
        );
        assert_eq!(lookup.logo_for_domain("nologo.io").await?, None);
        assert_eq!(lookup.logo_for_domain("script.io").await?, None);
        assert_eq!(lookup.logo_for_domain("down.io").await?, None);
        assert_eq!(lookup.logo_for_domain("../admin").await?, None);
        assert_eq!(lookup.logo_for_domain("").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn probe_uses_head_and_status() -> Result<()> {
        let mut server = Server::new_async().await;
        let found = server
            .mock("HEAD", "/avatar/found")
            .match_query(Matcher::UrlEncoded("d".into(), "404".into()))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("HEAD", "/avatar/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let probe = HttpImageProbe::new(reqwest::Client::new());
        assert!(probe.exists(&format!("{}/avatar/found?s=80&d=404", server.url())).await?);
        assert!(!probe.exists(&format!("{}/avatar/missing?s=80&d=404", server.url())).await?);
        found.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error_not_a_panic() {
        let probe = HttpImageProbe::new(reqwest::Client::new());
        assert!(probe.exists("http://127.0.0.1:9/avatar/x").await.is_err());
    }
}
