//! NCI CACTUS chemical identifier resolver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::NameStrategy;
use crate::error::Result;
use crate::utils::http::fetch_text_with_timeout;

const NOT_FOUND_MARKER: &str = "Not Found";

/// Resolves IUPAC names through CACTUS.
pub struct CactusStrategy {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl CactusStrategy {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn iupac_url(&self, smiles: &str) -> String {
        format!(
            "{}/chemical/structure/{}/iupac_name",
            self.base_url,
            urlencoding::encode(smiles)
        )
    }
}

#[async_trait]
impl NameStrategy for CactusStrategy {
    fn name(&self) -> &'static str {
        "cactus"
    }

    fn cache_tag(&self) -> Option<&'static str> {
        Some("cactus")
    }

    async fn attempt(&self, structure: &str) -> Result<Option<String>> {
        let body = fetch_text_with_timeout(&self.client, &self.iupac_url(structure), self.timeout)
            .await?;
        let text = body.trim();
        if text.is_empty() || text.contains(NOT_FOUND_MARKER) {
            return Ok(None);
        }
        Ok(Some(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;

    fn strategy(server: &Server) -> CactusStrategy {
        CactusStrategy::new(Client::new(), server.url(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_plain_text_name() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/chemical/structure/CC%23N/iupac_name")
            .with_status(200)
            .with_body("ACETONITRILE\n")
            .create_async()
            .await;

        let name = strategy(&server).attempt("CC#N").await.unwrap();
        assert_eq!(name.as_deref(), Some("ACETONITRILE"));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/chemical/structure/XX/iupac_name")
            .with_status(200)
            .with_body("<h1>Page Not Found (404)</h1>")
            .create_async()
            .await;

        assert_eq!(strategy(&server).attempt("XX").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/chemical/structure/C/iupac_name")
            .with_status(500)
            .create_async()
            .await;

        assert!(strategy(&server).attempt("C").await.is_err());
    }
}
