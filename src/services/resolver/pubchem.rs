//! PubChem PUG REST lookups: IUPAC name, then synonyms.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::NameStrategy;
use crate::error::Result;
use crate::utils::http::fetch_text_with_timeout;

static CAS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("valid CAS regex"));

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable", default)]
    table: PropertyTable,
}

#[derive(Debug, Default, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct Property {
    #[serde(rename = "IUPACName")]
    iupac_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SynonymResponse {
    #[serde(rename = "InformationList", default)]
    list: InformationList,
}

#[derive(Debug, Default, Deserialize)]
struct InformationList {
    #[serde(rename = "Information", default)]
    information: Vec<Information>,
}

#[derive(Debug, Deserialize)]
struct Information {
    #[serde(rename = "Synonym", default)]
    synonyms: Vec<String>,
}

/// Resolves names through PubChem.
pub struct PubChemStrategy {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PubChemStrategy {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn compound_url(&self, smiles: &str, suffix: &str) -> String {
        format!(
            "{}/compound/smiles/{}/{}",
            self.base_url,
            urlencoding::encode(smiles),
            suffix
        )
    }

    /// Canonical IUPAC name from the property endpoint.
    async fn iupac_name(&self, smiles: &str) -> Result<Option<String>> {
        let url = self.compound_url(smiles, "property/IUPACName/JSON");
        let body = fetch_text_with_timeout(&self.client, &url, self.timeout).await?;
        let response: PropertyResponse = serde_json::from_str(&body)?;
        Ok(response
            .table
            .properties
            .into_iter()
            .next()
            .and_then(|p| p.iupac_name)
            .filter(|name| !name.is_empty()))
    }

    /// First synonym that is neither a CID label nor a CAS number.
    async fn first_synonym(&self, smiles: &str) -> Result<Option<String>> {
        let url = self.compound_url(smiles, "synonyms/JSON");
        let body = fetch_text_with_timeout(&self.client, &url, self.timeout).await?;
        let response: SynonymResponse = serde_json::from_str(&body)?;
        Ok(response
            .list
            .information
            .into_iter()
            .next()
            .and_then(|info| pick_synonym(info.synonyms)))
    }
}

fn pick_synonym(synonyms: Vec<String>) -> Option<String> {
    synonyms.into_iter().find(|s| {
        !s.is_empty() && !s.to_lowercase().starts_with("cid") && !CAS_NUMBER.is_match(s)
    })
}

#[async_trait]
impl NameStrategy for PubChemStrategy {
    fn name(&self) -> &'static str {
        "pubchem"
    }

    fn cache_tag(&self) -> Option<&'static str> {
        Some("name")
    }

    async fn attempt(&self, structure: &str) -> Result<Option<String>> {
        match self.iupac_name(structure).await {
            Ok(Some(name)) => return Ok(Some(name)),
            Ok(None) => {}
            Err(e) => log::debug!("PubChem property lookup failed for {}: {}", structure, e),
        }
        self.first_synonym(structure).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use serde_json::json;

    use super::*;

    fn strategy(server: &Server) -> PubChemStrategy {
        PubChemStrategy::new(Client::new(), server.url(), Duration::from_secs(5))
    }

    #[test]
    fn test_pick_synonym_skips_ids() {
        let synonyms = vec![
            "".to_string(),
            "CID 702".to_string(),
            "64-17-5".to_string(),
            "ethanol".to_string(),
            "Ethyl alcohol".to_string(),
        ];
        assert_eq!(pick_synonym(synonyms).as_deref(), Some("ethanol"));
        assert_eq!(pick_synonym(vec!["7732-18-5".to_string()]), None);
    }

    #[test]
    fn test_compound_url_escapes_structure() {
        let s = PubChemStrategy::new(
            Client::new(),
            "https://pubchem.example/rest/pug/",
            Duration::from_secs(1),
        );
        assert_eq!(
            s.compound_url("C/C=C\\C#N", "synonyms/JSON"),
            "https://pubchem.example/rest/pug/compound/smiles/C%2FC%3DC%5CC%23N/synonyms/JSON"
        );
    }

    #[tokio::test]
    async fn test_iupac_name_success() {
        let mut server = Server::new_async().await;
        let property = server
            .mock("GET", "/compound/smiles/CCO/property/IUPACName/JSON")
            .with_status(200)
            .with_body(
                json!({"PropertyTable": {"Properties": [{"CID": 702, "IUPACName": "ethanol"}]}})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let synonyms = server
            .mock("GET", "/compound/smiles/CCO/synonyms/JSON")
            .expect(0)
            .create_async()
            .await;

        let name = strategy(&server).attempt("CCO").await.unwrap();
        assert_eq!(name.as_deref(), Some("ethanol"));
        property.assert_async().await;
        synonyms.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_synonyms() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/compound/smiles/O/property/IUPACName/JSON")
            .with_status(404)
            .with_body("{\"Fault\": {}}")
            .create_async()
            .await;
        server
            .mock("GET", "/compound/smiles/O/synonyms/JSON")
            .with_status(200)
            .with_body(
                json!({"InformationList": {"Information": [
                    {"CID": 962, "Synonym": ["7732-18-5", "water", "oxidane"]}
                ]}})
                .to_string(),
            )
            .create_async()
            .await;

        let name = strategy(&server).attempt("O").await.unwrap();
        assert_eq!(name.as_deref(), Some("water"));
    }

    #[tokio::test]
    async fn test_synonym_failure_is_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/compound/smiles/X/property/IUPACName/JSON")
            .with_status(200)
            .with_body(json!({"PropertyTable": {"Properties": []}}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/compound/smiles/X/synonyms/JSON")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        assert!(strategy(&server).attempt("X").await.is_err());
    }
}
