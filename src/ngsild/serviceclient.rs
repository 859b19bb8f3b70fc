use bytes::Bytes;
use reqwest::{Client, RequestBuilder};

use crate::LogLevel;
use crate::error::{Error, Result};

const ENTITIES_PATH: &str = "/ngsi-ld/v1/entities";
const JSON_LD_CONTEXT_REL: &str = "http://www.w3.org/ns/json-ld#context";

/// HTTP client for the NGSI-LD context broker.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    token: String,
    log_level: LogLevel,
}

impl RegistryClient {
    /// Create a new client for the given broker URL and access token.
    pub fn new(base_url: &str, token: &str, log_level: LogLevel) -> Self {
        Self::with_client(Client::new(), base_url, token, log_level)
    }

    /// Same as [`RegistryClient::new`] but reusing an existing HTTP client.
    pub fn with_client(client: Client, base_url: &str, token: &str, log_level: LogLevel) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            log_level,
        }
    }

    pub(crate) fn entity_url(&self, entity_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            ENTITIES_PATH,
            urlencoding::encode(entity_id)
        )
    }

    pub(crate) fn entities_by_type_url(
        &self,
        entity_type: &str,
        value_filter_query: &str,
    ) -> String {
        let mut url = format!(
            "{}{}?type={}",
            self.base_url,
            ENTITIES_PATH,
            urlencoding::encode(entity_type)
        );
        if !value_filter_query.is_empty() {
            url.push_str("&q=");
            url.push_str(&urlencoding::encode(value_filter_query));
        }
        url
    }

    /// Retrieve one entity; the body is a single JSON object.
    pub async fn get_entity_by_id(&self, entity_id: &str, context: &str) -> Result<Bytes> {
        let url = self.entity_url(entity_id);
        self.send(&url, context).await
    }

    /// Retrieve every entity of a type, optionally filtered by an NGSI-LD `q`
    /// expression; the body is a JSON array.
    pub async fn get_entities_by_type(
        &self,
        entity_type: &str,
        value_filter_query: &str,
        context: &str,
    ) -> Result<Bytes> {
        let url = self.entities_by_type_url(entity_type, value_filter_query);
        self.send(&url, context).await
    }

    fn request(&self, url: &str, context: &str) -> RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/ld+json");

        if !context.is_empty() {
            request = request.header(
                "Link",
                format!(
                    "<{}>; rel=\"{}\"; type=\"application/ld+json\"",
                    context, JSON_LD_CONTEXT_REL
                ),
            );
        }
        request
    }

    async fn send(&self, url: &str, context: &str) -> Result<Bytes> {
        if matches!(self.log_level, LogLevel::Debug) {
            log::debug!("Url: {:?}", url);
        }

        let resp = self.request(url, context).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                service: "context broker",
                status,
                body,
            });
        }

        let body = resp.bytes().await?;
        if matches!(self.log_level, LogLevel::Debug) {
            log::debug!("Received {} bytes from {}", body.len(), url);
        }
        Ok(body)
    }
}
