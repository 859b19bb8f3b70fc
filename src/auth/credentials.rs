use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::ngsild::settings::DataSourceSettings;

/// Token returned by the client credentials grant.
#[derive(Debug, Clone)]
pub struct ClientCredentialsToken {
    pub access_token: String,
    /// Unix timestamp (seconds) after which the token is no longer valid.
    pub expires_at: u64,
}

/// Raw token endpoint payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

pub(crate) fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::Clock)?
        .as_secs())
}

/// Request an access token with the `client_credentials` grant.
pub async fn fetch_client_credentials_token_with_expiry(
    client: &Client,
    settings: &DataSourceSettings,
) -> Result<ClientCredentialsToken> {
    let token_url = settings.token_url();

    let mut params = HashMap::new();
    params.insert("client_id", settings.client_id.as_str());
    params.insert("client_secret", settings.client_secret.as_str());
    params.insert("grant_type", "client_credentials");

    log::debug!("Requesting token from {}", token_url);

    let resp = client.post(&token_url).form(&params).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            service: "authorization server",
            status,
            body,
        });
    }

    let json: TokenResponse = serde_json::from_slice(&resp.bytes().await?)?;

    let access_token = json
        .access_token
        .filter(|token| !token.trim().is_empty())
        .ok_or(Error::MissingField("access_token"))?;
    let expires_in = json.expires_in.ok_or(Error::MissingField("expires_in"))?;

    Ok(ClientCredentialsToken {
        access_token,
        expires_at: now_secs()?.saturating_add(expires_in),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_PATH: &str = "/token";

    fn settings(server: &MockServer) -> DataSourceSettings {
        DataSourceSettings {
            auth_server_url: server.uri(),
            resource: TOKEN_PATH.to_string(),
            client_id: "grafana".to_string(),
            client_secret: "s3cret".to_string(),
            ..Default::default()
        }
    }

    async fn token_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn expiry_is_relative_to_now() {
        let server = token_server(json!({"access_token": "abc", "expires_in": 300})).await;
        let before = now_secs().unwrap();

        let token = fetch_client_credentials_token_with_expiry(&Client::new(), &settings(&server))
            .await
            .unwrap();

        assert_eq!(token.access_token, "abc");
        assert!(token.expires_at >= before + 300);
    }

    #[tokio::test]
    async fn huge_expiry_saturates() {
        let server = token_server(json!({"access_token": "abc", "expires_in": u64::MAX})).await;

        let token = fetch_client_credentials_token_with_expiry(&Client::new(), &settings(&server))
            .await
            .unwrap();

        assert_eq!(token.expires_at, u64::MAX);
    }

    #[tokio::test]
    async fn blank_token_is_rejected() {
        let server = token_server(json!({"access_token": " ", "expires_in": 300})).await;

        let err = fetch_client_credentials_token_with_expiry(&Client::new(), &settings(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingField("access_token")));
    }
}
