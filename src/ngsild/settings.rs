use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-instance data source configuration.
///
/// The plain settings arrive as a JSON blob; the client secret is kept out
/// of it and handed over separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    /// Base URL of the authorization server, e.g. `https://sso.example.com`.
    #[serde(default)]
    pub auth_server_url: String,
    /// Token endpoint path on the authorization server.
    #[serde(default)]
    pub resource: String,
    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret.
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    /// Base URL of the NGSI-LD context broker.
    #[serde(default)]
    pub context_broker_url: String,
}

impl DataSourceSettings {
    /// Decode the plain settings blob and attach the client secret.
    pub fn from_json(json_data: &[u8], client_secret: &str) -> Result<Self> {
        let mut settings: DataSourceSettings = serde_json::from_slice(json_data)?;
        settings.client_secret = client_secret.to_string();
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that cannot produce a working token request.
    pub fn validate(&self) -> Result<()> {
        if self.auth_server_url.trim().is_empty() {
            return Err(Error::InvalidSettings("authServerUrl is empty".to_string()));
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::InvalidSettings("clientId is empty".to_string()));
        }
        if self.context_broker_url.trim().is_empty() {
            return Err(Error::InvalidSettings(
                "contextBrokerUrl is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full token endpoint URL.
    pub fn token_url(&self) -> String {
        let base = self.auth_server_url.trim_end_matches('/');
        let path = self.resource.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_blob_and_attaches_secret() {
        let blob = br#"{
            "authServerUrl": "https://sso.example.com/",
            "resource": "/auth/realms/demo/protocol/openid-connect/token",
            "clientId": "grafana",
            "contextBrokerUrl": "https://broker.example.com"
        }"#;

        let settings = DataSourceSettings::from_json(blob, "s3cret").unwrap();

        assert_eq!(settings.client_id, "grafana");
        assert_eq!(settings.client_secret, "s3cret");
        assert_eq!(
            settings.token_url(),
            "https://sso.example.com/auth/realms/demo/protocol/openid-connect/token"
        );
    }

    #[test]
    fn rejects_missing_broker_url() {
        let blob = br#"{"authServerUrl": "https://sso", "clientId": "c"}"#;

        let err = DataSourceSettings::from_json(blob, "").unwrap_err();

        assert!(matches!(err, Error::InvalidSettings(_)));
    }

    #[test]
    fn secret_is_never_serialized() {
        let settings = DataSourceSettings {
            client_secret: "hidden".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&settings).unwrap();

        assert!(!json.contains("hidden"));
    }
}
