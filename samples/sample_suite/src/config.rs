use std::fs;
use std::path::PathBuf;

use ngsild_datasource::ngsild::settings::DataSourceSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Secrets {
    pub auth_server_url: String,
    pub resource: String,
    pub client_id: String,
    pub client_secret: String,
    pub context_broker_url: String,
    pub sample_entity_id: String,
    pub sample_entity_type: String,
    #[serde(default)]
    pub sample_context: String,
    #[serde(default)]
    pub sample_map_metric: String,
    #[serde(default)]
    pub sample_metadata_selector: String,
}

impl Secrets {
    pub fn settings(&self) -> DataSourceSettings {
        DataSourceSettings {
            auth_server_url: self.auth_server_url.clone(),
            resource: self.resource.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            context_broker_url: self.context_broker_url.clone(),
        }
    }
}

pub fn load_secrets() -> Result<Secrets, String> {
    let mut path = std::env::current_dir().map_err(|e| e.to_string())?;
    path.push("secrets.json");
    read_secrets(&path)
}

fn read_secrets(path: &PathBuf) -> Result<Secrets, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read secrets.json: {e}"))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid secrets.json: {e}"))
}
