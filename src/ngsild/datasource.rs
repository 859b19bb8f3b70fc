use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;

use crate::LogLevel;
use crate::auth::token::TokenCache;
use crate::error::Result;
use crate::ngsild::query::{DataQuery, DataResponse, QueryDataResponse, QueryModel};
use crate::ngsild::serviceclient::RegistryClient;
use crate::ngsild::settings::DataSourceSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub message: String,
}

/// One configured NGSI-LD data source.
///
/// Every batch of queries shares one access token; each query is then
/// fetched and projected on its own.
#[derive(Debug)]
pub struct DataSource {
    settings: DataSourceSettings,
    http: Client,
    tokens: TokenCache,
    log_level: LogLevel,
}

impl DataSource {
    pub fn new(settings: DataSourceSettings) -> Self {
        Self {
            settings,
            http: Client::new(),
            tokens: TokenCache::new(),
            log_level: LogLevel::default(),
        }
    }

    /// Build a data source from the plain settings blob and the client secret.
    pub fn from_json(json_data: &[u8], client_secret: &str) -> Result<Self> {
        Ok(Self::new(DataSourceSettings::from_json(json_data, client_secret)?))
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn settings(&self) -> &DataSourceSettings {
        &self.settings
    }

    /// Run a batch of queries. Every query gets a response under its ref id.
    pub async fn query_data(&self, queries: &[DataQuery]) -> QueryDataResponse {
        let registry = match self.tokens.access_token(&self.http, &self.settings).await {
            Ok(token) => Some(RegistryClient::with_client(
                self.http.clone(),
                &self.settings.context_broker_url,
                &token,
                self.log_level,
            )),
            Err(e) => {
                log::error!("Unable to obtain an access token: {}", e);
                None
            }
        };

        let mut response = QueryDataResponse::default();
        for query in queries {
            let result = self.query(registry.as_ref(), query).await;
            response.responses.insert(query.ref_id.clone(), result);
        }
        response
    }

    async fn query(&self, registry: Option<&RegistryClient>, query: &DataQuery) -> DataResponse {
        let model = match query.model() {
            Ok(model) => model,
            Err(e) => {
                log::warn!("Query {} is malformed: {}", query.ref_id, e);
                return DataResponse::with_error(e);
            }
        };

        let body = match registry {
            Some(registry) => fetch(registry, &model).await,
            None => Bytes::new(),
        };

        DataResponse::with_frame(model.project(&body))
    }

    /// Report whether a token can be obtained with the configured credentials.
    pub async fn check_health(&self) -> HealthCheckResult {
        self.tokens.clear().await;
        match self.tokens.access_token(&self.http, &self.settings).await {
            Ok(_) => HealthCheckResult {
                status: HealthStatus::Ok,
                message: "Data source is working".to_string(),
            },
            Err(e) => HealthCheckResult {
                status: HealthStatus::Error,
                message: e.to_string(),
            },
        }
    }
}

/// Fetch the payload a query asks for. Failures are logged and yield an
/// empty body, which projects into an empty frame.
async fn fetch(registry: &RegistryClient, model: &QueryModel) -> Bytes {
    let result = if model.is_by_id() {
        registry
            .get_entity_by_id(&model.entity_id, &model.context)
            .await
    } else {
        registry
            .get_entities_by_type(&model.entity_type, &model.value_filter_query, &model.context)
            .await
    };

    result.unwrap_or_else(|e| {
        log::error!("Fetching {} failed: {}", model.frame_name(), e);
        Bytes::new()
    })
}
