use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the JSON-LD context; never an attribute.
pub const CONTEXT_KEY: &str = "@context";

/// NGSI-LD entity as returned by the context broker.
///
/// Attributes are kept as raw JSON; their shape is only known once
/// [`classify`](crate::ngsild::attribute::classify) has looked at them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    /// Attribute map keyed by attribute name.
    pub attributes: Map<String, Value>,
}

impl Entity {
    /// Create a new empty entity.
    pub fn new() -> Self {
        Entity {
            attributes: Map::new(),
        }
    }

    /// Entity id, or an empty string when the payload has none.
    pub fn id(&self) -> &str {
        self.attributes
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Entity type, if present.
    pub fn entity_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }
}

/// Decode a broker payload into an entity collection.
///
/// Accepts a single entity object or an array of them. Anything that cannot
/// be decoded is logged and yields fewer (possibly zero) entities.
pub fn parse_entities(body: &[u8]) -> Vec<Entity> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return vec![];
    }

    let json: Value = match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Unable to decode entity payload: {}", e);
            return vec![];
        }
    };

    match json {
        Value::Object(attributes) => vec![Entity { attributes }],
        Value::Array(records) => records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match record {
                Value::Object(attributes) => Some(Entity { attributes }),
                other => {
                    log::warn!(
                        "Skipping entity #{}: expected an object, found {}",
                        index,
                        json_kind(&other)
                    );
                    None
                }
            })
            .collect(),
        other => {
            log::warn!(
                "Entity payload is neither an object nor an array: {}",
                json_kind(&other)
            );
            vec![]
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
