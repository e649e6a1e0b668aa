use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NO_NAME: &str = "No Name";
pub const NOT_AVAILABLE: &str = "N/A";

/// Metadados normalizados de um objeto do CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub creation_time: String,
    pub last_modified_time: String,
}

impl IntegrationItem {
    /// Projeta um objeto de `/crm/v3/objects/*` no formato comum.
    ///
    /// Campos ausentes viram placeholders: nome `"No Name"`, datas `"N/A"`.
    pub fn from_provider_object(object: &Value, item_type: &str) -> Self {
        let id = match object.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            id,
            name: text_or(object.pointer("/properties/name"), NO_NAME),
            item_type: item_type.to_string(),
            creation_time: text_or(object.get("createdAt"), NOT_AVAILABLE),
            last_modified_time: text_or(object.get("updatedAt"), NOT_AVAILABLE),
        }
    }
}

fn text_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
