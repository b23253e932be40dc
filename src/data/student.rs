use crate::{
    error::{GatewayResult, MissingFieldsSnafu},
    store::{Document, Fields},
};
use serde::Serialize;
use serde_json::Value;
use snafu::ensure;

/// Fields a new student must carry, in wire spelling.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "rollNo", "degree", "email", "department"];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(rename = "rollNo")]
    pub roll_no: String,
    pub degree: String,
    pub email: String,
    pub department: String,
}

impl From<Document> for Student {
    fn from(Document { id, fields }: Document) -> Self {
        let get = |name: &str| fields.get(name).map(display_field).unwrap_or_default();

        Self {
            name: get("name"),
            roll_no: get("rollNo"),
            degree: get("degree"),
            email: get("email"),
            department: get("department"),
            id,
        }
    }
}

/// The store doesn't enforce a schema, so anything that isn't a string is shown as its JSON text.
fn display_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Every required field must be present as a non-empty string. Extra fields are allowed.
pub fn ensure_required_fields(fields: &Fields) -> GatewayResult<()> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|name| !matches!(fields.get(*name), Some(Value::String(s)) if !s.is_empty()))
        .collect();

    ensure!(missing.is_empty(), MissingFieldsSnafu { fields: missing });
    Ok(())
}
