//! Document filters and their SQL rendering.
//!
//! Filters address documents by top-level fields. The reserved field name
//! `_id` targets the store-assigned id column; every other field is matched
//! against `json_extract` on the document body. A JSON-null equality matches
//! both explicit null and absent fields, mirroring document-store semantics.

use serde_json::Value;

use crate::error::StoreError;

/// A filter over documents in one collection.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals value. `Eq("_id", ...)` matches the document id.
    Eq(String, Value),
    /// Field value is one of the listed values. Empty list matches nothing.
    In(String, Vec<Value>),
    /// Any branch matches. Empty list matches nothing.
    Or(Vec<Filter>),
    /// All branches match.
    And(Vec<Filter>),
}

impl Filter {
    /// Equality on a named field.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    /// Equality on the document id.
    pub fn id(id: impl Into<Value>) -> Self {
        Self::Eq("_id".to_string(), id.into())
    }

    /// Membership on a named field.
    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In(field.into(), values)
    }

    /// Render this filter as a SQL condition, pushing bind values in order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Query` on unsupported field names or bind values.
    pub fn to_sql(&self, params: &mut Vec<libsql::Value>) -> Result<String, StoreError> {
        match self {
            Self::All => Ok("1 = 1".to_string()),
            Self::Eq(field, value) => {
                let expr = field_expr(field)?;
                if value.is_null() {
                    // JSON null and absent both extract to SQL NULL.
                    return Ok(format!("{expr} IS NULL"));
                }
                params.push(bind_value(value)?);
                Ok(format!("{expr} = ?{}", params.len()))
            }
            Self::In(field, values) => {
                if values.is_empty() {
                    return Ok("1 = 0".to_string());
                }
                let expr = field_expr(field)?;
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    params.push(bind_value(value)?);
                    placeholders.push(format!("?{}", params.len()));
                }
                Ok(format!("{expr} IN ({})", placeholders.join(", ")))
            }
            Self::Or(branches) => combine(branches, "OR", params),
            Self::And(branches) => combine(branches, "AND", params),
        }
    }

    /// Top-level equality pairs, excluding `_id`.
    ///
    /// On upsert-insert these become part of the new document, so a document
    /// created through a natural-key filter always carries its natural key.
    #[must_use]
    pub fn equalities(&self) -> Vec<(&str, &Value)> {
        match self {
            Self::Eq(field, value) if field != "_id" => vec![(field.as_str(), value)],
            Self::And(branches) => branches.iter().flat_map(Self::equalities).collect(),
            _ => Vec::new(),
        }
    }

    /// The `_id` equality value, if this filter pins one.
    #[must_use]
    pub fn id_equality(&self) -> Option<&Value> {
        match self {
            Self::Eq(field, value) if field == "_id" => Some(value),
            Self::And(branches) => branches.iter().find_map(Self::id_equality),
            _ => None,
        }
    }
}

fn combine(
    branches: &[Filter],
    op: &str,
    params: &mut Vec<libsql::Value>,
) -> Result<String, StoreError> {
    if branches.is_empty() {
        return Ok("1 = 0".to_string());
    }
    let rendered: Vec<String> = branches
        .iter()
        .map(|b| b.to_sql(params))
        .collect::<Result<_, _>>()?;
    Ok(format!("({})", rendered.join(&format!(" {op} "))))
}

/// SQL expression addressing a document field.
fn field_expr(field: &str) -> Result<String, StoreError> {
    if field == "_id" {
        return Ok("id".to_string());
    }
    if field.is_empty()
        || !field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(StoreError::Query(format!("unsupported field name '{field}'")));
    }
    Ok(format!("json_extract(doc, '$.{field}')"))
}

/// Convert a JSON scalar into a bind value.
///
/// Booleans bind as 0/1 because `json_extract` yields SQLite integers for
/// JSON booleans.
fn bind_value(value: &Value) -> Result<libsql::Value, StoreError> {
    match value {
        Value::Null => Ok(libsql::Value::Null),
        Value::Bool(b) => Ok(libsql::Value::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(libsql::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(libsql::Value::Real(f))
            } else {
                Err(StoreError::Query(format!("unsupported number {n}")))
            }
        }
        Value::String(s) => Ok(libsql::Value::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::Query(
            "structured values cannot be used in filters".to_string(),
        )),
    }
}
