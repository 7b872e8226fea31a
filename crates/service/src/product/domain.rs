use serde::{de, Deserialize, Deserializer, Serialize};

/// Product with its details and files attached, as returned by every read path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub details: Vec<ProductDetail>,
    pub files: Vec<ProductFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: i32,
    pub product_id: i32,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFile {
    pub id: i32,
    pub product_id: i32,
    /// Public URL in object storage
    pub location: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailInput {
    pub label: String,
    pub description: String,
}

/// Create payload. `priority` is accepted for compatibility but never used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "lenient_details")]
    pub details: Option<Vec<DetailInput>>,
}

/// Partial update payload; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "lenient_details")]
    pub details: Option<Vec<DetailInput>>,
}

/// Column changes handed to the repository after blank values are filtered out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.priority.is_none()
    }
}

impl From<&UpdateProductInput> for ProductChanges {
    fn from(input: &UpdateProductInput) -> Self {
        let non_blank = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        ProductChanges {
            name: non_blank(&input.name),
            description: non_blank(&input.description),
            priority: input.priority,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => i32::try_from(n).map(Some).map_err(de::Error::custom),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("priority must be an integer, got {:?}", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailsRepr {
    List(Vec<DetailInput>),
    Encoded(String),
}

fn lenient_details<'de, D>(deserializer: D) -> Result<Option<Vec<DetailInput>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<DetailsRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(DetailsRepr::List(list)) => Ok(Some(list)),
        Some(DetailsRepr::Encoded(raw)) => serde_json::from_str::<Vec<DetailInput>>(&raw)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("details must be a JSON array: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_accepts_numbers_and_numeric_strings() {
        let a: CreateProductInput = serde_json::from_value(json!({"name": "A", "priority": 5})).unwrap();
        let b: CreateProductInput = serde_json::from_value(json!({"name": "A", "priority": " 7 "})).unwrap();
        let c: CreateProductInput = serde_json::from_value(json!({"name": "A"})).unwrap();
        assert_eq!(a.priority, Some(5));
        assert_eq!(b.priority, Some(7));
        assert_eq!(c.priority, None);
        assert!(serde_json::from_value::<CreateProductInput>(json!({"name": "A", "priority": "high"})).is_err());
    }

    #[test]
    fn details_accept_array_or_encoded_string() {
        let list: UpdateProductInput =
            serde_json::from_value(json!({"details": [{"label": "Size", "description": "L"}]})).unwrap();
        let encoded: UpdateProductInput =
            serde_json::from_value(json!({"details": "[{\"label\":\"Size\",\"description\":\"L\"}]"})).unwrap();
        assert_eq!(list.details, encoded.details);
        assert_eq!(list.details.unwrap()[0].label, "Size");

        let empty: UpdateProductInput = serde_json::from_value(json!({"details": []})).unwrap();
        assert_eq!(empty.details, Some(vec![]));
        let absent: UpdateProductInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.details, None);
    }

    #[test]
    fn blank_update_fields_do_not_become_changes() {
        let input = UpdateProductInput {
            name: Some("  ".into()),
            description: Some("new".into()),
            priority: None,
            details: None,
        };
        let changes = ProductChanges::from(&input);
        assert_eq!(changes.name, None);
        assert_eq!(changes.description.as_deref(), Some("new"));
        assert!(!changes.is_empty());
        assert!(ProductChanges::from(&UpdateProductInput::default()).is_empty());
    }
}
