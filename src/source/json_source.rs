use serde_json::Value;

use crate::error::NormalizeError;
use crate::source::{RecordSet, RowMapper, SourceReader, decode_text};

/// Reads a JSON array of flat objects, one object per row.
pub struct JsonSource;

impl SourceReader for JsonSource {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn read(&self, data: &[u8], platform: &str) -> Result<RecordSet, NormalizeError> {
        let (text, warning) = decode_text(data);

        let value: Value = serde_json::from_str(&text)?;
        let Value::Array(items) = value else {
            return Err(NormalizeError::MalformedDocument {
                reason: "expected a JSON array of row objects".to_string(),
            });
        };

        let mut objects = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => objects.push(map),
                other => {
                    return Err(NormalizeError::MalformedRecord {
                        platform: platform.to_string(),
                        row: i + 1,
                        reason: format!("expected an object, found {}", kind(&other)),
                    });
                }
            }
        }

        // Header is the union of keys in first-seen document order
        let mut headers: Vec<&str> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }

        let mapper = RowMapper::new(platform, headers.iter().copied());

        let mut rows = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            let mut cells = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match object.get(*header) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(Value::Bool(b)) => Some(b.to_string()),
                    Some(other) => {
                        return Err(NormalizeError::MalformedRecord {
                            platform: platform.to_string(),
                            row: i + 1,
                            reason: format!("field {header:?} is {}", kind(other)),
                        });
                    }
                };
                cells.push(cell);
            }
            rows.push(mapper.map_row(i + 1, cells.iter().map(|c| c.as_deref()))?);
        }

        Ok(RecordSet {
            platform: platform.to_string(),
            columns: mapper.columns(),
            records: rows,
            warnings: warning.into_iter().collect(),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Column;

    #[test]
    fn test_json_rows() {
        let input = br#"[
            {"location__geo__region": "anvers", "province_count": 12},
            {"location__geo__region": null, "province_count": 2}
        ]"#;
        let set = JsonSource.read(input, "ubereats").unwrap();
        assert_eq!(set.columns, vec![Column::RegionLabel, Column::Weight]);
        assert_eq!(set.records[0].region_label.as_deref(), Some("anvers"));
        assert_eq!(set.records[0].weight, 12);
        assert_eq!(set.records[1].region_label, None);
    }

    #[test]
    fn test_json_numbers_stringified() {
        let input = br#"[{"latitude": 50.85, "longitude": 4.35}]"#;
        let set = JsonSource.read(input, "deliveroo").unwrap();
        assert_eq!(set.records[0].latitude.as_deref(), Some("50.85"));
        assert_eq!(set.records[0].longitude.as_deref(), Some("4.35"));
    }

    #[test]
    fn test_json_keys_missing_in_some_rows() {
        let input = br#"[{"name": "A"}, {"name": "B", "postal_code": "1000"}]"#;
        let set = JsonSource.read(input, "deliveroo").unwrap();
        assert_eq!(set.columns, vec![Column::Name, Column::PostalCode]);
        assert_eq!(set.records[0].postal_code, None);
        assert_eq!(set.records[1].postal_code.as_deref(), Some("1000"));
    }

    #[test]
    fn test_json_first_key_in_document_wins() {
        let input = br#"[{"primarySlug": "slug-a", "id": "42", "postalCode": "1000"}]"#;
        let set = JsonSource.read(input, "takeaway").unwrap();
        assert_eq!(set.columns, vec![Column::RestaurantKey, Column::PostalCode]);
        assert_eq!(set.records[0].restaurant_key.as_deref(), Some("slug-a"));
    }

    #[test]
    fn test_json_columns_follow_document_order() {
        let input = br#"[{"title": "A", "category": "Pizza", "latitude": "50.8"}]"#;
        let set = JsonSource.read(input, "ubereats").unwrap();
        assert_eq!(
            set.columns,
            vec![Column::Name, Column::Category, Column::Latitude]
        );
    }

    #[test]
    fn test_json_not_an_array() {
        let err = JsonSource.read(br#"{"name": "A"}"#, "deliveroo").unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedDocument { .. }));
    }

    #[test]
    fn test_json_nested_value_rejected() {
        let err = JsonSource
            .read(br#"[{"name": ["A"]}]"#, "deliveroo")
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedRecord { row: 1, .. }));
    }

    #[test]
    fn test_json_invalid_syntax() {
        let err = JsonSource.read(b"[{", "deliveroo").unwrap_err();
        assert!(matches!(err, NormalizeError::Json(_)));
    }
}
