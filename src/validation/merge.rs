//! Default-part merge rules.
//!
//! Part-level values win over the default part's shared values, with one
//! exception: array fields (tag sets and the like) are unioned rather than
//! replaced, default entries first, unless the part sets
//! `"override_<field>": true` in its option bag.

use serde_json::{Map, Value};

/// Merge the default part's option bag into a real part's bag.
pub fn merge_part_options(default: &Value, part: &Value) -> Value {
    let mut merged = part.as_object().cloned().unwrap_or_default();

    if let Some(default_map) = default.as_object() {
        for (key, default_value) in default_map {
            // Override flags are per-part switches, never inherited.
            if key.starts_with("override_") {
                continue;
            }

            match merged.get(key) {
                None => {
                    merged.insert(key.clone(), default_value.clone());
                }
                Some(part_value) => {
                    if let (Some(default_items), Some(part_items)) =
                        (default_value.as_array(), part_value.as_array())
                    {
                        if !override_flag_set(&merged, key) {
                            merged.insert(
                                key.clone(),
                                Value::Array(union(default_items, part_items)),
                            );
                        }
                    }
                    // Scalars and objects: the part's value stands.
                }
            }
        }
    }

    Value::Object(merged)
}

fn override_flag_set(map: &Map<String, Value>, key: &str) -> bool {
    map.get(&format!("override_{key}"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Union preserving order: default entries first, then part entries not
/// already present.
fn union(default_items: &[Value], part_items: &[Value]) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::with_capacity(default_items.len() + part_items.len());
    for item in default_items.iter().chain(part_items) {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_fall_back_to_default() {
        let default = json!({"rating": "general", "tags": ["art"]});
        let part = json!({});

        let merged = merge_part_options(&default, &part);
        assert_eq!(merged["rating"], "general");
        assert_eq!(merged["tags"], json!(["art"]));
    }

    #[test]
    fn test_part_scalar_wins() {
        let default = json!({"rating": "general"});
        let part = json!({"rating": "mature"});

        let merged = merge_part_options(&default, &part);
        assert_eq!(merged["rating"], "mature");
    }

    #[test]
    fn test_array_fields_union_default_first() {
        let default = json!({"tags": ["art", "digital"]});
        let part = json!({"tags": ["digital", "commission"]});

        let merged = merge_part_options(&default, &part);
        assert_eq!(merged["tags"], json!(["art", "digital", "commission"]));
    }

    #[test]
    fn test_override_flag_replaces_instead_of_union() {
        let default = json!({"tags": ["art", "digital"]});
        let part = json!({"tags": ["commission"], "override_tags": true});

        let merged = merge_part_options(&default, &part);
        assert_eq!(merged["tags"], json!(["commission"]));
    }

    #[test]
    fn test_override_flag_is_not_inherited_from_default() {
        let default = json!({"tags": ["art"], "override_tags": true});
        let part = json!({"tags": ["commission"]});

        let merged = merge_part_options(&default, &part);
        // The default's flag must not leak into the part.
        assert_eq!(merged["tags"], json!(["art", "commission"]));
        assert!(merged.get("override_tags").is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn tag_array(items: &[String]) -> Value {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }

        proptest! {
            #[test]
            fn union_contains_every_input_tag(
                default_tags in proptest::collection::vec("[a-z]{1,8}", 0..6),
                part_tags in proptest::collection::vec("[a-z]{1,8}", 0..6),
            ) {
                let default = json!({"tags": tag_array(&default_tags)});
                let part = json!({"tags": tag_array(&part_tags)});
                let merged = merge_part_options(&default, &part);
                let merged_tags: Vec<String> = merged["tags"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v.as_str().unwrap().to_string())
                    .collect();

                for tag in default_tags.iter().chain(part_tags.iter()) {
                    prop_assert!(merged_tags.contains(tag));
                }
            }

            #[test]
            fn union_never_duplicates(
                default_tags in proptest::collection::vec("[a-z]{1,8}", 0..6),
                part_tags in proptest::collection::vec("[a-z]{1,8}", 0..6),
            ) {
                let default = json!({"tags": tag_array(&default_tags)});
                let part = json!({"tags": tag_array(&part_tags)});
                let merged = merge_part_options(&default, &part);
                let merged_tags = merged["tags"].as_array().unwrap();

                let mut seen = std::collections::HashSet::new();
                for tag in merged_tags {
                    prop_assert!(seen.insert(tag.as_str().unwrap().to_string()));
                }
            }
        }
    }
}
