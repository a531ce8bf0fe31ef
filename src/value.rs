//! Conversions from parsed YAML metadata into template values, so templates
//! can reach arbitrary header fields without the generator knowing about
//! them.

use gtmpl::Value;
use std::collections::HashMap;

/// Converts a [`serde_yaml::Value`] into a template [`Value`]. Numbers keep
/// integer-ness where possible; mapping keys that aren't strings are dropped
/// (template objects are string-keyed).
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::from(i),
            (None, Some(f)) => Value::from(f),
            (None, None) => Value::Nil,
        },
        serde_yaml::Value::String(s) => Value::from(s.as_str()),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            for (key, value) in mapping {
                if let Some(key) = key.as_str() {
                    m.insert(key.to_owned(), from_yaml(value));
                }
            }
            Value::Object(m)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(from_yaml(&serde_yaml::Value::Null), Value::Nil);
        assert_eq!(from_yaml(&serde_yaml::Value::Bool(true)), Value::Bool(true));
        assert_eq!(
            from_yaml(&serde_yaml::Value::String("x".to_owned())),
            Value::from("x")
        );
    }

    #[test]
    fn test_nested() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("tags:\n  - rust\n  - blog\n").unwrap();
        match from_yaml(&yaml) {
            Value::Object(m) => assert_eq!(
                m["tags"],
                Value::Array(vec![Value::from("rust"), Value::from("blog")])
            ),
            other => panic!("expected object, got {:?}", other),
        }
    }
}
