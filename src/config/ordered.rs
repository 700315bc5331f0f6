//! Declaration-order mapping support.
//!
//! YAML mappings such as `data_sources` are read into `Vec<(String, T)>`
//! instead of a hash map, so iteration follows the order the entries were
//! written in. Use with `#[serde(with = "ordered")]`.

use serde::de::{Deserialize, Deserializer, Error, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::marker::PhantomData;

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of names to entries")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, entry)) = map.next_entry::<String, T>()? {
                entries.push((name, entry));
            }
            Ok(entries)
        }

        // `data_output:` with nothing under it
        fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}

#[allow(clippy::ptr_arg)]
pub fn serialize<S, T>(entries: &Vec<(String, T)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, entry) in entries {
        map.serialize_entry(name, entry)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, with = "super")]
        entries: Vec<(String, u32)>,
    }

    #[test]
    fn test_preserves_declaration_order() {
        let holder: Holder = serde_yaml::from_str("entries:\n  zeta: 1\n  alpha: 2\n  mid: 3\n").unwrap();
        let names: Vec<&str> = holder.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_missing_and_null_are_empty() {
        let missing: Holder = serde_yaml::from_str("{}").unwrap();
        assert!(missing.entries.is_empty());
        let null: Holder = serde_yaml::from_str("entries:\n").unwrap();
        assert!(null.entries.is_empty());
    }

    #[test]
    fn test_serializes_back_to_mapping() {
        let holder = Holder {
            entries: vec![("b".to_string(), 2), ("a".to_string(), 1)],
        };
        let text = serde_yaml::to_string(&holder).unwrap();
        assert!(text.find("b: 2").unwrap() < text.find("a: 1").unwrap());
    }
}
