use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" from `null`.
///
/// Pair with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        due_date: Option<Option<DateTime<Utc>>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.due_date, None);

        let cleared: Patch = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: Patch = serde_json::from_str(r#"{"due_date":"2025-03-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.due_date, Some(Some(_))));
    }
}
