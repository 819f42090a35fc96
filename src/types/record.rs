use std::collections::HashMap;

/// Flat input for evaluation, mapping variable names to their text values.
///
/// Values are kept as text; each operator coerces them as it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    data: HashMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, rendering it as text.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl RecordValue) -> Self {
        self.insert(name, value.into_text());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.data.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Values [`Record::set`] accepts: text and numbers.
///
/// `bool` is not a `RecordValue`. Its rendering `"false"` is non-empty text
/// and would be true in a logical context; use `""` or a number instead.
///
/// ```compile_fail
/// let record = ruleit::Record::new().set("flag", false);
/// ```
pub trait RecordValue {
    fn into_text(self) -> String;
}

macro_rules! record_value_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RecordValue for $ty {
                fn into_text(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

record_value_via_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, &str, &String,
);

impl RecordValue for String {
    fn into_text(self) -> String {
        self
    }
}

impl From<HashMap<String, String>> for Record {
    fn from(data: HashMap<String, String>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_renders_values_as_text() {
        let record = Record::new()
            .set("age", 40)
            .set("salary", 50000.5)
            .set("department", "Sales");
        assert_eq!(record.get("age"), Some("40"));
        assert_eq!(record.get("salary"), Some("50000.5"));
        assert_eq!(record.get("department"), Some("Sales"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn missing_key_returns_none() {
        let record = Record::new().set("a", 1);
        assert_eq!(record.get("b"), None);
        assert!(Record::new().is_empty());
    }

    #[test]
    fn overwrite_value() {
        let record = Record::new().set("score", 10).set("score", 20);
        assert_eq!(record.get("score"), Some("20"));
    }

    #[test]
    fn owned_and_borrowed_text() {
        let owned = String::from("Sales");
        let record = Record::new().set("a", &owned).set("b", owned).set("c", 'x');
        assert_eq!(record.get("a"), Some("Sales"));
        assert_eq!(record.get("b"), Some("Sales"));
        assert_eq!(record.get("c"), Some("x"));
    }

    #[test]
    fn insert_mutable_ref() {
        let mut record = Record::new();
        record.insert("key", "value");
        assert_eq!(record.get("key"), Some("value"));
    }

    #[test]
    fn from_iterator_and_map() {
        let record: Record = [("a", "5"), ("b", "3")].into_iter().collect();
        assert_eq!(record.get("a"), Some("5"));

        let map: HashMap<String, String> =
            HashMap::from([("x".to_owned(), "y".to_owned())]);
        assert_eq!(Record::from(map).get("x"), Some("y"));
    }
}
