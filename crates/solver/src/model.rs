use std::collections::BTreeMap;

/// Values a solver assigned to declared constants, from `(get-model)`.
///
/// Values stay as raw SMT-LIB2 text (`5`, `(- 3)`, `true`); interpreting
/// them is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    values: BTreeMap<String, String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, replacing any earlier one for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Model {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut model = Self::new();
        for (name, value) in iter {
            model.insert(name, value);
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_order() {
        let model = Model::from_iter([("x1", "(- 4)"), ("b0", "true"), ("x0", "42")]);
        assert_eq!(model.len(), 3);
        assert_eq!(model.get("x0"), Some("42"));
        assert_eq!(model.get("x1"), Some("(- 4)"));
        assert_eq!(model.get("y"), None);

        let names: Vec<&str> = model.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b0", "x0", "x1"]);
    }

    #[test]
    fn later_value_wins() {
        let mut model = Model::new();
        assert!(model.is_empty());
        model.insert("x0", "1");
        model.insert("x0", "2");
        assert_eq!(model.len(), 1);
        assert_eq!(model.get("x0"), Some("2"));
    }
}
