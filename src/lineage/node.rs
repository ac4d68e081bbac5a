use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A caller-supplied node: a unique name, the names it depends on, and any
/// extra fields, which are carried along untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Node {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Every field as `(key, display text)`, starting with `name` and
    /// `dependencies`, then the payload in input order.
    pub fn display_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.payload.len() + 2);
        fields.push(("name".to_owned(), self.name.clone()));
        fields.push(("dependencies".to_owned(), self.dependencies.join(",")));
        for (key, value) in &self.payload {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            fields.push((key.clone(), text));
        }
        fields
    }
}
