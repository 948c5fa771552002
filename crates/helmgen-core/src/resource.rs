//! Rendered Kubernetes resources

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, Result};

/// A single rendered resource document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resource(Mapping);

impl Resource {
    /// Wrap a parsed document, checking it looks like a resource
    pub fn from_value(value: Value) -> Result<Self> {
        check_resource(value).map_err(|message| CoreError::InvalidResource { index: 0, message })
    }

    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata("namespace")
    }

    fn metadata(&self, field: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }

    /// Look up a field by dotted path (e.g., "data.key")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.0.get(first)?, |value, key| value.get(key))
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }
}

fn check_resource(value: Value) -> std::result::Result<Resource, String> {
    let Value::Mapping(map) = value else {
        return Err(format!("expected a mapping, found {}", type_name(&value)));
    };
    for field in ["apiVersion", "kind"] {
        match map.get(field).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => {}
            _ => return Err(format!("missing '{}'", field)),
        }
    }
    Ok(Resource(map))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Ordered collection of rendered resources
///
/// Duplicate resource identities are kept; deduplication is up to the
/// consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceCollection {
    resources: Vec<Resource>,
}

impl ResourceCollection {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Serialize as a multi-document YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        let docs = self
            .resources
            .iter()
            .map(Resource::to_yaml)
            .collect::<Result<Vec<_>>>()?;
        Ok(docs.join("---\n"))
    }
}

impl From<Vec<Resource>> for ResourceCollection {
    fn from(resources: Vec<Resource>) -> Self {
        Self { resources }
    }
}

/// Builds resource collections from raw or already-parsed documents
pub trait ResourceFactory: Send + Sync {
    /// Parse a multi-document YAML stream
    fn from_bytes(&self, bytes: &[u8]) -> Result<ResourceCollection>;

    /// Build resources from parsed documents
    fn from_nodes(&self, nodes: Vec<Value>) -> Result<ResourceCollection>;
}

/// Strict YAML factory: every non-empty document must be a resource
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlResourceFactory;

impl ResourceFactory for YamlResourceFactory {
    fn from_bytes(&self, bytes: &[u8]) -> Result<ResourceCollection> {
        let mut nodes = Vec::new();
        for document in serde_yaml::Deserializer::from_slice(bytes) {
            nodes.push(Value::deserialize(document)?);
        }
        self.from_nodes(nodes)
    }

    fn from_nodes(&self, nodes: Vec<Value>) -> Result<ResourceCollection> {
        nodes
            .into_iter()
            .enumerate()
            .filter(|(_, node)| !node.is_null())
            .map(|(index, node)| {
                check_resource(node).map_err(|message| CoreError::InvalidResource { index, message })
            })
            .collect::<Result<Vec<_>>>()
            .map(ResourceCollection::from)
    }
}
