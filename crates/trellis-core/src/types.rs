//! Frame types and type resolution
//!
//! A stored element carries its declared frame type in the reserved
//! [`TYPE_PROPERTY`]. Resolvers turn that metadata into a [`FrameType`] and
//! decide whether an element may be exposed as a requested type.

use crate::element::{ElementKind, GraphElement, Properties};
use crate::error::{Error, Result};
use crate::limits;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property key holding an element's declared frame type
pub const TYPE_PROPERTY: &str = "trellis_type";

/// Root type every vertex type descends from
pub const VERTEX_ROOT: &str = "Vertex";

/// Root type every edge type descends from
pub const EDGE_ROOT: &str = "Edge";

/// Name of a frame type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameType(pub String);

impl FrameType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root type for an element kind
    pub fn root(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Vertex => Self::new(VERTEX_ROOT),
            ElementKind::Edge => Self::new(EDGE_ROOT),
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == VERTEX_ROOT || self.0 == EDGE_ROOT
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FrameType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FrameType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&FrameType> for FrameType {
    fn from(t: &FrameType) -> Self {
        t.clone()
    }
}

/// Single-inheritance hierarchy of frame types
///
/// The two roots are always present. Every other type names a parent that
/// must already be registered.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    parents: HashMap<String, Option<String>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut parents = HashMap::new();
        parents.insert(VERTEX_ROOT.to_string(), None);
        parents.insert(EDGE_ROOT.to_string(), None);
        Self { parents }
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as a subtype of `parent`
    pub fn register(&mut self, name: &str, parent: &str) -> Result<()> {
        limits::validate_type_name(name)?;
        if name == VERTEX_ROOT || name == EDGE_ROOT {
            return Err(Error::configuration(format!(
                "'{}' is a built-in root type",
                name
            )));
        }
        if !self.parents.contains_key(parent) {
            return Err(Error::configuration(format!(
                "type '{}' extends unknown type '{}'",
                name, parent
            )));
        }
        match self.parents.get(name) {
            Some(Some(existing)) if existing != parent => Err(Error::configuration(format!(
                "type '{}' already registered with parent '{}'",
                name, existing
            ))),
            Some(_) => Ok(()),
            None => {
                tracing::debug!("Registered frame type {} <: {}", name, parent);
                self.parents.insert(name.to_string(), Some(parent.to_string()));
                Ok(())
            }
        }
    }

    /// Register a vertex type directly under the vertex root
    pub fn with_vertex_type(mut self, name: &str) -> Result<Self> {
        self.register(name, VERTEX_ROOT)?;
        Ok(self)
    }

    /// Register an edge type directly under the edge root
    pub fn with_edge_type(mut self, name: &str) -> Result<Self> {
        self.register(name, EDGE_ROOT)?;
        Ok(self)
    }

    /// Register `name <: parent` pairs in any order, resolving parents that
    /// appear later in the input.
    pub fn register_all<I, N, P>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, P)>,
        N: AsRef<str>,
        P: AsRef<str>,
    {
        let mut pending: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(n, p)| (n.as_ref().to_string(), p.as_ref().to_string()))
            .collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for (name, parent) in pending {
                if self.parents.contains_key(&parent) {
                    self.register(&name, &parent)?;
                } else {
                    deferred.push((name, parent));
                }
            }
            if deferred.len() == before {
                let (name, parent) = &deferred[0];
                return Err(Error::configuration(format!(
                    "type '{}' extends unknown or cyclic type '{}'",
                    name, parent
                )));
            }
            pending = deferred;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parents.get(name).and_then(|p| p.as_deref())
    }

    /// Whether a `candidate` may be used where `target` is expected
    pub fn is_assignable(&self, target: &str, candidate: &str) -> bool {
        let mut current = Some(candidate);
        while let Some(name) = current {
            if name == target {
                return true;
            }
            current = self.parent(name);
        }
        false
    }

    /// Element kind a registered type belongs to
    pub fn kind_of(&self, name: &str) -> Option<ElementKind> {
        if !self.contains(name) {
            return None;
        }
        let mut current = name;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        match current {
            VERTEX_ROOT => Some(ElementKind::Vertex),
            EDGE_ROOT => Some(ElementKind::Edge),
            _ => None,
        }
    }

    /// All registered type names, roots included
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Maps stored elements to frame types
pub trait TypeResolver: Send + Sync {
    /// Concrete frame type of an element
    fn resolve(&self, element: &dyn GraphElement) -> Result<FrameType>;

    /// Whether an element may be exposed as `target`
    fn matches(&self, element: &dyn GraphElement, target: &FrameType) -> Result<bool>;

    /// Write type metadata into the properties of an element about to be created
    fn init(&self, properties: &mut Properties, frame_type: &FrameType);

    /// Check that `frame_type` can produce an element of `kind`
    fn validate_initializer(&self, frame_type: &FrameType, kind: ElementKind) -> Result<()>;
}

/// Resolver backed by a [`TypeRegistry`] and the reserved type property
#[derive(Debug, Clone, Default)]
pub struct PolymorphicTypeResolver {
    registry: TypeRegistry,
}

impl PolymorphicTypeResolver {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn corrupt(element: &dyn GraphElement, reason: impl Into<String>) -> Error {
        Error::TypeResolution {
            element: element.id().to_string(),
            reason: reason.into(),
        }
    }
}

impl TypeResolver for PolymorphicTypeResolver {
    fn resolve(&self, element: &dyn GraphElement) -> Result<FrameType> {
        let kind = element.kind();
        let declared = match element.property(TYPE_PROPERTY) {
            None => return Ok(FrameType::root(kind)),
            Some(serde_json::Value::String(name)) if name.is_empty() => {
                return Err(Self::corrupt(element, "empty type name"));
            }
            Some(serde_json::Value::String(name)) => name,
            Some(other) => {
                return Err(Self::corrupt(
                    element,
                    format!("type property is not a string: {}", other),
                ));
            }
        };

        match self.registry.kind_of(declared) {
            Some(declared_kind) if declared_kind == kind => Ok(FrameType::new(declared.as_str())),
            Some(declared_kind) => Err(Self::corrupt(
                element,
                format!("{} declares {} type '{}'", kind, declared_kind, declared),
            )),
            None => {
                tracing::trace!(
                    "Unknown frame type '{}' on {}, using default",
                    declared,
                    element.id()
                );
                Ok(FrameType::root(kind))
            }
        }
    }

    fn matches(&self, element: &dyn GraphElement, target: &FrameType) -> Result<bool> {
        let resolved = self.resolve(element)?;
        Ok(self.registry.is_assignable(target.as_str(), resolved.as_str()))
    }

    fn init(&self, properties: &mut Properties, frame_type: &FrameType) {
        if frame_type.is_root() {
            return;
        }
        properties.insert(
            TYPE_PROPERTY.to_string(),
            serde_json::Value::String(frame_type.0.clone()),
        );
    }

    fn validate_initializer(&self, frame_type: &FrameType, kind: ElementKind) -> Result<()> {
        match self.registry.kind_of(frame_type.as_str()) {
            Some(k) if k == kind => Ok(()),
            Some(k) => Err(Error::configuration(format!(
                "initializer type '{}' produces a {}, not a {}",
                frame_type, k, kind
            ))),
            None => Err(Error::configuration(format!(
                "initializer type '{}' is not registered",
                frame_type
            ))),
        }
    }
}

/// Resolver that ignores type metadata entirely
///
/// Every element resolves to its root type and matches every requested type.
#[derive(Debug, Clone, Copy, Default)]
pub struct UntypedTypeResolver;

impl TypeResolver for UntypedTypeResolver {
    fn resolve(&self, element: &dyn GraphElement) -> Result<FrameType> {
        Ok(FrameType::root(element.kind()))
    }

    fn matches(&self, _element: &dyn GraphElement, _target: &FrameType) -> Result<bool> {
        Ok(true)
    }

    fn init(&self, _properties: &mut Properties, _frame_type: &FrameType) {}

    fn validate_initializer(&self, _frame_type: &FrameType, _kind: ElementKind) -> Result<()> {
        Ok(())
    }
}

/// Lazily keep only elements assignable to `target`, preserving order.
///
/// Elements with unknown types are dropped. Store errors and corrupt type
/// metadata are passed through as `Err` items.
pub fn filter_by_type<'a, T, I>(
    resolver: &'a dyn TypeResolver,
    elements: I,
    target: FrameType,
) -> impl Iterator<Item = Result<T>> + 'a
where
    T: GraphElement + 'a,
    I: Iterator<Item = Result<T>> + 'a,
{
    elements.filter_map(move |item| match item {
        Ok(element) => match resolver.matches(&element, &target) {
            Ok(true) => Some(Ok(element)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        },
        Err(e) => Some(Err(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Edge, ElementId, Vertex};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register_all([
                ("Programmer", "Person"),
                ("Person", VERTEX_ROOT),
                ("Company", VERTEX_ROOT),
                ("Knows", EDGE_ROOT),
            ])
            .unwrap();
        registry
    }

    fn typed_vertex(type_name: serde_json::Value) -> Vertex {
        let mut vertex = Vertex::new("vertex");
        vertex.properties.insert(TYPE_PROPERTY.to_string(), type_name);
        vertex
    }

    #[test]
    fn test_registry_assignability() {
        let registry = registry();

        assert!(registry.is_assignable("Person", "Programmer"));
        assert!(registry.is_assignable(VERTEX_ROOT, "Programmer"));
        assert!(registry.is_assignable("Person", "Person"));
        assert!(!registry.is_assignable("Programmer", "Person"));
        assert!(!registry.is_assignable("Company", "Programmer"));
        assert_eq!(registry.kind_of("Programmer"), Some(ElementKind::Vertex));
        assert_eq!(registry.kind_of("Knows"), Some(ElementKind::Edge));
        assert_eq!(registry.kind_of("Alien"), None);
    }

    #[test]
    fn test_registry_rejects_bad_registrations() {
        let mut registry = registry();

        assert!(registry.register("Robot", "Machine").unwrap_err().is_configuration());
        assert!(registry.register("Person", "Company").is_err());
        assert!(registry.register("Person", VERTEX_ROOT).is_ok());
        assert!(registry.register(VERTEX_ROOT, EDGE_ROOT).is_err());
        assert!(registry.register_all([("A", "B"), ("B", "A")]).is_err());
    }

    #[test]
    fn test_resolve_declared_type() {
        let resolver = PolymorphicTypeResolver::new(registry());

        let untyped = Vertex::new("vertex");
        assert_eq!(resolver.resolve(&untyped).unwrap().as_str(), VERTEX_ROOT);

        let programmer = typed_vertex(json!("Programmer"));
        assert_eq!(resolver.resolve(&programmer).unwrap().as_str(), "Programmer");

        let alien = typed_vertex(json!("Alien"));
        assert_eq!(resolver.resolve(&alien).unwrap().as_str(), VERTEX_ROOT);

        let edge = Edge::new(ElementId::new(), ElementId::new(), "knows");
        assert_eq!(resolver.resolve(&edge).unwrap().as_str(), EDGE_ROOT);
    }

    #[test]
    fn test_corrupt_metadata_is_an_error() {
        let resolver = PolymorphicTypeResolver::new(registry());

        for bad in [json!(42), json!(""), json!({"name": "Person"})] {
            let err = resolver.resolve(&typed_vertex(bad)).unwrap_err();
            assert!(matches!(err, Error::TypeResolution { .. }));
        }

        let edge_type_on_vertex = typed_vertex(json!("Knows"));
        assert!(resolver.resolve(&edge_type_on_vertex).is_err());
    }

    #[test]
    fn test_filter_by_type_keeps_order_and_drops_unknown() {
        let resolver = PolymorphicTypeResolver::new(registry());
        let vertices = vec![
            typed_vertex(json!("Programmer")),
            typed_vertex(json!("Company")),
            typed_vertex(json!("Alien")),
            typed_vertex(json!("Person")),
        ];
        let expected = vec![vertices[0].id, vertices[3].id];

        let filtered: Vec<ElementId> = filter_by_type(
            &resolver,
            vertices.into_iter().map(Ok),
            FrameType::new("Person"),
        )
        .map(|v| v.unwrap().id)
        .collect();

        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_filter_by_type_surfaces_corrupt_elements() {
        let resolver = PolymorphicTypeResolver::new(registry());
        let vertices = vec![typed_vertex(json!(7)), typed_vertex(json!("Person"))];

        let results: Vec<Result<Vertex>> =
            filter_by_type(&resolver, vertices.into_iter().map(Ok), "Person".into()).collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_init_and_validate() {
        let resolver = PolymorphicTypeResolver::new(registry());
        let mut props = Properties::new();

        resolver.init(&mut props, &FrameType::new("Person"));
        assert_eq!(props.get(TYPE_PROPERTY), Some(&json!("Person")));

        let mut root_props = Properties::new();
        resolver.init(&mut root_props, &FrameType::root(ElementKind::Vertex));
        assert!(root_props.is_empty());

        assert!(resolver
            .validate_initializer(&"Person".into(), ElementKind::Vertex)
            .is_ok());
        assert!(resolver
            .validate_initializer(&"Knows".into(), ElementKind::Vertex)
            .unwrap_err()
            .is_configuration());
        assert!(resolver
            .validate_initializer(&"Alien".into(), ElementKind::Vertex)
            .is_err());
    }

    #[test]
    fn test_untyped_resolver_matches_everything() {
        let resolver = UntypedTypeResolver;
        let vertex = typed_vertex(json!("Programmer"));

        assert_eq!(resolver.resolve(&vertex).unwrap().as_str(), VERTEX_ROOT);
        assert!(resolver.matches(&vertex, &"Company".into()).unwrap());

        let mut props = Properties::new();
        resolver.init(&mut props, &"Person".into());
        assert!(props.is_empty());
    }
}
