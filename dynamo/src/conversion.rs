//! Conversion graph and conversion resolution
//!
//! Conversions form a directed graph from source type to target type. A
//! parameter position that declares a target type is widened to also accept
//! every direct source of that type; resolution never follows chains, so
//! `A -> B -> C` does not make an `A` acceptable where only `C` is declared.

use crate::error::Result;
use crate::guards::{Converter, Guard};
use crate::registry::TypeRegistry;
use crate::types::TypeTag;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A registered conversion edge
#[derive(Debug, Clone)]
pub struct Conversion {
    pub from: TypeTag,
    pub to: TypeTag,
    pub convert: Converter,
}

/// Directed graph of registered conversions
///
/// Registering the same edge twice keeps both copies; the duplicate only
/// costs an extra guard test on the widened position.
#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    graph: DiGraph<TypeTag, Converter>,
    nodes: HashMap<TypeTag, NodeIndex>,
}

impl ConversionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversion from `from` into `to`
    pub fn add(&mut self, from: &TypeTag, to: &TypeTag, convert: Converter) {
        let source = self.node(from);
        let target = self.node(to);
        self.graph.add_edge(source, target, convert);
    }

    /// Conversions targeting `to`, in registration order
    pub fn incoming(&self, to: &TypeTag) -> Vec<Conversion> {
        let Some(&target) = self.nodes.get(to) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges_directed(target, Direction::Incoming)
            .collect();
        edges.sort_by_key(|edge| edge.id());

        edges
            .into_iter()
            .map(|edge| Conversion {
                from: self.graph[edge.source()].clone(),
                to: to.clone(),
                convert: edge.weight().clone(),
            })
            .collect()
    }

    /// Number of registered conversions
    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    fn node(&mut self, tag: &TypeTag) -> NodeIndex {
        if let Some(&index) = self.nodes.get(tag) {
            return index;
        }
        let index = self.graph.add_node(tag.clone());
        self.nodes.insert(tag.clone(), index);
        index
    }
}

/// The acceptable types of one parameter position after widening
///
/// `tags`, `guards` and `converters` are parallel. The declared tags come
/// first with identity converters, followed by the sources added through
/// conversions.
#[derive(Debug, Clone)]
pub struct Widened {
    pub tags: Vec<TypeTag>,
    pub guards: Vec<Guard>,
    pub converters: Vec<Converter>,
    declared: usize,
}

impl Widened {
    /// Whether any conversion source was added
    pub fn is_widened(&self) -> bool {
        self.tags.len() > self.declared
    }

    /// Number of declared tags at the front of the lists
    pub fn declared_len(&self) -> usize {
        self.declared
    }
}

/// Widen a position's declared tags by one level of conversions
///
/// Fails only when a tag (declared or added) has no guard.
pub fn widen(declared: &[TypeTag], registry: &TypeRegistry) -> Result<Widened> {
    let mut tags: Vec<TypeTag> = declared.to_vec();
    let mut converters = vec![Converter::identity(); declared.len()];

    for to in declared {
        for conversion in registry.conversions().incoming(to) {
            if !tags.contains(&conversion.from) {
                tags.push(conversion.from);
                converters.push(conversion.convert);
            }
        }
    }

    let guards = tags
        .iter()
        .map(|tag| registry.resolve_guard(tag))
        .collect::<Result<Vec<_>>>()?;

    Ok(Widened {
        tags,
        guards,
        converters,
        declared: declared.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn names(tags: &[TypeTag]) -> Vec<String> {
        tags.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn test_incoming_preserves_registration_order() {
        let boxed = TypeTag::new("Boxed");
        let mut graph = ConversionGraph::new();
        graph.add(&TypeTag::boolean(), &boxed, Converter::identity());
        graph.add(&TypeTag::number(), &boxed, Converter::identity());
        graph.add(&TypeTag::string(), &TypeTag::number(), Converter::identity());

        let sources: Vec<_> = graph.incoming(&boxed).into_iter().map(|c| c.from).collect();
        assert_eq!(names(&sources), vec!["Boolean", "Number"]);
        assert_eq!(graph.len(), 3);
        assert!(graph.incoming(&TypeTag::string()).is_empty());
    }

    #[test]
    fn test_widen_adds_direct_sources_only() {
        let a = TypeTag::new("A");
        let b = TypeTag::new("B");
        let c = TypeTag::new("C");
        let mut registry = TypeRegistry::new();
        for tag in [&a, &b, &c] {
            registry.add_type(tag, |_| true);
        }
        registry.add_conversion(&a, &b, |x| x);
        registry.add_conversion(&b, &c, |x| x);

        let widened = widen(std::slice::from_ref(&c), &registry).unwrap();
        assert_eq!(names(&widened.tags), vec!["C", "B"]);
        assert!(widened.is_widened());
        assert_eq!(widened.declared_len(), 1);
        assert!(widened.converters[0].is_identity());
        assert!(!widened.converters[1].is_identity());
    }

    #[test]
    fn test_widen_skips_sources_already_declared() {
        let big = TypeTag::bigint();
        let mut registry = TypeRegistry::new();
        registry.add_type(&big, |x| matches!(x, Value::BigInt(_)));
        registry.add_type(&TypeTag::number(), |x| matches!(x, Value::Number(_)));
        registry.add_conversion(&TypeTag::number(), &big, |x| {
            Value::BigInt(x.as_number().unwrap_or_default() as i128)
        });

        let widened = widen(&[big.clone(), TypeTag::number()], &registry).unwrap();
        assert_eq!(names(&widened.tags), vec!["BigInt", "Number"]);
        assert!(!widened.is_widened());
    }

    #[test]
    fn test_duplicate_conversions_are_kept() {
        let boxed = TypeTag::new("Boxed");
        let mut registry = TypeRegistry::new();
        registry.add_type(&boxed, |_| false);
        registry.add_type(&TypeTag::number(), |x| matches!(x, Value::Number(_)));
        registry.add_conversion(&TypeTag::number(), &boxed, |x| x);
        registry.add_conversion(&TypeTag::number(), &boxed, |x| x);

        assert_eq!(registry.conversions().incoming(&boxed).len(), 2);
        // Only the first copy widens the position; the second source is already present
        let widened = widen(std::slice::from_ref(&boxed), &registry).unwrap();
        assert_eq!(widened.tags.len(), 2);
    }

    #[test]
    fn test_widen_fails_for_unknown_source() {
        let boxed = TypeTag::new("Boxed");
        let ghost = TypeTag::new("Ghost");
        let mut registry = TypeRegistry::new();
        registry.add_type(&boxed, |_| false);
        registry.add_conversion(&ghost, &boxed, |x| x);

        let err = widen(std::slice::from_ref(&boxed), &registry).unwrap_err();
        assert_eq!(err.to_string(), "Unknown type \"Ghost\"");
    }
}
