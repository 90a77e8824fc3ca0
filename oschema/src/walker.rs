//! Visit-once traversal over every schema reachable from a document.

use std::collections::HashSet;

use crate::{OpenApiDocument, SchemaGraph, SchemaId};

/// Depth-first, pre-order traversal keyed by node identity.
///
/// Children are read *after* the visitor runs, so slots a visitor adds to the node it
/// is looking at are traversed too. `$ref` nodes continue into their component.
#[derive(Debug, Default)]
pub struct SchemaWalker {
    visited: HashSet<SchemaId>,
}

impl SchemaWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components in registry order, then each operation's parameters, bodies and responses.
    pub fn roots(document: &OpenApiDocument) -> Vec<SchemaId> {
        let mut roots: Vec<SchemaId> = document.schemas.components().map(|(_, id)| id).collect();
        for operation in &document.operations {
            roots.extend(operation.schema_roots());
        }
        roots
    }

    pub fn walk_document<F>(&mut self, document: &mut OpenApiDocument, visit: F)
    where
        F: FnMut(&mut SchemaGraph, SchemaId),
    {
        let roots = Self::roots(document);
        self.walk(&mut document.schemas, roots, visit);
    }

    pub fn walk<F>(&mut self, graph: &mut SchemaGraph, roots: Vec<SchemaId>, mut visit: F)
    where
        F: FnMut(&mut SchemaGraph, SchemaId),
    {
        let mut stack: Vec<SchemaId> = roots.into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }

            visit(graph, id);

            let node = graph.node(id);
            if let Some(reference) = node.reference.as_deref() {
                if let Some(target) = graph.resolve_reference(reference) {
                    stack.push(target);
                }
            }
            stack.extend(node.children().into_iter().rev());
        }
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn walk_visits_each_node_once_on_cycles() {
        let mut graph = SchemaGraph::new();
        let tree = graph.parse_schema(&json!({
            "type": "object",
            "properties": {
                "child": {"$ref": "#/components/schemas/Tree"},
                "children": {"type": "array", "items": {"$ref": "#/components/schemas/Tree"}}
            }
        }));
        graph.register_component("Tree", tree);

        let mut seen = Vec::new();
        let mut walker = SchemaWalker::new();
        walker.walk(&mut graph, vec![tree, tree], |_, id| seen.push(id));

        assert_eq!(seen.len(), graph.len());
        assert_eq!(seen[0], tree);
        assert_eq!(walker.visited(), graph.len());
    }

    #[test]
    fn walk_reaches_every_combinator_slot() {
        let mut graph = SchemaGraph::new();
        let root = graph.parse_schema(&json!({
            "allOf": [{}], "anyOf": [{}], "oneOf": [{}], "not": {},
            "if": {}, "then": {}, "else": {}, "contains": {}, "prefixItems": [{}],
            "dependentSchemas": {"a": {}}, "contentSchema": {},
            "additionalProperties": {}, "patternProperties": {"^x": {}}
        }));

        let mut count = 0;
        SchemaWalker::new().walk(&mut graph, vec![root], |_, _| count += 1);

        assert_eq!(count, 14);
    }

    #[test]
    fn children_added_by_the_visitor_are_walked() {
        let mut graph = SchemaGraph::new();
        let root = graph.parse_schema(&json!({"type": "object"}));
        let extra = graph.parse_schema(&json!({"type": "string"}));

        let mut seen = Vec::new();
        SchemaWalker::new().walk(&mut graph, vec![root], |graph, id| {
            if id == root {
                graph.node_mut(root).one_of.push(extra);
            }
            seen.push(id);
        });

        assert_eq!(seen, vec![root, extra]);
    }
}
