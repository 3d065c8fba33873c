//! In-memory polymorphism tree.
//!
//! One tree is built per discriminator-bearing root model: the node name is
//! the model's definition name, children are the models whose `allOf` chain
//! points at it. Well-formed Swagger discriminators form a DAG, so a tree
//! suffices; construction still guards against cycles by refusing to re-enter
//! a name already on the construction stack (see `p4_discriminator`).

use crate::error::ResolveError;

/// A discriminator root or descendant, with ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymorphicTree {
    name: String,
    children: Vec<PolymorphicTree>,
}

impl PolymorphicTree {
    /// Create a node. The name must be non-empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ResolveError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ResolveError::invalid_argument(
                "polymorphic tree node name must be a non-empty string",
            ));
        }
        Ok(Self {
            name,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[PolymorphicTree] {
        &self.children
    }

    /// Append a child subtree. Adding a name that already exists among the
    /// direct children is a no-op (the existing subtree wins).
    pub fn add_child(&mut self, child: PolymorphicTree) {
        if self.children.iter().any(|c| c.name == child.name) {
            return;
        }
        self.children.push(child);
    }

    /// Every name in the tree in depth-first pre-order, root first.
    pub fn names_depth_first(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for child in &self.children {
            names.extend(child.names_depth_first());
        }
        names
    }

    /// Whether the root has any descendants at all.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
