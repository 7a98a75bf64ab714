//! Outcome hierarchy store
//!
//! Immutable 4-level tree (BusinessUnit → Product → Motive → Submotive). Loaded
//! once at startup and shared read-only (typically behind an `Arc`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::typification::{HierarchyLevel, TypificationPath, CONCLUSION};
use crate::{Error, Result};

/// Depth of every root-to-submotive path
pub const HIERARCHY_DEPTH: usize = 4;

/// Node of the outcome hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub label: String,
    /// Ordered children; empty for submotives
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(label: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    /// Child by label
    pub fn child(&self, label: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Child labels in configuration order
    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }
}

/// Read-only hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    roots: Vec<HierarchyNode>,
}

impl Hierarchy {
    /// Build a hierarchy, enforcing the structural invariants
    ///
    /// Every path from a business unit to a submotive must have length exactly
    /// four, labels must be non-empty and siblings must be unique.
    pub fn new(roots: Vec<HierarchyNode>) -> Result<Self> {
        if roots.is_empty() {
            return Err(Error::Configuration(
                "hierarchy has no business units".to_string(),
            ));
        }
        check_siblings(&roots, "(root)")?;
        for root in &roots {
            check_node(root, 1, &root.label)?;
        }

        let hierarchy = Self { roots };
        tracing::debug!(
            business_units = hierarchy.roots.len(),
            leaves = hierarchy.paths().len(),
            "Loaded outcome hierarchy"
        );
        Ok(hierarchy)
    }

    /// Business unit labels
    pub fn business_units(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.label.as_str()).collect()
    }

    /// Node reached by following `prefix` from the root
    pub fn node(&self, prefix: &[&str]) -> Option<&HierarchyNode> {
        let (first, rest) = prefix.split_first()?;
        let mut node = self.roots.iter().find(|r| r.label == *first)?;
        for label in rest {
            node = node.child(label)?;
        }
        Some(node)
    }

    /// Valid child labels of the node at `prefix`
    ///
    /// An empty prefix yields the business units. A full 4-label prefix yields
    /// the virtual conclusion child. `None` when the prefix does not resolve.
    pub fn children_of(&self, prefix: &[&str]) -> Option<Vec<&str>> {
        if prefix.is_empty() {
            return Some(self.business_units());
        }
        let node = self.node(prefix)?;
        if prefix.len() == HIERARCHY_DEPTH {
            return Some(vec![CONCLUSION]);
        }
        Some(node.child_labels())
    }

    /// Owned options for `level` given the labels already chosen above it
    pub fn options_for(&self, path: &TypificationPath, level: HierarchyLevel) -> Option<Vec<String>> {
        self.children_of(&path.prefix(level))
            .map(|labels| labels.into_iter().map(str::to_string).collect())
    }

    /// Whether the path exists in the hierarchy
    pub fn is_valid_path(&self, path: &TypificationPath) -> bool {
        self.node(&path.labels())
            .map(|leaf| leaf.children.is_empty())
            .unwrap_or(false)
    }

    /// Every valid path, in configuration order
    pub fn paths(&self) -> Vec<TypificationPath> {
        let mut out = Vec::new();
        for bu in &self.roots {
            for product in &bu.children {
                for motive in &product.children {
                    for submotive in &motive.children {
                        out.push(TypificationPath::new(
                            &bu.label,
                            &product.label,
                            &motive.label,
                            &submotive.label,
                        ));
                    }
                }
            }
        }
        out
    }
}

fn check_siblings(nodes: &[HierarchyNode], parent: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        if node.label.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "empty label under '{}'",
                parent
            )));
        }
        if !seen.insert(node.label.as_str()) {
            return Err(Error::Configuration(format!(
                "duplicate label '{}' under '{}'",
                node.label, parent
            )));
        }
    }
    Ok(())
}

fn check_node(node: &HierarchyNode, depth: usize, trail: &str) -> Result<()> {
    if depth == HIERARCHY_DEPTH {
        if !node.children.is_empty() {
            return Err(Error::Configuration(format!(
                "'{}' is deeper than {} levels",
                trail, HIERARCHY_DEPTH
            )));
        }
        return Ok(());
    }
    if node.children.is_empty() {
        return Err(Error::Configuration(format!(
            "'{}' stops at level {} of {}",
            trail, depth, HIERARCHY_DEPTH
        )));
    }
    check_siblings(&node.children, trail)?;
    for child in &node.children {
        check_node(child, depth + 1, &format!("{} > {}", trail, child.label))?;
    }
    Ok(())
}
