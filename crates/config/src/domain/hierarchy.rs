//! Outcome Hierarchy Configuration
//!
//! The four levels are spelled out in the file layout, so a branch that is too
//! short or too deep cannot be expressed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use triage_core::{Hierarchy, HierarchyNode};

use crate::ConfigError;

/// Hierarchy loaded from hierarchy.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub business_units: Vec<BusinessUnitEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessUnitEntry {
    pub label: String,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEntry {
    pub label: String,
    #[serde(default)]
    pub motives: Vec<MotiveEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotiveEntry {
    pub label: String,
    #[serde(default)]
    pub submotives: Vec<String>,
}

impl HierarchyConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        crate::read_yaml(path.as_ref())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Convert to core hierarchy nodes, preserving file order
    pub fn to_nodes(&self) -> Vec<HierarchyNode> {
        self.business_units
            .iter()
            .map(|bu| {
                HierarchyNode::new(
                    &bu.label,
                    bu.products
                        .iter()
                        .map(|product| {
                            HierarchyNode::new(
                                &product.label,
                                product
                                    .motives
                                    .iter()
                                    .map(|motive| {
                                        HierarchyNode::new(
                                            &motive.label,
                                            motive
                                                .submotives
                                                .iter()
                                                .map(HierarchyNode::leaf)
                                                .collect(),
                                        )
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect()
    }

    /// Build the read-only hierarchy store
    pub fn build(&self) -> Result<Hierarchy, ConfigError> {
        Ok(Hierarchy::new(self.to_nodes())?)
    }

    pub fn business_unit_labels(&self) -> Vec<&str> {
        self.business_units.iter().map(|b| b.label.as_str()).collect()
    }
}
