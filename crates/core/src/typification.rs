//! Outcome typification types
//!
//! A finished conversation is typified along the four hierarchy levels plus a
//! constant conclusion label.

use serde::{Deserialize, Serialize};

/// Terminal label of every typification
pub const CONCLUSION: &str = "Orientação";

/// Level of the outcome hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    BusinessUnit,
    Product,
    Motive,
    Submotive,
}

impl HierarchyLevel {
    /// All levels in pipeline order
    pub const ALL: [HierarchyLevel; 4] = [
        HierarchyLevel::BusinessUnit,
        HierarchyLevel::Product,
        HierarchyLevel::Motive,
        HierarchyLevel::Submotive,
    ];

    /// 1-based level number
    pub fn number(&self) -> u8 {
        match self {
            HierarchyLevel::BusinessUnit => 1,
            HierarchyLevel::Product => 2,
            HierarchyLevel::Motive => 3,
            HierarchyLevel::Submotive => 4,
        }
    }

    /// Level from its 1-based number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(HierarchyLevel::BusinessUnit),
            2 => Some(HierarchyLevel::Product),
            3 => Some(HierarchyLevel::Motive),
            4 => Some(HierarchyLevel::Submotive),
            _ => None,
        }
    }

    /// Machine name, as passed to the oracle
    pub fn name(&self) -> &'static str {
        match self {
            HierarchyLevel::BusinessUnit => "business_unit",
            HierarchyLevel::Product => "product",
            HierarchyLevel::Motive => "motive",
            HierarchyLevel::Submotive => "submotive",
        }
    }

    /// Next level, `None` after the submotive
    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Zero-based index into a path
    pub fn index(&self) -> usize {
        (self.number() - 1) as usize
    }
}

impl std::fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Proposed 4-label path through the hierarchy
///
/// A path is just data; it carries no validity guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypificationPath {
    pub business_unit: String,
    pub product: String,
    pub motive: String,
    pub submotive: String,
}

impl TypificationPath {
    pub fn new(
        business_unit: impl Into<String>,
        product: impl Into<String>,
        motive: impl Into<String>,
        submotive: impl Into<String>,
    ) -> Self {
        Self {
            business_unit: business_unit.into(),
            product: product.into(),
            motive: motive.into(),
            submotive: submotive.into(),
        }
    }

    /// Label at a level
    pub fn get(&self, level: HierarchyLevel) -> &str {
        match level {
            HierarchyLevel::BusinessUnit => &self.business_unit,
            HierarchyLevel::Product => &self.product,
            HierarchyLevel::Motive => &self.motive,
            HierarchyLevel::Submotive => &self.submotive,
        }
    }

    /// Replace the label at a level
    pub fn set(&mut self, level: HierarchyLevel, label: impl Into<String>) {
        let label = label.into();
        match level {
            HierarchyLevel::BusinessUnit => self.business_unit = label,
            HierarchyLevel::Product => self.product = label,
            HierarchyLevel::Motive => self.motive = label,
            HierarchyLevel::Submotive => self.submotive = label,
        }
    }

    /// Clear every label strictly below `level`
    pub fn clear_below(&mut self, level: HierarchyLevel) {
        let mut next = level.next();
        while let Some(lower) = next {
            self.set(lower, String::new());
            next = lower.next();
        }
    }

    /// Labels strictly above `level`, root first
    pub fn prefix(&self, level: HierarchyLevel) -> Vec<&str> {
        HierarchyLevel::ALL
            .iter()
            .take(level.index())
            .map(|l| self.get(*l))
            .collect()
    }

    /// All four labels, root first
    pub fn labels(&self) -> [&str; 4] {
        [
            &self.business_unit,
            &self.product,
            &self.motive,
            &self.submotive,
        ]
    }
}

impl std::fmt::Display for TypificationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} > {} > {} > {}",
            self.business_unit, self.product, self.motive, self.submotive
        )
    }
}

/// Result of checking a path against the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// 1–4: first invalid level, 5: fully valid
    pub level_reached: u8,
    pub error_message: Option<String>,
    /// Valid siblings at the failing level
    pub suggested_corrections: Vec<String>,
}

impl ValidationResult {
    /// Level reached by a fully valid path
    pub const FULLY_VALID: u8 = 5;

    pub fn valid() -> Self {
        Self {
            valid: true,
            level_reached: Self::FULLY_VALID,
            error_message: None,
            suggested_corrections: Vec::new(),
        }
    }

    pub fn invalid(
        level: HierarchyLevel,
        message: impl Into<String>,
        suggested_corrections: Vec<String>,
    ) -> Self {
        Self {
            valid: false,
            level_reached: level.number(),
            error_message: Some(message.into()),
            suggested_corrections,
        }
    }

    /// Level that failed, if any
    pub fn failing_level(&self) -> Option<HierarchyLevel> {
        if self.valid {
            None
        } else {
            HierarchyLevel::from_number(self.level_reached)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert_eq!(HierarchyLevel::BusinessUnit.next(), Some(HierarchyLevel::Product));
        assert_eq!(HierarchyLevel::Submotive.next(), None);
        assert!(HierarchyLevel::Product < HierarchyLevel::Motive);
        assert_eq!(HierarchyLevel::from_number(5), None);
    }

    #[test]
    fn test_path_prefix() {
        let path = TypificationPath::new("Emissão", "Cartão Pré-Pago", "Recarga", "Saque");
        assert!(path.prefix(HierarchyLevel::BusinessUnit).is_empty());
        assert_eq!(
            path.prefix(HierarchyLevel::Motive),
            vec!["Emissão", "Cartão Pré-Pago"]
        );
    }

    #[test]
    fn test_clear_below() {
        let mut path = TypificationPath::new("Emissão", "Cartão Pré-Pago", "Recarga", "Saque");
        path.clear_below(HierarchyLevel::Product);
        assert_eq!(path.product, "Cartão Pré-Pago");
        assert!(path.motive.is_empty());
        assert!(path.submotive.is_empty());
    }

    #[test]
    fn test_failing_level() {
        assert_eq!(ValidationResult::valid().failing_level(), None);

        let result = ValidationResult::invalid(HierarchyLevel::Motive, "unknown motive", vec![]);
        assert_eq!(result.level_reached, 3);
        assert_eq!(result.failing_level(), Some(HierarchyLevel::Motive));
    }
}
