//! Rule and rule-configuration type definitions

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Severity level for rule violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured rule: metadata plus references to its check and fix
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub category: String,
    pub description: String,
    pub severity: Severity,
    /// Identifier of the predicate in the check registry
    pub predicate: String,
    /// Identifier of the corrective function, if this rule overrides the default
    pub corrective: Option<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>, severity: Severity, predicate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            description: String::new(),
            severity,
            predicate: predicate.into(),
            corrective: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_corrective(mut self, corrective: impl Into<String>) -> Self {
        self.corrective = Some(corrective.into());
        self
    }
}

/// One rule entry inside a category of the JSON configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub function: String,
    #[serde(default, alias = "adjust_function")]
    pub adjust: Option<String>,
}

/// A named category and its rules, in file order
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub rules: Vec<RuleEntry>,
}

/// JSON file format for a rule set
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "ordered_categories")]
    pub categories: Vec<Category>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            name: "Default Checks".to_string(),
            description: "デフォルトのチェック項目".to_string(),
            categories: Vec::new(),
        }
    }
}

impl RuleConfig {
    /// Every rule across all categories, in configuration order
    pub fn rules(&self) -> Vec<Rule> {
        self.categories
            .iter()
            .flat_map(|category| {
                category.rules.iter().map(move |entry| Rule {
                    name: entry.name.clone(),
                    category: category.name.clone(),
                    description: entry.description.clone(),
                    severity: entry.severity,
                    predicate: entry.function.clone(),
                    corrective: entry.adjust.clone().filter(|a| !a.is_empty()),
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.rules.is_empty())
    }
}

/// Keep categories in the order they are written; a JSON object has no
/// inherent order but the category order drives progress and report order.
fn ordered_categories<'de, D>(deserializer: D) -> Result<Vec<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CategoriesVisitor;

    impl<'de> Visitor<'de> for CategoriesVisitor {
        type Value = Vec<Category>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of category name to rule list")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut categories = Vec::new();
            while let Some((name, rules)) = map.next_entry::<String, Vec<RuleEntry>>()? {
                categories.push(Category { name, rules });
            }
            Ok(categories)
        }
    }

    deserializer.deserialize_map(CategoriesVisitor)
}
