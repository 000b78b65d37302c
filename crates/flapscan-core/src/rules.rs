//! Classification rules: category keywords and known site prefixes.
//!
//! Both tables are ordered. The first category with a matching keyword wins
//! and the first site prefix contained in a description wins, so the order in
//! which they are configured is the tie-break between overlapping entries.
//! They are kept as `Vec`s rather than maps for that reason.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};

/// Category assigned when no keyword matches.
pub const OTHER_CATEGORY: &str = "OTHER";

/// Site prefixes recognised in circuit descriptions, in priority order.
pub const DEFAULT_SITE_PREFIXES: &[&str] = &[
    "HQ", "CA4", "CA5", "RMD", "BNS", "MNS", "ALX", "MKT", "TNT",
];

/// One named category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Externally configurable classification tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRules {
    /// Category rules in match-priority order.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
    /// Known site-code prefixes in match-priority order.
    #[serde(default = "default_site_prefixes")]
    pub site_prefixes: Vec<String>,
    /// Category used when nothing matches.
    #[serde(default = "default_fallback")]
    pub fallback_category: String,
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Etisalat",
            &["etisalat", "eti", "tele", "telemisr", "ettislat", "etislat"],
        ),
        CategoryRule::new("Orange", &["orange", "org"]),
        CategoryRule::new("WE", &["we", "te", "te-fixed", "te-"]),
    ]
}

fn default_site_prefixes() -> Vec<String> {
    DEFAULT_SITE_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn default_fallback() -> String {
    OTHER_CATEGORY.to_string()
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            site_prefixes: default_site_prefixes(),
            fallback_category: default_fallback(),
        }
    }
}

impl ClassificationRules {
    /// `~/.flapscan/rules.json`.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// The rules path rooted at `base_dir` (used for testing).
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".flapscan").join("rules.json")
    }

    /// Load rules from an explicit path.
    ///
    /// Unlike the defaults lookup, a missing or malformed file here is an
    /// error: the caller asked for this file specifically.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let rules: Self = serde_json::from_str(&content)?;
        rules.validate()?;
        debug!(
            path = %path.display(),
            categories = rules.categories.len(),
            site_prefixes = rules.site_prefixes.len(),
            "classification rules loaded"
        );
        Ok(rules)
    }

    /// Resolve the rules for a run: `explicit` if given, else the default
    /// path if that file exists, else the built-in tables.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_with_default(explicit, &Self::default_path())
    }

    /// Same as [`resolve`](Self::resolve) with an injectable default path.
    pub fn resolve_with_default(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None if default_path.exists() => Self::load_from(default_path),
            None => Ok(Self::default()),
        }
    }

    /// Reject tables that cannot classify anything sensibly.
    pub fn validate(&self) -> Result<()> {
        if self.fallback_category.trim().is_empty() {
            return Err(ScanError::Config(
                "fallback category must not be empty".to_string(),
            ));
        }
        for rule in &self.categories {
            if rule.name.trim().is_empty() {
                return Err(ScanError::Config(
                    "category name must not be empty".to_string(),
                ));
            }
            if rule.keywords.iter().any(|k| k.is_empty()) {
                return Err(ScanError::Config(format!(
                    "category {} has an empty keyword",
                    rule.name
                )));
            }
        }
        if self.site_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ScanError::Config(
                "site prefixes must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Category names in configured order, followed by the fallback.
    pub fn category_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
        if !order.contains(&self.fallback_category.as_str()) {
            order.push(&self.fallback_category);
        }
        order
    }
}
