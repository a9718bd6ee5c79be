//! Rule categories
//!
//! Each category inspects the whole profile against the grammar and returns
//! its findings. Categories are independent of each other: none relies on
//! another having run, and each skips names that belong to another
//! category's report (an unknown element is reported once, by vocabulary).

pub mod choice;
pub mod datatype;
pub mod identity;
pub mod strictness;
pub mod structure;
pub mod vocabulary;

pub use choice::ChoiceRules;
pub use datatype::DatatypeRules;
pub use identity::IdentityRules;
pub use strictness::StrictnessRules;
pub use structure::StructureRules;
pub use vocabulary::VocabularyRules;

use akn_profile::{Diagnostic, ElementRestriction, LineIndex, ProfileRestriction, Severity};
use akn_schema::SchemaModel;

/// Inputs shared by every rule category
pub struct RuleContext<'a> {
    pub profile: &'a ProfileRestriction,
    pub schema: &'a SchemaModel,
    pub line_index: &'a LineIndex,
}

impl<'a> RuleContext<'a> {
    pub fn new(profile: &'a ProfileRestriction, schema: &'a SchemaModel, line_index: &'a LineIndex) -> Self {
        Self {
            profile,
            schema,
            line_index,
        }
    }

    /// A diagnostic located at `path`, or at its nearest enclosing key
    pub fn report(
        &self,
        severity: Severity,
        rule_id: &str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Diagnostic {
        let path = path.into();
        let location = self.line_index.locate(&path);
        Diagnostic::new(severity, rule_id, path, message).at(location)
    }

    pub fn error(&self, rule_id: &str, path: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        self.report(Severity::Error, rule_id, path, message)
    }

    pub fn warning(&self, rule_id: &str, path: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        self.report(Severity::Warning, rule_id, path, message)
    }

    pub fn info(&self, rule_id: &str, path: impl Into<String>, message: impl Into<String>) -> Diagnostic {
        self.report(Severity::Info, rule_id, path, message)
    }

    /// Profile entries whose element exists in the grammar
    pub fn known_elements(&self) -> impl Iterator<Item = (&'a str, &'a ElementRestriction)> {
        let schema = self.schema;
        self.profile
            .elements
            .iter()
            .filter(move |(name, _)| schema.has_element(name))
            .map(|(name, restriction)| (name.as_str(), restriction))
    }
}

/// Path of an element entry
pub fn element_path(name: &str) -> String {
    format!("profile.elements.{}", name)
}

/// A named group of checks
pub trait RuleCategory: Send + Sync {
    /// Prefix of every rule id this category emits
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

/// All categories in reporting order
pub fn default_categories() -> Vec<Box<dyn RuleCategory>> {
    vec![
        Box::new(VocabularyRules),
        Box::new(StructureRules),
        Box::new(DatatypeRules),
        Box::new(IdentityRules),
        Box::new(ChoiceRules),
        Box::new(StrictnessRules),
    ]
}

/// `[a, b, c]` with names sorted
pub(crate) fn sorted_list<'s>(names: impl IntoIterator<Item = &'s str>) -> String {
    let mut names: Vec<&str> = names.into_iter().collect();
    names.sort_unstable();
    names.dedup();
    format!("[{}]", names.join(", "))
}
