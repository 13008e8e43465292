//! Skill and provider definitions.

/// A unit of reference documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Identifier the model uses to request it, e.g. `mermaid:flowchart`
    pub id: String,
    pub name: String,
    /// One-line description shown in the catalog table
    pub description: String,
    /// Documentation injected when requested
    pub content: String,
}

impl Skill {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            content: content.into(),
        }
    }
}

/// A source of skills for one documentation domain.
pub trait SkillProvider: Send + Sync {
    fn category(&self) -> &str;

    fn description(&self) -> &str;

    fn skills(&self) -> Vec<Skill>;
}
