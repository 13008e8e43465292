//! The process-wide skill catalog.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use tracing::debug;

use crate::mermaid::MermaidSkills;
use crate::skill::{Skill, SkillProvider};

static CATALOG: OnceLock<SkillCatalog> = OnceLock::new();

/// The catalog of every built-in skill provider.
///
/// Built on first use and read-only afterwards.
pub fn catalog() -> &'static SkillCatalog {
    CATALOG.get_or_init(|| {
        let providers: [&dyn SkillProvider; 1] = [&MermaidSkills];
        SkillCatalog::from_providers(providers)
    })
}

/// Immutable registry of skills keyed by id.
///
/// Registration order is preserved; a later skill with an existing id
/// replaces the earlier one in place.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
    index: HashMap<String, usize>,
}

impl SkillCatalog {
    /// Aggregate the skills of all given providers.
    pub fn from_providers<'a>(providers: impl IntoIterator<Item = &'a dyn SkillProvider>) -> Self {
        let mut catalog = Self::default();
        for provider in providers {
            let skills = provider.skills();
            debug!(category = provider.category(), skills = skills.len(), "Registering skills");
            for skill in skills {
                catalog.insert(skill);
            }
        }
        catalog
    }

    fn insert(&mut self, skill: Skill) {
        match self.index.get(&skill.id) {
            Some(&pos) => self.skills[pos] = skill,
            None => {
                self.index.insert(skill.id.clone(), self.skills.len());
                self.skills.push(skill);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.index.get(id).map(|&pos| &self.skills[pos])
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    fn table_rows(&self) -> String {
        self.skills
            .iter()
            .map(|s| format!("| {} | {} |", s.id, s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compact catalog for injection into a summarization system prompt.
    pub fn catalog_summary(&self) -> String {
        format!(
            r#"SKILL REQUEST: Before generating, you may request specialized knowledge.
Respond with ONLY this JSON: {{"skillsNeeded": ["skill-id-1", "skill-id-2"]}}
You will receive the documentation and be asked to generate again.
Only request skills when you intend to create content that needs them
(e.g. request mermaid skills only if you plan to include diagrams).

Available skills:
| ID | Description |
|----|-------------|
{}"#,
            self.table_rows()
        )
    }

    /// Catalog variant for chat, where the request is embedded in the chat reply shape.
    pub fn chat_catalog(&self) -> String {
        format!(
            r#"SKILL REQUEST: Before generating diagrams or specialized content, you may request documentation.
To request skills, respond with: {{"text": "", "updates": null, "skillsNeeded": ["skill-id-1", "skill-id-2"]}}
You will receive the documentation and be asked to generate again.
Only request skills when you plan to create content requiring specialized knowledge (e.g. mermaid diagrams).

Available skills:
| ID | Description |
|----|-------------|
{}"#,
            self.table_rows()
        )
    }

    /// Concatenate the documentation of the requested skills.
    ///
    /// Repeated ids are included once and unknown ids are ignored. Returns
    /// an empty string when nothing resolves.
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> String {
        let mut seen = HashSet::new();
        let parts: Vec<String> = ids
            .iter()
            .map(|id| AsRef::<str>::as_ref(id))
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.get(id))
            .map(|skill| format!("### {}\n{}", skill.name, skill.content))
            .collect();

        if parts.is_empty() {
            String::new()
        } else {
            format!(
                "\n\n---\n\n## Requested Skill Documentation\n\n{}",
                parts.join("\n\n")
            )
        }
    }
}
