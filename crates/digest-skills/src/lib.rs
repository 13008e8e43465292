//! # digest-skills
//!
//! On-demand reference documentation the model can request mid-task.
//!
//! Skills are registered by providers (one per syntax domain) into a
//! process-wide catalog built once on first use. The catalog renders a
//! compact table for system prompts and resolves requested ids into
//! documentation text.

mod catalog;
mod mermaid;
mod request;
mod skill;

pub use catalog::{catalog, SkillCatalog};
pub use mermaid::MermaidSkills;
pub use request::{parse_skill_request, SkillRequest};
pub use skill::{Skill, SkillProvider};
