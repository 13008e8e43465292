//! Mermaid diagram syntax skills.

use crate::skill::{Skill, SkillProvider};

const ESSENTIAL_RULES: &str = include_str!("../docs/mermaid/essential.md");

/// (doc id, display name, description, documentation)
const CHART_TYPES: &[(&str, &str, &str, &str)] = &[
    ("flowchart", "Flowchart", "Nodes, edges, subgraphs, shapes", include_str!("../docs/mermaid/flowchart.md")),
    ("sequenceDiagram", "Sequence Diagram", "Actors, messages, loops, alt", include_str!("../docs/mermaid/sequenceDiagram.md")),
    ("classDiagram", "Class Diagram", "Classes, relationships, methods", include_str!("../docs/mermaid/classDiagram.md")),
    ("stateDiagram", "State Diagram", "States, transitions, forks, choices", include_str!("../docs/mermaid/stateDiagram.md")),
    ("entityRelationshipDiagram", "ER Diagram", "Entities, relationships, attributes", include_str!("../docs/mermaid/entityRelationshipDiagram.md")),
    ("gantt", "Gantt Chart", "Tasks, milestones, dependencies", include_str!("../docs/mermaid/gantt.md")),
    ("pie", "Pie Chart", "Proportions, segments", include_str!("../docs/mermaid/pie.md")),
    ("mindmap", "Mindmap", "Hierarchical brainstorming", include_str!("../docs/mermaid/mindmap.md")),
    ("timeline", "Timeline", "Historical events, periods", include_str!("../docs/mermaid/timeline.md")),
    ("gitgraph", "Git Graph", "Branches, commits, merges", include_str!("../docs/mermaid/gitgraph.md")),
    ("quadrantChart", "Quadrant Chart", "2D comparison matrix", include_str!("../docs/mermaid/quadrantChart.md")),
    ("xyChart", "XY Chart", "Line and bar charts", include_str!("../docs/mermaid/xyChart.md")),
    ("sankey", "Sankey Diagram", "Flow quantity visualization", include_str!("../docs/mermaid/sankey.md")),
];

/// Mermaid syntax rules plus one skill per chart type.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidSkills;

impl SkillProvider for MermaidSkills {
    fn category(&self) -> &str {
        "mermaid"
    }

    fn description(&self) -> &str {
        "Mermaid diagram syntax and chart-type documentation"
    }

    fn skills(&self) -> Vec<Skill> {
        let mut skills = vec![Skill::new(
            "mermaid",
            "Mermaid Diagram Syntax",
            "Syntax rules and chart type selection guide",
            ESSENTIAL_RULES,
        )];

        skills.extend(CHART_TYPES.iter().map(|(file, name, desc, content)| {
            Skill::new(format!("mermaid:{}", file), *name, *desc, *content)
        }));

        skills.push(Skill::new(
            "mermaid:styling",
            "Mermaid Styling",
            "Theme configuration and CSS styling",
            include_str!("../docs/mermaid/styling.md"),
        ));
        skills.push(Skill::new(
            "mermaid:directives",
            "Mermaid Directives",
            "Frontmatter and directive configuration",
            include_str!("../docs/mermaid/directives.md"),
        ));

        skills
    }
}
