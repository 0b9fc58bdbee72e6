//! The section catalog: the authoritative, ordered list of section types a
//! PRD is composed of.
//!
//! The catalog owns `title`, `description`, `placeholder` and the default
//! enabled flag for every section id. Persisted documents only ever
//! contribute `content` and `is_enabled`; everything else is refreshed from
//! here on load so schema changes never break stored documents.

use crate::document::model::Section;

/// A catalog entry for one section type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
    pub enabled_by_default: bool,
}

/// The fixed, ordered section catalog. Order here is document order.
pub const CATALOG: &[SectionDef] = &[
    SectionDef {
        id: "executive_summary",
        title: "Executive Summary",
        description: "A high-level overview of the product vision and business value.",
        placeholder: "Summarize the entire PRD in one paragraph...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "problem_statement",
        title: "Problem Statement",
        description: "The specific user problem or gap in the market this product addresses.",
        placeholder: "What pain point are we solving?",
        enabled_by_default: true,
    },
    SectionDef {
        id: "goals_objectives",
        title: "Goals & Objectives",
        description: "Measurable business and product goals.",
        placeholder: "List key objectives (e.g., Increase user retention by 20%)...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "target_audience",
        title: "Target Audience",
        description: "Who is this product for? User personas and segments.",
        placeholder: "Primary and secondary user personas...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "user_stories",
        title: "User Stories",
        description: "Specific scenarios from the user's perspective.",
        placeholder: "As a [user], I want to [action], so that [benefit]...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "features_requirements",
        title: "Features & Requirements",
        description: "Detailed functional requirements.",
        placeholder: "List specific features and functionality...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "technical_requirements",
        title: "Technical Requirements",
        description: "Tech stack, constraints, and architecture notes.",
        placeholder: "API requirements, database schema, performance constraints...",
        enabled_by_default: false,
    },
    SectionDef {
        id: "design_requirements",
        title: "Design Requirements",
        description: "UI/UX guidelines and constraints.",
        placeholder: "Mobile-first, brand colors, accessibility standards...",
        enabled_by_default: false,
    },
    SectionDef {
        id: "timeline_milestones",
        title: "Timeline & Milestones",
        description: "Key dates and delivery phases.",
        placeholder: "Phase 1 launch date, beta testing window...",
        enabled_by_default: false,
    },
    SectionDef {
        id: "success_metrics",
        title: "Success Metrics",
        description: "KPIs to measure product success.",
        placeholder: "DAU/MAU, conversion rates, NPS score...",
        enabled_by_default: true,
    },
    SectionDef {
        id: "risks",
        title: "Risk Assessment",
        description: "Potential pitfalls and mitigation strategies.",
        placeholder: "Technical risks, market risks, regulatory concerns...",
        enabled_by_default: false,
    },
];

impl SectionDef {
    /// Materialize a section with catalog metadata and default user state.
    pub fn instantiate(&self) -> Section {
        Section {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            content: String::new(),
            is_enabled: self.enabled_by_default,
            placeholder: self.placeholder.to_string(),
        }
    }
}

/// Look up a catalog entry by section id.
pub fn find(id: &str) -> Option<&'static SectionDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// The full default section list, in catalog order.
pub fn default_sections() -> Vec<Section> {
    CATALOG.iter().map(SectionDef::instantiate).collect()
}
