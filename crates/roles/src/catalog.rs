//! The immutable catalog of the five pedagogical roles.
//!
//! Process-wide static data; sessions share it read-only. Prompts are
//! complete instruction templates — the engine appends them verbatim to
//! the per-turn context block and never interpolates into them.

use roleweave_core::{Role, SectionKind};

/// Everything the engine knows about one role.
#[derive(Debug, Clone, Copy)]
pub struct RoleProfile {
    pub role: Role,

    /// Complete instruction template for the generator.
    pub system_prompt: &'static str,

    /// Prior suitability, in [0, 10].
    pub base_weight: f64,

    /// Lowercase tokens whose presence in a unit favors this role.
    pub priority_keywords: &'static [&'static str],

    /// Lowercase tokens whose presence penalizes this role.
    pub avoid_keywords: &'static [&'static str],

    /// Section kinds this role has an affinity for.
    pub affinity_tags: &'static [SectionKind],

    /// Sampling temperature; 0.0 for the deterministic roles.
    pub temperature: f32,

    /// Token budget for this role's responses.
    pub max_tokens: u32,
}

/// Look up the profile for a role.
pub fn profile(role: Role) -> &'static RoleProfile {
    // CATALOG is ordered like Role::ALL
    &CATALOG[Role::ALL.iter().position(|&r| r == role).unwrap_or(0)]
}

/// All five profiles, in lexicographic role-name order.
pub fn all() -> &'static [RoleProfile; 5] {
    &CATALOG
}

static CATALOG: [RoleProfile; 5] = [
    RoleProfile {
        role: Role::Challenger,
        system_prompt: "You are the Challenger, a critical thinker who encourages deeper \
analysis. Question assumptions, probe for edge cases, and push the learner beyond \
surface understanding without being confrontational. Ask probing questions about the \
concept, identify assumptions worth questioning, present limitations and edge cases, \
and encourage genuinely critical analysis of the material.",
        base_weight: 7.0,
        priority_keywords: &[
            "limitation",
            "limitations",
            "edge case",
            "alternative",
            "critique",
            "challenge",
            "deeper",
            "analysis",
            "implications",
            "consequences",
            "trade-off",
            "assume",
            "why not",
            "what if",
            "consider",
        ],
        avoid_keywords: &[
            "explain",
            "define",
            "summarize",
            "example",
            "instance",
            "misconception",
            "mistake",
            "basic",
            "simple",
        ],
        affinity_tags: &[SectionKind::Body],
        temperature: 0.1,
        max_tokens: 400,
    },
    RoleProfile {
        role: Role::ExampleGenerator,
        system_prompt: "You are the Example-Generator, adept at creating concrete \
illustrations. Provide real-world examples, use cases, and practical applications that \
make abstract concepts tangible. Prefer familiar contexts, show more than one example \
when it helps, and keep every illustration clearly tied to the concept at hand.",
        base_weight: 7.5,
        priority_keywords: &[
            "example",
            "instance",
            "case",
            "application",
            "use case",
            "scenario",
            "practical",
            "real-world",
            "demonstrate",
            "illustrate",
            "show",
            "sample",
            "analogy",
        ],
        avoid_keywords: &[
            "define",
            "explain",
            "theory",
            "challenge",
            "question",
            "summarize",
            "overview",
            "misconception",
            "mistake",
        ],
        affinity_tags: &[SectionKind::Body, SectionKind::Methodology],
        temperature: 0.2,
        max_tokens: 450,
    },
    RoleProfile {
        role: Role::Explainer,
        system_prompt: "You are the Explainer, a patient and clear educator. Break complex \
concepts into understandable parts, give clear definitions, and explain how and why \
things work. Use simple language, build understanding step by step, and reach for an \
analogy when it makes the idea land.",
        base_weight: 8.0,
        priority_keywords: &[
            "explain",
            "definition",
            "meaning",
            "understand",
            "concept",
            "basics",
            "fundamental",
            "principle",
            "what is",
            "how does",
            "tell me about",
        ],
        avoid_keywords: &[
            "challenge",
            "question",
            "critique",
            "example",
            "instance",
            "misconception",
            "mistake",
            "error",
            "summary",
            "overview",
        ],
        affinity_tags: &[SectionKind::Introduction, SectionKind::Methodology],
        temperature: 0.0,
        max_tokens: 500,
    },
    RoleProfile {
        role: Role::MisconceptionSpotter,
        system_prompt: "You are the Misconception-Spotter, vigilant about common errors. \
Identify typical misunderstandings of this material, explain why they occur, and correct \
them clearly before they take root. Distinguish similar-but-different concepts, and be \
gentle but unambiguous when addressing a confusion.",
        base_weight: 7.0,
        priority_keywords: &[
            "misconception",
            "misconceptions",
            "mistake",
            "error",
            "confuse",
            "wrong",
            "common error",
            "pitfall",
            "misunderstand",
            "clarify",
            "distinguish",
            "difference",
            "versus",
            "vs",
            "common mistake",
        ],
        avoid_keywords: &["example", "summarize", "overview", "detail", "explain how"],
        affinity_tags: &[SectionKind::Methodology],
        temperature: 0.0,
        max_tokens: 400,
    },
    RoleProfile {
        role: Role::Summarizer,
        system_prompt: "You are the Summarizer, skilled at distilling complex information. \
Synthesize the key points, organize them logically, and give the learner a concise \
overview that shows the big picture. Highlight only what matters most and use a \
structured format when it aids clarity.",
        base_weight: 8.5,
        priority_keywords: &[
            "summary",
            "summarize",
            "overview",
            "key points",
            "main idea",
            "briefly",
            "concise",
            "recap",
            "synthesize",
            "gist",
            "takeaway",
            "essence",
            "core",
        ],
        avoid_keywords: &[
            "detail",
            "explain",
            "depth",
            "challenge",
            "question",
            "example",
            "instance",
            "misconception",
            "elaborate",
        ],
        affinity_tags: &[SectionKind::Introduction, SectionKind::Conclusion],
        temperature: 0.0,
        max_tokens: 300,
    },
];
