//! Prompt templates for joke generation, punchline prediction and explanation.
//!
//! Generation prompts ask for an explicit `Setup:` / `Punchline:` layout and a
//! word range so the parser and structural analyzer have something stable to
//! work with. Novel topic combinations keep the models away from jokes they
//! have memorized.

use crate::model::Category;

const BASE_TEMPLATE: &str = "You are a humor researcher generating jokes for a scientific study.

Task: Create a {category} joke that is:
- Original and novel (not a well-known joke)
- Has clear setup and punchline structure
- Appropriate for academic research
- Between 15-50 words total

Category: {category_description}

Generate exactly ONE joke. Use this format:
Setup: [your setup here]
Punchline: [your punchline here]

Remember: The joke should be {category_specific_instruction}";

const SURPRISE_TEMPLATE: &str = "Given this joke setup, predict what the punchline will be.

Setup: {setup}

What do you predict the punchline is? Give only the punchline, no explanation.";

const EXPLANATION_TEMPLATE: &str = "You are analyzing humor for a cognitive science study.

Below is a joke. Please explain why this joke is intended to be funny. Focus on the MECHANISMS that create humor.

Joke:
{full_text}

Explain why this is funny. Consider:
- What expectations does the setup create?
- How does the punchline violate those expectations?
- What knowledge is required to understand the joke?
- What makes the violation \"benign\" (safe, acceptable)?

Provide a detailed analysis in 3-5 sentences.";

pub struct CategorySpec {
    pub description: &'static str,
    pub instruction: &'static str,
    pub example_topics: &'static [&'static str],
}

pub fn category_spec(category: Category) -> &'static CategorySpec {
    match category {
        Category::Linguistic => &LINGUISTIC,
        Category::Physical => &PHYSICAL,
        Category::Social => &SOCIAL,
        Category::Dark => &DARK,
    }
}

static LINGUISTIC: CategorySpec = CategorySpec {
    description: "Linguistic humor relies on wordplay, puns, homonyms, semantic ambiguity, or double meanings. The humor emerges from language structure itself, not physical actions or social situations.",
    instruction: "based purely on word meaning, sound, or semantic ambiguity. Avoid references to physical actions or social situations.",
    example_topics: &["abstract concepts", "language itself", "numbers", "letters", "grammar"],
};

static PHYSICAL: CategorySpec = CategorySpec {
    description: "Physical humor involves descriptions of bodily mishaps, clumsiness, slapstick scenarios, or minor injuries. The humor requires understanding of physical causation and embodied experience.",
    instruction: "about a physical mishap, collision, or clumsy action. The humor should come from the physical consequence itself.",
    example_topics: &["walking into things", "tripping", "dropping objects", "coordination failures"],
};

static SOCIAL: CategorySpec = CategorySpec {
    description: "Social humor involves awkward situations, social norm violations, misunderstandings, or embarrassing moments in interpersonal contexts. Requires understanding of social expectations.",
    instruction: "about a socially awkward situation or social norm violation. The humor should emerge from social context and expectations.",
    example_topics: &["awkward conversations", "social mishaps", "etiquette violations", "miscommunications"],
};

static DARK: CategorySpec = CategorySpec {
    description: "Dark humor addresses mortality, danger, taboo topics, or serious threats in a way that reframes them as non-threatening. Requires transformation of genuine threat into benign violation.",
    instruction: "about mortality, danger, or taboo topics, but in a way that makes the threat benign. Should be edgy but not offensive.",
    example_topics: &["mortality", "accidents", "misfortune", "existential dread"],
};

pub const NOVEL_CONTEXT_COUNT: usize = 5;

pub fn novel_contexts(category: Category) -> &'static [&'static str; NOVEL_CONTEXT_COUNT] {
    match category {
        Category::Linguistic => &[
            "a pun about quantum computing and breakfast",
            "wordplay involving origami and philosophy",
            "semantic ambiguity about semicolons and life choices",
            "double meaning with cryptocurrency and gardening",
            "homonym joke about asteroids and grammar",
        ],
        Category::Physical => &[
            "someone organizing a filing cabinet",
            "trying to fold a fitted sheet for the first time",
            "assembling furniture with unclear instructions",
            "using a standing desk incorrectly",
            "attempting to use chopsticks while wearing mittens",
        ],
        Category::Social => &[
            "accidentally joining a work video call in the wrong context",
            "misinterpreting a Slack emoji reaction",
            "LinkedIn networking gone wrong",
            "virtual background malfunction during serious meeting",
            "replying-all to an email chain",
        ],
        Category::Dark => &[
            "procrastination and deadline mortality",
            "existential dread at the DMV",
            "inbox zero as life goal",
            "retirement planning in your 20s",
            "reading the terms and conditions",
        ],
    }
}

pub fn generation_prompt(category: Category, novel_context: Option<&str>) -> String {
    let spec = category_spec(category);
    let mut prompt = BASE_TEMPLATE
        .replace("{category}", category.as_str())
        .replace("{category_description}", spec.description)
        .replace("{category_specific_instruction}", spec.instruction);

    if let Some(ctx) = novel_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nSpecific context for this joke: ");
        prompt.push_str(ctx);
    }
    prompt
}

/// One prompt per novel context, at most `n`.
pub fn novel_prompts(category: Category, n: usize) -> Vec<String> {
    novel_contexts(category)
        .iter()
        .take(n)
        .map(|ctx| generation_prompt(category, Some(ctx)))
        .collect()
}

/// Exactly `n` prompts, cycling through the novel contexts.
pub fn extended_prompts(category: Category, n: usize) -> Vec<String> {
    let contexts = novel_contexts(category);
    (0..n)
        .map(|i| generation_prompt(category, Some(contexts[i % contexts.len()])))
        .collect()
}

pub fn surprise_prompt(setup: &str) -> String {
    SURPRISE_TEMPLATE.replace("{setup}", setup)
}

pub fn explanation_prompt(full_text: &str) -> String {
    EXPLANATION_TEMPLATE.replace("{full_text}", full_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_fills_category() {
        let p = generation_prompt(Category::Physical, None);
        assert!(p.contains("Create a physical joke"));
        assert!(p.contains("bodily mishaps"));
        assert!(p.contains("Setup: [your setup here]"));
        assert!(!p.contains('{'));
        assert!(!p.contains("Specific context"));
    }

    #[test]
    fn novel_context_is_appended() {
        let p = generation_prompt(Category::Dark, Some("existential dread at the DMV"));
        assert!(p.ends_with("Specific context for this joke: existential dread at the DMV"));
    }

    #[test]
    fn novel_prompts_are_capped() {
        assert_eq!(novel_prompts(Category::Social, 3).len(), 3);
        assert_eq!(novel_prompts(Category::Social, 50).len(), NOVEL_CONTEXT_COUNT);
    }

    #[test]
    fn extended_prompts_cycle() {
        let ps = extended_prompts(Category::Linguistic, 7);
        assert_eq!(ps.len(), 7);
        assert_eq!(ps[0], ps[5]);
        assert_eq!(ps[1], ps[6]);
        assert_ne!(ps[0], ps[1]);
    }

    #[test]
    fn analysis_prompts_embed_text() {
        assert!(surprise_prompt("Why is six afraid?").contains("Setup: Why is six afraid?"));
        let e = explanation_prompt("Setup: a\nPunchline: b");
        assert!(e.contains("Joke:\nSetup: a\nPunchline: b"));
        assert!(e.contains("\"benign\""));
    }
}
