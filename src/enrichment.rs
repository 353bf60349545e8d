//! Display-only annotations: category, canned subtasks, explanation and
//! expected output. Nothing here affects dates.

use crate::task::{Subtask, Task};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";

/// Adds display annotations to a task.
pub trait TaskEnricher: Send + Sync {
    fn enrich(&self, task: &mut Task);

    /// Tasks are independent, so the plan is enriched in parallel.
    fn enrich_all(&self, tasks: &mut [Task]) {
        tasks.par_iter_mut().for_each(|task| self.enrich(task));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskRule {
    pub keywords: Vec<String>,
    pub subtasks: Vec<String>,
}

impl CategoryRule {
    pub fn new(keywords: &[&str], category: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: category.to_string(),
        }
    }
}

impl SubtaskRule {
    pub fn new(keywords: &[&str], subtasks: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            subtasks: subtasks.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn matches_any(keywords: &[String], lowered_name: &str) -> bool {
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && lowered_name.contains(keyword.as_str()))
}

/// Ordered rule tables, evaluated first-match-wins against the lowercased
/// task name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRules {
    #[serde(default = "default_category_rules")]
    pub category_rules: Vec<CategoryRule>,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_subtask_rules")]
    pub subtask_rules: Vec<SubtaskRule>,
    #[serde(default = "default_fallback_subtasks")]
    pub fallback_subtasks: Vec<String>,
}

impl Default for EnrichmentRules {
    fn default() -> Self {
        Self {
            category_rules: default_category_rules(),
            default_category: default_category(),
            subtask_rules: default_subtask_rules(),
            fallback_subtasks: default_fallback_subtasks(),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(&["design", "ui", "figma"], "Design"),
        CategoryRule::new(&["api", "backend", "auth", "server"], "Development"),
        CategoryRule::new(&["test", "qa"], "Testing"),
        CategoryRule::new(&["plan", "analysis", "requirement"], "Planning"),
        CategoryRule::new(&["deploy", "release"], "Deployment"),
    ]
}

fn default_subtask_rules() -> Vec<SubtaskRule> {
    vec![
        SubtaskRule::new(
            &["design"],
            &[
                "Create wireframes",
                "Choose color palette",
                "Design components",
                "Review final UI",
            ],
        ),
        SubtaskRule::new(
            &["api"],
            &[
                "Define API endpoints",
                "Implement routes",
                "Connect database",
                "Write tests",
            ],
        ),
        SubtaskRule::new(
            &["auth"],
            &[
                "Create user schema",
                "Build signup",
                "Build login",
                "Add JWT",
                "Test with Postman",
            ],
        ),
        SubtaskRule::new(
            &["research", "plan"],
            &[
                "Gather requirements",
                "Identify constraints",
                "Prepare plan draft",
                "Review plan",
            ],
        ),
    ]
}

fn default_fallback_subtasks() -> Vec<String> {
    [
        "Understand requirements",
        "Implement core logic",
        "Review output",
        "Finalize task",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Rule-table enricher. Keywords are lowercased up front; an empty fallback
/// list or default category is replaced with the built-in one so every task
/// gets a category and at least one subtask.
#[derive(Debug, Clone, Default)]
pub struct KeywordEnricher {
    rules: EnrichmentRules,
}

impl KeywordEnricher {
    pub fn new(mut rules: EnrichmentRules) -> Self {
        for rule in &mut rules.category_rules {
            rule.keywords.iter_mut().for_each(|k| *k = k.to_lowercase());
        }
        for rule in &mut rules.subtask_rules {
            rule.keywords.iter_mut().for_each(|k| *k = k.to_lowercase());
        }
        if rules.default_category.trim().is_empty() {
            rules.default_category = default_category();
        }
        if rules.fallback_subtasks.is_empty() {
            rules.fallback_subtasks = default_fallback_subtasks();
        }
        Self { rules }
    }

    pub fn rules(&self) -> &EnrichmentRules {
        &self.rules
    }

    pub fn categorize(&self, name: &str) -> &str {
        let lowered = name.to_lowercase();
        self.rules
            .category_rules
            .iter()
            .find(|rule| matches_any(&rule.keywords, &lowered))
            .map(|rule| rule.category.as_str())
            .unwrap_or(self.rules.default_category.as_str())
    }

    pub fn subtasks_for(&self, name: &str) -> &[String] {
        let lowered = name.to_lowercase();
        self.rules
            .subtask_rules
            .iter()
            .find(|rule| !rule.subtasks.is_empty() && matches_any(&rule.keywords, &lowered))
            .map(|rule| rule.subtasks.as_slice())
            .unwrap_or(self.rules.fallback_subtasks.as_slice())
    }
}

impl TaskEnricher for KeywordEnricher {
    fn enrich(&self, task: &mut Task) {
        task.category = Some(self.categorize(&task.name).to_string());
        task.subtasks = self
            .subtasks_for(&task.name)
            .iter()
            .map(Subtask::new)
            .collect();
        task.explanation = Some(format!(
            "This task is important because it ensures \"{}\" is completed in a structured way.",
            task.name
        ));
        task.expected_output = Some(format!(
            "A completed and functional \"{}\" ready for integration.",
            task.name
        ));
    }
}
