//! Skill vocabulary: the controlled list of skill names the scorer can recognise in job text.
//!
//! The scorer only talks to the `SkillMatcher` trait so tests (and callers with their own
//! taxonomy) can inject a small fixed vocabulary.

use std::collections::HashMap;

/// Recognises skills in free text and maps spellings onto canonical names.
pub trait SkillMatcher: Send + Sync {
    /// Canonical skill names found in `text`, in order of first appearance, without repeats.
    fn extract_skills(&self, text: &str) -> Vec<String>;

    /// Canonical spelling of a skill name; unknown names come back unchanged.
    fn canonicalize(&self, name: &str) -> String {
        name.trim().to_string()
    }
}

/// Tech skills recognised out of the box.
const DEFAULT_SKILLS: &[&str] = &[
    "Python", "JavaScript", "Java", "C++", "C#", "Ruby", "Go", "Rust", "React", "Angular", "Vue",
    "Node.js", "Django", "Flask", "Spring", "AWS", "Azure", "GCP", "Docker", "Kubernetes",
    "Terraform", "PostgreSQL", "MySQL", "MongoDB", "Redis", "Elasticsearch", "TensorFlow",
    "PyTorch", "Scikit-learn", "Pandas", "NumPy", "Git", "CI/CD", "Agile", "Scrum", "REST",
    "GraphQL", "Microservices", "Linux", "Bash", "PowerShell", "HTML", "CSS", "TypeScript", "SQL",
    "Machine Learning", "FastAPI", "Kafka",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("golang", "Go"),
    ("postgres", "PostgreSQL"),
    ("k8s", "Kubernetes"),
    ("nodejs", "Node.js"),
    ("node", "Node.js"),
    ("reactjs", "React"),
    ("react.js", "React"),
    ("vue.js", "Vue"),
    ("sklearn", "Scikit-learn"),
    ("ml", "Machine Learning"),
    ("restful", "REST"),
];

#[derive(Debug, Clone)]
struct Entry {
    canonical: String,
    tokens: Vec<String>,
}

/// Exact, case-insensitive token matcher over a fixed skill list.
#[derive(Debug, Clone, Default)]
pub struct SkillVocabulary {
    entries: Vec<Entry>,
    /// first token → entry indices, longest phrase first
    by_first_token: HashMap<String, Vec<usize>>,
    /// lower-cased spelling → canonical name
    canonical_by_key: HashMap<String, String>,
}

impl SkillVocabulary {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for skill in skills {
            let name = skill.as_ref().trim();
            if !name.is_empty() {
                vocabulary.insert(name, name);
            }
        }
        vocabulary
    }

    /// Registers an alternative spelling for an existing or new canonical skill.
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.insert(alias.trim(), canonical.trim());
        self
    }

    fn insert(&mut self, spelling: &str, canonical: &str) {
        let key = spelling.to_lowercase();
        if self.canonical_by_key.contains_key(&key) {
            return;
        }
        let tokens = tokenize(spelling);
        let Some(first) = tokens.first().cloned() else {
            return;
        };

        self.canonical_by_key.insert(key, canonical.to_string());
        let index = self.entries.len();
        self.entries.push(Entry {
            canonical: canonical.to_string(),
            tokens,
        });

        let slots = self.by_first_token.entry(first).or_default();
        slots.push(index);
        let entries = &self.entries;
        slots.sort_by(|a, b| entries[*b].tokens.len().cmp(&entries[*a].tokens.len()));
    }

    /// Longest vocabulary phrase starting at `tokens[start]`.
    fn match_at(&self, tokens: &[String], start: usize) -> Option<&Entry> {
        self.by_first_token
            .get(&tokens[start])?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|entry| tokens[start..].starts_with(&entry.tokens))
    }

    /// Splits slash-joined tokens ("react/redux") unless the whole token is a known skill.
    fn expand_tokens(&self, tokens: Vec<String>) -> Vec<String> {
        let mut expanded = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.contains('/') && !self.by_first_token.contains_key(&token) {
                expanded.extend(
                    token
                        .split('/')
                        .filter(|part| !part.is_empty())
                        .map(str::to_string),
                );
            } else {
                expanded.push(token);
            }
        }
        expanded
    }
}

impl SkillVocabulary {
    /// Stock tech vocabulary with common alternative spellings.
    pub fn standard() -> Self {
        DEFAULT_ALIASES
            .iter()
            .fold(Self::new(DEFAULT_SKILLS), |vocab, (alias, canonical)| {
                vocab.with_alias(alias, canonical)
            })
    }
}

impl SkillMatcher for SkillVocabulary {
    fn extract_skills(&self, text: &str) -> Vec<String> {
        let tokens = self.expand_tokens(tokenize(text));
        let mut found: Vec<String> = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            match self.match_at(&tokens, i) {
                Some(entry) => {
                    if !found.iter().any(|s| s.eq_ignore_ascii_case(&entry.canonical)) {
                        found.push(entry.canonical.clone());
                    }
                    i += entry.tokens.len();
                }
                None => i += 1,
            }
        }

        found
    }

    fn canonicalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        self.canonical_by_key
            .get(&trimmed.to_lowercase())
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }
}

/// Lower-cased word tokens. `+ # . / -` stay inside tokens so "c++", "node.js" and
/// "ci/cd" survive; sentence punctuation at the edges is dropped.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '/' | '-')))
        .map(|raw| raw.trim_end_matches(['.', '-', '/']).trim_start_matches(['.', '-', '/']))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
