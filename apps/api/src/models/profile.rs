use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::MatchError;
use crate::models::job::SalaryPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl TryFrom<String> for Proficiency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "basic" | "novice" => Ok(Proficiency::Beginner),
            "intermediate" | "mid" => Ok(Proficiency::Intermediate),
            "advanced" => Ok(Proficiency::Advanced),
            "expert" => Ok(Proficiency::Expert),
            other => Err(format!("unknown proficiency level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredSalary {
    pub amount: f64,
    pub currency: Option<String>,
    #[serde(default)]
    pub period: SalaryPeriod,
}

impl DesiredSalary {
    pub fn annualized(&self) -> f64 {
        self.amount * self.period.annual_factor()
    }
}

/// Parsed résumé, read-only input to the scorer.
///
/// Skill names are unique ignoring case. Build through [`ResumeProfile::new`]
/// (deserialization goes through the same path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResumeProfileInput")]
pub struct ResumeProfile {
    skills: Vec<SkillEntry>,
    experience_years: f64,
    desired_salary: Option<DesiredSalary>,
    preferred_locations: Vec<String>,
    target_titles: Vec<String>,
    #[serde(skip)]
    skill_index: HashMap<String, Proficiency>,
}

impl ResumeProfile {
    pub fn new(
        skills: Vec<SkillEntry>,
        experience_years: f64,
        desired_salary: Option<DesiredSalary>,
        preferred_locations: Vec<String>,
        target_titles: Vec<String>,
    ) -> Result<Self, MatchError> {
        if !experience_years.is_finite() || experience_years < 0.0 {
            return Err(MatchError::InvalidArgument(format!(
                "experience_years must be a non-negative number, got {experience_years}"
            )));
        }

        if let Some(desired) = &desired_salary {
            if !desired.amount.is_finite() || desired.amount <= 0.0 {
                return Err(MatchError::InvalidArgument(format!(
                    "desired_salary.amount must be positive, got {}",
                    desired.amount
                )));
            }
        }

        // Merge case-insensitive duplicates: first spelling, highest proficiency
        let mut merged: Vec<SkillEntry> = Vec::with_capacity(skills.len());
        let mut skill_index: HashMap<String, Proficiency> = HashMap::new();
        for skill in skills {
            let name = skill.name.trim();
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            match skill_index.get(&key) {
                Some(existing) if *existing >= skill.proficiency => {}
                Some(_) => {
                    skill_index.insert(key.clone(), skill.proficiency);
                    if let Some(entry) = merged.iter_mut().find(|e| e.name.to_lowercase() == key) {
                        entry.proficiency = skill.proficiency;
                    }
                }
                None => {
                    skill_index.insert(key, skill.proficiency);
                    merged.push(SkillEntry {
                        name: name.to_string(),
                        proficiency: skill.proficiency,
                    });
                }
            }
        }

        Ok(Self {
            skills: merged,
            experience_years,
            desired_salary: desired_salary.map(|d| DesiredSalary {
                currency: d.currency.map(|c| c.to_uppercase()),
                ..d
            }),
            preferred_locations: clean_list(preferred_locations),
            target_titles: clean_list(target_titles),
            skill_index,
        })
    }

    pub fn skills(&self) -> &[SkillEntry] {
        &self.skills
    }

    pub fn experience_years(&self) -> f64 {
        self.experience_years
    }

    pub fn desired_salary(&self) -> Option<&DesiredSalary> {
        self.desired_salary.as_ref()
    }

    pub fn preferred_locations(&self) -> &[String] {
        &self.preferred_locations
    }

    pub fn target_titles(&self) -> &[String] {
        &self.target_titles
    }

    /// Case-insensitive skill lookup.
    pub fn proficiency_of(&self, skill: &str) -> Option<Proficiency> {
        self.skill_index.get(&skill.to_lowercase()).copied()
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Skills arrive either as `{"python": "expert"}` or as `[{"name", "proficiency"}]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkillsInput {
    List(Vec<SkillEntry>),
    Map(HashMap<String, Proficiency>),
}

impl Default for SkillsInput {
    fn default() -> Self {
        SkillsInput::List(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct ResumeProfileInput {
    #[serde(default)]
    skills: SkillsInput,
    #[serde(default)]
    experience_years: f64,
    #[serde(default)]
    desired_salary: Option<DesiredSalary>,
    #[serde(default)]
    preferred_locations: Vec<String>,
    #[serde(default)]
    target_titles: Vec<String>,
}

impl TryFrom<ResumeProfileInput> for ResumeProfile {
    type Error = MatchError;

    fn try_from(input: ResumeProfileInput) -> Result<Self, Self::Error> {
        let skills = match input.skills {
            SkillsInput::List(list) => list,
            SkillsInput::Map(map) => {
                // HashMap order is arbitrary; sort for a reproducible profile
                let mut list: Vec<SkillEntry> = map
                    .into_iter()
                    .map(|(name, proficiency)| SkillEntry { name, proficiency })
                    .collect();
                list.sort_by(|a, b| a.name.cmp(&b.name));
                list
            }
        };

        ResumeProfile::new(
            skills,
            input.experience_years,
            input.desired_salary,
            input.preferred_locations,
            input.target_titles,
        )
    }
}
