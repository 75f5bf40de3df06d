//! Recommendation engine — advisory suggestions computed from a normalized résumé.
//!
//! The rules are a static table. Each row is independent and every matching row
//! fires; there is no decision tree. Mutually exclusive pairs (missing vs.
//! malformed email, short vs. long summary) are encoded in the predicates.
//!
//! Output contract relied on by the editor UI:
//! - no two items share the same text
//! - ordered by category rank, stable within a category
//! - at most `MAX_RECOMMENDATIONS` items

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::error;

use crate::models::resume::ResumeDocument;
use crate::resume::reconcile::{resolve_education_period, resolve_work_period};

pub const MAX_RECOMMENDATIONS: usize = 10;

static EMAIL_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email hint regex"));
static PERIOD_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]{4}|[0-9]{2}\.[0-9]{4}).*[-–—].*([0-9]{4}|настоя|now|present)")
        .expect("valid period range regex")
});

/// Lowercase stems of action verbs (RU + EN). Plain substring match.
const ACTION_VERB_STEMS: &[&str] = &[
    "разработ",
    "развит",
    "реализ",
    "внедр",
    "оптимиз",
    "улучш",
    "автоматиз",
    "интегр",
    "поддерж",
    "настро",
    "спроект",
    "тестир",
    "рефактор",
    "develop",
    "implement",
    "optimiz",
    "improv",
    "automat",
    "integrat",
    "build",
    "design",
    "test",
    "refactor",
    "deploy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Profile,
    Content,
    Experience,
    Skills,
    Education,
    Github,
}

impl Category {
    /// Display order of the suggestions panel.
    pub fn rank(self) -> u8 {
        match self {
            Category::Profile => 1,
            Category::Content => 2,
            Category::Experience => 3,
            Category::Skills => 4,
            Category::Education => 5,
            Category::Github => 6,
        }
    }
}

/// Editor form field a suggestion deep-links to. The string forms are shared
/// with the form layer's focus logic and must not change independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldId {
    #[serde(rename = "profile-name")]
    ProfileName,
    #[serde(rename = "profile-email")]
    ProfileEmail,
    #[serde(rename = "profile-phone")]
    ProfilePhone,
    #[serde(rename = "profile-about")]
    ProfileAbout,
    #[serde(rename = "skills-skill")]
    SkillsSkill,
    #[serde(rename = "skills-level")]
    SkillsLevel,
    #[serde(rename = "experience-company")]
    ExperienceCompany,
    #[serde(rename = "experience-description")]
    ExperienceDescription,
    #[serde(rename = "experience-period")]
    ExperiencePeriod,
    #[serde(rename = "education-institution")]
    EducationInstitution,
    #[serde(rename = "education-years")]
    EducationYears,
    #[serde(rename = "github-username")]
    GithubUsername,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub category: Category,
    pub target: FieldId,
    pub text: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    pub completeness_score: u8,
}

struct Rule {
    category: Category,
    target: FieldId,
    text: &'static str,
    applies: fn(&ResumeDocument) -> bool,
}

const RULES: &[Rule] = &[
    // ── profile ──────────────────────────────────────────────────────────────
    Rule {
        category: Category::Profile,
        target: FieldId::ProfileName,
        text: "Add your full name: it is the first thing a recruiter sees.",
        applies: |d| d.profile.name.is_empty(),
    },
    Rule {
        category: Category::Profile,
        target: FieldId::ProfileEmail,
        text: "Add an email address so recruiters can reach you.",
        applies: |d| d.profile.email.is_empty(),
    },
    Rule {
        category: Category::Profile,
        target: FieldId::ProfileEmail,
        text: "Check your email: the address looks malformed.",
        applies: |d| !d.profile.email.is_empty() && !EMAIL_HINT_RE.is_match(&d.profile.email),
    },
    Rule {
        category: Category::Profile,
        target: FieldId::ProfilePhone,
        text: "Add a phone number: it often speeds up contact with recruiters.",
        applies: |d| d.profile.phone.is_empty(),
    },
    Rule {
        category: Category::Profile,
        target: FieldId::ProfilePhone,
        text: "Check your phone number: it seems to have too few digits.",
        applies: |d| !d.profile.phone.is_empty() && digit_count(&d.profile.phone) < 10,
    },
    Rule {
        category: Category::Content,
        target: FieldId::ProfileAbout,
        text: "The About section is too short. State your specialization, key stack and role (Frontend, Backend, QA).",
        applies: |d| word_count(&d.profile.about) < 12,
    },
    Rule {
        category: Category::Content,
        target: FieldId::ProfileAbout,
        text: "The About section is too long. Cut it to 3–5 sentences: who you are, your stack, your strengths and what you are looking for.",
        applies: |d| word_count(&d.profile.about) > 80,
    },
    // ── skills ───────────────────────────────────────────────────────────────
    Rule {
        category: Category::Skills,
        target: FieldId::SkillsSkill,
        text: "Fewer than 5 skills listed: add key technologies (languages, frameworks, tools).",
        applies: |d| d.skills.len() < 5,
    },
    Rule {
        category: Category::Skills,
        target: FieldId::SkillsSkill,
        text: "Some skills are listed twice. Remove duplicates to keep the résumé tidy.",
        applies: |d| has_duplicates(d.skills.iter().map(|s| s.name.to_lowercase())),
    },
    Rule {
        category: Category::Skills,
        target: FieldId::SkillsLevel,
        text: "Many skills are rated 1–2. Keep the key technologies and highlight your strengths (level 3–5).",
        applies: |d| d.skills.iter().filter(|s| s.level.is_some_and(|l| l <= 2)).count() >= 3,
    },
    Rule {
        category: Category::Skills,
        target: FieldId::SkillsLevel,
        text: "None of your skills is rated 4–5. Mark 2–3 strong technologies so a recruiter grasps your profile faster.",
        applies: |d| {
            d.skills.len() >= 5 && !d.skills.iter().any(|s| s.level.is_some_and(|l| l >= 4))
        },
    },
    // ── experience ───────────────────────────────────────────────────────────
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceCompany,
        text: "Missing experience: add jobs or projects. Study and pet projects count for IT roles.",
        applies: |d| d.experience.is_empty(),
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceDescription,
        text: "Some experience entries have no description. Add the tasks, the stack and the outcome.",
        applies: |d| d.experience.iter().any(|e| e.description.is_empty()),
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceDescription,
        text: "Some experience descriptions are too short. Add 1–3 points: what you did, which technologies, what effect.",
        applies: |d| {
            d.experience
                .iter()
                .any(|e| !e.description.is_empty() && word_count(&e.description) < 5)
        },
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceDescription,
        text: "Use action verbs in experience descriptions: developed, implemented, optimized, integrated.",
        applies: |d| {
            d.experience
                .iter()
                .any(|e| !e.description.is_empty() && !contains_action_verb(&e.description))
        },
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceDescription,
        text: "Add metrics to experience descriptions (%, time, user counts, speed, SLA). Figures make a résumé much stronger.",
        applies: |d| {
            d.experience
                .iter()
                .any(|e| !e.description.is_empty() && !has_digit(&e.description))
        },
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperiencePeriod,
        text: "Specify the period of each job or project (for example 2023–2024).",
        applies: any_experience_without_period,
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperiencePeriod,
        text: "Check the period format (for example 2024–2025 or 01.2024–12.2025).",
        applies: |d| {
            !any_experience_without_period(d)
                && d
                    .experience
                    .iter()
                    .any(|e| !e.period.is_empty() && !looks_like_range(&e.period))
        },
    },
    Rule {
        category: Category::Experience,
        target: FieldId::ExperienceCompany,
        text: "Some experience entries repeat the same company and position. Check for an accidental duplicate.",
        applies: |d| {
            has_duplicates(d.experience.iter().map(|e| {
                if e.company.is_empty() && e.position.is_empty() {
                    String::new()
                } else {
                    format!("{}|{}", e.company.to_lowercase(), e.position.to_lowercase())
                }
            }))
        },
    },
    // ── education ────────────────────────────────────────────────────────────
    Rule {
        category: Category::Education,
        target: FieldId::EducationInstitution,
        text: "Add education or courses (university, online courses, certificates).",
        applies: |d| d.education.is_empty(),
    },
    Rule {
        category: Category::Education,
        target: FieldId::EducationYears,
        text: "Add the years of study to each education entry (for example 2022–2026).",
        applies: |d| d.education.iter().any(|e| resolve_education_period(e).is_empty()),
    },
    // ── github ───────────────────────────────────────────────────────────────
    Rule {
        category: Category::Github,
        target: FieldId::GithubUsername,
        text: "Connect GitHub and add 2–5 repositories. It is a strong plus for IT roles.",
        applies: |d| d.github_projects.is_empty(),
    },
    Rule {
        category: Category::Github,
        target: FieldId::GithubUsername,
        text: "More than 5 GitHub repositories: keep the 3–5 most relevant ones with good descriptions and stars.",
        applies: |d| d.github_projects.len() > 5,
    },
    Rule {
        category: Category::Github,
        target: FieldId::GithubUsername,
        text: "Some GitHub repositories have no description. Add what the project does and its technologies.",
        applies: |d| d.github_projects.iter().any(|r| r.description.is_empty()),
    },
    Rule {
        category: Category::Github,
        target: FieldId::GithubUsername,
        text: "Check your GitHub repository links: some projects have no URL.",
        applies: |d| d.github_projects.iter().any(|r| r.url.is_empty()),
    },
    Rule {
        category: Category::Github,
        target: FieldId::GithubUsername,
        text: "No GitHub stars is fine, but make sure key projects have clear descriptions and a README.",
        applies: |d| {
            d.github_projects.len() >= 2
                && d.github_projects.iter().all(|r| r.stars.unwrap_or(0) == 0)
        },
    },
];

/// Evaluates every rule against `doc`, then dedups, orders and caps the result.
pub fn get_recommendations(doc: &ResumeDocument) -> Vec<Recommendation> {
    let fired = RULES
        .iter()
        .filter(|rule| (rule.applies)(doc))
        .map(|rule| Recommendation {
            category: rule.category,
            target: rule.target,
            text: rule.text.to_string(),
            priority: classify_priority(rule.text),
        })
        .collect();

    let mut recommendations = dedup_by_text(fired);
    recommendations.sort_by_key(|r| r.category.rank());
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// Call-site wrapper: a failing engine yields no suggestions instead of an error.
pub fn recommend_or_empty(doc: &ResumeDocument) -> Vec<Recommendation> {
    match catch_unwind(AssertUnwindSafe(|| get_recommendations(doc))) {
        Ok(recommendations) => recommendations,
        Err(_) => {
            error!("Recommendation engine panicked; returning no recommendations");
            Vec::new()
        }
    }
}

pub fn build_report(doc: &ResumeDocument) -> RecommendationReport {
    let recommendations = recommend_or_empty(doc);
    let completeness_score = completeness_score(recommendations.len());
    RecommendationReport {
        recommendations,
        completeness_score,
    }
}

/// 100 with no suggestions, minus 10 per suggestion, floored at 0.
pub fn completeness_score(recommendation_count: usize) -> u8 {
    100 - (recommendation_count.min(MAX_RECOMMENDATIONS) as u8) * 10
}

/// Priority is read off the message: contact details and missing experience are
/// high, metrics and GitHub are medium, everything else low.
pub fn classify_priority(text: &str) -> Priority {
    let t = text.to_lowercase();
    if ["email", "phone", "missing experience"]
        .iter()
        .any(|k| t.contains(k))
    {
        Priority::High
    } else if ["metric", "number", "github"].iter().any(|k| t.contains(k)) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

fn dedup_by_text(items: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|r| seen.insert(r.text.clone()))
        .collect()
}

/// True when a non-empty key repeats.
fn has_duplicates(keys: impl Iterator<Item = String>) -> bool {
    let mut seen = HashSet::new();
    keys.filter(|k| !k.is_empty()).any(|k| !seen.insert(k))
}

fn any_experience_without_period(d: &ResumeDocument) -> bool {
    d.experience
        .iter()
        .any(|e| resolve_work_period(e).is_empty() && e.start.is_empty())
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

fn contains_action_verb(text: &str) -> bool {
    let t = text.to_lowercase();
    ACTION_VERB_STEMS.iter().any(|stem| t.contains(stem))
}

fn looks_like_range(text: &str) -> bool {
    PERIOD_RANGE_RE.is_match(text)
}
