//! Flattened, reconciled record every renderer reads.
//!
//! The Markdown exporter renders from `ResumeView`, and the preview endpoint
//! hands the same record to the client's PDF and image templates, so a period
//! or a skill label reads the same in every format.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::resume::{ResumeDocument, Template};
use crate::resume::reconcile::{resolve_education_period, resolve_work_period};
use crate::resume::templates::{template_info, TemplateInfo};

static BULLET_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n|•|- ").expect("valid bullet split regex"));

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub template: Template,
    pub template_info: TemplateInfo,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub about: String,
    pub photo_url: String,
    pub github_url: String,
    pub website: String,
    pub skills: Vec<SkillView>,
    pub experience: Vec<ExperienceView>,
    pub education: Vec<EducationView>,
    pub github_projects: Vec<ProjectView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillView {
    pub name: String,
    pub level: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceView {
    pub position: String,
    pub company: String,
    pub period: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationView {
    pub institution: String,
    pub degree: String,
    pub years: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub name: String,
    pub url: String,
    pub description: String,
    pub stars: Option<u64>,
}

pub fn build_view(doc: &ResumeDocument) -> ResumeView {
    let p = &doc.profile;
    ResumeView {
        template: doc.template,
        template_info: template_info(doc.template),
        name: p.name.clone(),
        email: p.email.clone(),
        phone: p.phone.clone(),
        about: p.about.clone(),
        photo_url: p.photo_url.clone(),
        github_url: p.github_url.clone(),
        website: p.website.clone(),
        skills: doc
            .skills
            .iter()
            .map(|s| SkillView {
                name: s.name.clone(),
                level: s.level,
            })
            .collect(),
        experience: doc
            .experience
            .iter()
            .map(|e| ExperienceView {
                position: e.position.clone(),
                company: e.company.clone(),
                period: resolve_work_period(e),
                bullets: bullets_from_text(&e.description),
            })
            .collect(),
        education: doc
            .education
            .iter()
            .map(|e| EducationView {
                institution: e.institution.clone(),
                degree: e.degree.clone(),
                years: resolve_education_period(e),
            })
            .collect(),
        github_projects: doc
            .github_projects
            .iter()
            .map(|r| ProjectView {
                name: r.name.clone(),
                url: r.url.clone(),
                description: r.description.clone(),
                stars: r.stars,
            })
            .collect(),
    }
}

/// Splits a free-text description into bullet points on newlines and `•` / `- `
/// markers. Text with no usable markers becomes a single bullet.
pub fn bullets_from_text(text: &str) -> Vec<String> {
    let t = text.trim();
    if t.is_empty() {
        return Vec::new();
    }
    let parts: Vec<String> = BULLET_SPLIT_RE
        .split(t)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if parts.is_empty() {
        vec![t.to_string()]
    } else {
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_bullets_split_on_markers() {
        assert_eq!(
            bullets_from_text("- Built API\n- Cut latency 30%"),
            vec!["Built API", "Cut latency 30%"]
        );
        assert_eq!(bullets_from_text("• one • two"), vec!["one", "two"]);
    }

    #[test]
    fn test_bullets_fall_back_to_whole_text() {
        assert_eq!(
            bullets_from_text("Single sentence about the job."),
            vec!["Single sentence about the job."]
        );
        assert_eq!(bullets_from_text("•"), vec!["•"]);
        assert!(bullets_from_text("   ").is_empty());
    }

    #[test]
    fn test_view_uses_reconciled_periods() {
        let doc = normalize(&json!({
            "experience": [{"company": "Acme", "startDate": "2021", "current": true}],
            "education": [{"institution": "MSU", "startYear": "2015", "endYear": "2019"}],
        }));
        let view = build_view(&doc);
        assert_eq!(view.experience[0].period, "2021 - Present");
        assert_eq!(view.education[0].years, "2015-2019");
    }

    #[test]
    fn test_view_carries_template_info() {
        let doc = normalize(&json!({"template": "academic"}));
        let view = build_view(&doc);
        assert_eq!(view.template, Template::Academic);
        assert_eq!(view.template_info.id, "academic");
    }
}
