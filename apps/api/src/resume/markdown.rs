//! Markdown exporter.
//!
//! Section order is fixed: title, contacts, About, Skills, Experience,
//! Education, GitHub Projects. A section whose data is empty is left out
//! entirely, heading included.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::models::resume::ResumeDocument;
use crate::resume::view::{build_view, EducationView, ProjectView, ResumeView, SkillView};

const UNNAMED: &str = "Unnamed";
const UNTITLED_POSITION: &str = "Position";

/// Result object handed back to the client. Export never fails past this point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl ExportOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_name: None,
            content: None,
            download_url: None,
        }
    }
}

pub fn build_markdown(doc: &ResumeDocument) -> String {
    render_view(&build_view(doc))
}

fn render_view(view: &ResumeView) -> String {
    let mut lines: Vec<String> = Vec::new();

    let title = if view.name.is_empty() {
        UNNAMED
    } else {
        view.name.as_str()
    };
    lines.push(format!("# {title}"));
    lines.push(String::new());

    let mut contacts = Vec::new();
    if !view.email.is_empty() {
        contacts.push(format!(
            "Email: {}",
            markdown_link(&view.email, &format!("mailto:{}", view.email))
        ));
    }
    if !view.phone.is_empty() {
        contacts.push(format!("Phone: {}", view.phone));
    }
    if !view.github_url.is_empty() {
        contacts.push(format!(
            "GitHub: {}",
            markdown_link(&view.github_url, &view.github_url)
        ));
    }
    if !view.website.is_empty() {
        contacts.push(format!(
            "Website: {}",
            markdown_link(&view.website, &view.website)
        ));
    }
    if !contacts.is_empty() {
        lines.push(contacts.join(" • "));
        lines.push(String::new());
    }

    if !view.about.is_empty() {
        lines.push("## About".to_string());
        lines.push(view.about.clone());
        lines.push(String::new());
    }

    let skills: Vec<_> = view.skills.iter().filter_map(skill_line).collect();
    push_section(&mut lines, "## Skills", skills);

    if !view.experience.is_empty() {
        lines.push("## Experience".to_string());
        for exp in &view.experience {
            let position = if exp.position.is_empty() {
                UNTITLED_POSITION
            } else {
                exp.position.as_str()
            };
            if exp.company.is_empty() {
                lines.push(format!("### {position}"));
            } else {
                lines.push(format!("### {position} — {}", exp.company));
            }
            if !exp.period.is_empty() {
                lines.push(format!("_{}_", exp.period));
            }
            lines.extend(exp.bullets.iter().map(|b| format!("- {b}")));
            lines.push(String::new());
        }
    }

    let education: Vec<_> = view.education.iter().filter_map(education_line).collect();
    push_section(&mut lines, "## Education", education);

    let projects: Vec<_> = view.github_projects.iter().filter_map(project_line).collect();
    push_section(&mut lines, "## GitHub Projects", projects);

    lines.join("\n")
}

/// Heading plus body, or nothing when the body is empty.
fn push_section(lines: &mut Vec<String>, heading: &str, body: Vec<String>) {
    if body.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    lines.extend(body);
    lines.push(String::new());
}

fn skill_line(skill: &SkillView) -> Option<String> {
    if skill.name.is_empty() {
        return None;
    }
    Some(match skill.level {
        Some(level) => format!("- {} — {level}/5", skill.name),
        None => format!("- {}", skill.name),
    })
}

/// `- **degree**, institution (years)` with empty parts left out.
fn education_line(edu: &EducationView) -> Option<String> {
    let mut head = Vec::new();
    if !edu.degree.is_empty() {
        head.push(format!("**{}**", edu.degree));
    }
    if !edu.institution.is_empty() {
        head.push(edu.institution.clone());
    }
    let mut line = head.join(", ");
    if !edu.years.is_empty() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&format!("({})", edu.years));
    }
    (!line.is_empty()).then(|| format!("- {line}"))
}

fn project_line(repo: &ProjectView) -> Option<String> {
    if repo.name.is_empty() && repo.url.is_empty() {
        return None;
    }
    let mut line = format!("- {}", markdown_link(&repo.name, &repo.url));
    if let Some(stars) = repo.stars {
        line.push_str(&format!(" ⭐ {stars}"));
    }
    if !repo.description.is_empty() {
        line.push_str(&format!(" — {}", repo.description));
    }
    Some(line)
}

fn markdown_link(text: &str, url: &str) -> String {
    if url.is_empty() {
        return text.to_string();
    }
    let label = if text.is_empty() { url } else { text };
    format!("[{label}]({url})")
}

/// `{name_with_underscores}_{unix_millis}.md`, or `resume_…` when unnamed.
pub fn export_file_name(doc: &ResumeDocument) -> String {
    let stem = doc
        .profile
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "resume" } else { stem.as_str() };
    format!("{stem}_{}.md", Utc::now().timestamp_millis())
}

pub fn export_markdown(doc: &ResumeDocument) -> ExportOutcome {
    match catch_unwind(AssertUnwindSafe(|| build_markdown(doc))) {
        Ok(content) => {
            let file_name = export_file_name(doc);
            info!("Built Markdown export {file_name} ({} bytes)", content.len());
            ExportOutcome {
                success: true,
                message: "Markdown export ready".to_string(),
                file_name: Some(file_name),
                content: Some(content),
                download_url: None,
            }
        }
        Err(_) => {
            error!("Markdown export panicked");
            ExportOutcome::failed("Failed to build the Markdown export")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::normalize::normalize;
    use serde_json::json;

    fn full_doc() -> ResumeDocument {
        normalize(&json!({
            "profile": {
                "name": "Ivan Petrov",
                "email": "ivan@example.com",
                "phone": "+7 900 123 45 67",
                "githubUrl": "https://github.com/ivan",
                "summary": "Backend developer."
            },
            "skills": [{"name": "Rust", "level": 5}, "SQL"],
            "experience": [{
                "company": "Acme",
                "position": "Engineer",
                "startDate": "2020",
                "current": true,
                "description": "- Built API\n- Cut latency 30%"
            }],
            "education": [{"institution": "MSU", "degree": "BSc", "year": "2019"}],
            "githubProjects": [
                {"name": "kv", "url": "https://github.com/ivan/kv", "stars": 4, "description": "KV store"},
                {"name": "notes"}
            ]
        }))
    }

    #[test]
    fn test_full_document_layout() {
        let md = build_markdown(&full_doc());
        let expected = "\
# Ivan Petrov

Email: [ivan@example.com](mailto:ivan@example.com) • Phone: +7 900 123 45 67 • GitHub: [https://github.com/ivan](https://github.com/ivan)

## About
Backend developer.

## Skills
- Rust — 5/5
- SQL

## Experience
### Engineer — Acme
_2020 - Present_
- Built API
- Cut latency 30%

## Education
- **BSc**, MSU (2019)

## GitHub Projects
- [kv](https://github.com/ivan/kv) ⭐ 4 — KV store
- notes
";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_empty_skills_emit_no_heading() {
        let mut doc = full_doc();
        doc.skills.clear();
        let md = build_markdown(&doc);
        assert!(!md.contains("Skills"));
        assert!(md.contains("## Experience"));
    }

    #[test]
    fn test_empty_document_has_only_title() {
        let md = build_markdown(&ResumeDocument::default());
        assert_eq!(md, "# Unnamed\n");
        assert!(!md.contains("##"));
    }

    #[test]
    fn test_blank_entries_leave_no_headings() {
        let doc = normalize(&json!({
            "education": [{}],
            "skills": [{}],
            "githubProjects": [{}]
        }));
        assert_eq!(build_markdown(&doc), "# Unnamed\n");
    }

    #[test]
    fn test_education_omits_empty_parts() {
        let doc = normalize(&json!({"education": [
            {"institution": "Coursera"},
            {"degree": "MSc", "startYear": "2019", "endYear": "2021"},
            {}
        ]}));
        let md = build_markdown(&doc);
        assert!(md.contains("- Coursera\n"));
        assert!(md.contains("- **MSc** (2019-2021)\n"));
        assert!(!md.contains("- \n"));
    }

    #[test]
    fn test_experience_without_company_or_period() {
        let doc = normalize(&json!({"experience": [{"description": "Kept the lights on"}]}));
        let md = build_markdown(&doc);
        assert!(md.contains("### Position\n- Kept the lights on\n"));
    }

    #[test]
    fn test_markdown_matches_view_period() {
        let doc = full_doc();
        let view = build_view(&doc);
        assert!(build_markdown(&doc).contains(&format!("_{}_", view.experience[0].period)));
    }

    #[test]
    fn test_export_outcome_and_file_name() {
        let outcome = export_markdown(&full_doc());
        assert!(outcome.success);
        let name = outcome.file_name.unwrap();
        assert!(name.starts_with("Ivan_Petrov_"));
        assert!(name.ends_with(".md"));
        assert!(outcome.content.unwrap().starts_with("# Ivan Petrov"));
    }

    #[test]
    fn test_unnamed_export_file_name() {
        assert!(export_file_name(&ResumeDocument::default()).starts_with("resume_"));
    }
}
