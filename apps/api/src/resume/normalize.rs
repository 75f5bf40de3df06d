//! Normalizer — turns any stored or client-sent résumé JSON into a `ResumeDocument`.
//!
//! Several document shapes exist in the wild (`summary` instead of `about`,
//! `github` instead of `githubProjects`, bare-string skills, string levels,
//! `startDate`/`from`/`start` for the same field). All of them are absorbed here
//! and nowhere else.
//!
//! `normalize` is total: garbage degrades to defaults, it never fails.

use serde_json::{Map, Value};

use crate::models::resume::{
    EducationEntry, ExperienceEntry, GithubProject, Profile, ResumeDocument, Section, Skill,
    Template,
};

const START_ALIASES: &[&str] = &["startDate", "start", "from"];
const END_ALIASES: &[&str] = &["endDate", "end", "to"];

pub fn normalize(raw: &Value) -> ResumeDocument {
    let Some(obj) = raw.as_object() else {
        return ResumeDocument::default();
    };

    let profile = obj
        .get("profile")
        .and_then(Value::as_object)
        .map(normalize_profile)
        .unwrap_or_default();

    let github_projects: Vec<GithubProject> = ["githubProjects", "github"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(normalize_github_project).collect())
        .unwrap_or_default();

    ResumeDocument {
        profile,
        skills: array_of(obj, "skills").filter_map(normalize_skill).collect(),
        education: array_of(obj, "education")
            .filter_map(Value::as_object)
            .map(normalize_education)
            .collect(),
        experience: array_of(obj, "experience")
            .filter_map(Value::as_object)
            .map(normalize_experience)
            .collect(),
        github_projects,
        template: Template::from_id(&text(obj.get("template"))),
    }
}

/// Normalizes one raw entry and appends it to `section`, returning the entry id.
/// `None` when the value has no usable shape for that section.
pub fn add_raw_entry(doc: &mut ResumeDocument, section: Section, raw: &Value) -> Option<String> {
    let id = match section {
        Section::Skills => doc.add_skill(normalize_skill(raw)?),
        Section::Education => doc.add_education(normalize_education(raw.as_object()?)),
        Section::Experience => doc.add_experience(normalize_experience(raw.as_object()?)),
        Section::GithubProjects => doc.add_github_project(normalize_github_project(raw)?),
    };
    Some(id)
}

fn normalize_profile(p: &Map<String, Value>) -> Profile {
    Profile {
        name: text(p.get("name")),
        email: text(p.get("email")),
        phone: text(p.get("phone")),
        about: first_text(p, &["about", "summary"]),
        photo_url: first_text(p, &["photoUrl", "photo"]),
        github_url: text(p.get("githubUrl")),
        website: text(p.get("website")),
    }
}

fn normalize_skill(v: &Value) -> Option<Skill> {
    match v {
        Value::String(name) => Some(Skill {
            id: None,
            name: name.trim().to_string(),
            level: None,
        }),
        Value::Object(s) => Some(Skill {
            id: entry_id(s),
            name: text(s.get("name")),
            level: s.get("level").and_then(parse_level),
        }),
        _ => None,
    }
}

fn normalize_education(e: &Map<String, Value>) -> EducationEntry {
    EducationEntry {
        id: entry_id(e),
        institution: text(e.get("institution")),
        degree: text(e.get("degree")),
        years: text(e.get("years")),
        year: text(e.get("year")),
        start_year: text(e.get("startYear")),
        end_year: text(e.get("endYear")),
    }
}

fn normalize_experience(e: &Map<String, Value>) -> ExperienceEntry {
    ExperienceEntry {
        id: entry_id(e),
        company: text(e.get("company")),
        position: text(e.get("position")),
        description: text(e.get("description")),
        period: text(e.get("period")),
        start: first_text(e, START_ALIASES),
        end: first_text(e, END_ALIASES),
        current: truthy(e.get("current")),
    }
}

fn normalize_github_project(v: &Value) -> Option<GithubProject> {
    let r = v.as_object()?;
    Some(GithubProject {
        id: entry_id(r),
        name: text(r.get("name")),
        description: text(r.get("description")),
        url: first_text(r, &["url", "html_url"]),
        stars: r.get("stars").and_then(parse_count),
    })
}

fn array_of<'a>(obj: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Scalar coercion: trimmed strings, numbers and booleans as text, everything else empty.
fn text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// First non-empty value among `keys`, in order.
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| text(obj.get(*k)))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn entry_id(obj: &Map<String, Value>) -> Option<String> {
    Some(text(obj.get("id"))).filter(|id| !id.is_empty())
}

fn as_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_level(v: &Value) -> Option<u8> {
    as_number(v).map(|n| n.round().clamp(1.0, 5.0) as u8)
}

fn parse_count(v: &Value) -> Option<u64> {
    as_number(v).map(|n| n.round().max(0.0) as u64)
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
