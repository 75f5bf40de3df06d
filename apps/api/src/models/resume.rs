use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored résumé row. `data` holds the whole document as written by the last save.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_RESUME_TITLE: &str = "My IT résumé";

/// Personal details block.
///
/// `about` is the only stored copy of the summary text. It is written out under
/// both `about` and the legacy `summary` key so older readers see the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub about: String,
    pub photo_url: String,
    pub github_url: String,
    pub website: String,
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Profile", 8)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("email", &self.email)?;
        s.serialize_field("phone", &self.phone)?;
        s.serialize_field("about", &self.about)?;
        s.serialize_field("summary", &self.about)?;
        s.serialize_field("photoUrl", &self.photo_url)?;
        s.serialize_field("githubUrl", &self.github_url)?;
        s.serialize_field("website", &self.website)?;
        s.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Skill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// 1..=5 when rated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Education entry. `years` is canonical; the rest are read-only legacy shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub institution: String,
    pub degree: String,
    pub years: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_year: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_year: String,
}

/// Work or project entry. `period` is canonical; `start`/`end`/`current` are legacy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company: String,
    pub position: String,
    pub description: String,
    pub period: String,
    #[serde(rename = "startDate", skip_serializing_if = "String::is_empty")]
    pub start: String,
    #[serde(rename = "endDate", skip_serializing_if = "String::is_empty")]
    pub end: String,
    #[serde(skip_serializing_if = "is_false")]
    pub current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GithubProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Minimalist,
    Academic,
    Github,
}

impl Template {
    /// Unknown ids fall back to the minimalist layout.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "academic" => Template::Academic,
            "github" => Template::Github,
            _ => Template::Minimalist,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Minimalist => "minimalist",
            Template::Academic => "academic",
            Template::Github => "github",
        }
    }
}

/// The whole résumé a user edits. Loaded and saved wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub profile: Profile,
    pub skills: Vec<Skill>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub github_projects: Vec<GithubProject>,
    pub template: Template,
}

/// List sections whose entries can be removed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Skills,
    Education,
    Experience,
    GithubProjects,
}

impl Section {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skills" => Some(Section::Skills),
            "education" => Some(Section::Education),
            "experience" => Some(Section::Experience),
            "github" | "githubProjects" | "github-projects" => Some(Section::GithubProjects),
            _ => None,
        }
    }
}

impl ResumeDocument {
    pub fn set_about(&mut self, about: &str) {
        self.profile.about = about.trim().to_string();
    }

    /// Appends a skill and returns its id. Levels outside 1..=5 are clamped.
    pub fn add_skill(&mut self, mut skill: Skill) -> String {
        let id = skill.id.get_or_insert_with(mint_id).clone();
        skill.level = skill.level.map(|l| l.clamp(1, 5));
        self.skills.push(skill);
        id
    }

    pub fn add_education(&mut self, mut entry: EducationEntry) -> String {
        let id = entry.id.get_or_insert_with(mint_id).clone();
        self.education.push(entry);
        id
    }

    pub fn add_experience(&mut self, mut entry: ExperienceEntry) -> String {
        let id = entry.id.get_or_insert_with(mint_id).clone();
        self.experience.push(entry);
        id
    }

    pub fn add_github_project(&mut self, mut project: GithubProject) -> String {
        let id = project.id.get_or_insert_with(mint_id).clone();
        self.github_projects.push(project);
        id
    }

    /// Replaces the GitHub list wholesale, minting ids for imported repos.
    pub fn replace_github_projects(&mut self, projects: Vec<GithubProject>) {
        self.github_projects.clear();
        for project in projects {
            self.add_github_project(project);
        }
    }

    /// Removes the entry with `id` from `section`. Returns false when nothing matched.
    pub fn remove_entry(&mut self, section: Section, id: &str) -> bool {
        fn retain_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> Option<&str>) -> bool {
            let before = items.len();
            items.retain(|item| key(item) != Some(id));
            items.len() != before
        }

        match section {
            Section::Skills => retain_by_id(&mut self.skills, id, |s| s.id.as_deref()),
            Section::Education => retain_by_id(&mut self.education, id, |e| e.id.as_deref()),
            Section::Experience => retain_by_id(&mut self.experience, id, |e| e.id.as_deref()),
            Section::GithubProjects => {
                retain_by_id(&mut self.github_projects, id, |p| p.id.as_deref())
            }
        }
    }
}

fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, level: Option<u8>) -> Skill {
        Skill {
            id: None,
            name: name.to_string(),
            level,
        }
    }

    #[test]
    fn test_profile_serializes_about_under_both_names() {
        let profile = Profile {
            about: "Backend engineer".to_string(),
            ..Default::default()
        };
        let v = serde_json::to_value(&profile).unwrap();
        assert_eq!(v["about"], "Backend engineer");
        assert_eq!(v["summary"], "Backend engineer");
    }

    #[test]
    fn test_template_from_unknown_id_is_minimalist() {
        assert_eq!(Template::from_id("fancy"), Template::Minimalist);
        assert_eq!(Template::from_id("Academic"), Template::Academic);
        assert_eq!(Template::from_id("github"), Template::Github);
    }

    #[test]
    fn test_add_skill_clamps_level_and_mints_id() {
        let mut doc = ResumeDocument::default();
        let id = doc.add_skill(skill("Rust", Some(9)));
        assert_eq!(doc.skills[0].level, Some(5));
        assert_eq!(doc.skills[0].id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_remove_entry_by_identity_not_index() {
        let mut doc = ResumeDocument::default();
        let first = doc.add_skill(skill("Go", None));
        let second = doc.add_skill(skill("Rust", Some(4)));
        doc.skills.reverse();

        assert!(doc.remove_entry(Section::Skills, &first));
        assert_eq!(doc.skills.len(), 1);
        assert_eq!(doc.skills[0].id.as_deref(), Some(second.as_str()));
        assert!(!doc.remove_entry(Section::Skills, &first));
    }

    #[test]
    fn test_remove_experience_keeps_order_of_others() {
        let mut doc = ResumeDocument::default();
        let a = doc.add_experience(ExperienceEntry {
            company: "A".into(),
            ..Default::default()
        });
        doc.add_experience(ExperienceEntry {
            company: "B".into(),
            ..Default::default()
        });
        doc.add_experience(ExperienceEntry {
            company: "C".into(),
            ..Default::default()
        });
        assert!(doc.remove_entry(Section::Experience, &a));
        let companies: Vec<_> = doc.experience.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["B", "C"]);
    }

    #[test]
    fn test_section_parse_accepts_legacy_github_key() {
        assert_eq!(Section::parse("github"), Some(Section::GithubProjects));
        assert_eq!(Section::parse("profile"), None);
    }

    #[test]
    fn test_set_about_is_single_write() {
        let mut doc = ResumeDocument::default();
        doc.set_about("  Platform engineer  ");
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["profile"]["about"], "Platform engineer");
        assert_eq!(v["profile"]["summary"], "Platform engineer");
    }
}
