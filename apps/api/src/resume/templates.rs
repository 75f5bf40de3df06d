use serde::Serialize;

use crate::models::resume::Template;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const CATALOG: &[(Template, &str, &str)] = &[
    (
        Template::Minimalist,
        "Minimalist",
        "Single column, generous whitespace, one accent colour.",
    ),
    (
        Template::Academic,
        "Academic",
        "Serif layout that leads with education and keeps experience compact.",
    ),
    (
        Template::Github,
        "GitHub",
        "Developer layout that puts repositories and stars next to the stack.",
    ),
];

pub fn template_info(template: Template) -> TemplateInfo {
    CATALOG
        .iter()
        .find(|(t, _, _)| *t == template)
        .map(|&(t, name, description)| TemplateInfo {
            id: t.as_str(),
            name,
            description,
        })
        .unwrap_or(TemplateInfo {
            id: "minimalist",
            name: "Minimalist",
            description: "",
        })
}

pub fn all_templates() -> Vec<TemplateInfo> {
    CATALOG.iter().map(|(t, _, _)| template_info(*t)).collect()
}
