use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(default)]
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub image: String,
    pub summary: String,
    pub instructions: String,
    pub creator: String,
    #[serde(rename = "creatorEmail")]
    pub creator_email: String,
}

impl Meal {
    /// Instructions are stored newline-delimited; blank lines are dropped.
    pub fn instruction_lines(&self) -> Vec<&str> {
        self.instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Lowercases the title and joins its alphanumeric runs with dashes.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
