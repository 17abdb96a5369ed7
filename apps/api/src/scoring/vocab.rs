//! Curated vocabularies for deterministic extraction.
//!
//! The same lists run over both resume and job profile, so extracted terms
//! are directly comparable. All entries are lower-case; matching is
//! boundary-delimited substring search (see `extract::contains_token`).

/// Technical skills: languages, frameworks, data stores, cloud/DevOps, ML.
pub const TECHNICAL_SKILLS: &[&str] = &[
    // Languages
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "c#",
    "go",
    "golang",
    "rust",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "scala",
    "sql",
    // Frameworks
    "react",
    "angular",
    "vue",
    "node.js",
    "django",
    "flask",
    "fastapi",
    "spring",
    "rails",
    "laravel",
    ".net",
    "express",
    // Data stores
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "elasticsearch",
    "cassandra",
    "dynamodb",
    "sqlite",
    "oracle",
    // Cloud / DevOps
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "terraform",
    "jenkins",
    "git",
    "ci/cd",
    "devops",
    "linux",
    "microservices",
    // ML / data
    "machine learning",
    "deep learning",
    "data science",
    "nlp",
    "computer vision",
    "tensorflow",
    "pytorch",
    "scikit-learn",
    "pandas",
    "numpy",
    "spark",
    "hadoop",
    "kafka",
    "airflow",
    "tableau",
    "power bi",
    "analytics",
    "statistics",
    "etl",
];

/// Management and business skills.
pub const MANAGEMENT_SKILLS: &[&str] = &[
    "leadership",
    "team management",
    "project management",
    "product management",
    "people management",
    "performance management",
    "stakeholder management",
    "agile",
    "scrum",
    "kanban",
    "strategic planning",
    "budgeting",
    "hiring",
    "mentoring",
    "coaching",
    "communication",
    "negotiation",
    "roadmap",
];

/// Degree-level tokens, including common abbreviations.
pub const DEGREE_TOKENS: &[&str] = &[
    "bachelor",
    "bachelors",
    "master",
    "masters",
    "phd",
    "ph.d.",
    "mba",
    "doctorate",
    "b.s.",
    "m.s.",
    "b.a.",
    "m.a.",
    "b.e.",
    "b.tech",
    "m.tech",
];

/// Field-of-study tokens.
pub const FIELD_TOKENS: &[&str] = &[
    "computer science",
    "engineering",
    "mathematics",
    "business",
    "marketing",
    "information technology",
    "physics",
    "economics",
];

/// Institution tokens. The weakest education signal, but still evidence of
/// some higher education.
pub const INSTITUTION_TOKENS: &[&str] = &["university", "college", "institute", "school"];

/// Management requirement and title markers.
pub const MANAGEMENT_ROLE_TOKENS: &[&str] =
    &["manager", "director", "vp", "head of", "chief", "lead"];

/// Senior individual-contributor markers.
pub const SENIOR_ROLE_TOKENS: &[&str] = &["senior", "lead", "principal", "staff", "architect"];

/// Entry-level markers (resume side).
pub const ENTRY_LEVEL_TOKENS: &[&str] = &[
    "intern",
    "internship",
    "junior",
    "associate",
    "trainee",
    "fresh graduate",
    "fresher",
    "student",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn all_lists() -> Vec<&'static [&'static str]> {
        vec![
            TECHNICAL_SKILLS,
            MANAGEMENT_SKILLS,
            DEGREE_TOKENS,
            FIELD_TOKENS,
            INSTITUTION_TOKENS,
            MANAGEMENT_ROLE_TOKENS,
            SENIOR_ROLE_TOKENS,
            ENTRY_LEVEL_TOKENS,
        ]
    }

    #[test]
    fn test_vocab_entries_are_lowercase() {
        for list in all_lists() {
            for entry in list {
                assert_eq!(
                    *entry,
                    entry.to_lowercase(),
                    "vocab entry '{entry}' must be lower-case"
                );
            }
        }
    }

    #[test]
    fn test_vocab_lists_are_nonempty_and_trimmed() {
        for list in all_lists() {
            assert!(!list.is_empty());
            for entry in list {
                assert_eq!(*entry, entry.trim());
                assert!(!entry.is_empty());
            }
        }
    }

    #[test]
    fn test_skill_lists_have_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for entry in TECHNICAL_SKILLS.iter().chain(MANAGEMENT_SKILLS.iter()) {
            assert!(seen.insert(*entry), "duplicate skill entry '{entry}'");
        }
    }
}
