use serde::{Deserialize, Serialize};
use tracing::warn;

/// One resume submitted for screening. `content` is already-extracted plain
/// text; document parsing is the caller's concern. `filename` is the unique
/// candidate key within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub filename: String,
    pub content: String,
}

/// Drops later duplicates of the same filename, keeping the first occurrence.
pub fn dedupe_by_filename(resumes: Vec<ResumeRecord>) -> Vec<ResumeRecord> {
    let mut seen: Vec<String> = Vec::new();
    let mut unique = Vec::with_capacity(resumes.len());

    for resume in resumes {
        if seen.contains(&resume.filename) {
            warn!("Skipping duplicate resume '{}'", resume.filename);
            continue;
        }
        seen.push(resume.filename.clone());
        unique.push(resume);
    }

    unique
}
