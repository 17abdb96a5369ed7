//! Screening request construction — the User message that seeds a session's
//! transcript.

use crate::models::screening::ResumeRecord;

/// Resume text beyond this many characters is elided from the digest. Full
/// text still drives the deterministic scorer; the digest only bounds prompt
/// size for the conversation.
const RESUME_DIGEST_CHARS: usize = 500;

/// Builds the screening request embedding the job profile and numbered
/// resume digests.
pub fn build_screening_request(job_profile: &str, resumes: &[ResumeRecord]) -> String {
    let digests = resumes
        .iter()
        .enumerate()
        .map(|(index, resume)| format!("{}. {}: {}", index + 1, resume.filename, digest(&resume.content)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Job Profile: {job_profile}\n\n\
         Number of Resumes to Screen: {count}\n\n\
         Resumes:\n{digests}\n\n\
         Please analyze each resume against the job profile and provide matching scores with detailed explanations.",
        count = resumes.len(),
    )
}

/// First `RESUME_DIGEST_CHARS` characters, with an ellipsis when truncated.
/// Counted in characters, not bytes, so multi-byte text never splits.
fn digest(content: &str) -> String {
    if content.chars().count() <= RESUME_DIGEST_CHARS {
        content.to_string()
    } else {
        let mut truncated: String = content.chars().take(RESUME_DIGEST_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(filename: &str, content: &str) -> ResumeRecord {
        ResumeRecord {
            filename: filename.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_short_content_kept_verbatim() {
        assert_eq!(digest("short resume"), "short resume");
    }

    #[test]
    fn test_long_content_truncated_with_ellipsis() {
        let long = "x".repeat(600);
        let digested = digest(&long);

        assert_eq!(digested.chars().count(), 503);
        assert!(digested.ends_with("..."));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "é".repeat(600);
        let digested = digest(&long);

        assert_eq!(digested.chars().count(), 503);
        assert!(digested.starts_with("ééé"));
    }

    #[test]
    fn test_request_numbers_resumes_and_counts_them() {
        let request = build_screening_request(
            "Backend engineer",
            &[resume("a.pdf", "first resume"), resume("b.pdf", "second resume")],
        );

        assert!(request.contains("Job Profile: Backend engineer"));
        assert!(request.contains("Number of Resumes to Screen: 2"));
        assert!(request.contains("1. a.pdf: first resume"));
        assert!(request.contains("2. b.pdf: second resume"));
    }
}
