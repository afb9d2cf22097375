use crate::errors::AppError;

pub const MIN_JOB_DESCRIPTION_CHARS: usize = 30;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 2000;

/// Validates the job description of a generation request.
///
/// PASS: present and between 30 and 2000 characters (inclusive).
/// Length is counted in characters, not bytes.
pub fn validate_job_description(job_description: Option<&str>) -> Result<&str, AppError> {
    let job_description = match job_description {
        Some(jd) if !jd.is_empty() => jd,
        _ => {
            return Err(AppError::Validation(
                "Job description is required.".to_string(),
            ))
        }
    };

    let chars = job_description.chars().count();
    if chars < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(
            "Job description is too short. Please provide more detail.".to_string(),
        ));
    }
    if chars > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description is too long. Please shorten it (max {MAX_JOB_DESCRIPTION_CHARS} characters)."
        )));
    }

    Ok(job_description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<&str, AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_job_description_is_required() {
        assert_eq!(
            message(validate_job_description(None)),
            "Job description is required."
        );
        assert_eq!(
            message(validate_job_description(Some(""))),
            "Job description is required."
        );
    }

    #[test]
    fn test_short_job_description_rejected() {
        assert!(message(validate_job_description(Some("short"))).contains("too short"));
        let just_under = "a".repeat(MIN_JOB_DESCRIPTION_CHARS - 1);
        assert!(validate_job_description(Some(&just_under)).is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let min = "a".repeat(MIN_JOB_DESCRIPTION_CHARS);
        let max = "a".repeat(MAX_JOB_DESCRIPTION_CHARS);
        assert_eq!(validate_job_description(Some(&min)).unwrap(), min);
        assert_eq!(validate_job_description(Some(&max)).unwrap(), max);
    }

    #[test]
    fn test_long_job_description_rejected() {
        let too_long = "a".repeat(MAX_JOB_DESCRIPTION_CHARS + 1);
        assert!(message(validate_job_description(Some(&too_long))).contains("max 2000"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 30 two-byte characters: 60 bytes, but exactly at the minimum.
        let accented = "é".repeat(MIN_JOB_DESCRIPTION_CHARS);
        assert!(validate_job_description(Some(&accented)).is_ok());

        // 2000 characters of a three-byte glyph stays within the maximum.
        let wide = "€".repeat(MAX_JOB_DESCRIPTION_CHARS);
        assert!(validate_job_description(Some(&wide)).is_ok());
    }
}
