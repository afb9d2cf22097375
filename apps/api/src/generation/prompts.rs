// All LLM prompt constants for the Generation module.
// `{job_description}` and `{resume}` are replaced before sending.

/// System prompt for cover letter generation.
pub const COVER_LETTER_SYSTEM: &str = "You are an expert career coach.";

pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "Write a professional, personalized cover letter \
for this job description: \n\n{job_description}\n\nHere is the applicant's resume:\n{resume}";

/// System prompt for resume rewriting.
pub const RESUME_REWRITE_SYSTEM: &str = "You are an expert resume writer.";

pub const RESUME_REWRITE_PROMPT_TEMPLATE: &str = "Rewrite and optimize this resume for the \
following job description. Make it keyword-rich and ATS friendly.\n\nJob Description:\n\
{job_description}\n\nResume:\n{resume}";
