// Prompt constants for the screening module.
// The fit-analysis response is line-oriented text, parsed by `analysis::parse_fit_response`.

/// Fit analysis prompt template.
/// Replace `{job_description}`, `{resume_text}`, `{skills}`, `{experience}` and `{education}` before sending.
pub const FIT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze how well this resume matches the job description.

JOB DESCRIPTION:
{job_description}

RESUME EXTRACT:
{resume_text}

RESUME SKILLS: {skills}
EXPERIENCE: {experience}
EDUCATION: {education}

Please provide:
1. Overall match score (0-100)
2. Key strengths (3-4 bullet points)
3. Missing qualifications (2-3 bullet points)
4. Recommendation (Strong Yes/Yes/Maybe/No)

Format your response as:
Score: [number]
Strengths:
- [bullet point]
Missing:
- [bullet point]
Recommendation: [Strong Yes/Yes/Maybe/No]"#;

/// Characters of cleaned resume text included in the prompt.
pub const RESUME_EXCERPT_CHARS: usize = 2000;
