// Cover letter prompt text and the offline template.

pub const COVER_LETTER_SYSTEM: &str =
    "You are an expert career coach who writes compelling, personalized cover letters \
    that help candidates stand out.";

/// Replace `{title}`, `{company}`, `{location}`, `{match_score}`, `{matched_skills}`,
/// `{candidate}` and `{resume}` before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are a professional career coach. Write a compelling cover letter for a job application.

Job Details:
- Position: {title}
- Company: {company}
- Location: {location}
- Match Score: {match_score}
- Key Matched Skills: {matched_skills}

Candidate: {candidate}

Candidate's CV Summary:
{resume}

Instructions:
1. Write a professional, engaging cover letter (250-350 words)
2. Address it to "Hiring Manager" (don't make up names)
3. Highlight the candidate's relevant experience and skills that match this specific role
4. Show enthusiasm for the company and position
5. Include a strong opening and closing
6. Use a professional but warm tone
7. Don't use overly generic phrases
8. Format with proper paragraphs

Generate the cover letter now:"#;

/// Used when no generative provider is configured or its quota is exhausted.
/// Replace `{title}`, `{company}`, `{matched_skills}` and `{signature}`.
pub const TEMPLATE_LETTER: &str = r#"Dear Hiring Manager,

I am writing to express my strong interest in the {title} position at {company}. With my background in software development and proven expertise in {matched_skills}, I am confident that I would be a valuable addition to your team.

Throughout my career, I have developed a strong foundation in modern web technologies and best practices. My experience aligns well with the requirements outlined in your job posting, particularly in areas such as {matched_skills}. I am passionate about creating efficient, scalable solutions and staying current with emerging technologies.

What excites me most about this opportunity at {company} is the chance to contribute to innovative projects while continuing to grow professionally. I am particularly drawn to your company's commitment to excellence and the collaborative environment you foster.

I am eager to bring my technical skills, problem-solving abilities, and enthusiasm to your team. I would welcome the opportunity to discuss how my background and skills would benefit {company}.

Thank you for considering my application. I look forward to the possibility of contributing to your team's success.

Sincerely,
{signature}

---
Note: This is a template cover letter. Configure OpenAI API credits for personalized AI-generated letters."#;
