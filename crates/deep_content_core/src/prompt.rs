//! crates/deep_content_core/src/prompt.rs
//!
//! Deterministic prompt construction for the three AI stages: follow-up
//! question generation, research generation, and final content generation.
//!
//! These builders do no validation beyond what the types enforce; an empty
//! idea or content type produces a degenerate but syntactically valid prompt,
//! and the literal content type always appears in both the system and user
//! prompt text.

use crate::domain::{ContentDraft, Question};

/// A system-prompt / user-prompt pair ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// `Question: …\nAnswer: …` blocks joined by blank lines.
fn format_question_answers(questions: &[Question]) -> String {
    questions
        .iter()
        .map(|q| format!("Question: {}\nAnswer: {}", q.text, q.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// First 50 characters of the idea, used where the prompts quote it back.
fn idea_preview(idea: &str) -> String {
    idea.chars().take(50).collect()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

//=========================================================================================
// Stage 1: Follow-up Questions
//=========================================================================================

/// Builds the prompts asking the provider for 3-5 tailored follow-up
/// questions about the user's draft.
pub fn build_question_prompts(draft: &ContentDraft) -> PromptPair {
    let transcript_text = if draft.transcript.is_empty() {
        String::new()
    } else {
        format!(
            "The user has also provided this transcript or existing content for reference:\n\n{}\n\n",
            draft.transcript
        )
    };

    let system = "\
You are an expert content strategist who helps creators refine their ideas. Your role is to analyze the user's content type and idea, then generate tailored follow-up questions that will help them better articulate their goals.

IMPORTANT GUIDELINES:
- Generate 3-5 specific questions that directly relate to the user's content type and idea
- Each question should help the user clarify their vision, goals, or intended audience
- Analyze the specific keywords and phrases in their content idea and content type
- Focus questions on areas that would benefit from elaboration or clarification
- Ask about aspects that would help shape the research and final output
- Questions should be practical and help the user think through what they actually want
- Do not ask generic questions that could apply to any content
- Do not ask about information the user would need to research
- Focus on drawing out the user's expertise, preferences, and vision
- Questions should be clear, concise, and directly actionable
- ONLY return the numbered questions, nothing else"
        .to_string();

    let user = format!(
        "Content Type: {content_type}\n\n\
User's Content Idea:\n{idea}\n\n\
{transcript_text}\
Based on this specific content type \"{content_type}\" and their idea, generate 3-5 tailored follow-up questions that will help clarify:\n\
1. The specific goals or outcomes they want to achieve with this {content_type}\n\
2. Any particular style, tone, or approach they prefer for this specific content\n\
3. The knowledge gaps that research should fill to make this {content_type} more effective\n\
4. How they want to differentiate this content from similar content in their field\n\
5. Any specific elements they want to emphasize or highlight\n\n\
Your questions should feel like they were specifically written for someone creating a \"{content_type}\" about \"{idea_preview}...\"",
        content_type = draft.content_type,
        idea = draft.idea,
        transcript_text = transcript_text,
        idea_preview = idea_preview(&draft.idea),
    );

    PromptPair { system, user }
}

//=========================================================================================
// Stage 2: Research
//=========================================================================================

/// Builds the structured research prompts. Only questions with a non-empty
/// answer are included; the requested document always has the same four
/// sections.
pub fn build_research_prompts(draft: &ContentDraft, questions: &[Question]) -> PromptPair {
    let answered: Vec<Question> = questions
        .iter()
        .filter(|q| !q.answer.trim().is_empty())
        .cloned()
        .collect();
    let answered_questions = format_question_answers(&answered);

    let transcript_text = if draft.transcript.is_empty() {
        String::new()
    } else {
        format!("User's Transcript/Content:\n{}\n\n", draft.transcript)
    };

    let system = format!(
        "You are a specialized research assistant for {content_type} creation. You provide tailored, specific information that directly addresses the user's needs for creating this type of content. Your research is thorough, well-organized, and directly applicable to the user's stated goals. You focus on providing concrete facts, statistics, examples, and expert insights that would be most valuable for this particular content type.",
        content_type = draft.content_type,
    );

    let user = format!(
        "I need comprehensive research for creating a {content_type}.\n\n\
User's Original Idea:\n{idea}\n\n\
{transcript_text}\
User's Answers to Follow-up Questions:\n{answered_questions}\n\n\
Based on all of the above information, conduct targeted research specifically focused on creating an effective {content_type}. \n\n\
The research should be highly relevant to the specific type of content (\"{content_type}\") and the user's stated goals and preferences from their answers.\n\n\
Please structure your research in the following format:\n\n\
### Research for {content_type} on {idea_preview}...\n\n\
#### {capitalized} Overview and Context Analysis\n\
- **(Include 2-3 points with statistics, expert insights, or industry standards specifically for {content_type})**\n\n\
#### Audience Insights for this {content_type}\n\
- **(Include 2-3 points about the likely audience preferences, behaviors, or expectations for this type of content)**\n\n\
#### Dramatic or Engaging Elements for {content_type}\n\
- **(Include 2-3 points about storytelling techniques, formats, or structures that work well for this specific content type)**\n\n\
#### Content Strategy Elements\n\
- **(Include 2-3 points about effective strategies, trends, or best practices for this type of content)**\n\n\
For each section, prioritize specific facts, statistics, expert quotes, case studies, and examples that directly support the user's vision as expressed in their idea and answers.\n\n\
Note: Don't just use placeholder text or generic information. Provide actual researched information that would be valuable for someone creating this specific {content_type}.",
        content_type = draft.content_type,
        idea = draft.idea,
        transcript_text = transcript_text,
        answered_questions = answered_questions,
        idea_preview = idea_preview(&draft.idea),
        capitalized = capitalize_first(&draft.content_type),
    );

    PromptPair { system, user }
}

//=========================================================================================
// Stage 3: Content Generation
//=========================================================================================

/// Builds the prompts for final content generation. When `feedback` is
/// present this is a regeneration and the feedback-incorporation instruction
/// is appended; content-type-specific formatting hints are appended on a
/// lower-cased substring match.
pub fn build_generation_prompts(
    draft: &ContentDraft,
    questions: &[Question],
    research: &str,
    feedback: Option<&str>,
) -> PromptPair {
    let formatted_questions = format_question_answers(questions);

    let system = format!(
        "You are an expert content creator that specializes in creating high-quality, well-researched {content_type} content. \n\
You help users by generating content based on their ideas, their answers to specific questions, and provided research.\n\
The content you create should be original, engaging, and reflect the user's authentic voice based on how they've answered the questions.\n\n\
When generating content, follow these rules:\n\
1. Use the research provided to inform the content, incorporating relevant facts, statistics, and insights.\n\
2. Maintain the user's perspective and opinions as expressed in their answers to questions.\n\
3. Format the content appropriately for the chosen content type ({content_type}).\n\
4. Create content that is ready to use without requiring additional editing.\n\
5. Do not mention that the content was AI-generated or include any meta-commentary about the content generation process.\n\
6. Focus on creating authentic, human-sounding content that reflects the user's voice.",
        content_type = draft.content_type,
    );

    let mut user = format!(
        "Please create a {content_type} based on the following:\n\n\
IDEA: {idea}\n\n\
USER'S PERSPECTIVE (based on answers to questions):\n{formatted_questions}\n\n\
RESEARCH TO INCORPORATE:\n{research}",
        content_type = draft.content_type,
        idea = draft.idea,
        formatted_questions = formatted_questions,
        research = research,
    );

    if !draft.transcript.is_empty() {
        user.push_str(&format!(
            "\n\nTRANSCRIPT OR ADDITIONAL CONTENT:\n{}",
            draft.transcript
        ));
    }

    if let Some(feedback) = feedback {
        user.push_str(&format!(
            "\n\nUSER FEEDBACK FOR IMPROVEMENT:\n{}\n\n\
Please regenerate the content taking this feedback into account while maintaining the original purpose and incorporating the research.",
            feedback
        ));
    }

    let lowered = draft.content_type.to_lowercase();
    if lowered.contains("blog") {
        user.push_str("\n\nPlease format this as a complete blog post with a compelling headline, introduction, properly structured sections with subheadings, and a conclusion.");
    } else if lowered.contains("social") {
        user.push_str("\n\nPlease format this as social media content with appropriate hashtags and engaging language for the platform.");
    } else if lowered.contains("youtube") {
        user.push_str("\n\nPlease format this as a YouTube script with intro, main content sections, and an outro including a call to action.");
    } else if lowered.contains("email") {
        user.push_str("\n\nPlease format this as an email with subject line, greeting, main content, and signature.");
    }

    PromptPair { system, user }
}
