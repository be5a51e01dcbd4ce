//! Prompt construction and response parsing for new posts.

use tracing::{debug, info};

use crate::contract::{ContentGenerator, GeneratedPost};
use crate::error::ComposeError;

/// Build the generation prompt from the titles of existing posts.
///
/// The constraints are fixed: topic domain, length range, markdown
/// structure and the title-then-blank-line-then-body response shape the
/// parser relies on.
pub fn build_prompt(existing_titles: &[String]) -> String {
    let titles = existing_titles.join("\n");
    format!(
        "You are writing a new article for a software engineering blog.\n\
         \n\
         These posts already exist:\n\
         {titles}\n\
         \n\
         Write one new post about a software engineering topic not covered above.\n\
         Requirements:\n\
         - Between 400 and 800 words.\n\
         - Markdown body with \"##\" section headings and short paragraphs.\n\
         - Do not repeat or rephrase an existing title.\n\
         - Reply with the post title on the first line, then a blank line, then the body.\n\
         - No preamble or commentary outside the post itself."
    )
}

/// Split raw generator output into a structured post.
///
/// The first non-blank line (trimmed) is the title; the remaining
/// non-blank lines, re-joined and trimmed, are the body. Body length and
/// structure are not validated: malformed model output propagates as-is.
pub fn parse_post(raw: &str) -> Result<GeneratedPost, ComposeError> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some((first, rest)) = lines.split_first() else {
        return Err(ComposeError::EmptyGeneration);
    };
    Ok(GeneratedPost {
        title: first.trim().to_string(),
        content: rest.join("\n").trim().to_string(),
    })
}

/// Ask the generator for a new post, given the existing titles in
/// directory listing order.
pub async fn compose<G>(
    generator: &G,
    existing_titles: &[String],
) -> Result<GeneratedPost, ComposeError>
where
    G: ContentGenerator + ?Sized,
{
    let prompt = build_prompt(existing_titles);
    debug!(
        existing = existing_titles.len(),
        prompt_len = prompt.len(),
        "Requesting post generation"
    );
    let raw = generator.send_request(&prompt).await?;
    let post = parse_post(&raw)?;
    info!(
        title = %post.title,
        body_len = post.content.len(),
        "Parsed generated post"
    );
    Ok(post)
}
