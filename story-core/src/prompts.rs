//! Prompt construction for each generator call.

use crate::form::{Choice, ContinuationParams, OpeningParams};

/// System instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a helpful and creative story writing assistant. \
Never repeat or restate the user's first line. Start from the second sentence onward. \
Always end with a complete sentence.";

/// Budget for the short world-building passage.
pub const SETTING_TOKENS: usize = 100;

/// Budget for the title suggestion.
pub const TITLE_TOKENS: usize = 30;

/// Prompt for the 2-3 line setting description that opens the story.
pub fn setting_prompt(params: &OpeningParams<'_>) -> String {
    format!(
        "Create a vivid 2-3 line world-building description of a {} in a {} story with a {} tone.",
        params.setting.label().to_lowercase(),
        params.genre.label(),
        params.mood.label().to_lowercase(),
    )
}

/// Prompt for the first passage, which must pick up after the opening line.
pub fn opening_prompt(params: &OpeningParams<'_>, setting_description: &str) -> String {
    let mut prompt = format!(
        "Continue this {} story with a {} tone. Use this first line exactly once and do not repeat it. \
Begin directly from the second sentence onward.\n\n\
First line: {}\n\
Setting: {}\n\
Character emotion: {}\n",
        params.genre.label(),
        params.mood.label().to_lowercase(),
        params.opening_line,
        setting_description,
        params.emotion.label(),
    );
    if let Some(name) = params.character {
        prompt.push_str(&format!("Main character: {name}\n"));
    }
    prompt
}

/// Prompt asking for a title for the story so far.
pub fn title_prompt(genre: &str, body: &str) -> String {
    format!(
        "Suggest only a short and creative title for the following {genre} story. \
Return just the title. Do not explain or describe it.\n\n{body}"
    )
}

/// Prompt for one more paragraph of an existing story.
pub fn continuation_prompt(params: &ContinuationParams, body: &str) -> String {
    format!(
        "Continue the story below with a new paragraph in the {} genre with a {} tone. \
The main character feels {}. Do not repeat any lines. End with a complete sentence.\n\n{}",
        params.genre.label(),
        params.mood.label().to_lowercase(),
        params.emotion.label().to_lowercase(),
        body,
    )
}

/// Remove restatements of the opening line from generated text.
///
/// The opening line is placed in the story by the caller, so a restatement
/// by the model would make it appear twice. Only whole sentences are
/// removed: the copy must start the text, a line or a sentence, and end at a
/// sentence boundary. Everything else is returned as generated, trimmed at
/// both ends.
pub fn strip_opening_line(generated: &str, opening_line: &str) -> String {
    let line = opening_line.trim();
    if line.is_empty() {
        return generated.trim().to_string();
    }

    let mut out = String::with_capacity(generated.len());
    let mut rest = generated;

    while let Some(pos) = rest.find(line) {
        let before = &rest[..pos];
        let after = &rest[pos + line.len()..];
        let at_sentence_start = starts_sentence(before.chars().rev().chain(out.chars().rev()));

        match restatement_len(line, after) {
            Some(consumed) if at_sentence_start => {
                out.push_str(before);
                let mut tail = after[consumed..].trim_start_matches([' ', '\t']);
                if out.ends_with('\n') {
                    tail = tail.strip_prefix('\n').unwrap_or(tail);
                }
                rest = tail;
            }
            _ => {
                let step = pos + line.chars().next().map_or(1, char::len_utf8);
                out.push_str(&rest[..step]);
                rest = &rest[step..];
            }
        }
    }

    out.push_str(rest);
    out.trim().to_string()
}

/// Whether the text before a match (given last char first) ends a sentence.
fn starts_sentence(mut preceding: impl Iterator<Item = char>) -> bool {
    match preceding.next() {
        None | Some('\n') => true,
        Some(c) if !c.is_whitespace() => false,
        Some(_) => {
            for c in preceding {
                if c == '\n' {
                    return true;
                }
                if !c.is_whitespace() {
                    return matches!(c, '.' | '!' | '?' | '"' | '\u{201D}');
                }
            }
            true
        }
    }
}

/// Bytes of `after` that belong to a restated opening line, or `None` when
/// the match continues into a longer sentence.
fn restatement_len(line: &str, after: &str) -> Option<usize> {
    let consumed = if line.ends_with(['.', '!', '?', '"', '\u{201D}']) {
        0
    } else {
        match after.chars().next() {
            Some(c @ ('.' | '!' | '?')) => c.len_utf8(),
            _ => return None,
        }
    };

    match after[consumed..].chars().next() {
        None => Some(consumed),
        Some(c) if c.is_whitespace() => Some(consumed),
        Some(_) => None,
    }
}

/// Tidy a title reply: first line only, no wrapping quotes or "Title:" prefix.
pub fn clean_title(raw: &str) -> String {
    let first_line = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut title = first_line.trim();

    for prefix in ["Title:", "title:", "TITLE:"] {
        if let Some(rest) = title.strip_prefix(prefix) {
            title = rest.trim();
        }
    }

    title
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '“' | '”' | '#'))
        .trim()
        .to_string()
}
