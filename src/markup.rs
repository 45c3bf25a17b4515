// Tagged-markup contract shared by participants and the moderator
//
//   <SCRATCHPAD>...</SCRATCHPAD>  private reasoning
//   <ANSWER>...</ANSWER>          public proposal
//   <PLAN>...</PLAN>              private note for the author's next turn
//   <PARTY>name</PARTY>           moderator's next-speaker directive

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Scratchpad,
    Answer,
    Plan,
    Party,
}

impl Tag {
    fn block(self) -> &'static Regex {
        match self {
            Tag::Scratchpad => &SCRATCHPAD_BLOCK,
            Tag::Answer => &ANSWER_BLOCK,
            Tag::Plan => &PLAN_BLOCK,
            Tag::Party => &PARTY_BLOCK,
        }
    }
}

fn block_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>")).expect("static tag regex")
}

fn unterminated_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}>.*$")).expect("static tag regex")
}

static SCRATCHPAD_BLOCK: Lazy<Regex> = Lazy::new(|| block_regex("SCRATCHPAD"));
static ANSWER_BLOCK: Lazy<Regex> = Lazy::new(|| block_regex("ANSWER"));
static PLAN_BLOCK: Lazy<Regex> = Lazy::new(|| block_regex("PLAN"));
// Directive must sit on one line.
static PARTY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<PARTY>(.*?)</PARTY>").expect("static tag regex"));

static SCRATCHPAD_OPEN: Lazy<Regex> = Lazy::new(|| unterminated_regex("SCRATCHPAD"));
static PLAN_OPEN: Lazy<Regex> = Lazy::new(|| unterminated_regex("PLAN"));

/// Contents of the first `<tag>...</tag>` block.
pub fn first(text: &str, tag: Tag) -> Option<&str> {
    tag.block()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Contents of the last `<tag>...</tag>` block.
pub fn last(text: &str, tag: Tag) -> Option<&str> {
    tag.block()
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Remove scratchpad and plan sections, including ones left unterminated.
pub fn strip_private(text: &str) -> String {
    let text = SCRATCHPAD_BLOCK.replace_all(text, "");
    let text = PLAN_BLOCK.replace_all(&text, "");
    let text = SCRATCHPAD_OPEN.replace(&text, "");
    let text = PLAN_OPEN.replace(&text, "");
    text.trim().to_string()
}

/// The part of a response other parties are allowed to see.
///
/// That is the `<ANSWER>` section when present. Otherwise it is the response
/// with every private section removed.
pub fn public_text(response: &str) -> String {
    // Private sections go first so a draft answer inside a scratchpad never
    // counts as the public one.
    let visible = strip_private(response);
    match first(&visible, Tag::Answer) {
        Some(answer) => answer.trim().to_string(),
        None => visible,
    }
}
