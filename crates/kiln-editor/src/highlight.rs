//! Per-row syntax highlighting.
//!
//! [`tag_line`] is a single left-to-right pass over a row's render bytes
//! that assigns one [`Tag`] per byte. The only state that crosses rows is
//! whether a block comment is still open at the end of the line: the
//! caller passes in the state inherited from the previous row and gets
//! back the state for the next one. Keeping that bit consistent across
//! edits is the buffer's job (see [`Buffer::retag_range`]).
//!
//! Rules, in priority order at each position:
//!
//! 1. a line-comment delimiter outside strings and comments tags the rest
//!    of the row as comment
//! 2. a block-comment start opens a comment
//! 3. inside a block comment everything is comment until the end delimiter
//! 4. inside a string everything is string; backslash escapes one byte
//! 5. `"` or `'` opens a string
//! 6. digits after a separator, or continuing a number, are numbers
//! 7. operators (first listed match wins) after a separator
//! 8. keywords bounded by separators on both sides
//! 9. anything else is default
//!
//! [`Buffer::retag_range`]: crate::buffer::Buffer::retag_range

use crate::syntax::{Syntax, SyntaxFlags};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Lexical class of one rendered byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    #[default]
    Default,
    Comment,
    Keyword,
    Type,
    Control,
    Number,
    String,
    Match,
    Boolean,
    Operator,
}

// ---------------------------------------------------------------------------
// Separators
// ---------------------------------------------------------------------------

/// Bytes that end a word: whitespace, NUL and common punctuation.
#[inline]
#[must_use]
pub fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0 || b",.()+-/*=~%<>[]{};:&|!^?".contains(&b)
}

// ---------------------------------------------------------------------------
// Tagging
// ---------------------------------------------------------------------------

/// Recompute `tags` for `render` and return whether the line ends inside
/// an unterminated block comment.
///
/// `tags` is cleared and refilled to exactly `render.len()` entries. With
/// no syntax every byte is [`Tag::Default`] and the result is `false`.
pub fn tag_line(
    render: &[u8],
    syntax: Option<&Syntax>,
    carried_in: bool,
    tags: &mut Vec<Tag>,
) -> bool {
    tags.clear();
    tags.resize(render.len(), Tag::Default);

    let Some(syntax) = syntax else {
        return false;
    };

    let flags = syntax.flags;
    let block = syntax
        .block_comment
        .filter(|(start, end)| {
            flags.contains(SyntaxFlags::MULTILINE_COMMENTS) && !start.is_empty() && !end.is_empty()
        })
        .map(|(start, end)| (start.as_bytes(), end.as_bytes()));
    let line_comment = syntax
        .line_comment
        .filter(|lc| !lc.is_empty())
        .map(str::as_bytes);

    let mut in_comment = block.is_some() && carried_in;
    let mut in_string: Option<u8> = None;
    let mut prev_sep = true;
    let mut i = 0;

    while i < render.len() {
        let c = render[i];
        let rest = &render[i..];
        let prev_tag = if i > 0 { tags[i - 1] } else { Tag::Default };

        if in_string.is_none() && !in_comment {
            if let Some(lc) = line_comment {
                if rest.starts_with(lc) {
                    tags[i..].fill(Tag::Comment);
                    break;
                }
            }
        }

        if let Some((start, end)) = block {
            if in_string.is_none() {
                if in_comment {
                    if rest.starts_with(end) {
                        tags[i..i + end.len()].fill(Tag::Comment);
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        tags[i] = Tag::Comment;
                        i += 1;
                    }
                    continue;
                }
                if rest.starts_with(start) {
                    tags[i..i + start.len()].fill(Tag::Comment);
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        if flags.contains(SyntaxFlags::STRINGS) {
            if let Some(quote) = in_string {
                tags[i] = Tag::String;
                if c == b'\\' && i + 1 < render.len() {
                    tags[i + 1] = Tag::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                // A closing quote is not a word boundary.
                prev_sep = is_separator(c);
                continue;
            }
            if c == b'"' || c == b'\'' {
                in_string = Some(c);
                tags[i] = Tag::String;
                i += 1;
                continue;
            }
        }

        if flags.contains(SyntaxFlags::NUMBERS) {
            let starts_number =
                c.is_ascii_digit() || (c == b'.' && render.get(i + 1).is_some_and(u8::is_ascii_digit));
            if starts_number && (prev_sep || prev_tag == Tag::Number) {
                tags[i] = Tag::Number;
                i += 1;
                prev_sep = false;
                continue;
            }
        }

        let sep = is_separator(c);

        if prev_sep {
            if let Some(len) = match_operator(syntax, rest, &mut tags[i..]) {
                i += len;
                prev_sep = is_separator(render[i - 1]);
                continue;
            }
            if let Some(len) = match_keyword(syntax, render, i, &mut tags[i..]) {
                i += len;
                prev_sep = is_separator(render[i - 1]);
                continue;
            }
        }

        prev_sep = sep;
        i += 1;
    }

    in_comment
}

/// Tag the first operator that `rest` starts with. Returns its length.
fn match_operator(syntax: &Syntax, rest: &[u8], tags: &mut [Tag]) -> Option<usize> {
    let op = syntax
        .operators
        .iter()
        .find(|op| !op.text.is_empty() && rest.starts_with(op.text.as_bytes()))?;
    let len = op.text.len();
    tags[..len].fill(op.tag);
    Some(len)
}

/// Tag the first keyword at `render[at..]` that is followed by a separator
/// or the end of the row. Returns its length.
fn match_keyword(syntax: &Syntax, render: &[u8], at: usize, tags: &mut [Tag]) -> Option<usize> {
    let rest = &render[at..];
    let (text, tag) = syntax.words().find(|(text, _)| {
        !text.is_empty()
            && rest.starts_with(text.as_bytes())
            && render.get(at + text.len()).is_none_or(|&b| is_separator(b))
    })?;
    tags[..text.len()].fill(tag);
    Some(text.len())
}
