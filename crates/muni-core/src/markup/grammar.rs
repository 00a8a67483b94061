//! Token grammar for the supported markdown subset.
//!
//! This is the single source of truth for token recognition. The one-shot
//! renderer walks the whole text through these matchers; the reveal engine
//! applies the same matchers anchored at its cursor. Because both paths go
//! through [`token_at`], they cannot disagree on where a token starts or
//! ends.
//!
//! Matching is anchored: every matcher inspects the start of its input and
//! returns `None` rather than scanning ahead for a later match. At any one
//! position bold is attempted before italic, so `**x**` is never mis-split
//! into two italic spans.

/// A token matched at a fixed position in the source text.
///
/// Content slices borrow from the input and hold the raw span between the
/// delimiters (delimiters themselves are consumed but not captured).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `**content**` — content is non-empty and contains no `*` or newline.
    Bold(&'a str),
    /// `*content*` — same content rules as bold.
    Italic(&'a str),
    /// `#`..`######` at line start; more than six hashes cap at level 6
    /// with the surplus left in the content.
    Header { level: u8, content: &'a str },
    /// A lowercase letter immediately followed by `)` at line start, e.g.
    /// `a)`. Emphasized in place; never grouped into a list.
    ListPrefixLetter(char),
    /// A line starting with `-` or `*`. Content runs to end of line.
    ListItem(&'a str),
}

/// A matched token together with the number of input bytes it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan<'a> {
    pub token: Token<'a>,
    pub len: usize,
}

/// Matches the token grammar anchored at the start of `s`.
///
/// This is the trigger set the reveal engine uses per tick: `*` attempts
/// bold then italic; `#` at line start attempts a header; a lowercase
/// letter at line start attempts a lettered list prefix. List items are
/// deliberately absent — during reveal they are disclosed character by
/// character and grouped only by the final full render pass.
pub fn token_at(s: &str, at_line_start: bool) -> Option<Scan<'_>> {
    match s.as_bytes().first()? {
        b'*' => match_bold(s).or_else(|| match_italic(s)),
        b'#' if at_line_start => match_header(s),
        b'a'..=b'z' if at_line_start => match_letter_prefix(s),
        _ => None,
    }
}

/// Matches `**content**` at the start of `s`.
pub fn match_bold(s: &str) -> Option<Scan<'_>> {
    let rest = s.strip_prefix("**")?;
    let end = rest.find(['*', '\n'])?;
    if end == 0 || !rest[end..].starts_with("**") {
        return None;
    }
    Some(Scan {
        token: Token::Bold(&rest[..end]),
        len: 2 + end + 2,
    })
}

/// Matches `*content*` at the start of `s`.
///
/// Rejects a `**` opener outright so an unclosed bold span falls through
/// to literal text instead of being half-eaten as italic.
pub fn match_italic(s: &str) -> Option<Scan<'_>> {
    let rest = s.strip_prefix('*')?;
    if rest.starts_with('*') {
        return None;
    }
    let end = rest.find(['*', '\n'])?;
    if end == 0 || rest.as_bytes()[end] != b'*' {
        return None;
    }
    Some(Scan {
        token: Token::Italic(&rest[..end]),
        len: 1 + end + 1,
    })
}

/// Matches a header line at the start of `s`.
///
/// Whitespace after the hashes is optional (`#x` is a header), but the
/// content must be non-empty — a bare `######` stays literal.
pub fn match_header(s: &str) -> Option<Scan<'_>> {
    let hashes = s.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 {
        return None;
    }
    let level = hashes.min(6);
    let rest = &s[level..];
    let ws = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after_ws = &rest[ws..];
    let line_end = after_ws.find('\n').unwrap_or(after_ws.len());
    if line_end == 0 {
        return None;
    }
    Some(Scan {
        token: Token::Header {
            level: level as u8,
            content: &after_ws[..line_end],
        },
        len: level + ws + line_end,
    })
}

/// Matches a lettered prefix (`a)` plus trailing spaces) at the start of `s`.
pub fn match_letter_prefix(s: &str) -> Option<Scan<'_>> {
    let bytes = s.as_bytes();
    let letter = *bytes.first()?;
    if !letter.is_ascii_lowercase() || bytes.get(1) != Some(&b')') {
        return None;
    }
    let rest = &s[2..];
    let ws = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    Some(Scan {
        token: Token::ListPrefixLetter(letter as char),
        len: 2 + ws,
    })
}

/// Matches a list item line (`-` or `*` marker) at the start of `s`.
///
/// Only used by the renderer's tokenizer, and only after bold/italic have
/// had their chance at a `*` marker. Content may be empty (`- ` alone is
/// still an item).
pub fn match_list_item(s: &str) -> Option<Scan<'_>> {
    let marker = *s.as_bytes().first()?;
    if marker != b'-' && marker != b'*' {
        return None;
    }
    let rest = &s[1..];
    let ws = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after_ws = &rest[ws..];
    let line_end = after_ws.find('\n').unwrap_or(after_ws.len());
    Some(Scan {
        token: Token::ListItem(&after_ws[..line_end]),
        len: 1 + ws + line_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_is_matched_before_italic() {
        let scan = token_at("**x** tail", false).unwrap();
        assert_eq!(scan.token, Token::Bold("x"));
        assert_eq!(scan.len, 5);
    }

    #[test]
    fn italic_matches_single_asterisk_span() {
        let scan = token_at("*x* tail", false).unwrap();
        assert_eq!(scan.token, Token::Italic("x"));
        assert_eq!(scan.len, 3);
    }

    #[test]
    fn unclosed_delimiters_do_not_match() {
        assert_eq!(token_at("**x", false), None);
        assert_eq!(token_at("*x", false), None);
        assert_eq!(token_at("*", false), None);
        assert_eq!(token_at("**", false), None);
    }

    #[test]
    fn bold_does_not_span_lines() {
        assert_eq!(match_bold("**a\nb**"), None);
        assert_eq!(match_italic("*a\nb*"), None);
    }

    #[test]
    fn empty_spans_stay_literal() {
        assert_eq!(match_bold("****"), None);
        assert_eq!(match_italic("**"), None);
    }

    #[test]
    fn header_levels_cap_at_six() {
        let scan = match_header("###### h").unwrap();
        assert_eq!(
            scan.token,
            Token::Header {
                level: 6,
                content: "h"
            }
        );

        let scan = match_header("####### x").unwrap();
        assert_eq!(
            scan.token,
            Token::Header {
                level: 6,
                content: "# x"
            }
        );
    }

    #[test]
    fn header_whitespace_is_optional() {
        let scan = match_header("#x").unwrap();
        assert_eq!(
            scan.token,
            Token::Header {
                level: 1,
                content: "x"
            }
        );
    }

    #[test]
    fn header_needs_content_and_line_start() {
        assert_eq!(match_header("######"), None);
        assert_eq!(match_header("#  \n"), None);
        assert_eq!(token_at("# mid", false), None);
    }

    #[test]
    fn header_stops_at_newline() {
        let scan = match_header("# title\nrest").unwrap();
        assert_eq!(
            scan.token,
            Token::Header {
                level: 1,
                content: "title"
            }
        );
        assert_eq!(scan.len, "# title".len());
    }

    #[test]
    fn letter_prefix_consumes_trailing_spaces() {
        let scan = token_at("a) primero", true).unwrap();
        assert_eq!(scan.token, Token::ListPrefixLetter('a'));
        assert_eq!(scan.len, 3);
    }

    #[test]
    fn letter_prefix_requires_line_start_and_paren() {
        assert_eq!(token_at("a) x", false), None);
        assert_eq!(token_at("ab x", true), None);
    }

    #[test]
    fn list_item_captures_line_content() {
        let scan = match_list_item("- uno\n- dos").unwrap();
        assert_eq!(scan.token, Token::ListItem("uno"));
        assert_eq!(scan.len, "- uno".len());
    }

    #[test]
    fn reveal_trigger_set_excludes_list_items() {
        // `- uno` at line start is revealed character by character.
        assert_eq!(token_at("- uno", true), None);
        // `* uno` is not italic (no closing marker on the line).
        assert_eq!(token_at("* uno", true), None);
    }
}
