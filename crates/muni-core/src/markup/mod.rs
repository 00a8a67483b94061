//! Markdown-subset rendering for assistant replies.
//!
//! `render()` converts raw reply text into an HTML fragment using the
//! token grammar in [`grammar`]. The reveal engine in [`reveal`] replays
//! the same text one character-or-token at a time through the identical
//! grammar, so incremental disclosure and one-shot rendering agree.
//!
//! Rendering is pure and total: unrecognized or malformed syntax passes
//! through as literal text, and empty input produces empty output. Input
//! is author-controlled; no HTML escaping is performed.

pub mod grammar;
pub mod reveal;

use std::fmt::Write as _;

use grammar::Token;

/// One entry in the flat stream produced by the tokenizer.
///
/// Newline handling lives here rather than in the grammar because it is a
/// renderer concern: the reveal engine emits newlines verbatim and relies
/// on the final full render pass to place `<br>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Tok(Token<'a>),
    LineBreak,
    Literal(char),
}

/// Renders raw text in the supported markdown subset to an HTML fragment.
pub fn render(text: &str) -> String {
    let pieces = tokenize(text);
    let mut out = String::with_capacity(text.len());

    // Grouping pass: a maximal run of consecutive list items becomes one
    // <ul>; anything else breaks the run. Runs are only ever adjacent in
    // the stream because the newline between two list lines is elided.
    let mut i = 0;
    while i < pieces.len() {
        if matches!(pieces[i], Piece::Tok(Token::ListItem(_))) {
            out.push_str("<ul>");
            while let Some(Piece::Tok(Token::ListItem(content))) = pieces.get(i) {
                out.push_str("<li>");
                render_inline(content, &mut out);
                out.push_str("</li>");
                i += 1;
            }
            out.push_str("</ul>");
            continue;
        }
        emit(&pieces[i], &mut out);
        i += 1;
    }

    out
}

/// Tokenizes the whole text into a flat stream.
///
/// Walks left to right, tracking line starts. A newline immediately
/// followed by a block marker (`-`, `*`, `#`) is elided — the block
/// element supplies its own spacing — while any other newline becomes a
/// line break.
fn tokenize(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut i = 0;
    let mut at_line_start = true;

    while i < text.len() {
        let rest = &text[i..];
        let c = rest.chars().next().unwrap_or_default();

        if c == '\n' {
            if !matches!(rest[1..].as_bytes().first(), Some(b'-' | b'*' | b'#')) {
                pieces.push(Piece::LineBreak);
            }
            i += 1;
            at_line_start = true;
            continue;
        }

        let scan = grammar::token_at(rest, at_line_start).or_else(|| {
            if at_line_start && matches!(c, '-' | '*') {
                grammar::match_list_item(rest)
            } else {
                None
            }
        });

        if let Some(scan) = scan {
            pieces.push(Piece::Tok(scan.token));
            i += scan.len;
        } else {
            pieces.push(Piece::Literal(c));
            i += c.len_utf8();
        }
        at_line_start = false;
    }

    pieces
}

/// Renders inline content (header and list-item interiors).
///
/// Only bold and italic can fire here: block tokens all require a line
/// start, and bold/italic content cannot contain `*`, so nesting stops at
/// one level.
fn render_inline(s: &str, out: &mut String) {
    let mut i = 0;
    while i < s.len() {
        if let Some(scan) = grammar::token_at(&s[i..], false) {
            emit(&Piece::Tok(scan.token), out);
            i += scan.len;
            continue;
        }
        let c = s[i..].chars().next().unwrap_or_default();
        out.push(c);
        i += c.len_utf8();
    }
}

fn emit(piece: &Piece<'_>, out: &mut String) {
    match piece {
        Piece::Tok(Token::Bold(content)) => {
            let _ = write!(out, "<strong>{content}</strong>");
        }
        Piece::Tok(Token::Italic(content)) => {
            let _ = write!(out, "<em>{content}</em>");
        }
        Piece::Tok(Token::Header { level, content }) => {
            let _ = write!(out, "<h{level}>");
            render_inline(content, out);
            let _ = write!(out, "</h{level}>");
        }
        Piece::Tok(Token::ListPrefixLetter(letter)) => {
            let _ = write!(out, "<strong>{letter})</strong> ");
        }
        Piece::Tok(Token::ListItem(content)) => {
            // List items are grouped in render(); a stray one (inline
            // context) still renders as a single-item list.
            out.push_str("<ul><li>");
            render_inline(content, out);
            out.push_str("</li></ul>");
        }
        Piece::LineBreak => out.push_str("<br>"),
        Piece::Literal(c) => out.push(*c),
    }
}
