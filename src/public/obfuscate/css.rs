//! Stylesheet scanning: selectors, `@keyframes` names and `animation` values.
//!
//! A single byte-level walker splits the sheet into pieces and tracks the
//! block stack, so the same traversal serves collection and rewriting:
//!
//! ```text
//! Rules        .a, #b > .c { ... }       prelude is a selector
//! Rules        @media (...) { ... }      nested rule list
//! Rules        @keyframes spin { ... }   keyframe blocks
//! Keyframes    from { ... } 50% { ... }  declarations, prelude kept
//! Declarations color: red; animation: spin 1s
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{NameKind, Renames};

static VALUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// At-rules whose block holds rules rather than declarations.
const NESTING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "-moz-document",
    "scope",
    "starting-style",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Rules,
    Keyframes,
    Declarations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Selector,
    KeyframesPrelude,
    Declaration,
    Verbatim,
}

/// Report every class, id and keyframes name in order of appearance.
pub(super) fn collect(css: &str, mut found: impl FnMut(NameKind, &str)) {
    walk(css, |piece, text| {
        match piece {
            Piece::Selector => {
                map_selector(text, |kind, name| {
                    found(kind, name);
                    None
                });
            }
            Piece::KeyframesPrelude => {
                if let Some(range) = keyframes_name(text) {
                    found(NameKind::Keyframes, &text[range]);
                }
            }
            Piece::Declaration | Piece::Verbatim => {}
        }
        None
    });
}

pub(super) fn rewrite(css: &str, renames: &Renames) -> String {
    walk(css, |piece, text| match piece {
        Piece::Selector => Some(map_selector(text, |kind, name| {
            renames.lookup(kind, name).map(str::to_string)
        })),
        Piece::KeyframesPrelude => {
            let range = keyframes_name(text)?;
            let renamed = renames.lookup(NameKind::Keyframes, &text[range.clone()])?;
            Some(format!("{}{}{}", &text[..range.start], renamed, &text[range.end..]))
        }
        Piece::Declaration => rewrite_animation(text, renames),
        Piece::Verbatim => None,
    })
}

/// Split `css` into pieces; `visit` may replace each piece's text.
fn walk(css: &str, mut visit: impl FnMut(Piece, &str) -> Option<String>) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut stack = vec![Block::Rules];
    let mut start = 0;
    let mut i = 0;

    let mut emit = |out: &mut String, piece: Piece, text: &str| match visit(piece, text) {
        Some(replacement) => out.push_str(&replacement),
        None => out.push_str(text),
    };
    let pending = |stack: &[Block]| match stack.last() {
        Some(Block::Declarations) => Piece::Declaration,
        _ => Piece::Verbatim,
    };

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(css, i);
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote);
                continue;
            }
            b'{' => {
                let prelude = &css[start..i];
                let (piece, block) = classify(stack.last().copied(), prelude);
                emit(&mut out, piece, prelude);
                out.push('{');
                stack.push(block);
                start = i + 1;
            }
            b'}' => {
                emit(&mut out, pending(&stack), &css[start..i]);
                out.push('}');
                if stack.len() > 1 {
                    stack.pop();
                }
                start = i + 1;
            }
            b';' => {
                emit(&mut out, pending(&stack), &css[start..i]);
                out.push(';');
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    emit(&mut out, pending(&stack), &css[start..]);
    out
}

fn classify(ctx: Option<Block>, prelude: &str) -> (Piece, Block) {
    let head = skip_leading_comments(prelude);
    match ctx {
        Some(Block::Keyframes) => (Piece::Verbatim, Block::Declarations),
        _ if head.starts_with('@') => {
            let name: String = head[1..]
                .bytes()
                .take_while(|&b| is_ident_byte(b))
                .map(|b| b.to_ascii_lowercase() as char)
                .collect();
            if name.ends_with("keyframes") {
                (Piece::KeyframesPrelude, Block::Keyframes)
            } else if NESTING_AT_RULES.contains(&name.as_str()) {
                (Piece::Verbatim, Block::Rules)
            } else {
                (Piece::Verbatim, Block::Declarations)
            }
        }
        _ => (Piece::Selector, Block::Declarations),
    }
}

/// Visit `.class` and `#id` names in selector text.
///
/// Attribute selectors, strings and comments are left untouched. `f`
/// returns the replacement for a name, or `None` to keep it.
pub(super) fn map_selector(
    selector: &str,
    mut f: impl FnMut(NameKind, &str) -> Option<String>,
) -> String {
    let bytes = selector.as_bytes();
    let mut out = String::with_capacity(selector.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => i = skip_brackets(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(selector, i),
            quote @ (b'"' | b'\'') => i = skip_string(bytes, i, quote),
            marker @ (b'.' | b'#') if starts_ident(&bytes[i + 1..]) => {
                let start = i + 1;
                let end = start + ident_len(&bytes[start..]);
                let kind = if marker == b'.' {
                    NameKind::Class
                } else {
                    NameKind::Id
                };
                if let Some(replacement) = f(kind, &selector[start..end]) {
                    out.push_str(&selector[last..start]);
                    out.push_str(&replacement);
                    last = end;
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&selector[last..]);
    out
}

fn keyframes_name(prelude: &str) -> Option<Range<usize>> {
    let bytes = prelude.as_bytes();
    let mut i = prelude.find('@')? + 1;
    i += ident_len(&bytes[i..]);
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    let len = ident_len(&bytes[i..]);
    (len > 0).then_some(i..i + len)
}

fn rewrite_animation(decl: &str, renames: &Renames) -> Option<String> {
    let colon = decl.find(':')?;
    let prop = decl[..colon].trim().to_ascii_lowercase();
    if !matches!(unprefixed(&prop), "animation" | "animation-name") {
        return None;
    }
    let value = VALUE_TOKEN.replace_all(&decl[colon + 1..], |caps: &Captures| {
        renames
            .lookup(NameKind::Keyframes, &caps[0])
            .unwrap_or(&caps[0])
            .to_string()
    });
    Some(format!("{}{}", &decl[..=colon], value))
}

/// `-webkit-animation` -> `animation`
fn unprefixed(prop: &str) -> &str {
    match prop.strip_prefix('-') {
        Some(rest) => rest.find('-').map_or(prop, |i| &rest[i + 1..]),
        None => prop,
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn starts_ident(bytes: &[u8]) -> bool {
    let is_start = |b: u8| b.is_ascii_alphabetic() || b == b'_' || b >= 0x80;
    match bytes {
        [b'-', next, ..] => is_start(*next) || *next == b'-',
        [first, ..] => is_start(*first),
        [] => false,
    }
}

fn ident_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| is_ident_byte(b)).count()
}

/// Index just past the string starting at `start`.
pub(super) fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index just past the `/* */` comment starting at `start`.
fn skip_comment(text: &str, start: usize) -> usize {
    text[start + 2..]
        .find("*/")
        .map_or(text.len(), |p| start + 2 + p + 2)
}

fn skip_brackets(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => i = skip_string(bytes, i, quote),
            b']' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_leading_comments(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        match text.strip_prefix("/*") {
            Some(rest) => text = rest.find("*/").map_or("", |p| &rest[p + 2..]),
            None => return text,
        }
    }
}
