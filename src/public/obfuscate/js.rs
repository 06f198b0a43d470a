//! Script rewriting: names inside string literals only.
//!
//! A literal token equal to a known class (or id) is replaced whole, so
//! `classList.toggle('is-open')` follows the stylesheet. Other tokens have
//! their `.class` / `#id` fragments rewritten, which covers selector strings
//! passed to `querySelector`. Identifiers and comments are never touched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::css::{map_selector, skip_string};
use super::{NameKind, Renames};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\s]+").unwrap());

pub(super) fn rewrite(js: &str, renames: &Renames) -> String {
    let bytes = js.as_bytes();
    let mut out = String::with_capacity(js.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = js[i..].find('\n').map_or(bytes.len(), |p| i + p);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = js[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
            }
            quote @ (b'"' | b'\'' | b'`') => {
                let end = if quote == b'`' {
                    skip_template(bytes, i)
                } else {
                    skip_string(bytes, i, quote)
                };
                // Content between the quotes; an unterminated literal ends at `end`.
                let content_end = if end > i + 1 && bytes[end - 1] == quote {
                    end - 1
                } else {
                    end
                };
                let content = &js[i + 1..content_end];
                let rewritten = rewrite_literal(content, renames);
                if rewritten != content {
                    out.push_str(&js[last..i + 1]);
                    out.push_str(&rewritten);
                    last = content_end;
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&js[last..]);
    out
}

fn rewrite_literal(content: &str, renames: &Renames) -> String {
    TOKEN
        .replace_all(content, |caps: &Captures| {
            let token = &caps[0];
            if let Some(name) = renames
                .lookup(NameKind::Class, token)
                .or_else(|| renames.lookup(NameKind::Id, token))
            {
                return name.to_string();
            }
            map_selector(token, |kind, name| renames.lookup(kind, name).map(str::to_string))
        })
        .into_owned()
}

/// Index just past a template literal, `${...}` expressions included.
fn skip_template(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
