//! Markup rewriting: `class`, `id` and `for` attributes, in-page `href`
//! fragments, plus inline `<style>` and `<script>` bodies.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{NameKind, Renames, css, js};

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)",
        r"(<style\b[^>]*>)(.*?)(</style\s*>)",
        r"|(<script\b[^>]*>)(.*?)(</script\s*>)",
        r#"|(\s(class|id|for|href)\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
    ))
    .unwrap()
});

pub(super) fn rewrite(html: &str, renames: &Renames) -> String {
    MARKUP
        .replace_all(html, |caps: &Captures| {
            if let Some(body) = caps.get(2) {
                return format!("{}{}{}", &caps[1], css::rewrite(body.as_str(), renames), &caps[3]);
            }
            if let Some(body) = caps.get(5) {
                return format!("{}{}{}", &caps[4], js::rewrite(body.as_str(), renames), &caps[6]);
            }

            let attr = caps[8].to_ascii_lowercase();
            let (open, value, close) = if let Some(v) = caps.get(9) {
                ("\"", v.as_str(), "\"")
            } else if let Some(v) = caps.get(10) {
                ("'", v.as_str(), "'")
            } else {
                ("", caps.get(11).map_or("", |m| m.as_str()), "")
            };

            let value = match attr.as_str() {
                "class" => rename_tokens(value, NameKind::Class, renames),
                "href" => rename_fragment(value, renames),
                _ => rename_tokens(value, NameKind::Id, renames),
            };
            format!("{}{open}{value}{close}", &caps[7])
        })
        .into_owned()
}

/// `#id` -> `#new`; any other link is left alone.
fn rename_fragment(value: &str, renames: &Renames) -> String {
    match value
        .strip_prefix('#')
        .and_then(|id| renames.lookup(NameKind::Id, id))
    {
        Some(id) => format!("#{id}"),
        None => value.to_string(),
    }
}

/// Rename whitespace-separated tokens, keeping the original spacing.
fn rename_tokens(value: &str, kind: NameKind, renames: &Renames) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while !rest.is_empty() {
        let ws = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..ws]);
        rest = &rest[ws..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        out.push_str(renames.lookup(kind, token).unwrap_or(token));
        rest = &rest[end..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renames() -> Renames {
        Renames::for_test(&[("card", "preasuf"), ("title", "prebsuf")], &[("email", "preasuf")])
    }

    #[test]
    fn test_attributes() {
        let html = r#"<div class="card  title fa" id='email'><label for=email>x</label></div>"#;
        assert_eq!(
            rewrite(html, &renames()),
            r#"<div class="preasuf  prebsuf fa" id='preasuf'><label for=preasuf>x</label></div>"#
        );
    }

    #[test]
    fn test_inline_style_and_script() {
        let html = "<style>.card { color: red }</style>\n<script>\nq('.title');\n</script>";
        assert_eq!(
            rewrite(html, &renames()),
            "<style>.preasuf { color: red }</style>\n<script>\nq('.prebsuf');\n</script>"
        );
    }

    #[test]
    fn test_markup_pattern_compiles() {
        assert!(MARKUP.is_match("<DIV\tCLASS = card>"));
    }

    #[test]
    fn test_href_fragment_follows_id() {
        let html = r##"<a href="#email">x</a><a href='#card'>y</a><a href="/page#email">z</a>"##;
        assert_eq!(
            rewrite(html, &renames()),
            r##"<a href="#preasuf">x</a><a href='#card'>y</a><a href="/page#email">z</a>"##
        );
    }

    #[test]
    fn test_other_attributes_untouched() {
        let html = r#"<a href="card" data-class="card" title="card">card</a>"#;
        assert_eq!(rewrite(html, &renames()), html);
    }
}
