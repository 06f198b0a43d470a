//! Markup chain: HTML pages with include directives resolved.
//!
//! Recognized directives, paths relative to the including file:
//!
//! ```text
//! <!--=include html/header.html -->
//! <!--= include html/header.html -->
//! //=include html/snippet.js
//! <!--=require html/icons.html -->   (at most once per page)
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

use super::{FileOutcome, IncludeError, TransformError, read_string, write_file};
use crate::core::PipelineContext;
use crate::registry::Route;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)<!--=\s*(include|require)\s+["']?([^"'\s]+?)["']?\s*-->|^[ \t]*//=\s*(include|require)\s+["']?([^"'\s]+)["']?[ \t]*$"#,
    )
    .unwrap()
});

pub(super) fn render(
    route: &Route,
    ctx: &PipelineContext,
    src: &Path,
) -> Result<FileOutcome, TransformError> {
    let html = resolve_includes(src)?;
    let dest = route.output_path(ctx.root(), src);
    write_file(&dest, html)?;
    Ok(FileOutcome::Written(vec![dest]))
}

/// Expand every include directive in `path`, recursively.
pub fn resolve_includes(path: &Path) -> Result<String, TransformError> {
    let mut resolver = Resolver::default();
    resolver.expand(path)
}

/// Per-page state; discarded on the first error.
#[derive(Default)]
struct Resolver {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    /// Files already pulled in, for `require`.
    included: FxHashSet<PathBuf>,
}

impl Resolver {
    fn expand(&mut self, path: &Path) -> Result<String, TransformError> {
        let key = canonical(path);
        if let Some(pos) = self.stack.iter().position(|p| *p == key) {
            let mut chain = self.stack[pos..].to_vec();
            chain.push(key);
            return Err(IncludeError::Cycle { chain }.into());
        }

        let content = read_string(path)?;
        let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();

        self.stack.push(key.clone());
        self.included.insert(key);

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for caps in DIRECTIVE.captures_iter(&content) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            out.push_str(&content[last..whole.start]);
            last = whole.end;

            let (kind, target) = directive(&caps);
            let target_path = dir.join(target);
            if !target_path.is_file() {
                return Err(IncludeError::Missing {
                    path: target_path,
                    from: path.to_path_buf(),
                }
                .into());
            }
            if kind == "require" && self.included.contains(&canonical(&target_path)) {
                continue;
            }

            let included = self.expand(&target_path)?;
            out.push_str(included.trim_end_matches(['\n', '\r']));
        }
        out.push_str(&content[last..]);

        self.stack.pop();
        Ok(out)
    }
}

fn directive<'h>(caps: &Captures<'h>) -> (&'h str, &'h str) {
    let pick = |a: usize, b: usize| {
        caps.get(a)
            .or_else(|| caps.get(b))
            .map_or("", |m| m.as_str())
    };
    (pick(1, 3), pick(2, 4))
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing;
    use tempfile::TempDir;

    #[test]
    fn test_directive_pattern_whitespace() {
        let caps = DIRECTIVE.captures("<!--=\tinclude\t'html/a.html' -->").unwrap();
        assert_eq!(&caps[1], "include");
        assert_eq!(&caps[2], "html/a.html");

        let caps = DIRECTIVE.captures("  //= require js/b.js").unwrap();
        assert_eq!(&caps[3], "require");
        assert_eq!(&caps[4], "js/b.js");
    }

    #[test]
    fn test_nested_includes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        testing::write(root, "index.html", "<body>\n<!--=include html/header.html -->\n</body>\n");
        testing::write(root, "html/header.html", "<header><!--= include nav.html --></header>\n");
        testing::write(root, "html/nav.html", "<nav>menu</nav>\n");

        let html = resolve_includes(&root.join("index.html")).unwrap();
        assert_eq!(html, "<body>\n<header><nav>menu</nav></header>\n</body>\n");
    }

    #[test]
    fn test_script_style_directive() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        testing::write(root, "page.html", "<script>\n  //=include js/init.js\n</script>");
        testing::write(root, "js/init.js", "init();\n");

        let html = resolve_includes(&root.join("page.html")).unwrap();
        assert_eq!(html, "<script>\ninit();\n</script>");
    }

    #[test]
    fn test_require_includes_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        testing::write(
            root,
            "index.html",
            "<!--=require icons.html -->|<!--=require icons.html -->|<!--=include icons.html -->",
        );
        testing::write(root, "icons.html", "<svg/>");

        let html = resolve_includes(&root.join("index.html")).unwrap();
        assert_eq!(html, "<svg/>||<svg/>");
    }

    #[test]
    fn test_cycle_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        testing::write(root, "a.html", "<!--=include b.html -->");
        testing::write(root, "b.html", "<!--=include a.html -->");

        let err = resolve_includes(&root.join("a.html")).unwrap_err();
        let TransformError::Include(IncludeError::Cycle { chain }) = &err else {
            panic!("expected cycle, got {err}");
        };
        assert_eq!(chain.len(), 3);
        assert!(err.to_string().contains("a.html -> b.html -> a.html"));
    }

    #[test]
    fn test_self_include_is_cycle() {
        let dir = TempDir::new().unwrap();
        testing::write(dir.path(), "a.html", "<!--=include a.html -->");
        let err = resolve_includes(&dir.path().join("a.html")).unwrap_err();
        assert!(matches!(err, TransformError::Include(IncludeError::Cycle { .. })));
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        testing::write(dir.path(), "a.html", "<!--=include gone.html -->");
        let err = resolve_includes(&dir.path().join("a.html")).unwrap_err();
        assert!(matches!(err, TransformError::Include(IncludeError::Missing { .. })));
    }

    #[test]
    fn test_plain_comments_untouched() {
        let dir = TempDir::new().unwrap();
        let html = "<!-- include nothing -->\n<a href=\"http://x//=include\">x</a>";
        testing::write(dir.path(), "a.html", html);
        assert_eq!(resolve_includes(&dir.path().join("a.html")).unwrap(), html);
    }
}
