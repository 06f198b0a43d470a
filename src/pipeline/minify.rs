//! CSS post-processing and JS minification.
//!
//! Uses lightningcss for CSS and oxc for JavaScript.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;

use super::TransformError;

/// How the compiled stylesheet is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssOutput {
    /// Readable output.
    Pretty,
    /// Readable output with an inline base64 source map comment.
    PrettyWithMap,
    Minified,
}

/// Re-print compiled CSS through lightningcss.
///
/// `filename` is recorded as the map's source name.
pub fn process_css(source: &str, filename: &str, output: CssOutput) -> Result<String, TransformError> {
    let css_err = |e: &dyn std::fmt::Display| TransformError::Css(e.to_string());

    let stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| css_err(&e))?;

    let mut source_map = (output == CssOutput::PrettyWithMap).then(|| {
        let mut map = SourceMap::new("/");
        map.add_source(filename);
        // Content is only embedded for devtools; a failure leaves the map usable.
        let _ = map.set_source_content(0, source);
        map
    });

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: output == CssOutput::Minified,
            source_map: source_map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| css_err(&e))?;

    let mut code = result.code;
    if let Some(map) = source_map.as_mut() {
        let url = map.to_data_url(None).map_err(|e| css_err(&e))?;
        code.push_str(&format!("\n/*# sourceMappingURL={url} */\n"));
    }
    Ok(code)
}

/// Minify a classic (non-module) browser script.
///
/// Top-level declarations are globals shared with other scripts on the
/// page, so they keep their names and survive even when unused locally.
pub fn minify_js(source: &str, drop_console: bool) -> Result<String, TransformError> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs().with_module(false);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(err) = ret.errors.first() {
        return Err(TransformError::Script(err.to_string()));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions {
            drop_console,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}
