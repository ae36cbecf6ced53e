//! Output minification by file type.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. HTML is only tidied
//! (trailing whitespace, runs of blank lines); other files pass through.

use anyhow::{Result, anyhow, bail};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::pipeline::{Asset, Transform};

pub fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
        bail!("{error}");
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
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

pub fn minify_css(source: &str) -> Result<String> {
    let mut sheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| anyhow!("{e}"))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow!("{e}"))?;
    let result = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(result.code)
}

/// Strip trailing whitespace and collapse blank-line runs to one.
pub fn tidy_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = false;
    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if blank_run || out.is_empty() {
                continue;
            }
            blank_run = true;
        } else {
            blank_run = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

pub struct Minify;

impl Transform for Minify {
    fn name(&self) -> &str {
        "minify"
    }

    fn apply(&self, mut asset: Asset) -> Result<Option<Asset>> {
        let minified = match asset.extension().as_str() {
            "js" => minify_js(asset.text()?)?,
            "css" => minify_css(asset.text()?)?,
            "html" | "htm" => tidy_html(asset.text()?),
            _ => return Ok(Some(asset)),
        };
        asset.set_text(minified);
        Ok(Some(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js() {
        let source = "var message = 'hello';\n\nconsole.log(message);\n";
        let out = minify_js(source).unwrap();
        assert!(out.contains("console.log"));
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn test_minify_css() {
        let out = minify_css(".a {\n  color: #ff0000;\n}\n").unwrap();
        assert_eq!(out, ".a{color:red}");
    }

    #[test]
    fn test_tidy_html() {
        let out = tidy_html("\n<html>  \n\n\n<body>\t\n</body>\n\n</html>\n\n");
        assert_eq!(out, "<html>\n\n<body>\n</body>\n\n</html>\n");
    }

    #[test]
    fn test_other_files_untouched() {
        let font = Asset::new("webfonts/a.woff2", vec![0u8, 1, 2]);
        assert_eq!(Minify.apply(font.clone()).unwrap(), Some(font));
    }
}
