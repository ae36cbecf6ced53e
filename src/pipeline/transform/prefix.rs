//! Vendor prefixing for a browserslist target set.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::pipeline::{Asset, Transform};

pub struct Autoprefix {
    targets: Targets,
}

impl Autoprefix {
    pub fn new(queries: &[String]) -> Result<Self> {
        let browsers = Browsers::from_browserslist(queries)
            .map_err(|e| anyhow!("invalid browserslist query: {e}"))?;
        Ok(Self {
            targets: Targets {
                browsers,
                ..Targets::default()
            },
        })
    }
}

impl Transform for Autoprefix {
    fn name(&self) -> &str {
        "autoprefix"
    }

    fn apply(&self, mut asset: Asset) -> Result<Option<Asset>> {
        let source = asset.text()?.to_string();
        let options = ParserOptions {
            filename: asset.path.display().to_string(),
            ..ParserOptions::default()
        };
        let mut sheet = StyleSheet::parse(&source, options).map_err(|e| anyhow!("{e}"))?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| anyhow!("{e}"))?;
        let css = sheet
            .to_css(PrinterOptions {
                targets: self.targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| anyhow!("{e}"))?
            .code;

        asset.set_text(css);
        Ok(Some(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_prefixes_for_old_browsers() {
        let prefix = Autoprefix::new(&["ie 10".into()]).unwrap();
        let out = prefix
            .apply(Asset::new("main.css", ".a { display: flex; }"))
            .unwrap()
            .unwrap();
        assert!(out.text().unwrap().contains("-ms-flexbox"));
    }

    #[test]
    fn test_binary_input_is_rejected() {
        let prefix = Autoprefix::new(&["last 1 chrome version".into()]).unwrap();
        let err = prefix.apply(Asset::new("main.css", vec![0xff, 0xfe])).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_invalid_query() {
        assert!(Autoprefix::new(&["not a real query !!".into()]).is_err());
    }
}
