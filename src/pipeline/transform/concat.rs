use anyhow::Result;

use crate::pipeline::{Asset, Combine};

/// Joins every asset, in collection order, into one file.
///
/// An empty input produces no output at all.
pub struct Concat {
    output: String,
}

impl Concat {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl Combine for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn combine(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }
        let mut contents = Vec::new();
        for (i, asset) in assets.iter().enumerate() {
            if i > 0 {
                contents.push(b'\n');
            }
            contents.extend_from_slice(&asset.contents);
        }
        Ok(vec![Asset::new(&self.output, contents)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_in_order() {
        let out = Concat::new("main.js")
            .combine(vec![Asset::new("a.js", "var a;"), Asset::new("b.js", "var b;")])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path.to_str(), Some("main.js"));
        assert_eq!(out[0].text().unwrap(), "var a;\nvar b;");
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        assert!(Concat::new("main.js").combine(Vec::new()).unwrap().is_empty());
    }
}
