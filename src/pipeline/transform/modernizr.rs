//! Custom feature-detection bundle.
//!
//! Scripts and stylesheets are scanned for the detects they use:
//!
//! ```text
//! if (Modernizr.flexbox) …     → flexbox
//! .no-touchevents .menu { … }  → touchevents
//! ```
//!
//! and a `window.Modernizr` script containing only those detects (plus the
//! configured ones) is emitted.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

use crate::pipeline::{Asset, Combine};

/// Detect name and the JavaScript expression computing it. Expressions may
/// use `docElement`, `createElement`, `testProp` and `testAllProps`.
const DETECTS: &[(&str, &str)] = &[
    ("audio", "!!createElement('audio').canPlayType"),
    ("backgroundsize", "testAllProps('backgroundSize', 'cover')"),
    ("borderradius", "testAllProps('borderRadius', '0px')"),
    ("boxshadow", "testAllProps('boxShadow', '1px 1px')"),
    ("canvas", "!!(createElement('canvas').getContext && createElement('canvas').getContext('2d'))"),
    ("cssanimations", "testAllProps('animationName', 'a')"),
    ("csscalc", "(function () { var s = createElement('a').style; s.cssText = 'width:calc(10px);'; return !!s.width; })()"),
    ("cssgradients", "(function () { var s = createElement('a').style; s.backgroundImage = 'linear-gradient(left top,#9f9,white)'; return ('' + s.backgroundImage).indexOf('gradient') > -1; })()"),
    ("csstransforms", "testAllProps('transform', 'scale(1)')"),
    ("csstransforms3d", "testAllProps('perspective', '1px')"),
    ("csstransitions", "testAllProps('transition', 'all')"),
    ("cssvhunit", "(function () { var s = createElement('a').style; s.height = '50vh'; return s.height === '50vh'; })()"),
    ("flexbox", "testAllProps('flexBasis', '1px')"),
    ("flexwrap", "testAllProps('flexWrap', 'wrap')"),
    ("fontface", "'FontFace' in window || !!document.styleSheets"),
    ("geolocation", "'geolocation' in navigator"),
    ("hashchange", "'onhashchange' in window"),
    ("history", "!!(window.history && history.pushState)"),
    ("inlinesvg", "(function () { var d = createElement('div'); d.innerHTML = '<svg/>'; return (d.firstChild && d.firstChild.namespaceURI) === 'http://www.w3.org/2000/svg'; })()"),
    ("localstorage", "(function () { try { localStorage.setItem('modernizr', 'modernizr'); localStorage.removeItem('modernizr'); return true; } catch (e) { return false; } })()"),
    ("multiplebgs", "(function () { var s = createElement('a').style; s.cssText = 'background:url(https://),url(https://),red url(https://)'; return (/(url\\s*\\(.*?){3}/).test(s.background); })()"),
    ("objectfit", "testAllProps('objectFit', 'cover')"),
    ("opacity", "(function () { var s = createElement('a').style; s.cssText = 'opacity:.55'; return (/^0.55$/).test(s.opacity); })()"),
    ("placeholder", "'placeholder' in createElement('input') && 'placeholder' in createElement('textarea')"),
    ("rgba", "(function () { var s = createElement('a').style; s.cssText = 'background-color:rgba(150,255,150,.5)'; return ('' + s.backgroundColor).indexOf('rgba') > -1; })()"),
    ("sessionstorage", "(function () { try { sessionStorage.setItem('modernizr', 'modernizr'); sessionStorage.removeItem('modernizr'); return true; } catch (e) { return false; } })()"),
    ("svg", "!!document.createElementNS && !!document.createElementNS('http://www.w3.org/2000/svg', 'svg').createSVGRect"),
    ("textshadow", "testProp('textShadow')"),
    ("touchevents", "('ontouchstart' in window) || (window.DocumentTouch && document instanceof DocumentTouch)"),
    ("video", "!!createElement('video').canPlayType"),
    ("webgl", "(function () { var c = createElement('canvas'); try { return !!(window.WebGLRenderingContext && (c.getContext('webgl') || c.getContext('experimental-webgl'))); } catch (e) { return false; } })()"),
    ("websockets", "'WebSocket' in window && window.WebSocket.CLOSING === 2"),
];

/// API options and the code each one adds.
const OPTIONS: &[(&str, &str)] = &[
    ("addTest", ADD_TEST),
    ("html5printshiv", HTML5_SHIV),
    ("html5shiv", HTML5_SHIV),
    ("mq", MQ),
    ("setClasses", ""),
    ("testAllProps", "  Modernizr.testAllProps = testAllProps;\n"),
    ("testProp", "  Modernizr.testProp = testProp;\n"),
];

const PRELUDE: &str = r#";(function (window, document) {
  var docElement = document.documentElement;
  var Modernizr = { _version: 'custom' };
  var classes = [];
  var prefixes = ['', 'Webkit', 'Moz', 'O', 'ms'];
  function createElement(name) { return document.createElement(name); }
  function testProp(prop) {
    return createElement('modernizr').style[prop] !== undefined;
  }
  function testAllProps(prop, value) {
    var style = createElement('modernizr').style;
    var ucProp = prop.charAt(0).toUpperCase() + prop.slice(1);
    for (var i = 0; i < prefixes.length; i++) {
      var name = prefixes[i] ? prefixes[i] + ucProp : prop;
      if (style[name] === undefined) continue;
      if (value === undefined) return true;
      try { style[name] = value; } catch (e) {}
      if (style[name] !== '') return true;
    }
    return false;
  }
  function record(name, result) {
    Modernizr[name] = !!result;
    classes.push((result ? '' : 'no-') + name);
  }
"#;

const ADD_TEST: &str = r#"  Modernizr.addTest = function (name, test) {
    record(name.toLowerCase(), typeof test === 'function' ? test() : test);
    if (setClasses) docElement.className += ' ' + classes[classes.length - 1];
    return Modernizr;
  };
"#;

const HTML5_SHIV: &str = r#"  'abbr article aside audio bdi canvas data datalist details dialog figcaption figure footer header hgroup main mark meter nav output picture progress section summary template time video'
    .split(' ').forEach(function (tag) { createElement(tag); });
"#;

const MQ: &str = r#"  Modernizr.mq = function (query) {
    return !!(window.matchMedia && window.matchMedia(query).matches);
  };
"#;

pub fn is_known_detect(name: &str) -> bool {
    DETECTS.iter().any(|(n, _)| *n == name)
}

pub fn is_known_option(name: &str) -> bool {
    OPTIONS.iter().any(|(n, _)| *n == name)
}

// ASCII word boundaries: the regex build carries no Unicode tables.
static JS_USE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"Modernizr\.([a-z0-9]+)(?-u:\b)"));
static CSS_USE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\.(?:no-)?([a-z0-9]+)(?-u:\b)"));

/// Detects referenced by one source file.
pub fn scan(asset: &Asset) -> Result<BTreeSet<&'static str>> {
    let Ok(text) = asset.text() else {
        return Ok(BTreeSet::new());
    };
    let pattern = match asset.extension().as_str() {
        "js" => &*JS_USE,
        "css" | "scss" | "sass" => &*CSS_USE,
        _ => return Ok(BTreeSet::new()),
    };
    let re = pattern
        .as_ref()
        .map_err(|e| anyhow!("invalid detect pattern: {e}"))?;
    Ok(re
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| DETECTS.iter().find(|(n, _)| *n == m.as_str()).map(|(n, _)| *n))
        .collect())
}

/// Emit the bundle source for a set of detects and options.
pub fn build(detects: &BTreeSet<&str>, options: &[String]) -> String {
    let has = |name: &str| options.iter().any(|o| o == name);
    let mut out = String::new();

    let names: Vec<&str> = detects.iter().copied().collect();
    out.push_str(&format!("/*! modernizr custom build: {} */\n", names.join(", ")));
    out.push_str(PRELUDE);
    out.push_str(&format!("  var setClasses = {};\n", has("setClasses")));

    for (name, expr) in DETECTS.iter().filter(|(n, _)| detects.contains(n)) {
        out.push_str(&format!("  record('{name}', (function () {{ try {{ return {expr}; }} catch (e) {{ return false; }} }})());\n"));
    }
    for (name, code) in OPTIONS {
        if has(name) && !(*name == "html5shiv" && has("html5printshiv")) {
            out.push_str(code);
        }
    }
    out.push_str(
        "  if (setClasses) {\n    docElement.className = docElement.className.replace(/(^|\\s)no-js(\\s|$)/, '$1js$2') + (classes.length ? ' ' + classes.join(' ') : '');\n  }\n",
    );
    out.push_str("  window.Modernizr = Modernizr;\n})(window, document);\n");
    out
}

pub struct Modernizr {
    output: String,
    options: Vec<String>,
    forced: Vec<String>,
}

impl Modernizr {
    pub fn new(output: impl Into<String>, options: &[String], forced: &[String]) -> Self {
        Self {
            output: output.into(),
            options: options.to_vec(),
            forced: forced.to_vec(),
        }
    }
}

impl Combine for Modernizr {
    fn name(&self) -> &str {
        "modernizr"
    }

    fn combine(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let mut detects = BTreeSet::new();
        for asset in &assets {
            detects.extend(scan(asset)?);
        }
        detects.extend(
            self.forced
                .iter()
                .filter_map(|t| DETECTS.iter().find(|(n, _)| *n == t.as_str()).map(|(n, _)| *n)),
        );
        Ok(vec![Asset::new(&self.output, build(&detects, &self.options))])
    }
}
