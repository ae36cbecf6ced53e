//! Configuration section definitions.
//!
//! | Module    | TOML Section              | Purpose                          |
//! |-----------|---------------------------|----------------------------------|
//! | `paths`   | `[paths]`                 | Source glob pattern sets         |
//! | `build`   | `[build]`                 | Output, cache and sprite paths   |
//! | `styles`  | `[styles]`                | Sass command, prefix targets     |
//! | `scripts` | `[scripts]`, `[modernizr]`| Bundles, lint, feature detection |
//! | `html`    | `[html]`, `[icons]`       | Template context, icon ids       |
//! | `serve`   | `[serve]`                 | Development server               |
//! | `watch`   | `[watch]`                 | Watch rules and debounce         |

mod build;
mod html;
mod paths;
mod scripts;
mod serve;
mod styles;
mod watch;

pub use build::BuildConfig;
pub use html::{HtmlConfig, IconsConfig};
pub use paths::PathsConfig;
pub use scripts::{ModernizrConfig, ScriptsConfig};
pub use serve::ServeConfig;
pub use styles::StylesConfig;
pub use watch::{WatchConfig, WatchRule};
