//! Built-in stages.
//!
//! | Stage        | Kind    | Used by            |
//! |--------------|---------|--------------------|
//! | `Sass`       | each    | styles             |
//! | `Autoprefix` | each    | styles             |
//! | `Lint`       | each    | lint               |
//! | `Concat`     | all     | scripts, vendor    |
//! | `Modernizr`  | all     | modernizr          |
//! | `OptimizeImages` | each | images            |
//! | `Sprite`     | all     | icons              |
//! | `RenderTemplates` | each | html             |
//! | `Minify`     | each    | minify             |

mod concat;
mod image;
pub mod lint;
mod minify;
pub mod modernizr;
mod prefix;
mod sass;
mod sprite;
mod svg;
mod template;

pub use concat::Concat;
pub use image::OptimizeImages;
pub use lint::Lint;
pub use minify::Minify;
pub use modernizr::Modernizr;
pub use prefix::Autoprefix;
pub use sass::Sass;
pub use sprite::Sprite;
pub use template::RenderTemplates;
