//! Multi-label tags function variants.

mod image;
mod tabular;
mod text;

pub use image::ImageTagsFunction;
pub use tabular::TabularTagsFunction;
pub use text::TextTagsFunction;
