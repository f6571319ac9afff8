//! Fonts: descriptors, a persistent registry, and embedding into a rendition

mod embed;
mod font;
mod registry;

pub use embed::{EmbeddedFont, FontEmbedder};
pub use font::{Font, FontSource};
pub use registry::FontRegistry;
