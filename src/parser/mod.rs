//! Feed parsing and content normalization
//!
//! - [`feed`] reads RSS/RDF/Atom documents into entries
//! - [`normalize`] turns entries and page summaries into documents
//! - [`extensions`] applies optional per-source text transforms
//! - [`sanitize`] holds the text cleanup helpers they share

pub mod extensions;
pub mod feed;
pub mod normalize;
pub mod sanitize;

pub use extensions::Extension;
pub use feed::parse_feed;
pub use normalize::Normalizer;
