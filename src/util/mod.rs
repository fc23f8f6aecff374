//! Shared utility functions.
//!
//! - **Text normalization**: whitespace collapsing for HTML/XHTML content
//!   payloads.
//! - **URL validation**: HTTP(S)-only scheme enforcement for every network
//!   operation.

mod text;
mod url;

pub use text::collapse_whitespace;
pub use url::validate_http_url;
