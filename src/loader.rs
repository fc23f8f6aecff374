//! Input-source normalization for root documents.
//!
//! Every loadable entity (feeds, entries, service documents) accepts three
//! input shapes: a string of XML, an arbitrary byte stream, or an HTTP(S)
//! URL. All three funnel into the same path — tokenize, validate the root,
//! parse — so error behavior is identical regardless of where the bytes
//! came from. Buffers and cursors are plainly owned and dropped on every
//! exit path, success or error.

use std::io::Read;

use reqwest::blocking::Client;

use crate::error::Error;
use crate::util::validate_http_url;
use crate::xml::cursor::Cursor;
use crate::xml::parse::from_cursor;
use crate::xml::schema::Schema;

/// Media type sent in `Accept` headers for every feed-shaped request.
pub(crate) const MEDIA_TYPE_ATOM: &str = "application/atom+xml";

/// `User-Agent` for every request this crate makes.
pub(crate) const USER_AGENT: &str = concat!("plumage/", env!("CARGO_PKG_VERSION"));

/// Parses a root entity out of a string of XML.
///
/// # Errors
///
/// [`Error::Parse`] for malformed markup, [`Error::InvalidDocument`] when
/// the root element is not the expected one.
pub fn from_xml_str<T: Schema + 'static>(xml: &str) -> Result<T, Error> {
    let mut cursor = Cursor::new(xml)?;
    from_cursor(&mut cursor)
}

/// Reads a byte stream to its end and parses a root entity from it.
///
/// # Errors
///
/// [`Error::Io`] when reading fails, [`Error::InvalidArgument`] when the
/// bytes are not UTF-8, plus everything [`from_xml_str`] can return.
pub fn from_reader<T: Schema + 'static>(mut input: impl Read) -> Result<T, Error> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    let text = String::from_utf8(buf)
        .map_err(|_| Error::InvalidArgument("input is not valid UTF-8".to_string()))?;
    from_xml_str(&text)
}

/// Fetches a URL and parses a root entity from the response body.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for non-HTTP(S) URLs, [`Error::Http`] for
/// transport failures, [`Error::Protocol`] for non-success responses, plus
/// everything [`from_xml_str`] can return.
pub fn fetch<T: Schema + 'static>(client: &Client, url: &str) -> Result<T, Error> {
    let url = validate_http_url(url)?;
    let response = client
        .get(url.as_str())
        .header("Accept", MEDIA_TYPE_ATOM)
        .header("User-Agent", USER_AGENT)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Protocol {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        });
    }
    let body = response.text()?;
    from_xml_str(&body)
}
