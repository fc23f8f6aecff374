//! The publishing side of the Atom Publishing Protocol: create entries in a
//! collection, update and delete them via their edit links.
//!
//! All calls are synchronous and blocking; a non-success response surfaces
//! immediately as [`Error::Protocol`] carrying the status and body — no
//! retries. The server is authoritative: a created-response body that
//! parses as an entry replaces the submitted one.

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::StatusCode;

use crate::atompub::service::Collection;
use crate::error::Error;
use crate::loader::{MEDIA_TYPE_ATOM, USER_AGENT};
use crate::model::{Entry, Feed, Link};
use crate::util::validate_http_url;

/// Media type sent with entry documents on POST and PUT.
pub(crate) const MEDIA_TYPE_ENTRY: &str = "application/atom+xml;type=entry";

impl Collection {
    /// Fetches the feed this collection points at; `Ok(None)` when the
    /// collection has no `href`.
    pub fn feed(&self, client: &Client) -> Result<Option<Feed>, Error> {
        match self.href.as_deref() {
            Some(href) => Feed::fetch(client, href).map(Some),
            None => Ok(None),
        }
    }

    /// Publishes an entry to this collection with a POST.
    ///
    /// On `201 Created` the returned entry is the response body when it
    /// parses as an entry document, otherwise a copy of the submitted one;
    /// either way a `Location` header becomes the entry's edit-link target
    /// (updating the existing edit link or adding one).
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] when the collection has no `href`,
    /// [`Error::Protocol`] for any response other than `201 Created`, and
    /// [`Error::Http`] for transport failures.
    pub fn publish(&self, client: &Client, entry: &Entry) -> Result<Entry, Error> {
        let href = self
            .href
            .as_deref()
            .ok_or(Error::NotSupported("collection has no href"))?;
        let url = validate_http_url(href)?;

        let response = client
            .post(url.as_str())
            .header("Accept", MEDIA_TYPE_ATOM)
            .header("Content-Type", MEDIA_TYPE_ENTRY)
            .header("User-Agent", USER_AGENT)
            .body(entry.to_xml()?)
            .send()?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(Error::Protocol {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;

        let mut published = if body.trim().is_empty() {
            entry.clone()
        } else {
            Entry::from_xml(&body).unwrap_or_else(|error| {
                tracing::debug!(%error, "created response body is not an entry document; keeping the submitted entry");
                entry.clone()
            })
        };

        if let Some(location) = location {
            match published.links.edit_mut() {
                Some(edit) => edit.href = Some(location),
                None => published.links.push(Link::new("edit", location)),
            }
        }

        Ok(published)
    }
}

impl Entry {
    /// Updates the published entry with a PUT to its edit link.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] when the entry has no edit link — a usage
    /// error, not a network one. [`Error::Protocol`] for non-success
    /// responses.
    pub fn save(&self, client: &Client) -> Result<(), Error> {
        let href = self.edit_href()?;
        let url = validate_http_url(&href)?;

        let response = client
            .put(url.as_str())
            .header("Accept", MEDIA_TYPE_ATOM)
            .header("Content-Type", MEDIA_TYPE_ENTRY)
            .header("User-Agent", USER_AGENT)
            .body(self.to_xml()?)
            .send()?;

        expect_success(response)
    }

    /// Removes the published entry with a DELETE to its edit link.
    ///
    /// # Errors
    ///
    /// Same rules as [`save`](Entry::save).
    pub fn destroy(&self, client: &Client) -> Result<(), Error> {
        let href = self.edit_href()?;
        let url = validate_http_url(&href)?;

        let response = client
            .delete(url.as_str())
            .header("Accept", MEDIA_TYPE_ATOM)
            .header("User-Agent", USER_AGENT)
            .send()?;

        expect_success(response)
    }

    fn edit_href(&self) -> Result<String, Error> {
        self.links
            .edit()
            .and_then(|link| link.href.clone())
            .ok_or(Error::NotSupported("entry has no edit link"))
    }
}

fn expect_success(response: reqwest::blocking::Response) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Protocol {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }
}
