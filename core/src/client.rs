//! Stateless HTTP request builder and response parser for the item
//! collection.
//!
//! # Design
//! `ItemClient` holds only the collection URL and carries no mutable state
//! between calls. Each wire operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. A `Transport` executes the actual round-trip, keeping this
//! module deterministic and free of I/O.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Item, ItemId, ItemSnapshot, ItemUpdate, NewItem};

/// Characters escaped when an identifier becomes a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Synchronous, stateless client for the item collection.
#[derive(Debug, Clone)]
pub struct ItemClient {
    collection_url: String,
}

impl ItemClient {
    /// `collection_url` is the absolute URL of the collection, e.g.
    /// `http://localhost:8080/api/items`.
    pub fn new(collection_url: &str) -> Self {
        Self {
            collection_url: collection_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.collection_url())
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: &ItemId) -> Result<String, TransportError> {
        Ok(format!("{}/{}", self.collection_url, path_segment(id)?))
    }

    pub fn build_list_all(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.collection_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, description: &str) -> Result<HttpRequest, TransportError> {
        let input = NewItem {
            description: description.to_string(),
        };
        json_request(HttpMethod::Post, self.collection_url.clone(), &input)
    }

    pub fn build_fetch_one(&self, id: &ItemId) -> Result<HttpRequest, TransportError> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.item_url(id)?,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_update(&self, id: &ItemId, update: &ItemUpdate) -> Result<HttpRequest, TransportError> {
        json_request(HttpMethod::Put, self.item_url(id)?, update)
    }

    pub fn build_delete(&self, id: &ItemId) -> Result<HttpRequest, TransportError> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id)?,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_list_all(&self, response: HttpResponse) -> Result<Vec<Item>, TransportError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// The new identifier is read from the `location` header; the body is
    /// ignored.
    pub fn parse_create(&self, response: HttpResponse) -> Result<ItemId, TransportError> {
        check_status(&response)?;
        response
            .header("location")
            .and_then(id_from_location)
            .ok_or(TransportError::MissingLocation)
    }

    pub fn parse_fetch_one(&self, response: HttpResponse) -> Result<ItemSnapshot, TransportError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), TransportError> {
        check_status(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), TransportError> {
        check_status(&response)
    }
}

/// Percent-encode `id` as one path segment.
///
/// URL parsing resolves `.` and `..` segments (escaped or not) against the
/// collection path, so such ids cannot address an item and are refused.
fn path_segment(id: &ItemId) -> Result<String, TransportError> {
    match id.as_str() {
        "" | "." | ".." => Err(TransportError::UnaddressableId(id.to_string())),
        other => Ok(utf8_percent_encode(other, PATH_SEGMENT).to_string()),
    }
}

fn json_request<T: serde::Serialize>(
    method: HttpMethod,
    url: String,
    payload: &T,
) -> Result<HttpRequest, TransportError> {
    let body = serde_json::to_string(payload).map_err(|e| TransportError::Encode(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Map any non-2xx status to `TransportError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Accepts a bare identifier (`42`) or a URL/path ending in one
/// (`/api/items/42`, `http://host/api/items/42/`).
fn id_from_location(location: &str) -> Option<ItemId> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim().rsplit('/').find(|s| !s.is_empty())?;
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    Some(ItemId::new(decoded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ItemClient {
        ItemClient::new("http://localhost:8080/api/items")
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_all_produces_correct_request() {
        let req = client().build_list_all();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/items");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_sends_description_only() {
        let req = client().build_create("Write report").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/api/items");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"description": "Write report"}));
    }

    #[test]
    fn build_update_sends_both_fields() {
        let update = ItemUpdate {
            description: "Buy milk".to_string(),
            done: true,
        };
        let req = client().build_update(&ItemId::from("1"), &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:8080/api/items/1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"description": "Buy milk", "done": true}));
    }

    #[test]
    fn build_delete_and_fetch_address_the_item() {
        let id = ItemId::from("2");
        let delete = client().build_delete(&id).unwrap();
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.url, "http://localhost:8080/api/items/2");
        assert!(delete.body.is_none());

        let fetch = client().build_fetch_one(&id).unwrap();
        assert_eq!(fetch.method, HttpMethod::Get);
        assert_eq!(fetch.url, delete.url);
    }

    #[test]
    fn identifiers_are_escaped_in_paths() {
        let req = client().build_delete(&ItemId::from("a b/c")).unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items/a%20b%2Fc");

        // Dots inside a longer id are ordinary characters.
        let req = client().build_delete(&ItemId::from("v1..2")).unwrap();
        let url = reqwest::Url::parse(&req.url).unwrap();
        assert_eq!(url.path(), "/api/items/v1..2");
    }

    #[test]
    fn dot_segment_identifiers_are_refused() {
        let c = client();
        let update = ItemUpdate {
            description: "x".to_string(),
            done: true,
        };
        for raw in [".", "..", ""] {
            let id = ItemId::from(raw);
            let expected = TransportError::UnaddressableId(raw.to_string());
            assert_eq!(c.build_fetch_one(&id).unwrap_err(), expected, "fetch {raw:?}");
            assert_eq!(c.build_delete(&id).unwrap_err(), expected, "delete {raw:?}");
            assert_eq!(c.build_update(&id, &update).unwrap_err(), expected, "update {raw:?}");
        }
    }

    #[test]
    fn escaped_dot_segments_would_still_be_resolved() {
        // The URL parser resolves escaped dot segments too.
        let url = reqwest::Url::parse("http://localhost:8080/api/items/%2E%2E").unwrap();
        assert_eq!(url.path(), "/api/");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ItemClient::new("http://localhost:8080/api/items/");
        assert_eq!(client.build_list_all().url, "http://localhost:8080/api/items");
    }

    #[test]
    fn parse_list_all_success() {
        let items = client()
            .parse_list_all(response(
                200,
                &[],
                r#"[{"id":"1","description":"Buy milk","done":false,"createdAt":"2024-05-01T09:30:00Z"}]"#,
            ))
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Buy milk");
        assert!(items[0].created_at.is_some());
    }

    #[test]
    fn parse_list_all_bad_json() {
        let err = client().parse_list_all(response(200, &[], "not json")).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn parse_create_reads_bare_location() {
        let id = client()
            .parse_create(response(201, &[("location", "42")], ""))
            .unwrap();
        assert_eq!(id, ItemId::from("42"));
    }

    #[test]
    fn parse_create_reads_location_url() {
        let id = client()
            .parse_create(response(
                201,
                &[("Location", "http://localhost:8080/api/items/a%20b/")],
                "",
            ))
            .unwrap();
        assert_eq!(id, ItemId::from("a b"));
    }

    #[test]
    fn parse_create_without_location_fails() {
        let err = client().parse_create(response(201, &[], "")).unwrap_err();
        assert_eq!(err, TransportError::MissingLocation);
    }

    #[test]
    fn parse_create_wrong_status() {
        let err = client()
            .parse_create(response(500, &[("location", "42")], "internal error"))
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, .. }));
    }

    #[test]
    fn parse_fetch_one_not_found_is_a_status_error() {
        let err = client().parse_fetch_one(response(404, &[], "")).unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
    }

    #[test]
    fn parse_update_ignores_body() {
        assert!(client().parse_update(response(200, &[], "<html>")).is_ok());
        assert!(client().parse_update(response(204, &[], "")).is_ok());
    }

    #[test]
    fn parse_delete_failure() {
        let err = client().parse_delete(response(400, &[], "bad id")).unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 400,
                body: "bad id".to_string()
            }
        );
    }
}
