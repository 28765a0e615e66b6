//! Zotero Web API v3 client implementing [`RemoteLibrary`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use locus_core::{Error, Result};

use crate::remote::{ChangeSet, RemoteItem, RemoteLibrary};

/// Default Zotero API endpoint.
pub const DEFAULT_ZOTERO_URL: &str = "https://api.zotero.org";

/// Version header every Zotero response carries; its value is the remote
/// collection version counter the sync watermark tracks.
const VERSION_HEADER: &str = "Last-Modified-Version";

/// Page size for item listings.
const PAGE_LIMIT: usize = 100;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Zotero client.
#[derive(Debug, Clone)]
pub struct ZoteroConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// Zotero user id the library belongs to.
    pub user_id: String,
    /// API key for authentication.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl ZoteroConfig {
    /// Configuration against the public API for the given user.
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_ZOTERO_URL.to_string(),
            user_id: user_id.into(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// HTTP client for one user's Zotero library.
pub struct ZoteroClient {
    client: Client,
    config: ZoteroConfig,
}

impl ZoteroClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ZoteroConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        info!(
            subsystem = "sync",
            component = "zotero",
            op = "init",
            base_url = %config.base_url,
            "Initializing Zotero client"
        );
        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/users/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.user_id,
            endpoint
        )
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response> {
        let response = self
            .client
            .get(self.url(endpoint))
            .header("Zotero-API-Version", "3")
            .header("Zotero-API-Key", &self.config.api_key)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    fn check_status(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::RemoteUnavailable(format!(
                "zotero returned {} for {}",
                response.status(),
                response.url()
            )))
        }
    }

    fn version_header(response: &Response) -> Result<i64> {
        response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                Error::RemoteUnavailable(format!("zotero response missing {VERSION_HEADER}"))
            })
    }

    /// Page through a collection's item listing, returning the version the
    /// first page was served at and every item.
    async fn fetch_items(
        &self,
        collection_id: &str,
        since: Option<i64>,
    ) -> Result<(i64, Vec<RemoteItem>)> {
        let endpoint = format!("/collections/{collection_id}/items");
        let mut items = Vec::new();
        let mut version = None;
        let mut start = 0usize;

        loop {
            let mut query = vec![
                ("format", "json".to_string()),
                ("itemType", "-attachment".to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("start", start.to_string()),
            ];
            if let Some(since) = since {
                query.push(("since", since.to_string()));
            }

            let response = Self::check_status(self.get(&endpoint, &query).await?)?;
            if version.is_none() {
                version = Some(Self::version_header(&response)?);
            }

            let page: Vec<RemoteItem> = response.json().await?;
            let page_len = page.len();
            items.extend(page);
            if page_len < PAGE_LIMIT {
                break;
            }
            start += page_len;
        }

        debug!(
            subsystem = "sync",
            component = "zotero",
            op = "fetch_items",
            item_count = items.len(),
            "Fetched collection items"
        );
        Ok((version.unwrap_or_default(), items))
    }
}

#[async_trait]
impl RemoteLibrary for ZoteroClient {
    async fn resolve_collection_id(&self, name: &str) -> Result<Option<String>> {
        let response = Self::check_status(self.get("/collections", &[]).await?)?;
        let collections: Vec<JsonValue> = response.json().await?;

        Ok(collections.iter().find_map(|collection| {
            let data = collection.get("data")?;
            if data.get("name").and_then(JsonValue::as_str) == Some(name) {
                data.get("key")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
            } else {
                None
            }
        }))
    }

    async fn fetch_changed_since(
        &self,
        collection_id: &str,
        version: i64,
        include_deleted: bool,
    ) -> Result<ChangeSet> {
        let (new_version, items) = self.fetch_items(collection_id, Some(version)).await?;

        let deleted_keys = if include_deleted {
            let response = Self::check_status(
                self.get("/deleted", &[("since", version.to_string())])
                    .await?,
            )?;
            let body: JsonValue = response.json().await?;
            Some(
                body.get("items")
                    .and_then(JsonValue::as_array)
                    .map(|keys| {
                        keys.iter()
                            .filter_map(|k| k.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default(),
            )
        } else {
            None
        };

        Ok(ChangeSet {
            version: new_version,
            items,
            deleted_keys,
        })
    }

    async fn fetch_all(&self, collection_id: &str) -> Result<(i64, Vec<RemoteItem>)> {
        self.fetch_items(collection_id, None).await
    }

    async fn create_item(&self, collection_id: &str, data: JsonValue) -> Result<Option<String>> {
        let mut data = data;
        if let Some(obj) = data.as_object_mut() {
            obj.insert(
                "collections".to_string(),
                serde_json::json!([collection_id]),
            );
        }

        let response = self
            .client
            .post(self.url("/items"))
            .header("Zotero-API-Version", "3")
            .header("Zotero-API-Key", &self.config.api_key)
            .json(&serde_json::json!([data]))
            .send()
            .await?;
        let response = Self::check_status(response)?;

        let body: JsonValue = response.json().await?;
        Ok(body
            .pointer("/successful/0/key")
            .and_then(JsonValue::as_str)
            .map(str::to_string))
    }

    async fn child_items(&self, item_key: &str) -> Result<Vec<RemoteItem>> {
        let endpoint = format!("/items/{item_key}/children");
        let response = Self::check_status(self.get(&endpoint, &[]).await?)?;
        Ok(response.json().await?)
    }

    async fn fetch_attachment(&self, item_key: &str) -> Result<Option<Vec<u8>>> {
        let endpoint = format!("/items/{item_key}/file");
        let response = self.get(&endpoint, &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response)?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ZoteroClient {
        ZoteroClient::new(ZoteroConfig {
            base_url: server.uri(),
            user_id: "u1".to_string(),
            api_key: "secret".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_collection_id_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"data": {"key": "AAA", "name": "inbox"}},
                {"data": {"key": "BBB", "name": "locus_test"}}
            ])))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let id = client.resolve_collection_id("locus_test").await.unwrap();
        assert_eq!(id.as_deref(), Some("BBB"));
        assert!(client
            .resolve_collection_id("missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_changed_since_parses_items_header_and_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1/collections/BBB/items"))
            .and(query_param("since", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified-Version", "12")
                    .set_body_json(json!([
                        {"key": "K1", "version": 12,
                         "data": {"itemType": "journalArticle", "title": "One"},
                         "links": {}}
                    ])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/u1/deleted"))
            .and(query_param("since", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"items": ["GONE1", "GONE2"], "collections": []})),
            )
            .mount(&server)
            .await;

        let client = client(&server).await;
        let delta = client.fetch_changed_since("BBB", 10, true).await.unwrap();
        assert_eq!(delta.version, 12);
        assert_eq!(delta.items.len(), 1);
        assert_eq!(delta.items[0].key, "K1");
        assert_eq!(
            delta.deleted_keys,
            Some(vec!["GONE1".to_string(), "GONE2".to_string()])
        );
    }

    #[tokio::test]
    async fn test_fetch_all_reads_version_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1/collections/BBB/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified-Version", "7")
                    .set_body_json(json!([
                        {"key": "K1", "version": 7, "data": {"title": "One"}, "links": {}},
                        {"key": "K2", "version": 7, "data": {"title": "Two"}, "links": {}}
                    ])),
            )
            .mount(&server)
            .await;

        let client = client(&server).await;
        let (version, items) = client.fetch_all("BBB").await.unwrap();
        assert_eq!(version, 7);
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_create_item_returns_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/u1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": {"0": {"key": "NEW1"}}
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let key = client
            .create_item("BBB", json!({"itemType": "journalArticle", "title": "T"}))
            .await
            .unwrap();
        assert_eq!(key.as_deref(), Some("NEW1"));
    }

    #[tokio::test]
    async fn test_fetch_attachment_missing_file_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1/items/ATT1/file"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert!(client.fetch_attachment("ATT1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_remote_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1/collections"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let result = client.resolve_collection_id("x").await;
        assert!(matches!(result, Err(Error::RemoteUnavailable(_))));
    }
}
