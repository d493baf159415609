//! HTTP client implementation for the PysonDB-KV service

use std::sync::Arc;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};
use crate::types::Payload;

/// Header carrying the static credential on every request.
const AUTH_HEADER: &str = "AUTH_KEY";

/// Characters allowed unencoded in URI path segments per RFC 3986.
/// Everything else (including spaces, `#`, `?`, `%`, non-ASCII) gets percent-encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/');

/// Characters allowed unencoded in a query value. Stricter than the path
/// set: `&`, `=` and friends would split the query.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a key for use in a URI path.
fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, PATH_SEGMENT).to_string()
}

/// Percent-encode a value for use in a query string.
fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Configuration options for the PysonDB-KV client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service (default: http://localhost:8787)
    pub base_url: String,
    /// Static credential sent as the `AUTH_KEY` header on every request
    pub auth_key: String,
    /// Request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            auth_key: String::new(),
            timeout_ms: 30000,
        }
    }
}

/// Build a rustls ClientConfig for TLS connections, using standard CA
/// verification against the webpki root store.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Build the JSON body for an update: the record's fields plus the `key`
/// field addressing the item. The explicit key argument always wins; a
/// `"key"` field inside `data` is overwritten before the body is sent.
fn update_body<T: Serialize>(key: &str, data: &T) -> Result<Vec<u8>> {
    let mut fields = match serde_json::to_value(data)? {
        Value::Object(map) => map,
        _ => {
            return Err(Error::InvalidRequest(
                "update payload must serialize to a JSON object".to_string(),
            ))
        }
    };
    fields.insert("key".to_string(), Value::String(key.to_string()));
    Ok(serde_json::to_vec(&Value::Object(fields))?)
}

/// Async client for the PysonDB-KV service
///
/// Each method maps onto one HTTP request carrying the configured `AUTH_KEY`
/// header. Plain `http://` and `https://` base URLs are both supported;
/// HTTPS endpoints are verified against the standard CA roots.
///
/// The client is cheap to clone; clones share the same connection pool.
///
/// # Example
/// ```rust,no_run
/// use pysondb_kv_client::Client;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), pysondb_kv_client::Error> {
///     let client = Client::new("https://meow.workers.dev", "your-auth-key")?;
///
///     let added = client.add(&json!({"name": "Alice", "age": 25})).await?;
///     let key = added.key().expect("server assigns a key on add").to_string();
///
///     let item = client.get(&key).await?;
///     println!("stored item: {:?}", item.as_json());
///
///     client.update(&key, &json!({"age": 26})).await?;
///     client.delete(&key).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl Client {
    /// Create a new PysonDB-KV client
    ///
    /// # Arguments
    /// * `base_url` - Service base URL (e.g., "https://meow.workers.dev")
    /// * `auth_key` - Static credential sent on every request
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or TLS setup fails
    pub fn new(base_url: &str, auth_key: &str) -> Result<Self> {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            auth_key: auth_key.to_string(),
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create a new client with custom configuration
    pub fn with_config(mut config: ClientConfig) -> Result<Self> {
        // Validate the base URL early; endpoint paths all start with '/'
        // so trailing slashes would double up.
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("Invalid base URL: {}", e)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidUrl(format!(
                    "Unsupported URL scheme '{}', expected http or https",
                    other
                )))
            }
        }

        let tls_config = build_tls_config()?;

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_all_versions()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the configured auth key
    pub fn auth_key(&self) -> &str {
        &self.config.auth_key
    }

    /// Internal request method: sends one authenticated request and
    /// normalizes the response.
    ///
    /// A 200 response declared as `application/json` is parsed; any other
    /// 200 body (including one that fails to parse despite the declared
    /// content type) comes back as text. Any non-200 status is an
    /// [`Error::Status`] carrying the code and raw body.
    async fn request(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Payload> {
        let url = format!("{}{}", self.config.base_url, path);
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid request URL: {}", e)))?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(AUTH_HEADER, self.config.auth_key.as_str());

        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }

        let req = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| Error::InvalidRequest(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: {} {}", method, path);

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(timeout, self.http_client.request(req))
            .await
            .map_err(|_| Error::Timeout(self.config.timeout_ms))?
            .map_err(|e| Error::Connection(format!("Request failed: {}", e)))?;

        let status = response.status();
        let declares_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "application/json")
            .unwrap_or(false);

        let body_bytes = Self::read_body_to_bytes(response.into_body()).await?;

        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body_bytes).to_string(),
            });
        }

        if declares_json {
            if let Ok(value) = serde_json::from_slice(&body_bytes) {
                return Ok(Payload::Json(value));
            }
        }

        Ok(Payload::Text(
            String::from_utf8_lossy(&body_bytes).to_string(),
        ))
    }

    /// Read response body to bytes
    async fn read_body_to_bytes(body: Incoming) -> Result<Vec<u8>> {
        let collected = body
            .collect()
            .await
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        Ok(collected.to_bytes().to_vec())
    }

    /// Retrieve one item by its server-assigned key
    ///
    /// Issues `GET /get/{key}`. A missing key surfaces as an
    /// [`Error::Status`] with the server's status and body.
    pub async fn get(&self, key: &str) -> Result<Payload> {
        let path = format!("/get/{}", encode_key(key));
        self.request(Method::GET, &path, None).await
    }

    /// Retrieve every stored item
    ///
    /// Issues `GET /getAll`. The collection shape is defined by the server;
    /// no pagination is supported.
    pub async fn get_all(&self) -> Result<Payload> {
        self.request(Method::GET, "/getAll", None).await
    }

    /// Store a new item
    ///
    /// Issues `POST /add` with `data` serialized as the JSON body. The
    /// server assigns the key and reports it in the response; use
    /// [`Payload::key`] to read it.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use pysondb_kv_client::Client;
    /// # use serde_json::json;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), pysondb_kv_client::Error> {
    /// # let client = Client::new("http://localhost:8787", "auth-key")?;
    /// let added = client.add(&json!({"name": "Alice", "age": 25})).await?;
    /// if let Some(key) = added.key() {
    ///     println!("stored under {}", key);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add<T: Serialize>(&self, data: &T) -> Result<Payload> {
        let body = serde_json::to_vec(data)?;
        self.request(Method::POST, "/add", Some(Bytes::from(body)))
            .await
    }

    /// Update an existing item
    ///
    /// Issues `PUT /update` with a JSON body of `data`'s fields plus the
    /// `key` field addressing the item. `data` must serialize to a JSON
    /// object; a `"key"` field inside it is overwritten by the `key`
    /// argument.
    pub async fn update<T: Serialize>(&self, key: &str, data: &T) -> Result<Payload> {
        let body = update_body(key, data)?;
        self.request(Method::PUT, "/update", Some(Bytes::from(body)))
            .await
    }

    /// Delete one item by key
    ///
    /// Issues `DELETE /delete/{key}`. The server acknowledges with plain
    /// text.
    pub async fn delete(&self, key: &str) -> Result<Payload> {
        let path = format!("/delete/{}", encode_key(key));
        self.request(Method::DELETE, &path, None).await
    }

    /// Delete every stored item
    ///
    /// Issues `DELETE /deleteAll`.
    pub async fn delete_all(&self) -> Result<Payload> {
        self.request(Method::DELETE, "/deleteAll", None).await
    }

    /// Check if the service is reachable
    ///
    /// Any HTTP answer counts, whatever the status; the service responds
    /// 404 for unknown paths, which still proves it is up.
    pub async fn health_check(&self) -> Result<bool> {
        match self.request(Method::GET, "/", None).await {
            Ok(_) => Ok(true),
            Err(Error::Status { .. }) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Fetch the service's HTML dashboard listing all stored pairs
    ///
    /// Issues `GET /auth-key` with the configured auth key as a query
    /// parameter, the way the dashboard endpoint expects it.
    pub async fn dashboard(&self) -> Result<String> {
        let path = format!(
            "/auth-key?auth_key={}",
            encode_query_value(&self.config.auth_key)
        );
        match self.request(Method::GET, &path, None).await? {
            Payload::Text(html) => Ok(html),
            Payload::Json(value) => Ok(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ===== encode_key tests =====

    #[test]
    fn test_encode_key_plain() {
        assert_eq!(encode_key("abc123"), "abc123");
        assert_eq!(encode_key("user_1.v2-x~y"), "user_1.v2-x~y");
    }

    #[test]
    fn test_encode_key_spaces() {
        assert_eq!(encode_key("key with spaces"), "key%20with%20spaces");
    }

    #[test]
    fn test_encode_key_uri_structural() {
        assert_eq!(encode_key("a#b"), "a%23b");
        assert_eq!(encode_key("a?b"), "a%3Fb");
        assert_eq!(encode_key("a%b"), "a%25b");
    }

    #[test]
    fn test_encode_key_preserves_slash() {
        assert_eq!(encode_key("path/to/item"), "path/to/item");
    }

    #[test]
    fn test_encode_key_unicode() {
        assert_eq!(encode_key("ключ"), "%D0%BA%D0%BB%D1%8E%D1%87");
    }

    #[test]
    fn test_encode_query_value_is_strict() {
        assert_eq!(encode_query_value("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query_value("meow"), "meow");
    }

    // ===== update_body tests =====

    #[test]
    fn test_update_body_appends_key() {
        let body = update_body("abc123", &json!({"age": 26})).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"key": "abc123", "age": 26}));
    }

    #[test]
    fn test_update_body_key_argument_wins() {
        let body = update_body("abc123", &json!({"key": "sneaky", "age": 26})).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["key"], "abc123");
        assert_eq!(value["age"], 26);
    }

    #[test]
    fn test_update_body_rejects_non_object() {
        let result = update_body("abc123", &json!([1, 2, 3]));
        assert!(matches!(result, Err(Error::InvalidRequest(_))));

        let result = update_body("abc123", &"just a string");
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_update_body_from_derived_struct() {
        #[derive(Serialize)]
        struct Patch {
            age: u32,
        }

        let body = update_body("abc123", &Patch { age: 26 }).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"key": "abc123", "age": 26}));
    }

    // ===== ClientConfig default tests =====

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8787");
        assert!(config.auth_key.is_empty());
        assert_eq!(config.timeout_ms, 30000);
    }

    // ===== Client construction tests =====

    #[test]
    fn test_client_new_http() {
        let client = Client::new("http://localhost:8787", "meow").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8787");
        assert_eq!(client.auth_key(), "meow");
    }

    #[test]
    fn test_client_new_https() {
        let client = Client::new("https://meow.workers.dev", "meow").unwrap();
        assert_eq!(client.base_url(), "https://meow.workers.dev");
    }

    #[test]
    fn test_client_trims_trailing_slashes() {
        let client = Client::new("https://meow.workers.dev/", "meow").unwrap();
        assert_eq!(client.base_url(), "https://meow.workers.dev");

        let client = Client::new("http://localhost:8787//", "meow").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8787");
    }

    #[test]
    fn test_client_invalid_base_url() {
        let result = Client::new("not a url", "meow");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_client_rejects_non_http_scheme() {
        let result = Client::new("ftp://example.com", "meow");
        let err = result.err().unwrap();
        match &err {
            Error::InvalidUrl(msg) => assert!(msg.contains("ftp"), "message: {}", msg),
            _ => panic!("Expected InvalidUrl error, got: {:?}", err),
        }
    }
}
