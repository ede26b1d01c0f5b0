//! HTTP client for the hosted services behind the portfolio catalog: the JSON document store
//! that holds catalog entries, the blob store, and the hosted image service.

pub mod image_host;

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

/// Primary error type for the [`Client`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("base URL error: {0}")]
    BaseUrl(#[source] reqwest::Error),

    #[error("base URL '{0}' cannot carry a path")]
    CannotBeABase(Url),

    #[error("request URL error: {0}")]
    RequestUrl(#[from] url::ParseError),

    #[error("failed to read the API response bytes: {0}")]
    Bytes(#[source] reqwest::Error),

    #[error("failed to parse JSON response: {0}")]
    Json(#[source] reqwest::Error),

    #[error("failed to parse plaintext response: {0}")]
    Text(#[source] reqwest::Error),

    #[error("failed to build multipart form: {0}")]
    Multipart(#[source] reqwest::Error),

    #[error("server responded with error [{code}]: {message}")]
    ApiError { code: StatusCode, message: String },

    #[error("failed to send {method} {url} request: {source}")]
    RequestSend {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    fn request_send(method: Method, url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RequestSend {
            method,
            url: url.into(),
            source,
        }
    }

    /// `true` if the server answered `404 Not Found`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { code, .. } if *code == StatusCode::NOT_FOUND)
    }

    /// `true` if the response arrived but its body could not be decoded
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Text(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Build an [`Error::ApiError`] out of a response with an unexpected status
///
/// The body only becomes the message; a body that is not UTF-8 is decoded lossily so the
/// status code always survives.
async fn api_error(resp: Response) -> Error {
    let code = resp.status();
    match resp.bytes().await {
        Ok(content) => Error::ApiError {
            code,
            message: String::from_utf8_lossy(&content).into_owned(),
        },
        Err(e) => Error::Bytes(e),
    }
}

/// Client for the document store that holds the catalog collection
///
/// Documents live under `/v1/collections/{collection}/documents` relative to the base URL;
/// any path already on the base URL is kept as a prefix.
#[derive(Debug, Clone)]
pub struct Client {
    /// The base URL for making requests to the document store
    base_url: Url,
    /// The `Bearer` token to use for authenticating on each request to the server
    auth_token: Option<Secret<String>>,
    /// A [`reqwest::Client`] for handling HTTP requests
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new [`Client`]
    pub fn new<U: reqwest::IntoUrl>(base_url: U) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into_url().map_err(Error::BaseUrl)?,
            auth_token: None,
            http_client: reqwest::Client::new(),
        })
    }

    /// Set the `Bearer` token that will be sent with each request to the server
    ///
    /// # Example
    /// ```
    /// # use portfolio_client::Client;
    /// # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new("http://localhost:8080")?
    ///     .with_auth_token("secret-token-string");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_auth_token<S: Into<String>>(mut self, auth_token: S) -> Self {
        self.auth_token = Some(Secret::new(auth_token.into()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Append `segments` to the base URL, percent-encoding each one
    fn url_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn documents_url(&self, collection: &str) -> Result<Url> {
        self.url_for(["v1", "collections", collection, "documents"])
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        self.url_for(["v1", "collections", collection, "documents", id])
    }

    /// Make a request to `POST /v1/collections/{collection}/documents`, returning the id the
    /// store assigned to the new document
    pub async fn api_v1_document_create<B>(&self, collection: &str, doc: &B) -> Result<String>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.documents_url(collection)?;
        let api_path = url.path().to_string();
        let req = self.authorize(self.http_client.post(url).json(doc));
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::POST, api_path, src))?;

        #[derive(Deserialize)]
        struct Created {
            id: String,
        }

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let created = resp.json::<Created>().await.map_err(Error::Json)?;
                Ok(created.id)
            }
            _ => Err(api_error(resp).await),
        }
    }

    /// Compose a request to `GET /v1/collections/{collection}/documents`
    ///
    /// # Example
    /// ```no_run
    /// # use portfolio_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new("http://localhost:8080")?;
    /// let docs: Vec<serde_json::Value> = client
    ///     .api_v1_documents_list("projects")
    ///     .category("java")
    ///     .order_by_created_at_desc()
    ///     .limit(6)
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn api_v1_documents_list(
        &self,
        collection: impl Into<String>,
    ) -> ListDocumentsRequestBuilder<'_> {
        ListDocumentsRequestBuilder {
            client: self,
            collection: collection.into(),
            category: None,
            newest_first: false,
            limit: None,
            start_after: None,
        }
    }

    /// Make a request to `GET /v1/collections/{collection}/documents/{id}`
    ///
    /// Returns `None` if the store has no document with that id.
    pub async fn api_v1_document_get<T>(&self, collection: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.document_url(collection, id)?;
        let api_path = url.path().to_string();
        let req = self.authorize(self.http_client.get(url));
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::GET, api_path, src))?;
        match resp.status() {
            StatusCode::OK => resp.json().await.map(Some).map_err(Error::Json),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(api_error(resp).await),
        }
    }

    /// Make a request to `PATCH /v1/collections/{collection}/documents/{id}`
    ///
    /// Only the fields present in `patch` are written. A missing document comes back as an
    /// [`Error::ApiError`] with a `404` code.
    pub async fn api_v1_document_patch<B>(
        &self,
        collection: &str,
        id: &str,
        patch: &B,
    ) -> Result<()>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.document_url(collection, id)?;
        let api_path = url.path().to_string();
        let req = self.authorize(self.http_client.patch(url).json(patch));
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::PATCH, api_path, src))?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(api_error(resp).await),
        }
    }

    /// Make a request to `DELETE /v1/collections/{collection}/documents/{id}`
    ///
    /// Deleting a document that does not exist is not an error.
    pub async fn api_v1_document_delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id)?;
        let api_path = url.path().to_string();
        let req = self.authorize(self.http_client.delete(url));
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::DELETE, api_path, src))?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(api_error(resp).await),
        }
    }

    /// Make a request to `PUT /v1/blobs/{path}`, uploading `body` and returning the public
    /// download URL the blob store hands back
    pub async fn api_v1_blob_put(
        &self,
        path: &str,
        content_type: &str,
        body: impl Into<Bytes> + Send,
    ) -> Result<String> {
        let segments = ["v1", "blobs"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let url = self.url_for(segments)?;
        let api_path = url.path().to_string();
        let req = self.authorize(
            self.http_client
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body.into()),
        );
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::PUT, api_path, src))?;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Uploaded {
            download_url: String,
        }

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let uploaded = resp.json::<Uploaded>().await.map_err(Error::Json)?;
                Ok(uploaded.download_url)
            }
            _ => Err(api_error(resp).await),
        }
    }
}

/// Query parameters of the `GET /v1/collections/{collection}/documents` API
#[derive(Debug, Serialize)]
struct ListParams<'a> {
    category: Option<&'a str>,
    order_by: Option<&'static str>,
    direction: Option<&'static str>,
    limit: Option<usize>,
    start_after_id: Option<&'a str>,
    start_after_created_at: Option<&'a str>,
}

impl<'a> From<&'a ListDocumentsRequestBuilder<'a>> for ListParams<'a> {
    fn from(builder: &'a ListDocumentsRequestBuilder<'a>) -> Self {
        Self {
            category: builder.category.as_deref(),
            order_by: builder.newest_first.then_some("createdAt"),
            direction: builder.newest_first.then_some("desc"),
            limit: builder.limit,
            start_after_id: builder.start_after.as_ref().map(|(id, _)| id.as_str()),
            start_after_created_at: builder.start_after.as_ref().map(|(_, t)| t.as_str()),
        }
    }
}

/// Builder type for composing a request to `GET /v1/collections/{collection}/documents`
///
/// Produced by [`Client::api_v1_documents_list`]
#[derive(Debug)]
pub struct ListDocumentsRequestBuilder<'c> {
    client: &'c Client,
    collection: String,
    category: Option<String>,
    newest_first: bool,
    limit: Option<usize>,
    start_after: Option<(String, String)>,
}

impl ListDocumentsRequestBuilder<'_> {
    /// Only return documents whose `category` field equals `category`
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Order by `createdAt`, newest first
    pub fn order_by_created_at_desc(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Return at most `limit` documents
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after the document with this id and `createdAt` value
    pub fn start_after(mut self, id: impl Into<String>, created_at: impl Into<String>) -> Self {
        self.start_after = Some((id.into(), created_at.into()));
        self
    }

    /// Send the request, decoding each returned document as a `T`
    pub async fn send<T>(self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.client.documents_url(&self.collection)?;
        let api_path = url.path().to_string();
        let params = ListParams::from(&self);
        let req = self
            .client
            .authorize(self.client.http_client.get(url).query(&params));
        let resp = req
            .send()
            .await
            .map_err(|src| Error::request_send(Method::GET, api_path, src))?;

        #[derive(Deserialize)]
        struct Listing<T> {
            documents: Vec<T>,
        }

        match resp.status() {
            StatusCode::OK => {
                let listing = resp.json::<Listing<T>>().await.map_err(Error::Json)?;
                Ok(listing.documents)
            }
            _ => Err(api_error(resp).await),
        }
    }
}
