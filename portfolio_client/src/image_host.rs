//! Client for a hosted image service that takes unsigned uploads tied to an upload preset.

use reqwest::{
    Method, StatusCode,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use url::Url;

use crate::{Error, Result, api_error};

/// Uploads raw image files to `POST {base}/v1_1/{cloud_name}/image/upload`
#[derive(Debug, Clone)]
pub struct ImageHostClient {
    base_url: Url,
    cloud_name: String,
    /// Preset that authorizes unsigned uploads and carries the host-side transformations
    upload_preset: Secret<String>,
    http_client: reqwest::Client,
}

impl ImageHostClient {
    pub fn new<U: reqwest::IntoUrl>(
        base_url: U,
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into_url().map_err(Error::BaseUrl)?,
            cloud_name: cloud_name.into(),
            upload_preset: Secret::new(upload_preset.into()),
            http_client: reqwest::Client::new(),
        })
    }

    /// Upload one file as multipart form data, returning the `secure_url` the host assigned
    pub async fn upload(
        &self,
        file_name: impl Into<String> + Send,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v1_1", self.cloud_name.as_str(), "image", "upload"]);
        let api_path = url.path().to_string();

        let file = Part::bytes(bytes)
            .file_name(file_name.into())
            .mime_str(content_type)
            .map_err(Error::Multipart)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.expose_secret().clone());

        let resp = self
            .http_client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|src| Error::request_send(Method::POST, api_path, src))?;

        #[derive(Deserialize)]
        struct Uploaded {
            secure_url: String,
        }

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let uploaded = resp.json::<Uploaded>().await.map_err(Error::Json)?;
                Ok(uploaded.secure_url)
            }
            _ => Err(api_error(resp).await),
        }
    }
}
