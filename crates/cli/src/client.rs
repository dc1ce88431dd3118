//! Thin HTTP client for the QPrint API.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Upload options forwarded as multipart text fields
pub struct UploadForm {
    pub file_name: String,
    pub data: Vec<u8>,
    pub print_type: &'static str,
    pub shop_id: Option<i64>,
    pub copies: u32,
    pub print_mode: String,
    pub color_mode: String,
    pub paper_size: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        if self.token.is_none() {
            anyhow::bail!("This command needs a token (run `qprint login`, then set QPRINT_TOKEN)");
        }
        Ok(self.request(method, path))
    }

    /// Send and turn non-2xx answers into the server's error message
    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .context("Failed to connect to server")?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => anyhow::bail!("{} ({}): {}", status.as_u16(), err.error, err.message),
            Err(_) => anyhow::bail!("{}: {}", status, body),
        }
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        Self::send(builder)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::json(self.authed(Method::GET, path)?).await
    }

    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::json(self.request(Method::GET, path)).await
    }

    pub async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        Self::json(self.request(Method::POST, path).json(body)).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::json(self.authed(Method::POST, path)?).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        Self::json(self.authed(Method::PUT, path)?.json(body)).await
    }

    /// Raw bytes of a download endpoint
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let response = Self::send(self.authed(Method::GET, path)?).await?;
        let bytes = response.bytes().await.context("Failed to read download")?;
        Ok(bytes.to_vec())
    }

    pub async fn upload<T: DeserializeOwned>(&self, form: UploadForm) -> Result<T> {
        let file = Part::bytes(form.data).file_name(form.file_name);
        let mut multipart = Form::new()
            .part("file", file)
            .text("print_type", form.print_type)
            .text("copies", form.copies.to_string())
            .text("print_mode", form.print_mode)
            .text("color_mode", form.color_mode)
            .text("paper_size", form.paper_size);
        if let Some(shop_id) = form.shop_id {
            multipart = multipart.text("shop_id", shop_id.to_string());
        }

        Self::json(self.authed(Method::POST, "/upload")?.multipart(multipart)).await
    }
}
