use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|_| anyhow!("Invalid anon key value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| anyhow!("Invalid auth token value"))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Call a PostgREST stored procedure. Used where a multi-row write
    /// must commit atomically.
    pub async fn rpc<T>(&self, function: &str, auth_token: &str, args: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(auth_token), Some(args))
            .await
    }

    /// Create a short-lived signed upload URL for a storage object.
    /// Returns the absolute URL plus the upload token Supabase embeds in it.
    pub async fn create_signed_upload_url(
        &self,
        bucket: &str,
        object_path: &str,
        auth_token: &str,
    ) -> Result<(String, Option<String>)> {
        let path = format!("/storage/v1/object/upload/sign/{}/{}", bucket, object_path);

        let result: Value = self
            .request(Method::POST, &path, Some(auth_token), None)
            .await?;

        let relative = result
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Storage response missing signed upload url"))?;

        let token = relative
            .split("token=")
            .nth(1)
            .map(|t| t.to_string());

        Ok((format!("{}/storage/v1{}", self.base_url, relative), token))
    }

    /// Create a time-limited signed read URL for a storage object.
    pub async fn create_signed_url(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_seconds: u32,
        auth_token: &str,
    ) -> Result<String> {
        let path = format!("/storage/v1/object/sign/{}/{}", bucket, object_path);

        let result: Value = self
            .request(
                Method::POST,
                &path,
                Some(auth_token),
                Some(json!({ "expiresIn": expires_in_seconds })),
            )
            .await?;

        let relative = result
            .get("signedURL")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Storage response missing signed url"))?;

        Ok(format!("{}/storage/v1{}", self.base_url, relative))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
