//! HTTP upload

use super::BlobSink;

/// Posts files to `{endpoint}/projects/{project}/folders/{folder}/{file}`
///
/// The response body is taken as the handle of the stored file.
#[derive(Debug, Clone)]
pub struct HttpBlobSink {
    endpoint: String,
    token: Option<String>,
}

impl HttpBlobSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self, project_id: &str, folder_id: &str, file_name: &str) -> String {
        format!(
            "{}/projects/{}/folders/{}/{}",
            self.endpoint, project_id, folder_id, file_name
        )
    }
}

impl BlobSink for HttpBlobSink {
    fn upload(
        &self,
        project_id: &str,
        folder_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Option<String> {
        let url = self.url(project_id, folder_id, file_name);
        let mut request = ureq::post(&url).header("Content-Type", "application/octet-stream");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }

        match request.send(bytes) {
            Ok(mut response) => {
                let handle = response
                    .body_mut()
                    .read_to_string()
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| file_name.to_string());
                tracing::info!("Uploaded {} ({} bytes)", file_name, bytes.len());
                Some(handle)
            }
            Err(e) => {
                tracing::error!("Upload of {} to {} failed: {}", file_name, url, e);
                None
            }
        }
    }
}
