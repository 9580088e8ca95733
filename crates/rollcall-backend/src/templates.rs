//! Client for the Template Store.
//!
//! The Template Store owns the durable enrolled artifacts: one encrypted
//! template per student, plus the comparator that scores a live capture
//! against the stored template. This client speaks its four endpoints:
//!
//! - `POST {base}/enroll` - commit a template, replacing any prior one
//! - `POST {base}/verify` - compare a live capture, returns matched/confidence
//! - `GET {base}/status/{studentId}` - enrollment lookup
//! - `DELETE {base}/{studentId}` - remove an enrollment
//!
//! `biometricData` carries the template envelope produced by the capture
//! layer; enrollment and verification serialize it identically so both sides
//! of the store parse the same shape.

use crate::error::{BackendError, BackendResult};
use chrono::{DateTime, Utc};
use rollcall_core::StudentId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout for template store calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`TemplateStoreClient`].
#[derive(Debug, Clone)]
pub struct TemplateStoreConfig {
    /// Base URL of the template store, e.g. `http://127.0.0.1:8901/templates`.
    pub base_url: String,

    /// Timeout for every request.
    pub timeout: Duration,
}

impl TemplateStoreConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Request body of `POST enroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_id: String,

    /// Serialized template envelope (see the capture crate).
    pub biometric_data: String,

    /// Quality of the committed sample, after normalization.
    pub quality_score: u8,

    /// Modality/device description recorded alongside the template.
    pub device_info: String,
}

/// Request body of `POST verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub student_id: String,

    /// Serialized template envelope of the live capture, byte-compatible
    /// with the one submitted at enrollment.
    pub biometric_data: String,
}

/// Response body of `POST verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub matched: bool,
    pub confidence: f64,
}

/// Response body of `GET status/{studentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatusResponse {
    pub enrolled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// HTTP client for the Template Store.
#[derive(Debug, Clone)]
pub struct TemplateStoreClient {
    client: reqwest::Client,
    config: TemplateStoreConfig,
}

impl TemplateStoreClient {
    /// Create a new template store client.
    ///
    /// # Errors
    /// Returns `BackendError::InvalidBaseUrl` if the base URL is empty and
    /// `BackendError::Http` if the underlying client cannot be built.
    pub fn new(config: TemplateStoreConfig) -> BackendResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(BackendError::InvalidBaseUrl(
                "template store base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        debug!("Created template store client for {}", config.base_url);

        Ok(Self { client, config })
    }

    /// Commit a template for a student, replacing any prior one.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn enroll(&self, request: &EnrollRequest) -> BackendResult<()> {
        let url = format!("{}/enroll", self.config.base_url);

        let response = self.client.post(&url).json(request).send().await?;
        self.check_status(response).await?;

        debug!("Template committed for student {}", request.student_id);
        Ok(())
    }

    /// Score a live capture against the stored template.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn verify(&self, request: &VerifyRequest) -> BackendResult<VerifyResponse> {
        let url = format!("{}/verify", self.config.base_url);

        let response = self.client.post(&url).json(request).send().await?;
        let response = self.check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Look up whether a student has an enrolled template.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn enrollment_status(
        &self,
        student: &StudentId,
    ) -> BackendResult<EnrollmentStatusResponse> {
        let url = format!("{}/status/{}", self.config.base_url, student.as_str());

        let response = self.client.get(&url).send().await?;
        let response = self.check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Remove a student's enrollment.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn delete(&self, student: &StudentId) -> BackendResult<()> {
        let url = format!("{}/{}", self.config.base_url, student.as_str());

        let response = self.client.delete(&url).send().await?;
        self.check_status(response).await?;

        debug!("Enrollment removed for student {}", student);
        Ok(())
    }

    async fn check_status(&self, response: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Template store request failed: {} {}", status, body);
        Err(BackendError::status(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn student(id: &str) -> StudentId {
        StudentId::new(id).unwrap()
    }

    async fn client_for(server: &MockServer) -> TemplateStoreClient {
        TemplateStoreClient::new(TemplateStoreConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_enroll_sends_camel_case_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/enroll"))
            .and(body_json(json!({
                "studentId": "S1001",
                "biometricData": "{\"template\":\"abc\"}",
                "qualityScore": 95,
                "deviceInfo": "vendor_bridged"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "studentId": "S1001", "enrolled": true
            })))
            .mount(&server)
            .await;

        let request = EnrollRequest {
            student_id: "S1001".to_string(),
            biometric_data: "{\"template\":\"abc\"}".to_string(),
            quality_score: 95,
            device_info: "vendor_bridged".to_string(),
        };

        client_for(&server).await.enroll(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_returns_confidence() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matched": true,
                "confidence": 82.0
            })))
            .mount(&server)
            .await;

        let request = VerifyRequest {
            student_id: "S1001".to_string(),
            biometric_data: "{\"template\":\"abc\"}".to_string(),
        };

        let response = client_for(&server).await.verify(&request).await.unwrap();
        assert!(response.matched);
        assert_eq!(response.confidence, 82.0);
    }

    #[tokio::test]
    async fn test_enrollment_status_not_enrolled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/S2002"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "enrolled": false
            })))
            .mount(&server)
            .await;

        let status = client_for(&server)
            .await
            .enrollment_status(&student("S2002"))
            .await
            .unwrap();
        assert!(!status.enrolled);
        assert!(status.enrolled_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_enrollment() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/S1001"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client_for(&server)
            .await
            .delete(&student("S1001"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/S1001"))
            .respond_with(ResponseTemplate::new(500).set_body_string("comparator unavailable"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .await
            .enrollment_status(&student("S1001"))
            .await
            .unwrap_err();
        assert!(error.is_retryable());
    }
}
