use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eco_types::{BoundingBox, DetectionResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::EcoConfig;

/// A still frame captured from the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl CapturedImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg".to_string(),
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector unavailable: {0}")]
    Unavailable(String),
    #[error("detection request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("detection service returned status {0}")]
    Status(u16),
}

/// Something that can count bottles in a captured frame.
#[async_trait]
pub trait BottleDetector: Send + Sync {
    async fn detect(&self, image: &CapturedImage) -> Result<DetectionResult, DetectorError>;
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    image_data: &'a str,
}

#[derive(Deserialize)]
struct DetectResponse {
    bottles: u32,
    confidence: f64,
    #[serde(default)]
    detections: Vec<WireDetection>,
}

#[derive(Deserialize)]
struct WireDetection {
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    material: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the bottle detection web service.
///
/// The service answers with pixel boxes and no frame size, so boxes are not
/// carried over; the per-detection size and material labels are.
pub struct HttpDetector {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetector {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DetectorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EcoConfig) -> Result<Self, DetectorError> {
        Self::new(&config.detection_api_url, config.detection_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        let response = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!("Detection service health returned {}", response.status());
                return false;
            }
            Err(e) => {
                debug!("Detection service health check failed: {}", e);
                return false;
            }
        };

        match response.json::<HealthResponse>().await {
            Ok(health) => health.status == "healthy",
            Err(_) => false,
        }
    }
}

#[async_trait]
impl BottleDetector for HttpDetector {
    async fn detect(&self, image: &CapturedImage) -> Result<DetectionResult, DetectorError> {
        let url = format!("{}/detect-bottles-base64", self.base_url);
        let data_url = image.to_data_url();

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest {
                image_data: &data_url,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Detection service returned {}", response.status());
            return Err(DetectorError::Status(response.status().as_u16()));
        }

        let body: DetectResponse = response.json().await?;
        let first = body.detections.into_iter().next();

        Ok(DetectionResult {
            bottle_count: body.bottles,
            confidence: body.confidence,
            bounding_boxes: Vec::new(),
            size_hint: first.as_ref().and_then(|d| d.size.clone()),
            material_hint: first.and_then(|d| d.material),
        })
    }
}

/// Detector with a canned answer. Stands in for the model in demos and tests.
pub struct FixedDetector {
    result: Option<DetectionResult>,
    delay: Duration,
}

impl FixedDetector {
    /// One standard 330 ml PET bottle at 98% confidence.
    pub fn new() -> Self {
        Self::returning(DetectionResult {
            bottle_count: 1,
            confidence: 0.98,
            bounding_boxes: vec![BoundingBox {
                x: 0.3,
                y: 0.2,
                width: 0.4,
                height: 0.6,
                confidence: 0.98,
                label: "PET Bottle 330ml".to_string(),
            }],
            size_hint: Some("330 ml".to_string()),
            material_hint: None,
        })
    }

    pub fn returning(result: DetectionResult) -> Self {
        Self {
            result: Some(result),
            delay: Duration::ZERO,
        }
    }

    /// A detector whose every call fails.
    pub fn failing() -> Self {
        Self {
            result: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for FixedDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BottleDetector for FixedDetector {
    async fn detect(&self, _image: &CapturedImage) -> Result<DetectionResult, DetectorError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.result
            .clone()
            .ok_or_else(|| DetectorError::Unavailable("model not loaded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single HTTP response on a local port and return its base URL.
    async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    /// Drain headers and a Content-Length body so closing doesn't reset the
    /// connection under the client.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            data.extend_from_slice(&chunk[..n]);

            let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }

    #[test]
    fn test_data_url_encoding() {
        let image = CapturedImage::jpeg(vec![0xff, 0xd8, 0xff]);
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[tokio::test]
    async fn test_fixed_detector_default() {
        let result = FixedDetector::new()
            .detect(&CapturedImage::jpeg(Vec::new()))
            .await
            .unwrap();

        assert_eq!(result.bottle_count, 1);
        assert_eq!(result.confidence, 0.98);
        assert_eq!(result.bounding_boxes[0].label, "PET Bottle 330ml");
    }

    #[tokio::test]
    async fn test_failing_detector() {
        let result = FixedDetector::failing()
            .detect(&CapturedImage::jpeg(Vec::new()))
            .await;
        assert!(matches!(result, Err(DetectorError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_http_detector_parses_response() {
        let body = r#"{"bottles":2,"confidence":0.91,"detections":[{"class":"bottle","confidence":0.91,"bbox":{"x1":100,"y1":100,"x2":200,"y2":300},"size":"500ml","material":"PET plastic"}],"processing_time_ms":12.5}"#;
        let base_url = serve_once("200 OK", body).await;

        let detector = HttpDetector::new(&base_url, Duration::from_secs(2)).unwrap();
        let result = detector
            .detect(&CapturedImage::jpeg(vec![1, 2, 3]))
            .await
            .unwrap();

        assert_eq!(result.bottle_count, 2);
        assert_eq!(result.confidence, 0.91);
        assert_eq!(result.size_hint.as_deref(), Some("500ml"));
        assert_eq!(result.material_hint.as_deref(), Some("PET plastic"));
    }

    #[tokio::test]
    async fn test_http_detector_error_status() {
        let base_url = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;

        let detector = HttpDetector::new(&base_url, Duration::from_secs(2)).unwrap();
        let result = detector.detect(&CapturedImage::jpeg(vec![1])).await;

        assert!(matches!(result, Err(DetectorError::Status(500))));
    }

    #[test]
    fn test_from_config_uses_api_url() {
        let config = EcoConfig::from_lookup(|name| match name {
            "DETECTION_API_URL" => Some("http://detector.local:9000/".to_string()),
            _ => None,
        })
        .unwrap();

        let detector = HttpDetector::from_config(&config).unwrap();
        assert_eq!(detector.base_url(), "http://detector.local:9000");

        let default = HttpDetector::from_config(&EcoConfig::default()).unwrap();
        assert_eq!(default.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_health_check() {
        let base_url = serve_once("200 OK", r#"{"status":"healthy","model_loaded":true}"#).await;
        let detector = HttpDetector::new(&base_url, Duration::from_secs(2)).unwrap();
        assert!(detector.check_health().await);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unhealthy() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let detector =
            HttpDetector::new(&format!("http://{}", addr), Duration::from_millis(500)).unwrap();
        assert!(!detector.check_health().await);
        assert!(matches!(
            detector.detect(&CapturedImage::jpeg(vec![1])).await,
            Err(DetectorError::Request(_))
        ));
    }
}
