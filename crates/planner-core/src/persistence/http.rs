//! HTTP implementation of the shape service.

use super::{ServiceError, ServiceResult, ShapeRecord, ShapeService, decode_records};
use std::time::Duration;
use url::Url;

/// Shape service reached over HTTP with JSON bodies.
///
/// Routes, relative to the base URL:
/// - `GET /shapes`
/// - `POST /shapes`
/// - `DELETE /shapes/{id}`
pub struct HttpShapeService {
    base: Url,
    agent: ureq::Agent,
}

impl HttpShapeService {
    /// Create a service client for the given base URL.
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ServiceError::InvalidUrl(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }
        if base.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(base_url.to_string()));
        }
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self { base, agent })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `<base>/shapes[/<id>]`, percent-encoding the id.
    fn endpoint(&self, id: Option<&str>) -> ServiceResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ServiceError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty().push("shapes");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

fn map_error(err: ureq::Error) -> ServiceError {
    match err {
        ureq::Error::Status(404, response) => {
            ServiceError::NotFound(response.get_url().to_string())
        }
        ureq::Error::Status(code, response) => ServiceError::Status {
            code,
            message: response.status_text().to_string(),
        },
        ureq::Error::Transport(transport) => ServiceError::Transport(transport.to_string()),
    }
}

impl ShapeService for HttpShapeService {
    fn list(&self) -> ServiceResult<Vec<ShapeRecord>> {
        let url = self.endpoint(None)?;
        log::debug!("GET {}", url);
        self.agent
            .get(url.as_str())
            .call()
            .map_err(map_error)?
            .into_json::<Vec<serde_json::Value>>()
            .map(decode_records)
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    fn create(&self, record: &ShapeRecord) -> ServiceResult<ShapeRecord> {
        let url = self.endpoint(None)?;
        log::debug!("POST {}", url);
        self.agent
            .post(url.as_str())
            .send_json(record.without_id())
            .map_err(map_error)?
            .into_json::<ShapeRecord>()
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    fn delete(&self, id: &str) -> ServiceResult<()> {
        let url = self.endpoint(Some(id))?;
        log::debug!("DELETE {}", url);
        self.agent.delete(url.as_str()).call().map_err(map_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base: &str) -> HttpShapeService {
        HttpShapeService::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let svc = service("http://localhost:5000");
        assert_eq!(
            svc.endpoint(None).unwrap().as_str(),
            "http://localhost:5000/shapes"
        );
        assert_eq!(
            svc.endpoint(Some("abc")).unwrap().as_str(),
            "http://localhost:5000/shapes/abc"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let svc = service("https://example.com/api/");
        assert_eq!(
            svc.endpoint(None).unwrap().as_str(),
            "https://example.com/api/shapes"
        );
    }

    #[test]
    fn test_id_is_percent_encoded() {
        let svc = service("http://localhost:5000");
        assert_eq!(
            svc.endpoint(Some("a/b c")).unwrap().as_str(),
            "http://localhost:5000/shapes/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            HttpShapeService::new("not a url", Duration::from_secs(1)),
            Err(ServiceError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpShapeService::new("ws://localhost:5000", Duration::from_secs(1)),
            Err(ServiceError::InvalidUrl(_))
        ));
    }
}
