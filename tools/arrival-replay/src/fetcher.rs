use std::future::Future;
use std::pin::Pin;

use arrival_transit::{DataFetcher, TransitError};

/// [`DataFetcher`] over a shared reqwest client
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataFetcher for ReqwestFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = arrival_transit::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let fetch_err = |message: String| TransitError::Fetch {
                url: url.to_string(),
                message,
            };

            log::debug!("GET {url}");
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| fetch_err(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(fetch_err(format!("HTTP {status}")));
            }

            let body = resp.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
            Ok(body.to_vec())
        })
    }
}
