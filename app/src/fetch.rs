use crate::config::DirectoryConfig;
use crate::error::FetchError;
use crate::ui;
use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Form parameters sent in a POST body, in order.
pub type FormParams<'a> = [(&'a str, &'a str)];

/// One outbound request, one body.
///
/// `Ok(None)` means the server answered with a non-success status; transport
/// failures are reported as [`FetchError`].
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(
        &self,
        url: &str,
        method: HttpMethod,
        form: &FormParams<'_>,
    ) -> Result<Option<Vec<u8>>, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &DirectoryConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        method: HttpMethod,
        form: &FormParams<'_>,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url).form(form),
        };

        let wrap = |source| FetchError {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(wrap)?;
        let status = response.status();
        if !status.is_success() {
            ui::print_verbose(&format!("{:?} {} answered {}", method, url, status));
            return Ok(None);
        }

        let body = response.bytes().await.map_err(wrap)?;
        ui::print_verbose(&format!("{:?} {} -> {} bytes", method, url, body.len()));
        Ok(Some(body.to_vec()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};

    async fn echo_form(form: web::Form<Vec<(String, String)>>) -> HttpResponse {
        HttpResponse::Ok().json(form.into_inner())
    }

    #[actix_web::test]
    async fn status_decides_between_body_and_none() {
        let server = HttpServer::new(|| {
            App::new()
                .route("/page", web::get().to(|| async { HttpResponse::Ok().body("labas") }))
                .route("/missing", web::get().to(|| async { HttpResponse::NotFound().finish() }))
                .route(
                    "/broken",
                    web::get().to(|| async { HttpResponse::InternalServerError().finish() }),
                )
                .route("/search", web::post().to(echo_form))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let base = format!("http://{}", addr);
        let fetcher = HttpFetcher::new(&DirectoryConfig::new(&base, "test-agent", Some(5))).unwrap();
        let url = |path: &str| format!("{}{}", base, path);

        let page = fetcher.fetch(&url("/page"), HttpMethod::Get, &[]).await;
        assert_eq!(page.unwrap(), Some(b"labas".to_vec()));
        let missing = fetcher.fetch(&url("/missing"), HttpMethod::Get, &[]).await;
        assert_eq!(missing.unwrap(), None);
        let broken = fetcher.fetch(&url("/broken"), HttpMethod::Get, &[]).await;
        assert_eq!(broken.unwrap(), None);

        // Form fields arrive url-encoded, in the order given
        let form = [("name", "UAB \"Ąžuolas\" & Co"), ("code", "304232351")];
        let body = fetcher
            .fetch(&url("/search"), HttpMethod::Post, &form)
            .await
            .unwrap()
            .expect("form echoed back");
        let echoed: Vec<(String, String)> = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            echoed,
            [
                ("name".to_string(), "UAB \"Ąžuolas\" & Co".to_string()),
                ("code".to_string(), "304232351".to_string()),
            ]
        );

        handle.stop(true).await;
    }

    #[test]
    fn builds_client_with_and_without_timeout() {
        assert!(HttpFetcher::new(&DirectoryConfig::default()).is_ok());
        let config = DirectoryConfig::new("http://localhost", "test-agent", Some(5));
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[tokio::test]
    async fn connection_failure_is_reported_with_url() {
        let config = DirectoryConfig::new("http://127.0.0.1:1", "test-agent", Some(5));
        let fetcher = HttpFetcher::new(&config).unwrap();
        let url = "http://127.0.0.1:1/imones/1";

        let err = fetcher.fetch(url, HttpMethod::Get, &[]).await.unwrap_err();

        assert_eq!(err.url, url);
        assert!(err.to_string().starts_with("Error during requests to http://127.0.0.1:1/imones/1 : "));
    }
}
