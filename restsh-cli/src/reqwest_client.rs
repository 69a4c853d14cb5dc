use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;

use restsh_core::command::{Method, RequestSpec};
use restsh_core::dispatch::{resolve, Dispatch, Envelope};
use restsh_core::error::{Error, Result};
use restsh_core::session::Session;

/// HTTP dispatch backed by a blocking `reqwest` client with a cookie jar.
/// Cookies received are stored and resent for the life of the session;
/// `reset` swaps in a fresh jar by rebuilding the client.
pub struct ReqwestDispatch {
    client: Client,
}

impl ReqwestDispatch {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: fresh_client()?,
        })
    }
}

fn fresh_client() -> Result<Client> {
    Client::builder()
        .cookie_provider(Arc::new(Jar::default()))
        .build()
        .map_err(|e| Error::RequestBuild(e.to_string()))
}

impl Dispatch for ReqwestDispatch {
    fn send(&self, spec: &RequestSpec, session: &Session) -> Result<Envelope> {
        let url = resolve(&session.base_url, &spec.path)?;

        let method = match spec.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &spec.body {
            builder = builder
                .header(CONTENT_TYPE, session.content_type.as_str())
                .body(body.clone());
        }

        let response = builder.send().map_err(|e| {
            if e.is_builder() {
                Error::RequestBuild(e.to_string())
            } else {
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in response.headers() {
            headers
                .entry(key.as_str().to_string())
                .or_default()
                .push(value.to_str().unwrap_or("(binary)").to_string());
        }

        let body = response
            .bytes()
            .map_err(|e| Error::BodyRead(e.to_string()))?
            .to_vec();

        Ok(Envelope {
            status,
            headers,
            body,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.client = fresh_client()?;
        Ok(())
    }
}
