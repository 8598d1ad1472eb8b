//! Process-wide HTTP agent.
//!
//! The CLI adjusts user agent, proxy and extra headers once at startup with
//! [`configure_http_client`]. Every request afterwards goes through
//! [`SHARED_AGENT`] and carries its own timeout.

use std::{
    sync::{LazyLock, RwLock, RwLockReadGuard},
    time::Duration,
};

use ureq::{http::HeaderMap, typestate::WithoutBody, Agent, Proxy, RequestBuilder};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    /// Sent with every request, before request-specific headers.
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("pgext/{}", env!("CARGO_PKG_VERSION"))),
            headers: None,
            proxy: None,
        }
    }
}

impl ClientConfig {
    fn agent(&self) -> Agent {
        let mut builder = Agent::config_builder().proxy(self.proxy.clone());
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build().into()
    }
}

struct Client {
    agent: Agent,
    config: ClientConfig,
}

impl Client {
    fn new(config: ClientConfig) -> Self {
        Self {
            agent: config.agent(),
            config,
        }
    }
}

static CLIENT: LazyLock<RwLock<Client>> =
    LazyLock::new(|| RwLock::new(Client::new(ClientConfig::default())));

fn client() -> RwLockReadGuard<'static, Client> {
    CLIENT.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prepare<B>(
    mut req: RequestBuilder<B>,
    headers: Option<&HeaderMap>,
    timeout: Duration,
) -> RequestBuilder<B> {
    for (key, value) in headers.into_iter().flatten() {
        req = req.header(key, value);
    }
    req.config().timeout_global(Some(timeout)).build()
}

/// Handle onto the shared agent.
pub struct SharedAgent;

impl SharedAgent {
    pub fn head(&self, url: &str, timeout: Duration) -> RequestBuilder<WithoutBody> {
        let client = client();
        prepare(client.agent.head(url), client.config.headers.as_ref(), timeout)
    }

    pub fn get(&self, url: &str, timeout: Duration) -> RequestBuilder<WithoutBody> {
        let client = client();
        prepare(client.agent.get(url), client.config.headers.as_ref(), timeout)
    }
}

pub static SHARED_AGENT: SharedAgent = SharedAgent;

/// Updates the shared client configuration and rebuilds the agent.
///
/// ```
/// use pgext_dl::http_client::configure_http_client;
///
/// configure_http_client(|cfg| {
///     cfg.user_agent = Some("pgext-ci/1.0".to_string());
/// });
/// ```
pub fn configure_http_client<F>(updater: F)
where
    F: FnOnce(&mut ClientConfig),
{
    let mut client = CLIENT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut config = client.config.clone();
    updater(&mut config);
    *client = Client::new(config);
}

#[cfg(test)]
mod tests {
    use ureq::http::{header::ACCEPT, HeaderValue};

    use super::*;

    #[test]
    fn test_default_user_agent() {
        let config = ClientConfig::default();
        assert!(config
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.starts_with("pgext/")));
        assert!(config.proxy.is_none());
        assert!(config.headers.is_none());
    }

    #[test]
    fn test_configure_http_client_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));

        configure_http_client(|cfg| cfg.headers = Some(headers.clone()));
        assert_eq!(client().config.headers.as_ref(), Some(&headers));

        let _req = SHARED_AGENT.get("https://repo.pigsty.io/yum", Duration::from_secs(5));
    }
}
