use reqwest::{Client, Proxy, Url};

use crate::error::{FetchError, Result};

const DEFAULT_USER_AGENT: &str = concat!("repotree/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Default)]
pub struct ClientSetting {
    pub proxies: Option<Vec<Url>>,
    pub user_agent: Option<String>,
}

impl ClientSetting {
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxies.get_or_insert_with(Vec::new).push(url);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut cb = Client::builder().user_agent(agent);

        if let Some(proxies) = self.proxies {
            let (secure, insecure): (Vec<Url>, Vec<Url>) =
                proxies.into_iter().partition(|u| u.scheme() == "https");

            for u in secure {
                cb = cb.proxy(Proxy::https(u).map_err(FetchError::Client)?);
            }

            for u in insecure {
                cb = cb.proxy(Proxy::http(u).map_err(FetchError::Client)?);
            }
        }

        cb.build().map_err(FetchError::Client)
    }
}
