use log::debug;
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;

use super::UpgradeError;

const USER_AGENT: &str = concat!("clab/", env!("CARGO_PKG_VERSION"));

/// A record from the tag listing endpoint. Only the name is used.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Tag {
    pub name: String,
}

/// An in-flight download: the body stream plus its advertised length.
pub struct Download<'a> {
    pub url: String,
    pub reader: Box<dyn Read + 'a>,
    pub len: Option<u64>,
}

/// Where release tags and the installer script come from.
pub trait ReleaseSource {
    fn fetch_tags(&self) -> Result<Vec<Tag>, UpgradeError>;

    fn open_installer(&self) -> Result<Download<'_>, UpgradeError>;
}

/// Release source backed by the GitHub tags API and a raw installer URL.
pub struct GithubSource {
    client: reqwest::blocking::Client,
    tags_url: String,
    installer_url: String,
}

impl GithubSource {
    pub fn new(tags_url: &str, installer_url: &str) -> Result<Self, UpgradeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            // No timeout; the blocking client would otherwise default to 30s.
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| UpgradeError::network(tags_url, e))?;

        Ok(Self {
            client,
            tags_url: tags_url.to_string(),
            installer_url: installer_url.to_string(),
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, UpgradeError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| UpgradeError::network(url, e))?;

        if !response.status().is_success() {
            return Err(UpgradeError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

impl ReleaseSource for GithubSource {
    fn fetch_tags(&self) -> Result<Vec<Tag>, UpgradeError> {
        let body = self
            .get(&self.tags_url)?
            .text()
            .map_err(|e| UpgradeError::network(&self.tags_url, e))?;

        parse_tag_listing(&self.tags_url, &body)
    }

    fn open_installer(&self) -> Result<Download<'_>, UpgradeError> {
        let response = self.get(&self.installer_url)?;
        let len = response.content_length();

        Ok(Download {
            url: self.installer_url.clone(),
            reader: Box::new(response),
            len,
        })
    }
}

/// Decode a tag listing body. Only the first page is ever requested.
pub fn parse_tag_listing(url: &str, body: &str) -> Result<Vec<Tag>, UpgradeError> {
    serde_json::from_str(body).map_err(|source| UpgradeError::Decode {
        url: url.to_string(),
        source,
    })
}
