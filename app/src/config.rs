use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://rekvizitai.vz.lt";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const LISTING_PATH: &str = "/imones/1";
const LEGAL_ENTITY_SEGMENT: &str = "juridinis-asmuo/";

/// Where the directory lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub user_agent: String,
    /// `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl DirectoryConfig {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: Option<u64>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }

    /// Search listing endpoint that accepts the code-search form.
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, LISTING_PATH)
    }

    /// Legal entity sub-page of a company detail page.
    pub fn legal_entity_url(&self, detail_url: &str) -> String {
        if detail_url.ends_with('/') {
            format!("{}{}", detail_url, LEGAL_ENTITY_SEGMENT)
        } else {
            format!("{}/{}", detail_url, LEGAL_ENTITY_SEGMENT)
        }
    }
}
