//! Reference to the externally hosted digital-twin viewer.
//!
//! The viewer is opaque: we hold its address and hand it to the display,
//! nothing more.

use anyhow::{anyhow, bail, Result};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwinEmbed {
    url: Url,
}

impl TwinEmbed {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| anyhow!("invalid twin url {:?}: {}", raw, e))?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => bail!("twin url must be http(s), got {}", other),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_default_viewer() {
        let twin = TwinEmbed::parse("http://localhost:5173/").unwrap();
        assert_eq!(twin.url().host_str(), Some("localhost"));
        assert_eq!(twin.url().port(), Some(5173));
        assert_eq!(twin.as_str(), "http://localhost:5173/");
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(TwinEmbed::parse("file:///tmp/twin.html").is_err());
        assert!(TwinEmbed::parse("localhost:5173").is_err());
    }
}
