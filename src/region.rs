//! Storyblok server regions.

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// The region a space is hosted in. Each region has its own API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Eu,
    Us,
    Ap,
    Ca,
    Cn,
}

impl Region {
    /// The Management API root for this region, including the version prefix.
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Eu => "https://mapi.storyblok.com/v1/",
            Region::Us => "https://api-us.storyblok.com/v1/",
            Region::Ap => "https://api-ap.storyblok.com/v1/",
            Region::Ca => "https://api-ca.storyblok.com/v1/",
            Region::Cn => "https://app.storyblokchina.cn/v1/",
        }
    }

    /// The short region code, e.g. `"eu"`.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Eu => "eu",
            Region::Us => "us",
            Region::Ap => "ap",
            Region::Ca => "ca",
            Region::Cn => "cn",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eu" => Ok(Region::Eu),
            "us" => Ok(Region::Us),
            "ap" => Ok(Region::Ap),
            "ca" => Ok(Region::Ca),
            "cn" => Ok(Region::Cn),
            other => Err(Error::ConfigurationError(format!(
                "Unknown region `{}` (expected one of eu, us, ap, ca, cn)",
                other
            ))),
        }
    }
}
