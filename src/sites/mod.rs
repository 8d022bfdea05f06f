//! Built-in site rule sets
//!
//! Each supported shop is a [`SiteRules`] value: a handful of selectors and one
//! field extractor. [`SiteId`] maps the command-line site identifier to its rule
//! set and applies `[sites.<id>]` configuration overrides.

mod arete;
mod casarica;
mod retail;

use crate::config::Config;
use crate::crawler::SiteRules;
use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Identifier of a supported site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteId {
    /// Superseis supermarket chain
    SuperSeis,

    /// Stock supermarket chain (same platform as Superseis)
    Stock,

    CasaRica,

    Arete,
}

impl SiteId {
    /// Every supported site, in registry order
    pub const ALL: [SiteId; 4] = [Self::SuperSeis, Self::Stock, Self::CasaRica, Self::Arete];

    /// The identifier used on the command line and in `[sites.<id>]`
    pub fn key(&self) -> &'static str {
        match self {
            Self::SuperSeis => "s6",
            Self::Stock => "stock",
            Self::CasaRica => "casarica",
            Self::Arete => "arete",
        }
    }

    /// Built-in rule set for this site
    pub fn rules(&self) -> SiteRules {
        match self {
            Self::SuperSeis => retail::rules(self.key(), retail::SUPERSEIS_START_URL),
            Self::Stock => retail::rules(self.key(), retail::STOCK_START_URL),
            Self::CasaRica => casarica::rules(),
            Self::Arete => arete::rules(),
        }
    }

    /// Rule set with the configuration's overrides for this site applied
    pub fn configured_rules(&self, config: &Config) -> SiteRules {
        let rules = self.rules();
        let Some(site) = config.site_override(self.key()) else {
            return rules;
        };

        let rules = match &site.start_url {
            Some(start_url) => rules.with_start_url(start_url.clone()),
            None => rules,
        };
        rules.with_exclusions(site.exclude.iter().cloned())
    }
}

impl FromStr for SiteId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|site| site.key() == s)
            .ok_or_else(|| ConfigError::UnknownSite(s.to_string()))
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
