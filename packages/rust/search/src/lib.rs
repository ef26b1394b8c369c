//! Company lookup through a web search provider.
//!
//! One query per company name. From the organic results we pick a
//! professional-network profile link (first link containing the profile
//! marker) and a website link (first link whose host is not deny-listed).
//! When every result is deny-listed, the first result's link is used.

mod provider;
mod serpapi;

use companyscout_shared::{ResearchError, Result, SearchConfig};
use tracing::{debug, info, instrument};
use url::Url;

pub use provider::{SearchHit, SearchProvider};
pub use serpapi::SerpApiProvider;

// ---------------------------------------------------------------------------
// Lookup options
// ---------------------------------------------------------------------------

/// Selection settings for [`lookup`].
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Organic results requested from the provider.
    pub num_results: u32,
    /// Hosts never accepted as the company website (substring match).
    pub deny_hosts: Vec<String>,
    /// Substring identifying a company profile link.
    pub profile_marker: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for LookupOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            num_results: config.num_results,
            deny_hosts: config.deny_hosts.clone(),
            profile_marker: config.profile_marker.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// LookupResult
// ---------------------------------------------------------------------------

/// Links resolved for one company name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub company_name: String,
    /// Company website link.
    pub domain: String,
    pub linkedin_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Search for `company_name` and resolve its website and profile links.
///
/// Fails with [`ResearchError::Lookup`] when the provider fails or returns
/// no organic results.
#[instrument(skip_all, fields(company = %company_name, provider = provider.name()))]
pub async fn lookup<P: SearchProvider>(
    provider: &P,
    company_name: &str,
    opts: &LookupOptions,
) -> Result<LookupResult> {
    let hits = provider.search(company_name, opts.num_results).await?;
    debug!(count = hits.len(), "search returned results");

    if hits.is_empty() {
        return Err(ResearchError::Lookup(format!(
            "No results found for: {company_name}"
        )));
    }

    let (domain, linkedin_url) = select_candidates(&hits, opts);
    info!(%domain, linkedin = linkedin_url.as_deref().unwrap_or("-"), "company resolved");

    Ok(LookupResult {
        company_name: company_name.to_string(),
        domain,
        linkedin_url,
    })
}

/// Pick `(domain, profile)` from ranked hits. `hits` must be non-empty.
///
/// Walks the hits once in order. A link containing the profile marker is
/// taken as the profile if none has been chosen yet; otherwise it competes
/// for the website slot like any other link. Empty links are ignored.
pub fn select_candidates(hits: &[SearchHit], opts: &LookupOptions) -> (String, Option<String>) {
    let mut domain: Option<&str> = None;
    let mut profile: Option<&str> = None;

    for hit in hits {
        let link = hit.link.as_str();
        if link.is_empty() {
            continue;
        }

        if profile.is_none() && link.contains(&opts.profile_marker) {
            profile = Some(link);
        } else if domain.is_none() && !is_denied(link, &opts.deny_hosts) {
            domain = Some(link);
        }
    }

    let domain = domain
        .or_else(|| hits.first().map(|h| h.link.as_str()))
        .unwrap_or_default()
        .to_string();

    (domain, profile.map(str::to_string))
}

fn is_denied(link: &str, deny_hosts: &[String]) -> bool {
    let Ok(url) = Url::parse(link) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    deny_hosts
        .iter()
        .filter(|d| !d.is_empty())
        .any(|d| host.contains(d.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedProvider {
        links: Vec<&'static str>,
        calls: AtomicU32,
    }

    impl FixedProvider {
        fn new(links: Vec<&'static str>) -> Self {
            Self {
                links,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl SearchProvider for FixedProvider {
        async fn search(&self, _query: &str, _num_results: u32) -> Result<Vec<SearchHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.links.iter().map(|l| SearchHit::new(*l)).collect())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn hits(links: &[&str]) -> Vec<SearchHit> {
        links.iter().map(|l| SearchHit::new(*l)).collect()
    }

    #[test]
    fn skips_denied_hosts_and_takes_profile() {
        let (domain, profile) = select_candidates(
            &hits(&[
                "https://en.wikipedia.org/wiki/Acme",
                "https://www.linkedin.com/company/acme",
                "https://acme.com/",
                "https://acme.io/",
            ]),
            &LookupOptions::default(),
        );
        assert_eq!(domain, "https://acme.com/");
        assert_eq!(
            profile.as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
    }

    #[test]
    fn falls_back_to_first_link_when_all_denied() {
        let (domain, profile) = select_candidates(
            &hits(&[
                "https://en.wikipedia.org/wiki/Acme",
                "https://www.facebook.com/acme",
                "https://twitter.com/acme",
            ]),
            &LookupOptions::default(),
        );
        assert_eq!(domain, "https://en.wikipedia.org/wiki/Acme");
        assert!(profile.is_none());
    }

    #[test]
    fn second_profile_link_can_become_domain() {
        let (domain, profile) = select_candidates(
            &hits(&[
                "https://www.linkedin.com/company/acme",
                "https://www.linkedin.com/company/acme-labs",
            ]),
            &LookupOptions::default(),
        );
        assert_eq!(domain, "https://www.linkedin.com/company/acme-labs");
        assert_eq!(
            profile.as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
    }

    #[test]
    fn empty_links_are_ignored() {
        let (domain, _) = select_candidates(
            &hits(&["", "https://acme.com/"]),
            &LookupOptions::default(),
        );
        assert_eq!(domain, "https://acme.com/");
    }

    #[test]
    fn deny_match_uses_host_only() {
        // The deny entry appears in the path, not the host.
        let (domain, _) = select_candidates(
            &hits(&["https://acme.com/press/twitter.com-launch"]),
            &LookupOptions::default(),
        );
        assert_eq!(domain, "https://acme.com/press/twitter.com-launch");
    }

    #[test]
    fn custom_deny_list() {
        let opts = LookupOptions {
            deny_hosts: vec!["crunchbase.com".into(), String::new()],
            ..LookupOptions::default()
        };
        let (domain, _) = select_candidates(
            &hits(&["https://www.crunchbase.com/organization/acme", "https://acme.com/"]),
            &opts,
        );
        assert_eq!(domain, "https://acme.com/");
    }

    #[tokio::test]
    async fn lookup_resolves_company() {
        let provider = FixedProvider::new(vec![
            "https://acme.com/",
            "https://www.linkedin.com/company/acme",
        ]);
        let result = lookup(&provider, "Acme", &LookupOptions::default())
            .await
            .unwrap();
        assert_eq!(result.company_name, "Acme");
        assert_eq!(result.domain, "https://acme.com/");
        assert_eq!(
            result.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lookup_without_results_fails() {
        let provider = FixedProvider::new(vec![]);
        let err = lookup(&provider, "UnknownXyz123", &LookupOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Lookup(_)));
        assert_eq!(err.to_string(), "No results found for: UnknownXyz123");
    }
}
