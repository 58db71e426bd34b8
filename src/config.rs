//! Backend URL resolution and runtime configuration.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::logging::{self, obj, v_str, Domain};

/// Local reverse-proxy path used when no explicit backend is configured.
pub const DEV_PROXY_PATH: &str = "/api";
/// Placeholder for hosted deployments that forgot to set the backend variable.
pub const HOSTED_FALLBACK_URL: &str = "https://YOUR-BACKEND-URL.onrender.com";
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const HOSTED_PROVIDERS: &[&str] = &["vercel.app", "netlify.app"];

/// Which rule produced the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiUrlSource {
    /// `VITE_API_BASE_URL`
    BaseUrlVar,
    /// `VITE_API_URL`
    UrlVar,
    /// `--api-url` on the command line
    CliFlag,
    DevProxy,
    HostedGuess,
    Default,
}

impl ApiUrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiUrlSource::BaseUrlVar => "VITE_API_BASE_URL",
            ApiUrlSource::UrlVar => "VITE_API_URL",
            ApiUrlSource::CliFlag => "--api-url",
            ApiUrlSource::DevProxy => "dev_proxy",
            ApiUrlSource::HostedGuess => "hosted_guess",
            ApiUrlSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApiUrl {
    pub base: String,
    pub source: ApiUrlSource,
}

impl ResolvedApiUrl {
    pub fn is_relative(&self) -> bool {
        !(self.base.starts_with("http://") || self.base.starts_with("https://"))
    }
}

/// Everything the resolver looks at. Built from the environment in
/// production and by hand in tests.
#[derive(Debug, Clone, Default)]
pub struct ResolverInputs {
    pub api_base_url: Option<String>,
    pub api_url: Option<String>,
    pub dev: bool,
    pub hostname: Option<String>,
}

impl ResolverInputs {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Runtime values win; build-time values baked in with `option_env!`
    /// fill the gaps.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("VITE_API_BASE_URL")
            .or_else(|| option_env!("VITE_API_BASE_URL").map(str::to_string));
        let api_url =
            lookup("VITE_API_URL").or_else(|| option_env!("VITE_API_URL").map(str::to_string));
        let dev = match lookup("AUTOPSY_DEV").as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            _ => cfg!(debug_assertions),
        };
        Self {
            api_base_url,
            api_url,
            dev,
            hostname: lookup("AUTOPSY_PUBLIC_HOST"),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn normalize(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Resolve the backend base URL.
///
/// Priority: explicit variable, then the dev proxy, then a guess for known
/// hosting providers, then the default relative path.
pub fn resolve_api_url(inputs: &ResolverInputs) -> ResolvedApiUrl {
    let resolved = if let Some(base) = non_empty(&inputs.api_base_url) {
        ResolvedApiUrl {
            base: normalize(base),
            source: ApiUrlSource::BaseUrlVar,
        }
    } else if let Some(base) = non_empty(&inputs.api_url) {
        ResolvedApiUrl {
            base: normalize(base),
            source: ApiUrlSource::UrlVar,
        }
    } else if inputs.dev {
        ResolvedApiUrl {
            base: DEV_PROXY_PATH.to_string(),
            source: ApiUrlSource::DevProxy,
        }
    } else if let Some(host) = non_empty(&inputs.hostname)
        .filter(|h| HOSTED_PROVIDERS.iter().any(|p| h.contains(p)))
    {
        logging::warn(
            Domain::Config,
            "hosted_fallback",
            obj(&[
                ("msg", v_str("VITE_API_BASE_URL not set; using hosted fallback")),
                ("hostname", v_str(host)),
                ("fallback", v_str(HOSTED_FALLBACK_URL)),
            ]),
        );
        ResolvedApiUrl {
            base: HOSTED_FALLBACK_URL.to_string(),
            source: ApiUrlSource::HostedGuess,
        }
    } else {
        ResolvedApiUrl {
            base: DEV_PROXY_PATH.to_string(),
            source: ApiUrlSource::Default,
        }
    };

    logging::debug(
        Domain::Config,
        "api_url",
        obj(&[
            ("base", v_str(&resolved.base)),
            ("source", v_str(resolved.source.as_str())),
        ]),
    );
    resolved
}

/// Runtime configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api: ResolvedApiUrl,
    /// Origin that relative API bases are joined onto.
    pub origin: String,
    pub timeout: Duration,
    pub dev: bool,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let inputs = ResolverInputs::from_lookup(&lookup);
        Self {
            api: resolve_api_url(&inputs),
            origin: non_empty(&lookup("AUTOPSY_ORIGIN"))
                .unwrap_or(DEFAULT_ORIGIN)
                .to_string(),
            timeout: Duration::from_secs(
                lookup("AUTOPSY_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            dev: inputs.dev,
        }
    }

    /// Config pointing straight at `base` with every other setting at its
    /// default.
    pub fn with_api_base(base: &str) -> Self {
        Self {
            api: ResolvedApiUrl {
                base: normalize(base),
                source: ApiUrlSource::CliFlag,
            },
            origin: DEFAULT_ORIGIN.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dev: false,
        }
    }

    /// Replace only the API base, as the `--api-url` flag does.
    pub fn override_api(mut self, base: &str) -> Self {
        self.api = ResolvedApiUrl {
            base: normalize(base),
            source: ApiUrlSource::CliFlag,
        };
        self
    }

    /// Absolute URL for `path` under the API base.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let base = self.api.base.trim_end_matches('/');
        if self.api.is_relative() {
            let origin = Url::parse(&self.origin)
                .with_context(|| format!("invalid origin {}", self.origin))?;
            let relative = if base.starts_with('/') {
                format!("{}/{}", base, path)
            } else {
                format!("/{}/{}", base, path)
            };
            origin
                .join(&relative)
                .map_err(|e| anyhow!("cannot join {} onto {}: {}", relative, self.origin, e))
        } else {
            Url::parse(&format!("{}/{}", base, path))
                .with_context(|| format!("invalid API base {}", self.api.base))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(base: Option<&str>, url: Option<&str>, dev: bool, host: Option<&str>) -> ResolverInputs {
        ResolverInputs {
            api_base_url: base.map(str::to_string),
            api_url: url.map(str::to_string),
            dev,
            hostname: host.map(str::to_string),
        }
    }

    #[test]
    fn test_dev_without_override_uses_proxy() {
        let resolved = resolve_api_url(&inputs(None, None, true, None));
        assert_eq!(resolved.base, "/api");
        assert_eq!(resolved.source, ApiUrlSource::DevProxy);
    }

    #[test]
    fn test_base_url_var_beats_everything() {
        let resolved = resolve_api_url(&inputs(
            Some("https://autopsy.example.com/"),
            Some("https://other.example.com"),
            true,
            Some("app.vercel.app"),
        ));
        assert_eq!(resolved.base, "https://autopsy.example.com");
        assert_eq!(resolved.source, ApiUrlSource::BaseUrlVar);
    }

    #[test]
    fn test_url_var_used_when_base_blank() {
        let resolved = resolve_api_url(&inputs(Some("  "), Some("https://api.example.com"), true, None));
        assert_eq!(resolved.base, "https://api.example.com");
        assert_eq!(resolved.source, ApiUrlSource::UrlVar);
    }

    #[test]
    fn test_hosted_provider_guess() {
        let resolved = resolve_api_url(&inputs(None, None, false, Some("autopsy.netlify.app")));
        assert_eq!(resolved.base, HOSTED_FALLBACK_URL);
        assert_eq!(resolved.source, ApiUrlSource::HostedGuess);
    }

    #[test]
    fn test_default_relative_path() {
        let resolved = resolve_api_url(&inputs(None, None, false, Some("intranet.local")));
        assert_eq!(resolved.base, "/api");
        assert_eq!(resolved.source, ApiUrlSource::Default);
    }

    #[test]
    fn test_lookup_dev_flag() {
        let inputs = ResolverInputs::from_lookup(|k| match k {
            "AUTOPSY_DEV" => Some("true".to_string()),
            _ => None,
        });
        assert!(inputs.dev);
        let inputs = ResolverInputs::from_lookup(|k| match k {
            "AUTOPSY_DEV" => Some("0".to_string()),
            _ => None,
        });
        assert!(!inputs.dev);
    }

    #[test]
    fn test_endpoint_joins_relative_base_onto_origin() {
        let mut cfg = ClientConfig::with_api_base("/api");
        cfg.api.source = ApiUrlSource::DevProxy;
        cfg.origin = "http://localhost:5173".to_string();
        let url = cfg.endpoint("run-autopsy").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5173/api/run-autopsy");
    }

    #[test]
    fn test_endpoint_absolute_base_keeps_path() {
        let cfg = ClientConfig::with_api_base("https://backend.example.com/v1/");
        let url = cfg.endpoint("/run-autopsy").unwrap();
        assert_eq!(url.as_str(), "https://backend.example.com/v1/run-autopsy");
    }

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_override_keeps_env_settings() {
        let cfg = ClientConfig::from_lookup(env(&[
            ("AUTOPSY_TIMEOUT_SECS", "7"),
            ("AUTOPSY_DEV", "1"),
            ("AUTOPSY_ORIGIN", "http://dash.local:8080"),
            ("VITE_API_BASE_URL", "https://env.example.com"),
        ]))
        .override_api("https://flag.example.com/");
        assert_eq!(cfg.api.base, "https://flag.example.com");
        assert_eq!(cfg.api.source, ApiUrlSource::CliFlag);
        assert_eq!(cfg.api.source.as_str(), "--api-url");
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert!(cfg.dev);
        assert_eq!(cfg.origin, "http://dash.local:8080");
    }

    #[test]
    fn test_blank_origin_falls_back_to_default() {
        let cfg = ClientConfig::from_lookup(env(&[("AUTOPSY_ORIGIN", "  "), ("AUTOPSY_DEV", "1")]));
        assert_eq!(cfg.origin, DEFAULT_ORIGIN);
        let url = cfg.endpoint("run-autopsy").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5173/api/run-autopsy");
    }
}
