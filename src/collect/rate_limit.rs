use chrono::{DateTime, Utc};
use core::fmt::Write;
use serde::Deserialize;

/// Response of the `/rate_limit` endpoint
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RateLimitOverview {
    #[serde(default)]
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RateLimitResources {
    pub core: Option<RateLimitResource>,
    pub search: Option<RateLimitResource>,
}

/// Quota of one resource category
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct RateLimitResource {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp at which the quota resets
    pub reset: i64,
}

impl RateLimitResource {
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}

impl RateLimitOverview {
    /// Human-readable report of the core and search quotas
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        describe_resource(&mut out, "Core", self.resources.core.as_ref());
        describe_resource(&mut out, "Search", self.resources.search.as_ref());
        out
    }
}

fn describe_resource(out: &mut String, title: &str, resource: Option<&RateLimitResource>) {
    let _ = writeln!(out, "{title} Rate Limit:");
    let Some(resource) = resource else {
        let _ = writeln!(out, "  (not reported)");
        return;
    };

    let _ = writeln!(out, "  Limit: {}", resource.limit);
    let _ = writeln!(out, "  Remaining: {}", resource.remaining);
    match resource.reset_at() {
        Some(at) => {
            let _ = writeln!(out, "  Reset: {} ({})", resource.reset, at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => {
            let _ = writeln!(out, "  Reset: {}", resource.reset);
        }
    }
}

/// Show the first and last four characters of a token, hiding the rest
#[must_use]
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars.iter().take(4).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}...{tail}")
}
