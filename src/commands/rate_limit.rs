use super::{GlobalArgs, Host};
use crate::Result;
use crate::collect::{RetryPolicy, SearchClient, SearchError, load_token, mask_token};
use crate::config::Config;
use ohno::{IntoAppError, bail};
use std::io::Write;

/// Authenticate with the configured token and print the remaining API quota
pub async fn check_rate_limit<H: Host>(host: &mut H, global: &GlobalArgs) -> Result<()> {
    let config = global.setup()?;
    let token = load_token(&config.token_env)?;
    report_rate_limit(host, &config, &token).await
}

async fn report_rate_limit<H: Host>(host: &mut H, config: &Config, token: &str) -> Result<()> {
    let _ = writeln!(host.output(), "Token from {}: {}", config.token_env, mask_token(token));

    let retry = RetryPolicy {
        max_attempts: 1,
        backoff_base: config.backoff_base(),
    };
    let client = SearchClient::new(token, config.api_base_url.as_str(), retry, config.request_timeout())?;

    match client.rate_limit().await {
        Ok(overview) => {
            let _ = write!(host.output(), "{}", overview.describe());
            Ok(())
        }
        Err(SearchError::Status { status, body }) => {
            let _ = writeln!(host.error(), "Rate limit request failed with HTTP {status}");
            let _ = writeln!(host.error(), "{body}");
            bail!("rate limit check failed with HTTP {status}")
        }
        Err(e) => Err(e).into_app_err("checking the rate limit"),
    }
}
