use crate::Result;
use ohno::bail;

/// Read the API token from the environment variable `env_var`.
///
/// A `.env` file in the working directory, if present, is loaded first. A missing or empty
/// variable is an error naming the variable.
pub fn load_token(env_var: &str) -> Result<String> {
    let _ = dotenvy::dotenv();
    token_from(env_var, |name| std::env::var(name).ok())
}

/// Resolve the token through `lookup`, failing when it yields nothing usable
pub fn token_from(env_var: &str, lookup: impl FnOnce(&str) -> Option<String>) -> Result<String> {
    match lookup(env_var) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => bail!("environment variable {env_var} is missing; set it to a GitHub token before running"),
    }
}
