//! Runtime configuration for the command-line tool.
//! Credentials come from the environment, optionally seeded from a `.env` file.

use std::path::Path;
use std::time::Duration;

use crate::models::oj::CustomerId;
use crate::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

#[derive(Clone)]
pub struct Config {
    /// Static API key issued by OJ Electronics.
    pub api_key: String,
    pub customer_id: CustomerId,
    pub username: String,
    pub password: String,
    pub base_url: String,
    /// Global timeout applied to every HTTP request.
    pub http_timeout: Duration,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("customer_id", &self.customer_id)
            .field("username", &self.username)
            .field("base_url", &self.base_url)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let required = |key: &str| match lookup(key) {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(format!("Missing {key}: set it in the environment or a .env file")),
        };

        let api_key = required("OJ_API_KEY")?;
        let customer_id = required("OJ_CUSTOMER_ID")?
            .parse::<i64>()
            .map(CustomerId)
            .map_err(|_| "OJ_CUSTOMER_ID must be an integer".to_string())?;
        let username = required("OJ_USERNAME")?;
        let password = required("OJ_PASSWORD")?;

        let base_url = lookup("OJ_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http_timeout = match lookup("OJ_HTTP_TIMEOUT_SECS") {
            Some(s) if !s.trim().is_empty() => Duration::from_secs(
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| "OJ_HTTP_TIMEOUT_SECS must be a whole number of seconds".to_string())?,
            ),
            _ => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            api_key,
            customer_id,
            username,
            password,
            base_url,
            http_timeout,
        })
    }
}

/// Load `KEY=VALUE` lines into the process environment. Variables that are already set win.
pub fn load_env_file(path: &Path) -> Result<(), String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for (index, line) in content.lines().enumerate() {
        let assignment = parse_env_line(line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        if let Some((key, value)) = assignment
            && std::env::var_os(&key).is_none()
        {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

/// Parse one `.env` line. Blank lines and comments yield `None`; `export ` prefixes,
/// single and double quotes, and trailing comments on unquoted values are understood.
pub fn parse_env_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let trimmed = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);

    let (key, raw) = trimmed.split_once('=').ok_or("missing '=' in assignment")?;
    let key = key.trim();
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(format!("invalid variable name {key:?}"));
    }

    let raw = raw.trim();
    let value = if let Some(rest) = raw.strip_prefix('"') {
        parse_double_quoted(rest)?
    } else if let Some(rest) = raw.strip_prefix('\'') {
        let (value, tail) = rest.split_once('\'').ok_or("unterminated single-quoted value")?;
        check_tail(tail)?;
        value.to_string()
    } else {
        raw.split(" #").next().unwrap_or_default().trim_end().to_string()
    };
    Ok(Some((key.to_string(), value)))
}

/// Decode the rest of a double-quoted value. Escapes: `\n`, `\r`, `\t`, and a backslash before any other character.
fn parse_double_quoted(input: &str) -> Result<String, String> {
    let mut value = String::new();
    let mut chars = input.chars();
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if escape {
            value.push(match ch {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => {
                check_tail(chars.as_str())?;
                return Ok(value);
            }
            other => value.push(other),
        }
    }

    if escape {
        Err("unterminated escape sequence in double-quoted value".to_string())
    } else {
        Err("unterminated double-quoted value".to_string())
    }
}

fn check_tail(tail: &str) -> Result<(), String> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with('#') {
        Ok(())
    } else {
        Err("unexpected characters after closing quote".to_string())
    }
}
