//! Signed-in identity: subscription ID and ARM access token.
//!
//! [`AzureCliSession`] asks the Azure CLI (`az`) for both. [`StaticSession`]
//! takes them as given, typically from `AZURE_SUBSCRIPTION_ID` and
//! `AZURE_ACCESS_TOKEN`.

use std::io::ErrorKind;

use async_trait::async_trait;
use azcost_cost::SessionProvider;
use tokio::process::Command;
use tracing::{debug, info};

use azcost_config::DEFAULT_MANAGEMENT_ENDPOINT;
use crate::error::{AzureError, Result};
use crate::models::{AccessTokenResponse, AccountShow};

/// Environment variable holding a subscription ID.
pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";

/// Environment variable holding an ARM access token.
pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";

/// A session that can also hand out bearer tokens for HTTP calls.
#[async_trait]
pub trait AccessTokenProvider: SessionProvider {
    /// Access token for the ARM endpoint.
    async fn access_token(&self) -> Result<String>;

    /// Short label for logs.
    fn kind(&self) -> &'static str;
}

/// Session backed by the Azure CLI login.
#[derive(Debug, Clone)]
pub struct AzureCliSession {
    program: String,
    resource: String,
    subscription_id: Option<String>,
}

impl Default for AzureCliSession {
    fn default() -> Self {
        Self::new(DEFAULT_MANAGEMENT_ENDPOINT)
    }
}

impl AzureCliSession {
    /// Session requesting tokens for `resource` (the ARM endpoint).
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            program: "az".to_string(),
            resource: resource.into(),
            subscription_id: None,
        }
    }

    /// Use a subscription other than the CLI's default.
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Path or name of the CLI executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The CLI's current account.
    pub async fn account(&self) -> Result<AccountShow> {
        let mut args = vec!["account", "show", "--output", "json"];
        if let Some(id) = &self.subscription_id {
            args.extend(["--subscription", id.as_str()]);
        }
        let stdout = self.run(&args).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    /// Run the CLI and return stdout, mapping failures to session errors.
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        debug!(program = %self.program, ?args, "running Azure CLI");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AzureError::NotLoggedIn(format!(
                    "Azure CLI '{}' not found; install it or set {SUBSCRIPTION_ENV} and {ACCESS_TOKEN_ENV}",
                    self.program
                )),
                _ => AzureError::Cli(format!("failed to run '{}': {e}", self.program)),
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("az login") {
            Err(AzureError::NotLoggedIn(stderr))
        } else {
            Err(AzureError::Cli(stderr))
        }
    }
}

#[async_trait]
impl SessionProvider for AzureCliSession {
    async fn current_subscription_id(&self) -> azcost_cost::Result<String> {
        let account = self.account().await?;
        info!(subscription = %account.name, "using Azure CLI session");
        Ok(account.id)
    }
}

#[async_trait]
impl AccessTokenProvider for AzureCliSession {
    async fn access_token(&self) -> Result<String> {
        let mut args = vec!["account", "get-access-token", "--output", "json", "--resource"];
        args.push(self.resource.as_str());
        if let Some(id) = &self.subscription_id {
            args.extend(["--subscription", id.as_str()]);
        }
        let stdout = self.run(&args).await?;
        let token: AccessTokenResponse = serde_json::from_slice(&stdout)?;
        Ok(token.access_token)
    }

    fn kind(&self) -> &'static str {
        "azure-cli"
    }
}

/// Session with a fixed subscription and token.
#[derive(Clone)]
pub struct StaticSession {
    subscription_id: String,
    access_token: String,
}

impl std::fmt::Debug for StaticSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSession")
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl StaticSession {
    pub fn new(subscription_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Build from the environment, if both variables are set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let subscription_id = lookup(SUBSCRIPTION_ENV).filter(|v| !v.trim().is_empty())?;
        let access_token = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty())?;
        Some(Self::new(subscription_id.trim(), access_token.trim()))
    }

    /// Use a different subscription with the same token.
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = subscription_id.into();
        self
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_subscription_id(&self) -> azcost_cost::Result<String> {
        Ok(self.subscription_id.clone())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticSession {
    async fn access_token(&self) -> Result<String> {
        Ok(self.access_token.clone())
    }

    fn kind(&self) -> &'static str {
        "environment"
    }
}

/// Pick a session: environment variables first, then the Azure CLI.
///
/// `subscription_id` overrides whatever subscription the session defaults to.
pub fn detect_session(
    endpoint: &str,
    subscription_id: Option<&str>,
) -> Box<dyn AccessTokenProvider> {
    if let Some(session) = StaticSession::from_env() {
        return match subscription_id {
            Some(id) => Box::new(session.with_subscription_id(id)),
            None => Box::new(session),
        };
    }

    let session = AzureCliSession::new(endpoint);
    match subscription_id {
        Some(id) => Box::new(session.with_subscription_id(id)),
        None => Box::new(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcost_cost::CostError;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_cli_session_defaults_to_configured_endpoint() {
        let session = AzureCliSession::default();
        assert_eq!(session.resource, azcost_config::AzcostConfig::default().management_endpoint);
    }

    #[test]
    fn test_static_session_from_lookup() {
        let session = StaticSession::from_lookup(lookup(&[
            (SUBSCRIPTION_ENV, " abc "),
            (ACCESS_TOKEN_ENV, "tok"),
        ]))
        .unwrap();
        assert_eq!(session.subscription_id, "abc");
        assert_eq!(session.access_token, "tok");
    }

    #[test]
    fn test_static_session_requires_both_values() {
        assert!(StaticSession::from_lookup(lookup(&[(SUBSCRIPTION_ENV, "abc")])).is_none());
        assert!(
            StaticSession::from_lookup(lookup(&[(SUBSCRIPTION_ENV, "abc"), (ACCESS_TOKEN_ENV, "")]))
                .is_none()
        );
    }

    #[test]
    fn test_static_session_debug_hides_token() {
        let debug = format!("{:?}", StaticSession::new("abc", "secret-token"));
        assert!(!debug.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_static_session_provides_identity() {
        let session = StaticSession::new("abc", "tok").with_subscription_id("def");
        assert_eq!(session.current_subscription_id().await.unwrap(), "def");
        assert_eq!(session.access_token().await.unwrap(), "tok");
        assert_eq!(session.kind(), "environment");
    }

    #[tokio::test]
    async fn test_missing_cli_is_a_session_error() {
        let session = AzureCliSession::default().with_program("azcost-no-such-az-binary");
        let err = session.current_subscription_id().await.unwrap_err();
        assert!(matches!(err, CostError::Session(msg) if msg.contains("not found")));
    }
}
