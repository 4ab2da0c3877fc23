//! Vault client backed by the 1Password `op` CLI
//!
//! Each call spawns one `op` process and waits for it to exit. Failures are
//! classified from stderr:
//! - TLS handshake timeouts are retried under the configured [`RetryPolicy`]
//! - "not signed in" becomes [`CheckError::NotSignedIn`]
//! - anything else becomes [`CheckError::CommandFailed`] with the log prefix stripped

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::CheckerConfig;
use crate::error::{CheckError, CheckResult};
use crate::models::RawRecord;
use crate::retry::RetryPolicy;

const TLS_TIMEOUT_MARKER: &str = "TLS handshake timeout";
const NOT_SIGNED_IN_MARKER: &str = "You are not currently signed in";

/// Source of raw vault items
#[allow(async_fn_in_trait)]
pub trait VaultCli {
    /// List all items in `vault` (overview data only)
    async fn list_items(&self, vault: &str) -> CheckResult<Vec<RawRecord>>;

    /// Fetch one item with its details
    async fn get_item(&self, uuid: &str) -> CheckResult<RawRecord>;
}

/// How a failed `op` invocation should be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Transient,
    NotSignedIn,
    Other(String),
}

/// Classify the stderr of a failed `op` invocation
pub fn classify_failure(stderr: &str) -> Failure {
    if stderr.contains(TLS_TIMEOUT_MARKER) {
        Failure::Transient
    } else if stderr.contains(NOT_SIGNED_IN_MARKER) {
        Failure::NotSignedIn
    } else {
        Failure::Other(trim_error_message(stderr))
    }
}

/// Drop the `[LEVEL] date time` prefix `op` puts in front of its messages
pub fn trim_error_message(stderr: &str) -> String {
    stderr
        .split(' ')
        .skip(3)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// `op` subprocess client
#[derive(Debug, Clone)]
pub struct OpClient {
    binary: PathBuf,
    retry: RetryPolicy,
}

impl OpClient {
    pub fn new(binary: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            binary: binary.into(),
            retry,
        }
    }

    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(config.op_binary.clone(), config.retry.clone())
    }

    /// Interactive `op signin <url> <username>` using the caller's terminal
    pub async fn signin(&self, url: &str, username: &str) -> CheckResult<()> {
        debug!("Running {} signin {} {}", self.binary.display(), url, username);

        let status = Command::new(&self.binary)
            .args(["signin", url, username])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(CheckError::Spawn)?;

        if !status.success() {
            return Err(CheckError::CommandFailed(format!(
                "op signin exited with {}",
                status
            )));
        }
        Ok(())
    }

    /// Run `op` with `args` and return its stdout
    async fn run(&self, args: &[&str]) -> CheckResult<String> {
        let mut attempt = 0;
        loop {
            debug!("Running {} {}", self.binary.display(), args.join(" "));

            let output = Command::new(&self.binary)
                .args(args)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(CheckError::Spawn)?;

            if output.status.success() {
                return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            match classify_failure(&stderr) {
                Failure::Transient => {
                    if !self.retry.should_retry(attempt) {
                        return Err(CheckError::RetriesExhausted {
                            attempts: attempt + 1,
                            message: trim_error_message(&stderr),
                        });
                    }
                    let delay = self.retry.calculate_delay(attempt);
                    warn!(
                        "TLS handshake timeout from op (attempt {}), retrying in {:?}",
                        attempt + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Failure::NotSignedIn => return Err(CheckError::NotSignedIn),
                Failure::Other(message) => return Err(CheckError::CommandFailed(message)),
            }
        }
    }
}

impl VaultCli for OpClient {
    async fn list_items(&self, vault: &str) -> CheckResult<Vec<RawRecord>> {
        let stdout = self.run(&["list", "items", "--vault", vault]).await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    async fn get_item(&self, uuid: &str) -> CheckResult<RawRecord> {
        let stdout = self.run(&["get", "item", uuid]).await?;
        Ok(serde_json::from_str(&stdout)?)
    }
}
