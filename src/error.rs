use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Provisioning failed: {0}")]
    #[diagnostic(
        code(warden::provision::failed),
        help("Provisioning is retried by replacement: rerun with the same --name to clean up and recreate")
    )]
    Provision(String),

    #[error("Host control plane commit failed: {0}")]
    #[diagnostic(
        code(warden::host::commit),
        help("Pending pool/endpoint changes were not applied; rerun to retry by replacement")
    )]
    HostCommit(String),

    #[error("Host control plane error: {0}")]
    #[diagnostic(code(warden::host::api))]
    HostApi(String),

    #[error("Endpoint not found: {0}")]
    #[diagnostic(code(warden::endpoint::not_found))]
    EndpointNotFound(String),

    #[error("Warmup failed: {detail}")]
    #[diagnostic(
        code(warden::warmup::failed),
        help("The endpoint was stopped. Check the application logs behind the warmup path")
    )]
    WarmupFailed {
        status: Option<u16>,
        detail: String,
    },

    #[error("Invalid pool identity: {0}")]
    #[diagnostic(
        code(warden::identity::invalid),
        help("Valid identities: ApplicationPoolIdentity, LocalService, LocalSystem, NetworkService")
    )]
    InvalidIdentity(String),

    #[error("Invalid runtime version: {0}")]
    #[diagnostic(
        code(warden::runtime::invalid),
        help("Valid runtime versions: v2.0, v4.0")
    )]
    InvalidRuntime(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::Provision(_) | Error::HostCommit(_) => Some(
                "Rerun with the same --name: provisioning replaces any half-created pool or endpoint"
                    .to_string(),
            ),
            Error::HostApi(_) | Error::Http(_) => Some(
                "Check that the host control plane is reachable (see --host-api / WARDEN_HOST_API)"
                    .to_string(),
            ),
            Error::EndpointNotFound(name) => Some(format!(
                "No endpoint named '{}' exists on the host; provision it first",
                name
            )),
            Error::WarmupFailed { status, .. } => match status {
                Some(code) => Some(format!(
                    "The endpoint answered the warmup request with status {} instead of 200",
                    code
                )),
                None => Some(
                    "The warmup request did not complete; the endpoint may be slow to start or the port unreachable"
                        .to_string(),
                ),
            },
            _ => None,
        }
    }
}

/// Validates and converts a u32 PID to nix::unistd::Pid for a read-only
/// existence check. Returns None for PID 0 (process group) or values that
/// cannot be represented as i32.
pub fn validate_pid_for_check(pid: u32) -> Option<nix::unistd::Pid> {
    if pid == 0 || pid > i32::MAX as u32 {
        return None;
    }
    Some(nix::unistd::Pid::from_raw(pid as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pid_for_check_rejects_zero() {
        assert!(validate_pid_for_check(0).is_none());
    }

    #[test]
    fn test_validate_pid_for_check_rejects_over_i32_max() {
        assert!(validate_pid_for_check(i32::MAX as u32 + 1).is_none());
        assert!(validate_pid_for_check(u32::MAX).is_none());
    }

    #[test]
    fn test_validate_pid_for_check_accepts_normal_pids() {
        assert_eq!(validate_pid_for_check(1234).map(|p| p.as_raw()), Some(1234));
        assert_eq!(
            validate_pid_for_check(i32::MAX as u32).map(|p| p.as_raw()),
            Some(i32::MAX)
        );
    }

    #[test]
    fn test_warmup_suggestion_mentions_status() {
        let err = Error::WarmupFailed {
            status: Some(503),
            detail: "received status 503".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("503"));

        let err = Error::WarmupFailed {
            status: None,
            detail: "timed out".to_string(),
        };
        assert!(err.suggestion().is_some());
    }
}
