use std::fmt;

/// Line prefix classifying how serious an outcome is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Skip,
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Skip => "SKIP",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Outcome of checking a single branch, rendered as one line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchStatus {
    /// The repository URL is not hosted on GitHub.
    Skipped { repository: String },
    /// Travis does not build this repository.
    IntegrationInactive { docs_url: String },
    Failed { build_url: String },
    Canceled { build_url: String },
    /// Any other state reported for the latest build.
    Passed { state: String, build_url: String },
    /// No build state was reported, usually because the branch does not exist.
    Unknown { slug: String, branch: String },
}

impl BranchStatus {
    pub fn from_state(state: &str, build_url: String) -> Self {
        match state {
            "failed" => Self::Failed { build_url },
            "canceled" => Self::Canceled { build_url },
            _ => Self::Passed {
                state: state.to_string(),
                build_url,
            },
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Skipped { .. } => Severity::Skip,
            Self::IntegrationInactive { .. } | Self::Canceled { .. } => Severity::Warning,
            Self::Failed { .. } => Severity::Error,
            Self::Passed { .. } | Self::Unknown { .. } => Severity::Ok,
        }
    }

    /// Every classified outcome exits successfully unless `fail_on_error` is
    /// set, in which case a failed build exits with 1.
    pub fn exit_code(&self, fail_on_error: bool) -> u8 {
        u8::from(fail_on_error && self.severity() == Severity::Error)
    }
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = self.severity();
        match self {
            Self::Skipped { repository } => {
                write!(f, "{severity}: Skipping checks. {repository} Not a github repo.")
            }
            Self::IntegrationInactive { docs_url } => {
                write!(f, "{severity}: Travis integration not setup. See {docs_url}")
            }
            Self::Failed { build_url } => write!(f, "{severity}: Build failed, see {build_url}"),
            Self::Canceled { build_url } => {
                write!(f, "{severity}: Build canceled, see {build_url}")
            }
            Self::Passed { state, build_url } => {
                write!(f, "{severity}: Build status was {state}, see {build_url}")
            }
            Self::Unknown { slug, branch } => {
                write!(f, "{severity}: Unknown state of {slug}/{branch}")
            }
        }
    }
}
