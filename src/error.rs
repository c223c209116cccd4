use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Everything that can end a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Bad or missing configuration, detected before the destination is touched.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to launch `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The site generator exited unsuccessfully; the destination is untouched.
    #[error("site generator `{tool}` exited with {status}; destination left untouched")]
    Generator { tool: String, status: ExitStatus },

    #[error("build output {} is missing or empty; destination left untouched", .0.display())]
    EmptyBuild(PathBuf),

    /// A git step failed after the destination had already been replaced.
    #[error(
        "`git {step}` exited with {status}; {} already holds the new build and needs manual attention",
        .destination.display()
    )]
    Vcs {
        step: &'static str,
        status: ExitStatus,
        destination: PathBuf,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PublishError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Generator { .. } | Self::EmptyBuild(_) => 2,
            Self::Vcs { .. } => 3,
            Self::Configuration(_) | Self::Spawn { .. } | Self::Io { .. } => 1,
        }
    }
}

pub type Result<T, E = PublishError> = std::result::Result<T, E>;
