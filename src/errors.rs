use thiserror::Error;

// Failures of the disk and OS probes
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed {
        command: &'static str,
        stderr: String,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {what} line: {line:?}")]
    Malformed { what: &'static str, line: String },
}
