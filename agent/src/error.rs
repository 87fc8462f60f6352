//! Error types for the agent.

use std::path::PathBuf;

/// All errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("settings error: {0}")]
    Settings(String),

    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("failed to read positions export {path}: {source}")]
    ExportRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] allocheck::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit code for a failed command: `2` when the export holds no
/// value, `1` for every other input or configuration problem.
pub fn exit_code(err: &Error) -> i32 {
    match err {
        Error::Pipeline(allocheck::Error::ZeroPortfolio { .. }) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn empty_portfolio_exits_two() {
        let err = Error::Pipeline(allocheck::Error::ZeroPortfolio { total: 0.0 });
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn input_errors_exit_one() {
        let errors = [
            Error::Settings("bad".into()),
            Error::ExportRead {
                path: "positions.csv".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            Error::Pipeline(allocheck::Error::HeaderNotFound {
                expected: "Symbol,",
                format: "fidelity",
            }),
            Error::Pipeline(allocheck::Error::Policy("bad range".into())),
            Error::Pipeline(allocheck::Error::UnknownFormat("schwab".into())),
        ];
        for err in &errors {
            assert_eq!(exit_code(err), 1, "{err}");
        }
    }

    #[test]
    fn pipeline_message_passes_through() {
        let err = Error::Pipeline(allocheck::Error::ZeroPortfolio { total: 0.0 });
        assert!(err.to_string().starts_with("total portfolio value computed as 0.00"));
    }
}
