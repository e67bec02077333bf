//! Domain error types.
//!
//! Nothing inside the simulation core fails; these errors come from the
//! collaborators around it (ingestion, configuration, report output).

/// Top-level error type for crossbt.
#[derive(Debug, thiserror::Error)]
pub enum CrossbtError {
    #[error("cannot open data source {path}: {reason}")]
    DataSource { path: String, reason: String },

    #[error("no price bars found in {path}")]
    EmptyData { path: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to write report {path}: {reason}")]
    Report { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrossbtError {
    /// Process exit status for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            CrossbtError::Io(_) | CrossbtError::DataSource { .. } => 1,
            CrossbtError::ConfigParse { .. } | CrossbtError::ConfigInvalid { .. } => 2,
            CrossbtError::EmptyData { .. } => 5,
            CrossbtError::Report { .. } => 6,
        }
    }
}

impl From<&CrossbtError> for std::process::ExitCode {
    fn from(err: &CrossbtError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_data_source() {
        let err = CrossbtError::DataSource {
            path: "data/AAPL.csv".into(),
            reason: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot open data source data/AAPL.csv: No such file or directory"
        );
    }

    #[test]
    fn display_config_invalid() {
        let err = CrossbtError::ConfigInvalid {
            section: "strategy".into(),
            key: "long_period".into(),
            reason: "long_period must be greater than short_period".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] long_period: long_period must be greater than short_period"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        let io = CrossbtError::Io(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), 1);

        let cfg = CrossbtError::ConfigParse {
            file: "x.ini".into(),
            reason: "bad".into(),
        };
        assert_eq!(cfg.exit_code(), 2);

        let empty = CrossbtError::EmptyData {
            path: "x.csv".into(),
        };
        assert_eq!(empty.exit_code(), 5);

        let report = CrossbtError::Report {
            path: "out.csv".into(),
            reason: "denied".into(),
        };
        assert_eq!(report.exit_code(), 6);
    }
}
