//! Process exit codes

use revgraph_core::RevgraphError;

pub const INPUT_DIR_MISSING: i32 = 30;
pub const INPUT_DIR_EMPTY: i32 = 35;
pub const INVALID_LIMIT: i32 = 40;
pub const BATCH_WRITE: i32 = 50;
pub const BATCH_MISSING: i32 = 110;
pub const BATCH_UNREADABLE: i32 = 114;
pub const LOAD_FAILED: i32 = 120;
pub const BACKEND_UNREACHABLE: i32 = 9050;
pub const CONFIG: i32 = 2;
pub const OTHER: i32 = 1;

/// Exit code for a fatal pipeline error
pub fn exit_code(err: &RevgraphError) -> i32 {
    match err {
        RevgraphError::InputDirMissing(_) => INPUT_DIR_MISSING,
        RevgraphError::InputDirEmpty(_) => INPUT_DIR_EMPTY,
        RevgraphError::InvalidLimit { .. } => INVALID_LIMIT,
        RevgraphError::BatchWrite { .. } => BATCH_WRITE,
        RevgraphError::BatchMissing(_) => BATCH_MISSING,
        RevgraphError::BatchRead { .. } | RevgraphError::BatchFormat { .. } => BATCH_UNREADABLE,
        RevgraphError::Clear { .. }
        | RevgraphError::Transaction { .. }
        | RevgraphError::CommitTimeout(_) => LOAD_FAILED,
        RevgraphError::Backend(_) => BACKEND_UNREACHABLE,
        RevgraphError::Config(_) | RevgraphError::InvalidInput(_) => CONFIG,
        _ => OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revgraph_core::{ConfigError, ReviewRecord};
    use std::path::PathBuf;

    #[test]
    fn test_codes_per_failure_class() {
        assert_eq!(exit_code(&RevgraphError::InputDirMissing(PathBuf::from("inData"))), 30);
        assert_eq!(exit_code(&RevgraphError::InputDirEmpty(PathBuf::from("inData"))), 35);
        assert_eq!(
            exit_code(&RevgraphError::InvalidLimit {
                limit: 0,
                available: 3
            }),
            40
        );
        assert_eq!(exit_code(&RevgraphError::BatchMissing(PathBuf::from("b.json"))), 110);
        assert_eq!(exit_code(&RevgraphError::Backend("refused".to_string())), 9050);
        assert_eq!(
            exit_code(&RevgraphError::Config(ConfigError::InvalidValue {
                key: "REVGRAPH_EDGE_POLICY".to_string(),
                value: "sometimes".to_string(),
            })),
            2
        );
    }

    #[test]
    fn test_load_failures_share_a_code() {
        let inner = || Box::new(RevgraphError::Backend("conflict".to_string()));
        assert_eq!(exit_code(&RevgraphError::Clear { source: inner() }), 120);
        assert_eq!(
            exit_code(&RevgraphError::Transaction {
                index: 0,
                record: Box::new(ReviewRecord::new("f0001", "")),
                source: inner(),
            }),
            120
        );
    }
}
