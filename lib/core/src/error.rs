//! Error handling foundation for flowgate.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error enums in its own
//! error module and reports them through `Report<C>`.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ParseIdError, WorkflowId};

    #[test]
    fn report_keeps_typed_context() {
        let parsed: Result<WorkflowId, ParseIdError> =
            "wf_not-a-ulid".parse::<WorkflowId>().map_err(Report::from);

        let report = parsed.expect_err("invalid id");
        assert_eq!(report.current_context().id_type, "WorkflowId");
    }
}
