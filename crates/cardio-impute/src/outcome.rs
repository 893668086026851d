use serde::Serialize;

/// What an imputer did to one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImputeOutcome {
    pub column: String,
    pub strategy: &'static str,
    /// Previously missing cells that now hold a value.
    pub filled: usize,
    /// Known cells replaced by a fitted value.
    pub overwritten: usize,
    /// Missing cells left after imputation.
    pub remaining_missing: usize,
    /// Groups left untouched for lack of data.
    pub skipped_groups: usize,
}

impl ImputeOutcome {
    pub(crate) fn new(column: &str, strategy: &'static str) -> Self {
        Self {
            column: column.to_string(),
            strategy,
            ..Self::default()
        }
    }

    /// True when the column was returned unchanged because no group had
    /// enough data.
    pub fn is_skipped(&self) -> bool {
        self.filled == 0 && self.overwritten == 0 && self.skipped_groups > 0
    }
}
