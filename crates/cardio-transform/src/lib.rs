//! Frame operations for the analytic dataset pipeline.
//!
//! - **frame**: [`SourceFrame`], a cleaned frame with its key columns and provenance
//! - **keys**: composite keys, uniqueness assertion, exact-duplicate removal
//! - **join**: key-coalescing outer and left joins with cardinality checks
//! - **codes**: country-code assignment over a frame
//! - **placeholders**: synthesized rows for uncovered years
//! - **fill**: regional fallback and keyed lookup fills
//! - **region**: derived `Region` column
//! - **typing**: explicit numeric typing of all-text source frames

pub mod codes;
pub mod error;
pub mod fill;
pub mod filter;
pub mod frame;
pub mod join;
pub mod keys;
pub mod melt;
pub mod placeholders;
pub mod region;
pub mod rows;
pub mod sanity;
pub mod sort;
pub mod typing;

pub use codes::{CodeStats, assign_country_codes, keep_registry_codes};
pub use error::{Result, TransformError};
pub use fill::{fill_from_lookup, fill_from_regions};
pub use filter::{drop_excluded, drop_null, drop_years, keep_equal};
pub use frame::{SourceFrame, SourceFrameMeta};
pub use join::{left_join, outer_join};
pub use keys::{assert_unique_keys, composite_keys, dedupe_exact};
pub use melt::melt;
pub use placeholders::add_missing_years;
pub use region::add_region_column;
pub use sanity::mask_negative;
pub use sort::sort_rows;
pub use typing::{MISSING_MARKERS, parse_float_columns, parse_gender_column, parse_int_column};
