//! Country-code assignment over a frame.

use std::collections::BTreeSet;

use cardio_common::{ColumnData, set_column, text_values};
use cardio_model::{COUNTRY, COUNTRY_CODE};
use cardio_standards::CountryCodeResolver;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::rows::filter_rows;

/// Outcome of [`assign_country_codes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeStats {
    /// Rows whose source code was already known.
    pub by_code: usize,
    /// Rows resolved from the country name.
    pub by_name: usize,
    /// Rows dropped because neither code nor name resolved.
    pub unresolved: usize,
    pub unresolved_names: BTreeSet<String>,
}

impl CodeStats {
    pub fn resolved(&self) -> usize {
        self.by_code + self.by_name
    }
}

/// Sets `Country_Code` for every row and rewrites `Country` to the canonical
/// display name of that code.
///
/// A source code is kept when the resolver knows it; otherwise the code is
/// resolved from `Country`. Rows that resolve neither way are dropped, so no
/// row leaves with a null key.
pub fn assign_country_codes(
    df: &DataFrame,
    resolver: &CountryCodeResolver,
) -> Result<(DataFrame, CodeStats)> {
    if df.column(COUNTRY).is_err() {
        return Err(TransformError::MissingColumn {
            column: COUNTRY.to_string(),
        });
    }
    let names = text_values(df, COUNTRY)?;
    let source_codes = if df.column(COUNTRY_CODE).is_ok() {
        text_values(df, COUNTRY_CODE)?
    } else {
        vec![None; df.height()]
    };

    let mut stats = CodeStats::default();
    let mut keep = Vec::with_capacity(df.height());
    let mut codes = Vec::with_capacity(df.height());
    let mut display = Vec::with_capacity(df.height());

    for (name, source_code) in names.iter().zip(&source_codes) {
        let known = source_code
            .as_deref()
            .map(str::trim)
            .filter(|code| resolver.display_name(code).is_some())
            .map(str::to_ascii_uppercase);
        let code = match known {
            Some(code) => {
                stats.by_code += 1;
                Some(code)
            }
            None => {
                let resolved = name.as_deref().and_then(|n| resolver.resolve(n));
                if resolved.is_some() {
                    stats.by_name += 1;
                }
                resolved.map(str::to_string)
            }
        };
        match code {
            Some(code) => {
                let canonical = resolver
                    .display_name(&code)
                    .map(str::to_string)
                    .or_else(|| name.clone());
                keep.push(true);
                display.push(canonical);
                codes.push(Some(code));
            }
            None => {
                stats.unresolved += 1;
                if let Some(name) = name {
                    stats.unresolved_names.insert(name.trim().to_string());
                }
                keep.push(false);
                display.push(None);
                codes.push(None);
            }
        }
    }

    let mut out = df.clone();
    set_column(&mut out, COUNTRY, ColumnData::Text(display))?;
    set_column(&mut out, COUNTRY_CODE, ColumnData::Text(codes))?;
    let out = if stats.unresolved > 0 {
        filter_rows(&out, &keep)?
    } else {
        out
    };

    for name in &stats.unresolved_names {
        debug!(name = %name, "dropping rows for unresolved country");
    }
    info!(
        by_code = stats.by_code,
        by_name = stats.by_name,
        unresolved = stats.unresolved,
        "country codes assigned"
    );
    Ok((out, stats))
}

/// Keeps rows whose `column` holds a code from the ISO registry.
pub fn keep_registry_codes(
    df: &DataFrame,
    column: &str,
    resolver: &CountryCodeResolver,
) -> Result<(DataFrame, usize)> {
    if df.column(column).is_err() {
        return Err(TransformError::MissingColumn {
            column: column.to_string(),
        });
    }
    let keep: Vec<bool> = text_values(df, column)?
        .iter()
        .map(|code| code.as_deref().is_some_and(|c| resolver.is_registry_code(c)))
        .collect();
    let removed = keep.iter().filter(|k| !**k).count();
    Ok((filter_rows(df, &keep)?, removed))
}
