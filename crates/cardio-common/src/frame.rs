//! Typed column extraction and rebuilding.
//!
//! Source files are read as all-text frames and typed explicitly by the
//! cleaners. Row-level operations (joins, group fills, imputation) work on
//! [`ColumnData`] vectors and rebuild a `DataFrame` afterwards.

use polars::prelude::*;

use crate::numeric::{format_numeric, parse_f64, parse_i64};

/// Owned values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
}

impl ColumnData {
    /// Extracts a column, mapping its dtype onto the closest variant.
    ///
    /// Floats lose `NaN` (it becomes `None`); unsupported dtypes are cast to
    /// text.
    pub fn from_column(column: &Column) -> PolarsResult<Self> {
        let dtype = column.dtype().clone();
        if dtype == DataType::String {
            let values = column
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            return Ok(Self::Text(values));
        }
        if dtype == DataType::Null {
            return Ok(Self::Float(vec![None; column.len()]));
        }
        if dtype.is_float() {
            let cast = column.cast(&DataType::Float64)?;
            let values = cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            return Ok(Self::Float(values));
        }
        if dtype.is_integer() {
            let cast = column.cast(&DataType::Int64)?;
            return Ok(Self::Int(cast.i64()?.into_iter().collect()));
        }
        let cast = column.cast(&DataType::String)?;
        let values = cast
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(Self::Text(values))
    }

    /// Builds a null column of the same variant.
    pub fn nulls_like(&self, len: usize) -> Self {
        match self {
            Self::Text(_) => Self::Text(vec![None; len]),
            Self::Float(_) => Self::Float(vec![None; len]),
            Self::Int(_) => Self::Int(vec![None; len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, idx: usize) -> bool {
        match self {
            Self::Text(v) => v.get(idx).is_none_or(|x| x.is_none()),
            Self::Float(v) => v.get(idx).is_none_or(|x| x.is_none()),
            Self::Int(v) => v.get(idx).is_none_or(|x| x.is_none()),
        }
    }

    /// Renders one cell for use in composite keys. Nulls render empty.
    pub fn key_part(&self, idx: usize) -> String {
        match self {
            Self::Text(v) => v.get(idx).cloned().flatten().unwrap_or_default(),
            Self::Float(v) => v
                .get(idx)
                .copied()
                .flatten()
                .map(format_numeric)
                .unwrap_or_default(),
            Self::Int(v) => v
                .get(idx)
                .copied()
                .flatten()
                .map(|x| x.to_string())
                .unwrap_or_default(),
        }
    }

    /// Selects rows by index; `None` yields a null cell.
    pub fn gather(&self, indices: &[Option<usize>]) -> Self {
        fn pick<T: Clone>(values: &[Option<T>], indices: &[Option<usize>]) -> Vec<Option<T>> {
            indices
                .iter()
                .map(|idx| idx.and_then(|i| values.get(i).cloned().flatten()))
                .collect()
        }
        match self {
            Self::Text(v) => Self::Text(pick(v, indices)),
            Self::Float(v) => Self::Float(pick(v, indices)),
            Self::Int(v) => Self::Int(pick(v, indices)),
        }
    }

    /// Fills nulls in `self` from `other` at the same positions.
    ///
    /// Both columns must have the same variant and length; a mismatching
    /// variant leaves `self` untouched.
    pub fn coalesce(&mut self, other: &Self) {
        fn fill<T: Clone>(target: &mut [Option<T>], source: &[Option<T>]) {
            for (slot, value) in target.iter_mut().zip(source) {
                if slot.is_none() {
                    slot.clone_from(value);
                }
            }
        }
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => fill(a, b),
            (Self::Float(a), Self::Float(b)) => fill(a, b),
            (Self::Int(a), Self::Int(b)) => fill(a, b),
            _ => {}
        }
    }

    pub fn into_column(self, name: &str) -> Column {
        match self {
            Self::Text(v) => Series::new(name.into(), v).into_column(),
            Self::Float(v) => Series::new(name.into(), v).into_column(),
            Self::Int(v) => Series::new(name.into(), v).into_column(),
        }
    }
}

/// Reads a column as text. Numeric cells are formatted without trailing
/// zeros, so a `Year` stored as `2000.0` reads back as `"2000"`.
pub fn text_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let data = ColumnData::from_column(df.column(name)?)?;
    Ok(match data {
        ColumnData::Text(values) => values
            .into_iter()
            .map(|v| v.filter(|s| !s.trim().is_empty()))
            .collect(),
        ColumnData::Float(values) => values
            .into_iter()
            .map(|v| v.map(format_numeric))
            .collect(),
        ColumnData::Int(values) => values
            .into_iter()
            .map(|v| v.map(|x| x.to_string()))
            .collect(),
    })
}

/// Reads a column as `f64`, parsing text cells.
pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let data = ColumnData::from_column(df.column(name)?)?;
    Ok(match data {
        ColumnData::Text(values) => values
            .iter()
            .map(|v| v.as_deref().and_then(parse_f64))
            .collect(),
        ColumnData::Float(values) => values,
        ColumnData::Int(values) => values.into_iter().map(|v| v.map(|x| x as f64)).collect(),
    })
}

/// Reads a column as `i64`, parsing text cells. Non-integral floats become
/// `None`.
pub fn int_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let data = ColumnData::from_column(df.column(name)?)?;
    Ok(match data {
        ColumnData::Text(values) => values
            .iter()
            .map(|v| v.as_deref().and_then(parse_i64))
            .collect(),
        ColumnData::Float(values) => values
            .into_iter()
            .map(|v| v.and_then(|x| parse_i64(&format_numeric(x))))
            .collect(),
        ColumnData::Int(values) => values,
    })
}

/// Column names in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Replaces (or appends) a column.
pub fn set_column(df: &mut DataFrame, name: &str, data: ColumnData) -> PolarsResult<()> {
    df.with_column(data.into_column(name))?;
    Ok(())
}

/// Extracts every column in frame order.
pub fn frame_columns(df: &DataFrame) -> PolarsResult<Vec<(String, ColumnData)>> {
    df.get_columns()
        .iter()
        .map(|column| Ok((column.name().to_string(), ColumnData::from_column(column)?)))
        .collect()
}

/// Builds a frame from named columns, preserving order.
pub fn frame_from_columns(columns: Vec<(String, ColumnData)>) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, data)| data.into_column(&name))
        .collect();
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "Country_Code" => ["USA", "FRA", "USA"],
            "Year" => ["2000", "2000.0", "2001"],
            "GDP" => [Some(1.5), None, Some(f64::NAN)],
        }
        .unwrap()
    }

    #[test]
    fn float_values_treat_nan_as_missing() {
        let df = sample();
        assert_eq!(float_values(&df, "GDP").unwrap(), vec![Some(1.5), None, None]);
    }

    #[test]
    fn int_values_accept_integral_floats() {
        let df = sample();
        assert_eq!(
            int_values(&df, "Year").unwrap(),
            vec![Some(2000), Some(2000), Some(2001)]
        );
    }

    #[test]
    fn gather_with_missing_indices_yields_nulls() {
        let data = ColumnData::Text(vec![Some("a".into()), Some("b".into())]);
        let gathered = data.gather(&[Some(1), None, Some(0)]);
        assert_eq!(
            gathered,
            ColumnData::Text(vec![Some("b".into()), None, Some("a".into())])
        );
    }

    #[test]
    fn coalesce_only_fills_gaps() {
        let mut left = ColumnData::Float(vec![Some(1.0), None]);
        left.coalesce(&ColumnData::Float(vec![Some(9.0), Some(2.0)]));
        assert_eq!(left, ColumnData::Float(vec![Some(1.0), Some(2.0)]));
    }

    #[test]
    fn columns_round_trip_through_frame() {
        let df = sample();
        let columns = frame_columns(&df).unwrap();
        let rebuilt = frame_from_columns(columns).unwrap();
        assert_eq!(rebuilt.height(), 3);
        assert_eq!(
            text_values(&rebuilt, "Country_Code").unwrap(),
            vec![Some("USA".into()), Some("FRA".into()), Some("USA".into())]
        );
    }

    #[test]
    fn set_column_replaces_existing_values() {
        let mut df = sample();
        set_column(&mut df, "GDP", ColumnData::Float(vec![Some(1.0); 3])).unwrap();
        assert_eq!(float_values(&df, "GDP").unwrap(), vec![Some(1.0); 3]);
    }
}
