use cardio_common::{ColumnData, column_names, frame_from_columns};
use polars::prelude::*;

use crate::error::Result;
use crate::keys::key_columns;

/// Unpivots every non-id column into `(var_name, value_name)` pairs.
///
/// Rows are emitted column by column, so all rows for the first value column
/// come first. Values are rendered as text for later typing.
pub fn melt(df: &DataFrame, id_vars: &[&str], var_name: &str, value_name: &str) -> Result<DataFrame> {
    let ids = key_columns(df, id_vars)?;
    let value_vars: Vec<String> = column_names(df)
        .into_iter()
        .filter(|name| !id_vars.contains(&name.as_str()))
        .collect();
    let value_refs: Vec<&str> = value_vars.iter().map(String::as_str).collect();
    let values = key_columns(df, &value_refs)?;

    let height = df.height();
    let repeated: Vec<Option<usize>> = (0..value_vars.len())
        .flat_map(|_| (0..height).map(Some))
        .collect();

    let mut columns: Vec<(String, ColumnData)> = id_vars
        .iter()
        .zip(&ids)
        .map(|(name, data)| ((*name).to_string(), data.gather(&repeated)))
        .collect();

    let mut vars = Vec::with_capacity(repeated.len());
    let mut cells = Vec::with_capacity(repeated.len());
    for (name, data) in value_vars.iter().zip(&values) {
        for idx in 0..height {
            vars.push(Some(name.clone()));
            cells.push((!data.is_null(idx)).then(|| data.key_part(idx)));
        }
    }
    columns.push((var_name.to_string(), ColumnData::Text(vars)));
    columns.push((value_name.to_string(), ColumnData::Text(cells)));

    Ok(frame_from_columns(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_common::text_values;

    #[test]
    fn wide_year_columns_become_rows() {
        let wide = df! {
            "Location" => ["France", "Spain"],
            "Code" => ["FRA", "ESP"],
            "2000" => [Some("11.5"), None],
            "2001" => ["11.2", "10.0"],
        }
        .unwrap();

        let long = melt(&wide, &["Location", "Code"], "Year", "Alcohol_Value").unwrap();

        assert_eq!(long.height(), 4);
        assert_eq!(
            text_values(&long, "Location").unwrap(),
            vec![
                Some("France".into()),
                Some("Spain".into()),
                Some("France".into()),
                Some("Spain".into())
            ]
        );
        assert_eq!(
            text_values(&long, "Year").unwrap(),
            vec![
                Some("2000".into()),
                Some("2000".into()),
                Some("2001".into()),
                Some("2001".into())
            ]
        );
        assert_eq!(
            text_values(&long, "Alcohol_Value").unwrap(),
            vec![Some("11.5".into()), None, Some("11.2".into()), Some("10.0".into())]
        );
    }
}
