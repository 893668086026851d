//! Cleaner tests over small in-memory sources and the shipped standards.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use cardio_clean::error::CleanError;
use cardio_clean::{
    ActivityObesityGdpCleaner, CleanContext, DiabetesAlcoholCleaner, DiseaseMetricsCleaner,
    OverweightHealthCleaner, SourceCleaner,
};
use cardio_common::{column_names, float_values, int_values, text_values};
use cardio_standards::StandardsRegistry;
use cardio_transform::TransformError;
use polars::prelude::*;

fn registry() -> &'static StandardsRegistry {
    static REGISTRY: OnceLock<StandardsRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards");
        StandardsRegistry::verify_and_load(&dir)
            .expect("shipped standards verify")
            .0
    })
}

/// Index of the row with the given code, year and (when the frame has one)
/// gender.
fn row(df: &DataFrame, code: &str, year: i64, gender: Option<&str>) -> usize {
    let codes = text_values(df, "Country_Code").unwrap();
    let years = int_values(df, "Year").unwrap();
    let genders = if df.column("Gender").is_ok() {
        text_values(df, "Gender").unwrap()
    } else {
        vec![None; df.height()]
    };
    (0..df.height())
        .find(|&i| {
            codes[i].as_deref() == Some(code)
                && years[i] == Some(year)
                && genders[i].as_deref() == gender
        })
        .unwrap_or_else(|| panic!("no row for {code} {year} {gender:?}"))
}

fn dropped(frame: &cardio_transform::SourceFrame, reason: &str) -> usize {
    frame
        .meta
        .as_ref()
        .and_then(|meta| meta.dropped_rows.get(reason).copied())
        .unwrap_or(0)
}

// ============================================================================
// Activity / obesity / GDP
// ============================================================================

fn gho_sheet(rows: &[(&str, &str, &str, &str)]) -> DataFrame {
    df! {
        "Location" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "SpatialDimValueCode" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "Period" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "FactValueNumeric" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
    }
    .unwrap()
}

#[test]
fn activity_obesity_gdp_are_joined_masked_and_imputed() {
    let activity = gho_sheet(&[
        ("France", "FRA", "2000", "30.0"),
        ("France", "FRA", "2000", "30.0"),
        ("Germany", "DEU", "2000", "25.0"),
        ("World", "GLOBAL", "2000", "28.0"),
    ]);
    let obesity = gho_sheet(&[
        ("France", "FRA", "2000", "20"),
        ("France", "FRA", "2001", "21"),
        ("Germany", "DEU", "2001", "22"),
    ]);
    let gdp = df! {
        "Entity" => ["France", "France", "Germany", "Germany", "Europe and Central Asia"],
        "Code" => ["FRA", "FRA", "DEU", "DEU", ""],
        "Year" => ["2000", "2001", "2000", "2001", "2000"],
        "GDP per capita, PPP (constant 2017 international $)" =>
            ["40000", "-100", "45000", "46000", "30000"],
    }
    .unwrap();

    let cleaner = ActivityObesityGdpCleaner::in_dir(Path::new("data"));
    let ctx = CleanContext::new(registry());
    let frame = cleaner.clean_frames(&ctx, &activity, &obesity, &gdp).unwrap();
    let df = &frame.data;

    assert_eq!(frame.name, "activity_obesity_gdp");
    assert_eq!(frame.key_columns, ["Country_Code", "Year"]);
    assert_eq!(df.height(), 4);
    assert_eq!(dropped(&frame, "exact duplicate"), 1);
    assert_eq!(dropped(&frame, "aggregate entity"), 1);
    assert_eq!(dropped(&frame, "missing country code"), 1);
    assert_eq!(frame.source_files().len(), 3);

    for column in ["Activity_Prevalence_Rate", "Obesity_Prevalence_Rate", "GDP"] {
        let values = float_values(df, column).unwrap();
        assert!(values.iter().all(Option::is_some), "{column} has gaps");
    }

    // The masked value is estimated from the donors sharing an obesity
    // reading; the other donor has no comparable coordinate.
    let gdp = float_values(df, "GDP").unwrap();
    let fra_2001 = row(df, "FRA", 2001, None);
    assert!((gdp[fra_2001].unwrap() - 43_000.0).abs() < 1e-9);
    assert!(gdp.iter().flatten().all(|v| *v >= 0.0));

    let countries = text_values(df, "Country").unwrap();
    assert_eq!(countries[row(df, "DEU", 2000, None)].as_deref(), Some("Germany"));
}

#[test]
fn gho_sheet_without_fact_column_is_fatal() {
    let activity = df! { "Location" => ["France"], "Period" => ["2000"] }.unwrap();
    let obesity = gho_sheet(&[("France", "FRA", "2000", "20")]);
    let gdp = df! {
        "Entity" => ["France"],
        "Code" => ["FRA"],
        "Year" => ["2000"],
        "GDP per capita, PPP (constant 2017 international $)" => ["40000"],
    }
    .unwrap();

    let cleaner = ActivityObesityGdpCleaner::in_dir(Path::new("data"));
    let err = cleaner
        .clean_frames(&CleanContext::new(registry()), &activity, &obesity, &gdp)
        .unwrap_err();
    assert!(matches!(err, CleanError::Ingest(_)));
    assert_eq!(
        err.path(),
        Some(Path::new("data/insufficient_physical_activity_data.xlsx"))
    );
}

// ============================================================================
// Disease metrics
// ============================================================================

fn gbd_frame(rows: &[(&str, &str, &str, &str)]) -> DataFrame {
    df! {
        "location_name" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "sex_name" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "age_name" => vec!["All ages"; rows.len()],
        "year" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "val" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
    }
    .unwrap()
}

#[test]
fn disease_rates_are_joined_and_gap_filled() {
    let mut incidence = gbd_frame(&[
        ("France", "Male", "2000", "10"),
        ("France", "Female", "2000", "11"),
        ("France", "Male", "2001", "12"),
        ("Global", "Male", "2000", "50"),
        ("France", "Male", "2000", "99999"),
    ]);
    incidence
        .with_column(Column::new(
            "metric_name".into(),
            ["Rate", "Rate", "Rate", "Rate", "Number"],
        ))
        .unwrap();
    let mortality = gbd_frame(&[
        ("France", "Male", "2000", "5"),
        ("France", "Female", "2000", "5"),
        ("Global", "Male", "2000", "5"),
    ]);
    let prevalence = gbd_frame(&[
        ("France", "Male", "2000", "100"),
        ("France", "Female", "2000", "110"),
        ("France", "Male", "2001", "120"),
        ("Global", "Male", "2000", "500"),
    ]);

    let cleaner = DiseaseMetricsCleaner::in_dir(Path::new("data"));
    let ctx = CleanContext::new(registry());
    let frame = cleaner
        .clean_frames(&ctx, &incidence, &mortality, &prevalence)
        .unwrap();
    let df = &frame.data;

    assert_eq!(df.height(), 3);
    assert_eq!(dropped(&frame, "non-rate measure"), 1);
    assert_eq!(dropped(&frame, "aggregate entity"), 1);

    let incidence = float_values(df, "IncidenceRate").unwrap();
    assert_eq!(incidence[row(df, "FRA", 2000, Some("Male"))], Some(10.0));

    let mortality = float_values(df, "MortalityRate").unwrap();
    let filled = mortality[row(df, "FRA", 2001, Some("Male"))].unwrap();
    assert!((filled - 5.0).abs() < 1e-9);

    let genders = text_values(df, "Gender").unwrap();
    assert!(genders.iter().flatten().all(|g| g == "Male" || g == "Female"));
}

#[test]
fn unknown_sex_label_names_the_file() {
    let incidence = gbd_frame(&[("France", "Unknown", "2000", "10")]);
    let other = gbd_frame(&[("France", "Male", "2000", "5")]);

    let cleaner = DiseaseMetricsCleaner::in_dir(Path::new("data"));
    let err = cleaner
        .clean_frames(&CleanContext::new(registry()), &incidence, &other, &other)
        .unwrap_err();
    assert!(matches!(
        err,
        CleanError::Transform {
            source: TransformError::InvalidValue { .. },
            ..
        }
    ));
    assert_eq!(err.path(), Some(Path::new("data/GBD_INCIDENCE.csv")));
}

#[test]
fn disease_cleaner_loads_csv_sources() {
    let dir = tempfile::tempdir().unwrap();
    let header = "location_name,sex_name,age_name,year,val\n";
    let files = [
        ("GBD_INCIDENCE.csv", "France,Male,All ages,2000,10\nJapan,Female,All ages,2000,8\n"),
        (
            "GBD_MORTALITY-DEATHS.csv",
            "France,Male,All ages,2000,3\nFrance,Female,All ages,2000,3\n",
        ),
        ("GBD_PREVALENCE.csv", "France,Male,All ages,2000,90\n"),
    ];
    for (name, rows) in files {
        fs::write(dir.path().join(name), format!("{header}{rows}")).unwrap();
    }

    let cleaner = DiseaseMetricsCleaner::in_dir(dir.path());
    assert_eq!(cleaner.inputs().len(), 3);
    let frame = cleaner.clean(&CleanContext::new(registry())).unwrap();

    assert_eq!(frame.record_count(), 3);
    assert_eq!(
        column_names(&frame.data),
        [
            "Country",
            "Gender",
            "Age_Group",
            "Year",
            "IncidenceRate",
            "MortalityRate",
            "PrevalenceRate",
            "Country_Code",
        ]
    );
    let japan = row(&frame.data, "JPN", 2000, Some("Female"));
    let mortality = float_values(&frame.data, "MortalityRate").unwrap();
    assert!((mortality[japan].unwrap() - 3.0).abs() < 1e-9);
}

// ============================================================================
// Diabetes / alcohol
// ============================================================================

#[test]
fn diabetes_placeholders_and_alcohol_fallbacks() {
    let diabetes = df! {
        "Country/Region/World" => ["France", "France", "France", "France", "World"],
        "ISO" => ["FRA", "FRA", "FRA", "FRA", ""],
        "Sex" => ["Men", "Men", "Women", "Women", "Men"],
        "Year" => ["1990", "1991", "1990", "1991", "1990"],
        "Prevalence of diabetes (18+ years)" => ["5.0", "5.5", "4.0", "4.2", "8.0"],
    }
    .unwrap();
    let alcohol = df! {
        "Location" => ["France", "Europe", "Monaco"],
        "Code" => ["FRA", "", "MCO"],
        "1990" => ["12.0", "10.0", ""],
        "1991" => ["", "10.5", ""],
    }
    .unwrap();

    let cleaner = DiabetesAlcoholCleaner::in_dir(Path::new("data"));
    let ctx = CleanContext::new(registry()).with_placeholder_years(1988..=1989);
    let frame = cleaner.clean_frames(&ctx, &diabetes, &alcohol).unwrap();
    let df = &frame.data;

    // Two sexes over four years for France, plus Monaco's alcohol-only rows.
    assert_eq!(df.height(), 10);
    // World from diabetes, Europe's two melted years from alcohol.
    assert_eq!(dropped(&frame, "aggregate entity"), 3);

    let diabetes = float_values(df, "Diabetes_Prevalence_Rate").unwrap();
    let men_1988 = diabetes[row(df, "FRA", 1988, Some("Male"))].unwrap();
    assert!((men_1988 - 4.0).abs() < 1e-9);
    for gender in ["Male", "Female"] {
        for year in 1988..=1991 {
            assert!(diabetes[row(df, "FRA", year, Some(gender))].is_some());
        }
    }

    let alcohol = float_values(df, "Alcohol_Value").unwrap();
    assert_eq!(alcohol[row(df, "MCO", 1990, None)], Some(10.0));
    assert_eq!(alcohol[row(df, "MCO", 1991, None)], Some(10.5));
    assert_eq!(alcohol[row(df, "FRA", 1990, Some("Female"))], Some(12.0));
    assert!(alcohol[row(df, "FRA", 1988, Some("Male"))].is_some());
}

// ============================================================================
// Overweight / health
// ============================================================================

#[test]
fn overweight_rows_take_health_and_supplemental_life_expectancy() {
    let overweight = df! {
        "Location" => ["France", "France", "France", "France", "Germany"],
        "SpatialDimValueCode" => ["FRA", "FRA", "FRA", "FRA", "DEU"],
        "Period" => ["2000", "2000", "2001", "2002", "2000"],
        "Dim1ValueCode" => ["SEX_BTSX", "SEX_MLE", "SEX_BTSX", "SEX_BTSX", "SEX_BTSX"],
        "FactValueNumeric" => ["50", "49", "51", "52", "55"],
    }
    .unwrap();
    let world_health = df! {
        "country" => ["France", "France", "France", "Germany", "Kosovo"],
        "country_code" => ["FRA", "FRA", "FRA", "DEU", "XKX"],
        "year" => ["2000", "2002", "1999", "2000", "2000"],
        "health_exp" => ["10.0", "", "9.0", "11.0", "5.0"],
        "life_expect" => ["79.0", "", "78.0", "", "76.0"],
    }
    .unwrap();
    let life_expectancy = df! {
        "SpatialDimValueCode" => ["FRA", "FRA"],
        "Dim1ValueCode" => ["SEX_BTSX", "SEX_MLE"],
        "FactValueNumeric" => ["81.0", "78.0"],
        "Period" => ["2002", "2002"],
    }
    .unwrap();

    let cleaner = OverweightHealthCleaner::in_dir(Path::new("data"));
    let frame = cleaner
        .clean_frames(
            &CleanContext::new(registry()),
            &overweight,
            &world_health,
            &life_expectancy,
        )
        .unwrap();
    let df = &frame.data;

    assert_eq!(df.height(), 4);
    assert_eq!(dropped(&frame, "sex-specific row"), 2);
    assert_eq!(dropped(&frame, "sparse year"), 1);
    assert_eq!(dropped(&frame, "territory"), 1);

    let overweight = float_values(df, "Overweight_Prevalence").unwrap();
    assert_eq!(overweight[row(df, "FRA", 2000, None)], Some(50.0));

    let life = float_values(df, "Life_Expectancy").unwrap();
    assert_eq!(life[row(df, "FRA", 2002, None)], Some(81.0));
    assert_eq!(life[row(df, "FRA", 2001, None)], Some(80.0));

    let health = float_values(df, "Health_Expenditure").unwrap();
    for year in 2000..=2002 {
        assert_eq!(health[row(df, "FRA", year, None)], Some(10.0));
    }
    assert_eq!(health[row(df, "DEU", 2000, None)], Some(11.0));
}
