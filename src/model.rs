use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::UnmappedCategories;
use crate::error::DashboardError;
use crate::schema::{category, prepared, raw};

/// The current dropdown values. `None` means nothing has been picked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub crime: Option<String>,
    pub year: Option<String>,
}

impl Selection {
    pub fn new(crime: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            crime: Some(crime.into()),
            year: Some(year.into()),
        }
    }
}

/// Long-form crime table: one row per city, year and crime category.
///
/// Built once from the wide snapshot and never written to afterwards, so it
/// can be shared behind an `Arc` by every request handler.
#[derive(Debug, Clone)]
pub struct CrimeTable {
    frame: DataFrame,
    loaded_at: DateTime<Utc>,
}

impl CrimeTable {
    // ── Data loading ────────────────────────────────────────────────────────

    /// Read a CSV or Parquet snapshot and prepare it.
    ///
    /// Files ending in `.parquet` go through the Parquet reader; anything else
    /// is read as CSV with every column as a string.
    pub fn load(
        path: impl AsRef<Path>,
        unmapped: UnmappedCategories,
    ) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let snapshot = read_source(path)?;
        info!(
            path = %path.display(),
            rows = snapshot.height(),
            columns = snapshot.width(),
            "read raw crime snapshot"
        );
        Self::prepare(snapshot, unmapped)
    }

    /// Turn the wide snapshot into the long table.
    ///
    /// Keeps large-city rows only, emits one row per measure column with the
    /// column's display label in `type_crime`, and renders `year` as text.
    /// Identifying columns other than city, year and large_city may be
    /// missing; they come out as all-null columns. Any frame-level failure
    /// while reshaping is reported as `DataLoad`.
    pub fn prepare(
        snapshot: DataFrame,
        unmapped: UnmappedCategories,
    ) -> Result<Self, DashboardError> {
        Self::reshape(snapshot, unmapped).map_err(|err| match err {
            DashboardError::Polars(e) => {
                DashboardError::DataLoad(format!("preparing crime table: {e}"))
            }
            other => other,
        })
    }

    fn reshape(
        snapshot: DataFrame,
        unmapped: UnmappedCategories,
    ) -> Result<Self, DashboardError> {
        let snapshot = trim_column_names(snapshot)?;
        let columns: Vec<String> = snapshot
            .get_column_names_str()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let text_columns: Vec<String> = snapshot
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String)
            .map(|c| c.name().to_string())
            .collect();
        let has = |name: &str| columns.iter().any(|c| c == name);
        let is_text = |name: &str| text_columns.iter().any(|c| c == name);

        if !has(raw::LARGE_CITY) {
            return Err(DashboardError::Schema(format!(
                "column '{}' is required to select large cities",
                raw::LARGE_CITY
            )));
        }
        for &name in &raw::REQUIRED {
            if !has(name) {
                return Err(DashboardError::DataLoad(format!(
                    "missing required column '{name}'"
                )));
            }
        }

        let measures: Vec<&str> = columns
            .iter()
            .map(String::as_str)
            .filter(|c| !raw::ID_COLUMNS.contains(c))
            .collect();
        if measures.is_empty() {
            return Err(DashboardError::DataLoad(
                "no crime category columns found".to_string(),
            ));
        }
        let labels = measure_labels(&measures, unmapped)?;

        // Coerce every column to its prepared dtype
        let mut parsed: Vec<Expr> = Vec::with_capacity(columns.len() + raw::ID_COLUMNS.len());
        for &name in &raw::TEXT_COLUMNS {
            parsed.push(if has(name) {
                col(name).cast(DataType::String)
            } else {
                lit(NULL).cast(DataType::String).alias(name)
            });
        }
        for &name in &raw::NUMERIC_COLUMNS {
            parsed.push(if name == raw::LARGE_CITY {
                parse_flag(name, is_text(name))
            } else if has(name) {
                parse_float(name, is_text(name))
            } else {
                lit(NULL).cast(DataType::Float64).alias(name)
            });
        }
        parsed.push(parse_float(raw::YEAR, is_text(raw::YEAR)));
        parsed.extend(measures.iter().map(|&m| parse_float(m, is_text(m))));

        let wide = snapshot
            .lazy()
            .with_columns(parsed)
            .filter(col(raw::LARGE_CITY).eq(lit(1.0)))
            .collect()?;

        let bad_years = wide
            .column(raw::YEAR)?
            .f64()?
            .into_iter()
            .filter(|year| !year.is_some_and(|y| y.is_finite() && y.fract() == 0.0))
            .count();
        if bad_years > 0 {
            return Err(DashboardError::DataLoad(format!(
                "{bad_years} large-city rows have a year that is not a whole number"
            )));
        }
        let wide = wide.lazy().with_column(year_text()).collect()?;

        // Wide -> long: one block of rows per measure column, in column order
        let mut keep: Vec<Expr> = raw::ID_COLUMNS.iter().map(|c| col(*c)).collect();
        keep.push(col(prepared::TYPE_CRIME));
        keep.push(col(prepared::NUMBER_CRIMES));

        let blocks: Vec<LazyFrame> = measures
            .iter()
            .zip(labels)
            .map(|(measure, label)| {
                wide.clone()
                    .lazy()
                    .with_columns([
                        lit(label).alias(prepared::TYPE_CRIME),
                        col(*measure).alias(prepared::NUMBER_CRIMES),
                    ])
                    .select(keep.clone())
            })
            .collect();

        let frame = concat(blocks, UnionArgs::default())?.collect()?;

        info!(
            cities = wide.height(),
            categories = measures.len(),
            rows = frame.height(),
            "prepared crime table"
        );

        Ok(Self {
            frame,
            loaded_at: Utc::now(),
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct crime labels, sorted ascending.
    pub fn crime_types(&self) -> Result<Vec<String>, DashboardError> {
        self.distinct_sorted(prepared::TYPE_CRIME)
    }

    /// Distinct years, sorted ascending.
    pub fn years(&self) -> Result<Vec<String>, DashboardError> {
        self.distinct_sorted(raw::YEAR)
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    /// Rows matching both the selected crime and the selected year.
    ///
    /// An unset or unknown selection gives an empty frame with the full
    /// schema; it is never an error.
    pub fn select(&self, selection: &Selection) -> Result<DataFrame, DashboardError> {
        let (Some(crime), Some(year)) = (selection.crime.as_deref(), selection.year.as_deref())
        else {
            return Ok(self.frame.clear());
        };

        let df = self
            .frame
            .clone()
            .lazy()
            .filter(
                col(prepared::TYPE_CRIME)
                    .eq(lit(crime))
                    .and(col(raw::YEAR).eq(lit(year))),
            )
            .collect()?;

        Ok(df)
    }

    fn distinct_sorted(&self, column: &str) -> Result<Vec<String>, DashboardError> {
        let values: BTreeSet<String> = self
            .frame
            .column(column)?
            .str()?
            .into_iter()
            .filter_map(|v| v.map(|s| s.to_string()))
            .collect();
        Ok(values.into_iter().collect())
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

fn read_source(path: &Path) -> Result<DataFrame, DashboardError> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

    let result = if is_parquet {
        File::open(path)
            .map_err(PolarsError::from)
            .and_then(|file| ParquetReader::new(file).finish())
    } else {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
    };

    result.map_err(|e| DashboardError::DataLoad(format!("{}: {e}", path.display())))
}

fn trim_column_names(mut df: DataFrame) -> Result<DataFrame, DashboardError> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;
    Ok(df)
}

fn measure_labels(
    measures: &[&str],
    unmapped: UnmappedCategories,
) -> Result<Vec<String>, DashboardError> {
    measures
        .iter()
        .map(|&measure| match category::display_label(measure) {
            Some(label) => Ok(label.to_string()),
            None => match unmapped {
                UnmappedCategories::Passthrough => {
                    warn!(
                        column = measure,
                        "measure column has no display label, keeping its raw name"
                    );
                    Ok(measure.to_string())
                }
                UnmappedCategories::Reject => Err(DashboardError::Schema(format!(
                    "measure column '{measure}' has no display label"
                ))),
            },
        })
        .collect()
}

/// Parse a column to Float64. Text is trimmed first; unparseable values
/// become null.
fn parse_float(column: &str, is_text: bool) -> Expr {
    if is_text {
        col(column)
            .str()
            .strip_chars(lit(" \t\r\n"))
            .cast(DataType::Float64)
    } else {
        col(column).cast(DataType::Float64)
    }
}

/// Parse the large-city flag to Float64. Text `true`/`false` (any case)
/// count as 1 and 0, as booleans do.
fn parse_flag(column: &str, is_text: bool) -> Expr {
    if !is_text {
        return col(column).cast(DataType::Float64);
    }
    let text = col(column)
        .str()
        .strip_chars(lit(" \t\r\n"))
        .str()
        .to_lowercase();
    when(text.clone().eq(lit("true")))
        .then(lit(1.0))
        .when(text.clone().eq(lit("false")))
        .then(lit(0.0))
        .otherwise(text.cast(DataType::Float64))
        .alias(column)
}

/// Whole-number Float64 year to text: `2010.0` becomes `"2010"`.
fn year_text() -> Expr {
    col(raw::YEAR)
        .cast(DataType::Int64)
        .cast(DataType::String)
}
