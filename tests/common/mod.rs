#![allow(dead_code)]

use polars::prelude::*;

/// Chicago (two years) and Houston are large cities; Boise is not.
pub fn wide_frame() -> DataFrame {
    df!(
        "state" => ["IL", "IL", "TX", "ID"],
        "city" => ["Chicago", "Chicago", "Houston", "Boise"],
        "population" => [2_695_598.0, 2_707_120.0, 2_099_451.0, 205_671.0],
        "year" => [2010i64, 2011, 2010, 2010],
        "state_city" => ["IL_Chicago", "IL_Chicago", "TX_Houston", "ID_Boise"],
        "lat" => [41.8781, 41.8781, 29.7604, 43.6150],
        "lng" => [-87.6298, -87.6298, -95.3698, -116.2023],
        "population_sm" => [26.96, 27.07, 21.0, 2.06],
        "density" => [11_841.8, 11_892.4, 3_501.0, 2_553.0],
        "large_city" => [1i64, 1, 1, 0],
        "violentcrime" => [500.0, 480.0, 700.0, 90.0],
        "rape" => [40.0, 38.0, 60.0, 9.0],
        "twitter_index" => [0.2, 0.1, -0.3, 0.5],
    )
    .expect("fixture frame")
}

pub const QUALIFYING_ROWS: usize = 3;
pub const MEASURES: usize = 3;

pub fn strings(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect()
}

pub fn floats(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}
