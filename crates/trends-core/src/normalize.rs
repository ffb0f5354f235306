//! Conversion of provider tables into fixed record shapes.
//!
//! Every schema assumption about provider output lives here and in the column
//! constants of [`crate::provider`]. Rows with a null cell are skipped; cells
//! that cannot be read as a non-negative integer are errors.

use polars::prelude::*;

use crate::{
    error::{Result, TrendsError},
    provider::{
        BREAKOUT_SENTINEL, DATE_COLUMN, QUERY_COLUMN, REGION_COLUMN, SCORE_COLUMN, VALUE_COLUMN,
    },
    types::{MAX_RANKED_ITEMS, RankedTerm, RegionScore, TimeSeriesPoint},
};

/// Score assigned to a rising term reported as a breakout.
pub const BREAKOUT_SCORE: u32 = 100;

/// Length of a `YYYY-MM-DD` date prefix.
const CALENDAR_DAY_LEN: usize = 10;

/// Converts an interest-over-time table into chronological points.
///
/// Provider row order is preserved. Timestamps are cut to calendar days and
/// every point is labelled with `keyword`. A table without a score column
/// yields no points.
///
/// # Errors
/// Returns [`TrendsError::Parse`] if the date column is missing or a score is
/// negative.
pub fn time_series(frame: &DataFrame, keyword: &str) -> Result<Vec<TimeSeriesPoint>> {
    if frame.height() == 0 {
        return Ok(Vec::new());
    }
    let Ok(values) = frame.column(SCORE_COLUMN) else {
        return Ok(Vec::new());
    };

    let values = integer_cells(values)?;
    let dates = string_column(frame, DATE_COLUMN)?;
    let dates = dates.str().map_err(table_error)?;

    let mut points = Vec::with_capacity(frame.height());
    for (date, value) in dates.into_iter().zip(values) {
        let (Some(date), Some(value)) = (date, value) else {
            continue;
        };
        points.push(TimeSeriesPoint::new(
            calendar_day(date),
            to_score(value)?,
            keyword,
        ));
    }

    Ok(points)
}

/// Converts an interest-by-region table into the top regions.
///
/// Only strictly positive scores are kept. The output is sorted by descending
/// score (ties keep provider order) and truncated to [`MAX_RANKED_ITEMS`].
/// A table without a score column yields no regions.
///
/// # Errors
/// Returns [`TrendsError::Parse`] if the region column is missing.
pub fn region_scores(frame: &DataFrame) -> Result<Vec<RegionScore>> {
    if frame.height() == 0 {
        return Ok(Vec::new());
    }
    let Ok(values) = frame.column(SCORE_COLUMN) else {
        return Ok(Vec::new());
    };

    let values = integer_cells(values)?;
    let regions = string_column(frame, REGION_COLUMN)?;
    let regions = regions.str().map_err(table_error)?;

    let mut scores: Vec<RegionScore> = regions
        .into_iter()
        .zip(values)
        .filter_map(|(region, value)| {
            let value = u32::try_from(value?).ok().filter(|v| *v > 0)?;
            Some(RegionScore::new(region?, value))
        })
        .collect();

    scores.sort_by(|a, b| b.value.cmp(&a.value));
    scores.truncate(MAX_RANKED_ITEMS);
    Ok(scores)
}

/// Converts a top related-queries table into ranked terms.
///
/// # Errors
/// Returns [`TrendsError::Parse`] if a column is missing or a score is not a
/// non-negative integer.
pub fn top_terms(frame: &DataFrame) -> Result<Vec<RankedTerm>> {
    ranked_terms(frame, false)
}

/// Converts a rising related-queries table into ranked terms.
///
/// A score equal to [`BREAKOUT_SENTINEL`] becomes [`BREAKOUT_SCORE`].
///
/// # Errors
/// Returns [`TrendsError::Parse`] if a column is missing or a score is neither
/// the sentinel nor a non-negative integer.
pub fn rising_terms(frame: &DataFrame) -> Result<Vec<RankedTerm>> {
    ranked_terms(frame, true)
}

fn ranked_terms(frame: &DataFrame, allow_breakout: bool) -> Result<Vec<RankedTerm>> {
    if frame.height() == 0 {
        return Ok(Vec::new());
    }

    let head = frame.head(Some(MAX_RANKED_ITEMS));
    let queries = string_column(&head, QUERY_COLUMN)?;
    let queries = queries.str().map_err(table_error)?;
    let values = head.column(VALUE_COLUMN).map_err(table_error)?;
    let values = term_scores(values, allow_breakout)?;

    Ok(queries
        .into_iter()
        .zip(values)
        .filter_map(|(text, value)| Some(RankedTerm::new(text?, value?)))
        .collect())
}

fn term_scores(column: &Column, allow_breakout: bool) -> Result<Vec<Option<u32>>> {
    if matches!(column.dtype(), DataType::String) {
        let cells = column.str().map_err(table_error)?;
        return cells
            .into_iter()
            .map(|cell| {
                cell.map(|raw| parse_term_score(raw, allow_breakout))
                    .transpose()
            })
            .collect();
    }

    integer_cells(column)?
        .into_iter()
        .map(|cell| cell.map(to_score).transpose())
        .collect()
}

fn parse_term_score(raw: &str, allow_breakout: bool) -> Result<u32> {
    let raw = raw.trim();
    if allow_breakout && raw == BREAKOUT_SENTINEL {
        return Ok(BREAKOUT_SCORE);
    }
    raw.parse::<u32>()
        .map_err(|_| TrendsError::Parse(format!("unrecognized term score {raw:?}")))
}

fn integer_cells(column: &Column) -> Result<Vec<Option<i64>>> {
    let ints = column.cast(&DataType::Int64).map_err(table_error)?;
    Ok(ints.i64().map_err(table_error)?.into_iter().collect())
}

fn string_column(frame: &DataFrame, name: &str) -> Result<Column> {
    frame
        .column(name)
        .map_err(table_error)?
        .cast(&DataType::String)
        .map_err(table_error)
}

fn to_score(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| TrendsError::Parse(format!("score {value} out of range")))
}

fn calendar_day(timestamp: &str) -> String {
    timestamp.chars().take(CALENDAR_DAY_LEN).collect()
}

fn table_error(e: PolarsError) -> TrendsError {
    TrendsError::Parse(e.to_string())
}
