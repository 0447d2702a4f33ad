use crate::domain::QuoteTable;
use polars::prelude::*;

/// Expected column layout of a quote table converted to a DataFrame.
pub struct QuoteSchema;

impl QuoteSchema {
    /// The canonical OHLCV columns. Derived columns follow these.
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("open".into(), DataType::Float64),
            Field::new("high".into(), DataType::Float64),
            Field::new("low".into(), DataType::Float64),
            Field::new("close".into(), DataType::Float64),
            Field::new("volume".into(), DataType::Float64),
        ])
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

impl QuoteTable {
    /// Convert to a polars DataFrame for charting front ends.
    ///
    /// Column order: date, open, high, low, close, volume, adj_close (only if
    /// any bar has one), then derived columns in insertion order. NaN values
    /// in derived columns stay NaN.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let bars = self.bars();
        // polars dates are days since 1970-01-01 (NaiveDate::default()).
        let days: Vec<i32> = bars
            .iter()
            .map(|b| {
                b.date
                    .signed_duration_since(chrono::NaiveDate::default())
                    .num_days() as i32
            })
            .collect();

        let mut columns = vec![
            Column::from(Series::new("date".into(), days).cast(&DataType::Date)?),
            Column::from(Series::new("open".into(), bars.iter().map(|b| b.open).collect::<Vec<_>>())),
            Column::from(Series::new("high".into(), bars.iter().map(|b| b.high).collect::<Vec<_>>())),
            Column::from(Series::new("low".into(), bars.iter().map(|b| b.low).collect::<Vec<_>>())),
            Column::from(Series::new("close".into(), bars.iter().map(|b| b.close).collect::<Vec<_>>())),
            Column::from(Series::new("volume".into(), bars.iter().map(|b| b.volume).collect::<Vec<_>>())),
        ];

        if self.has_adj_close() {
            let adj: Vec<Option<f64>> = bars.iter().map(|b| b.adj_close).collect();
            columns.push(Column::from(Series::new("adj_close".into(), adj)));
        }

        for derived in self.columns() {
            columns.push(Column::from(Series::new(
                derived.name.as_str().into(),
                derived.values.clone(),
            )));
        }

        DataFrame::new(columns)
    }
}
