use common::Result;
use common::time::CalendarParts;
use datafusion::arrow::array::{Int64Array, TimestampMillisecondArray};
use datafusion::arrow::datatypes::{DataType, TimeUnit};
use datafusion::common::DataFusionError;
use datafusion::execution::context::SessionContext;
use datafusion::logical_expr::ColumnarValue;
use datafusion::logical_expr::{Volatility, create_udf};
use std::sync::Arc;

/// Registers the calendar-derivation UDFs with the SessionContext.
///
/// All of them take the raw epoch-millisecond event timestamp and delegate
/// to the shared calendar logic, so both pipelines agree on ISO week and
/// Monday=0 weekday semantics.
pub fn register_udfs(ctx: &SessionContext) -> Result<()> {
    let event_start_time = create_udf(
        "event_start_time",
        vec![DataType::Int64],
        DataType::Timestamp(TimeUnit::Millisecond, None),
        Volatility::Immutable,
        Arc::new(|args| {
            convert_to_timestamp(args).map_err(|e| DataFusionError::Internal(e.to_string()))
        }),
    );
    ctx.register_udf(event_start_time);

    let parts: [(&str, fn(&CalendarParts) -> i64); 6] = [
        ("event_hour", |p| p.hour as i64),
        ("event_day", |p| p.day as i64),
        ("event_week", |p| p.week as i64),
        ("event_month", |p| p.month as i64),
        ("event_year", |p| p.year as i64),
        ("event_weekday", |p| p.weekday as i64),
    ];

    for (name, extract) in parts {
        let udf = create_udf(
            name,
            vec![DataType::Int64],
            DataType::Int64,
            Volatility::Immutable,
            Arc::new(move |args| {
                derive_calendar_part(args, extract)
                    .map_err(|e| DataFusionError::Internal(e.to_string()))
            }),
        );
        ctx.register_udf(udf);
    }

    Ok(())
}

/// Converts epoch milliseconds to an Arrow timestamp; out-of-range values
/// become null.
fn convert_to_timestamp(args: &[ColumnarValue]) -> Result<ColumnarValue> {
    let int_array = match &args[0] {
        ColumnarValue::Array(array) => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| DataFusionError::Internal("Expected int64 array".to_string()))?,
        ColumnarValue::Scalar(_) => {
            return Err(DataFusionError::Internal("Scalar inputs not supported".to_string()).into());
        }
    };

    let result: TimestampMillisecondArray = int_array
        .iter()
        .map(|opt_ts| {
            opt_ts.and_then(|ts| {
                chrono::DateTime::from_timestamp_millis(ts).map(|dt| dt.timestamp_millis())
            })
        })
        .collect();

    Ok(ColumnarValue::Array(Arc::new(result)))
}

/// Derives one calendar component from epoch milliseconds; out-of-range
/// values become null.
fn derive_calendar_part(
    args: &[ColumnarValue],
    extract: fn(&CalendarParts) -> i64,
) -> Result<ColumnarValue> {
    let int_array = match &args[0] {
        ColumnarValue::Array(array) => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| DataFusionError::Internal("Expected int64 array".to_string()))?,
        ColumnarValue::Scalar(_) => {
            return Err(DataFusionError::Internal("Scalar inputs not supported".to_string()).into());
        }
    };

    let result: Int64Array = int_array
        .iter()
        .map(|opt_ts| {
            opt_ts.and_then(|ts| CalendarParts::from_epoch_ms(ts).ok().map(|p| extract(&p)))
        })
        .collect();

    Ok(ColumnarValue::Array(Arc::new(result)))
}
