use chrono::{DateTime, Utc};
use rusqlite::{self, types::Type, Result};
use serde::{de::DeserializeOwned, Serialize};

pub(crate) fn to_utc_datetime(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

pub(crate) fn to_optional_utc(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.map(to_utc_datetime).transpose()
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn from_json<T: DeserializeOwned>(json: String) -> Result<T> {
    serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Error for a stored enum value this build does not know.
pub(crate) fn unknown_value(column: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(column, name.to_string(), Type::Text)
}
