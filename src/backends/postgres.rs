//! PostgreSQL driver implementation
//!
//! This module implements the driver traits using the synchronous `postgres`
//! client. Statements are prepared first so that parameters can be encoded
//! for the column types the server expects, then run to completion with the
//! rows buffered on the cursor. Placeholders use the `$1, $2, ...` syntax.
//!
//! Column types without a direct counterpart in [`DatabaseValue`] are read
//! as text (date, time, numeric, json, uuid) or, failing that, as the raw
//! binary value.

use crate::core::{
    database::{Driver, DriverConnection, DriverCursor},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseRow, DatabaseValue},
};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use parking_lot::Mutex;
use postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type, WrongType};
use postgres::{Client, NoTls, Row};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

struct Session {
    client: Option<Client>,
    in_transaction: bool,
}

type SharedSession = Arc<Mutex<Session>>;

/// Opens PostgreSQL connections from libpq-style connection strings
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    type Connection = PostgresConnection;

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn open(&self, connection_string: &str) -> Result<PostgresConnection> {
        let client = Client::connect(connection_string, NoTls)?;
        Ok(PostgresConnection {
            session: Arc::new(Mutex::new(Session {
                client: Some(client),
                in_transaction: false,
            })),
        })
    }
}

/// An open PostgreSQL connection
pub struct PostgresConnection {
    session: SharedSession,
}

impl PostgresConnection {
    /// Check if a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.session.lock().in_transaction
    }

    fn end_transaction(&mut self, command: &str) -> Result<()> {
        let mut session = self.session.lock();
        if !session.in_transaction {
            return Ok(());
        }
        let client = session
            .client
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("connection already closed"))?;
        client.batch_execute(command)?;
        session.in_transaction = false;
        Ok(())
    }
}

impl DriverConnection for PostgresConnection {
    type Cursor = PostgresCursor;

    fn cursor(&mut self) -> Result<PostgresCursor> {
        if self.session.lock().client.is_none() {
            return Err(DatabaseError::connection("connection already closed"));
        }
        Ok(PostgresCursor::new(Arc::clone(&self.session)))
    }

    fn commit(&mut self) -> Result<()> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.end_transaction("ROLLBACK")
    }

    fn close(&mut self) -> Result<()> {
        let mut session = self.session.lock();
        session.in_transaction = false;
        match session.client.take() {
            Some(client) => Ok(client.close()?),
            None => Ok(()),
        }
    }
}

/// Cursor holding the buffered result of one statement
pub struct PostgresCursor {
    session: SharedSession,
    rows: VecDeque<DatabaseRow>,
    row_count: Option<usize>,
    row_number: usize,
    closed: bool,
}

impl PostgresCursor {
    fn new(session: SharedSession) -> Self {
        Self {
            session,
            rows: VecDeque::new(),
            row_count: None,
            row_number: 0,
            closed: false,
        }
    }

    /// Convert a postgres Row to a DatabaseRow
    fn to_database_row(row: &Row, columns: &Arc<[String]>) -> Result<DatabaseRow> {
        let values = row
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| Self::column_value(row, idx, column.type_()))
            .collect::<Result<Vec<_>>>()?;
        Ok(DatabaseRow::new(Arc::clone(columns), values))
    }

    fn column_value(row: &Row, idx: usize, ty: &Type) -> Result<DatabaseValue> {
        let value = match *ty {
            Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(DatabaseValue::Bool),
            Type::INT2 => row
                .try_get::<_, Option<i16>>(idx)?
                .map(|v| DatabaseValue::Int(i32::from(v))),
            Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(DatabaseValue::Int),
            Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(DatabaseValue::Long),
            Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(DatabaseValue::Float),
            Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(DatabaseValue::Double),
            Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(DatabaseValue::Bytes),
            Type::TIMESTAMP => row
                .try_get::<_, Option<NaiveDateTime>>(idx)?
                .map(|v| DatabaseValue::Timestamp(v.and_utc().timestamp_micros())),
            Type::TIMESTAMPTZ => row
                .try_get::<_, Option<DateTime<Utc>>>(idx)?
                .map(DatabaseValue::from),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => row
                .try_get::<_, Option<String>>(idx)?
                .map(DatabaseValue::String),
            Type::DATE => row
                .try_get::<_, Option<NaiveDate>>(idx)?
                .map(|v| DatabaseValue::String(v.to_string())),
            Type::TIME => row
                .try_get::<_, Option<NaiveTime>>(idx)?
                .map(|v| DatabaseValue::String(v.to_string())),
            Type::NUMERIC => row
                .try_get::<_, Option<NumericText>>(idx)?
                .map(|v| DatabaseValue::String(v.0)),
            Type::JSON | Type::JSONB => row
                .try_get::<_, Option<serde_json::Value>>(idx)?
                .map(|v| DatabaseValue::String(v.to_string())),
            Type::UUID => row
                .try_get::<_, Option<RawValue>>(idx)?
                .map(|v| DatabaseValue::String(format_uuid(&v.0))),
            _ => row
                .try_get::<_, Option<RawValue>>(idx)?
                .map(|v| DatabaseValue::Bytes(v.0)),
        };
        Ok(value.unwrap_or(DatabaseValue::Null))
    }
}

impl DriverCursor for PostgresCursor {
    fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<()> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        let mut session = self.session.lock();
        let session = &mut *session;
        let client = session
            .client
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("connection already closed"))?;

        if !session.in_transaction {
            client.batch_execute("BEGIN")?;
            session.in_transaction = true;
        }

        let statement = client.prepare(sql)?;
        let bound: Vec<PgParam<'_>> = params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let mut rows = VecDeque::new();
        let row_count = if statement.columns().is_empty() {
            client.execute(&statement, &refs)? as usize
        } else {
            let columns: Arc<[String]> = statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            for row in client.query(&statement, &refs)? {
                rows.push_back(Self::to_database_row(&row, &columns)?);
            }
            rows.len()
        };

        debug!(rows = row_count, "postgres statement executed");
        self.rows = rows;
        self.row_count = Some(row_count);
        self.row_number = 0;
        Ok(())
    }

    fn fetch_one(&mut self) -> Result<Option<DatabaseRow>> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        let row = self.rows.pop_front();
        if row.is_some() {
            self.row_number += 1;
        }
        Ok(row)
    }

    fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    fn row_number(&self) -> usize {
        self.row_number
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(DatabaseError::CursorClosed);
        }
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

/// Any column, as the bytes the server sent
struct RawValue(Vec<u8>);

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Ok(RawValue(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn format_uuid(raw: &[u8]) -> String {
    let hex: String = raw.iter().map(|b| format!("{:02x}", b)).collect();
    if hex.len() != 32 {
        return hex;
    }
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

/// A NUMERIC column rendered as exact decimal text
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Decode the binary NUMERIC format: a header of digit count, weight, sign
/// and display scale, then base-10000 digits, most significant first. The
/// first digit is multiplied by 10000^weight.
fn decode_numeric(raw: &[u8]) -> std::result::Result<String, BoxError> {
    let word = |i: usize| -> std::result::Result<u16, BoxError> {
        match raw.get(i..i + 2) {
            Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
            None => Err("numeric value truncated".into()),
        }
    };
    let ndigits = usize::from(word(0)?);
    let weight = word(2)? as i16;
    let sign = word(4)?;
    let dscale = usize::from(word(6)?);

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }
    let digits = (0..ndigits)
        .map(|i| word(8 + 2 * i))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let digit = |i: i32| -> u16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NUMERIC_NEG {
        text.push('-');
    }
    if weight < 0 {
        text.push('0');
    } else {
        for i in 0..=i32::from(weight) {
            if i == 0 {
                write!(text, "{}", digit(i))?;
            } else {
                write!(text, "{:04}", digit(i))?;
            }
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = i32::from(weight) + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", digit(i))?;
            i += 1;
        }
        fraction.truncate(dscale);
        text.push('.');
        text.push_str(&fraction);
    }
    Ok(text)
}

/// Encodes a DatabaseValue for whatever type the server inferred for its
/// placeholder, widening or narrowing numbers as needed. A value whose kind
/// does not fit the inferred type is rejected with [`WrongType`].
#[derive(Debug)]
struct PgParam<'a>(&'a DatabaseValue);

type EncodeResult = std::result::Result<IsNull, BoxError>;

fn wrong_type<T>(ty: &Type) -> EncodeResult {
    Err(Box::new(WrongType::new::<T>(ty.clone())))
}

fn encode_integer(v: i64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::BOOL => (v != 0).to_sql(ty, out),
        _ => wrong_type::<i64>(ty),
    }
}

fn encode_float(v: f64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        _ => wrong_type::<f64>(ty),
    }
}

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        match self.0 {
            DatabaseValue::Null => Ok(IsNull::Yes),
            DatabaseValue::Bool(v) if *ty == Type::BOOL => v.to_sql(ty, out),
            DatabaseValue::Bool(_) => wrong_type::<bool>(ty),
            DatabaseValue::Int(v) => encode_integer(i64::from(*v), ty, out),
            DatabaseValue::Long(v) => encode_integer(*v, ty, out),
            DatabaseValue::Float(v) => encode_float(f64::from(*v), ty, out),
            DatabaseValue::Double(v) => encode_float(*v, ty, out),
            DatabaseValue::String(s) if <&str as ToSql>::accepts(ty) => s.as_str().to_sql(ty, out),
            DatabaseValue::String(_) => wrong_type::<String>(ty),
            DatabaseValue::Bytes(b) if <&[u8] as ToSql>::accepts(ty) => b.as_slice().to_sql(ty, out),
            DatabaseValue::Bytes(_) => wrong_type::<Vec<u8>>(ty),
            DatabaseValue::Timestamp(micros) => {
                let dt = DateTime::from_timestamp_micros(*micros)
                    .ok_or_else(|| format!("timestamp {} out of range", micros))?;
                match *ty {
                    Type::TIMESTAMP => dt.naive_utc().to_sql(ty, out),
                    Type::TIMESTAMPTZ => dt.to_sql(ty, out),
                    Type::DATE => dt.date_naive().to_sql(ty, out),
                    Type::INT8 => micros.to_sql(ty, out),
                    _ => wrong_type::<DateTime<Utc>>(ty),
                }
            }
        }
    }

    // the value's own kind decides, in to_sql
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
