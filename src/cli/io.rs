//! JSON-lines I/O for the CLI
//!
//! One JSON object per line in, one per line out. Responses are either
//! `{"status":"ok","data":...}` or `{"status":"error","code":...,"message":...}`.

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Parse each non-empty input line as JSON
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Value>> {
    input
        .lines()
        .filter(|line| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(true))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line).map_err(CliError::from)
        })
}

pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_json(out, &json!({ "status": "ok", "data": data }))
}

pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_json(
        out,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

pub fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
