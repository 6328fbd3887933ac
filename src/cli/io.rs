//! JSON I/O handling for CLI
//!
//! - Input: one JSON object of query parameters per line
//! - Output: one JSON object per request
//! - UTF-8 only; blank lines are skipped

use std::collections::HashMap;
use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Outer result: fatal I/O. Inner result: a bad request line.
pub type RequestLine = CliResult<HashMap<String, String>>;

/// Read request lines from a reader
pub fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<RequestLine>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            Ok(parse_params(&line))
        })
}

/// Parse one request line into query parameters
///
/// String values are taken as-is; any other JSON value is passed on as its
/// JSON text, so `filter` and `sort` may be given inline.
pub fn parse_params(line: &str) -> RequestLine {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| CliError::request_error(format!("Invalid request JSON: {}", e)))?;

    let object = match value {
        Value::Object(object) => object,
        _ => return Err(CliError::request_error("Request must be a JSON object")),
    };

    Ok(object
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_inline_json_values_are_stringified() {
        let params = parse_params(
            r#"{"format":"aggrid","startRow":0,"filter":{"a":{"filterType":"set","values":[]}}}"#,
        )
        .unwrap();

        assert_eq!(params["format"], "aggrid");
        assert_eq!(params["startRow"], "0");
        let filter: Value = serde_json::from_str(&params["filter"]).unwrap();
        assert_eq!(filter["a"]["filterType"], "set");
    }

    #[test]
    fn test_non_object_request_is_rejected() {
        let err = parse_params("[1,2]").unwrap_err();
        assert_eq!(err.code_str(), "GRID_CLI_REQUEST_ERROR");
    }

    #[test]
    fn test_read_requests_skips_blank_lines() {
        let input = Cursor::new("{\"a\":\"1\"}\n\n   \nnot json\n");
        let lines: Vec<_> = read_requests(input).collect();

        assert_eq!(lines.len(), 2);
        assert!(matches!(&lines[0], Ok(Ok(p)) if p["a"] == "1"));
        assert!(matches!(&lines[1], Ok(Err(_))));
    }

    #[test]
    fn test_write_envelopes() {
        let mut out = Vec::new();
        write_response(&mut out, serde_json::json!({"rowCount": 0})).unwrap();
        write_error(&mut out, "GRID_INVALID_RANGE", "bad").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["data"]["rowCount"], 0);
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "GRID_INVALID_RANGE");
    }
}
