use crate::constants::STATUS_LINE_PREFIX;
use crate::error::{Error, Result};
use crate::http::headers::Headers;
use crate::http::method::Method;

/// Split raw transport output into header block and body.
///
/// `header_size` is the length of the header block as reported by the
/// transport; a size past the end of the output is rejected.
pub fn split_transfer(raw: &[u8], header_size: usize) -> Result<(&[u8], &[u8])> {
    if header_size > raw.len() {
        return Err(Error::MalformedHeaderBlock(format!(
            "header size {} exceeds transfer length {}",
            header_size,
            raw.len()
        )));
    }
    Ok(raw.split_at(header_size))
}

/// Parse a header block into lower-cased headers.
///
/// Redirects and interim responses leave several blocks back to back; only
/// the last one describes the body. An empty block yields no headers. A block
/// that does not start with a status line, or a header line with no `:`, is
/// malformed. Repeated names keep the last value. Folded continuation lines
/// are joined onto the previous value.
pub fn parse_header_block(block: &str) -> Result<Headers> {
    let trimmed = block.trim();
    let mut headers = Headers::new();
    if trimmed.is_empty() {
        return Ok(headers);
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let start = lines
        .iter()
        .rposition(|line| line.trim().is_empty())
        .map_or(0, |idx| idx + 1);
    let mut section = lines[start..].iter();

    let status_line = section.next().copied().unwrap_or_default();
    if !status_line.starts_with(STATUS_LINE_PREFIX) {
        return Err(Error::MalformedHeaderBlock(format!(
            "expected status line, got '{}'",
            status_line
        )));
    }

    let mut last_key: Option<String> = None;
    for line in section {
        if line.starts_with([' ', '\t'])
            && let Some(key) = &last_key
        {
            let joined = format!("{} {}", headers.get(key).unwrap_or_default(), line.trim());
            headers.insert(key.clone(), joined.trim().to_string());
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| Error::MalformedHeaderBlock(format!("invalid header line '{}'", line)))?;
        let key = key.trim().to_ascii_lowercase();
        headers.insert(key.clone(), value.trim());
        last_key = Some(key);
    }

    Ok(headers)
}

/// Parse request line to extract method, URL, and optional body
pub fn parse_request_line(line: &str) -> (Method, String, Option<String>) {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.is_empty() {
        return (Method::Get, String::new(), None);
    }

    if parts.len() > 1
        && let Ok(method) = parts[0].parse::<Method>()
    {
        let url = parts[1].to_string();
        let body = if parts.len() > 2 {
            Some(parts[2..].join(" "))
        } else {
            None
        };
        (method, url, body)
    } else {
        (Method::Get, line.trim().to_string(), None)
    }
}
