use colored::*;
use serde_json::json;
use xmltree::EmitterConfig;

use reqcore::{Body, Response};

/// Which parts of a response end up in the output
#[derive(Debug, Clone, Default)]
pub struct OutputOptions<'a> {
    pub expect: &'a [u16],
    pub raw_request: Option<&'a str>,
    pub include_headers: bool,
    pub include_body: bool,
    pub colored: bool,
}

impl OutputOptions<'_> {
    fn is_expected(&self, response: &Response) -> bool {
        if self.expect.is_empty() {
            response.is_ok()
        } else {
            response.is_ok_with(self.expect)
        }
    }
}

/// Render a body for display, indenting XML documents
pub fn render_body(body: &Body) -> String {
    match body {
        Body::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Body::Xml(element) => {
            let mut out = Vec::new();
            let config = EmitterConfig::new().perform_indent(true);
            match element.write_with_config(&mut out, config) {
                Ok(()) => String::from_utf8_lossy(&out).into_owned(),
                Err(e) => format!("[unprintable xml: {}]", e),
            }
        }
    }
}

/// Format response as plain text output
pub fn format_plain_output(response: &Response, options: &OutputOptions) -> String {
    let (method, url, ip_addr, size, elapsed) = match response.info() {
        Some(info) => (
            info.method.to_string(),
            info.url.clone(),
            info.remote_addr.map(|a| a.ip().to_string()).unwrap_or_default(),
            info.size_download,
            info.total_time,
        ),
        None => Default::default(),
    };
    let status = response.status().to_string();

    let mut output = if options.colored {
        let colored_status = if options.is_expected(response) {
            status.green()
        } else if (300..400).contains(&response.status()) {
            status.yellow()
        } else {
            status.red()
        };
        format!(
            "[{}] [{}] [{}] -> {} | Size: {} | Time: {:?}\n",
            method.yellow(),
            url.cyan(),
            ip_addr.magenta(),
            colored_status,
            size.to_string().blue(),
            elapsed
        )
    } else {
        format!(
            "[{}] [{}] [{}] -> {} | Size: {} | Time: {:?}\n",
            method, url, ip_addr, status, size, elapsed
        )
    };

    if let Some(raw_req) = options.raw_request {
        output.push_str(&format!("[Raw Request]\n{}\n", raw_req));
    }
    if options.include_headers {
        output.push_str("[Response Headers]\n");
        for (name, value) in response.headers() {
            output.push_str(&format!("{}: {}\n", name, value));
        }
    }
    if options.include_body {
        output.push_str(&format!("[Response Body]\n{}\n", render_body(response.body())));
    }
    output
}

/// Format response as a single JSON line
pub fn format_jsonl_output(response: &Response, options: &OutputOptions) -> String {
    let mut json_output = json!({
        "status_code": response.status(),
        "ok": options.is_expected(response),
    });
    if let Some(info) = response.info() {
        json_output["info"] = serde_json::to_value(info).unwrap_or_default();
    }
    if let Some(req) = options.raw_request {
        json_output["raw_request"] = req.into();
    }
    if options.include_headers {
        json_output["headers"] = serde_json::to_value(response.headers()).unwrap_or_default();
    }
    if options.include_body {
        json_output["body"] = render_body(response.body()).into();
        json_output["xml"] = response.body().is_xml().into();
    }
    serde_json::to_string(&json_output).unwrap_or_default() + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqcore::{Headers, Method, ResponseParts, TransferInfo};
    use std::time::Duration;

    fn sample(body: &'static str) -> Response {
        let mut info = TransferInfo::new("https://example.com/", Method::Get, 200);
        info.size_download = body.len() as u64;
        info.total_time = Duration::from_millis(12);
        Response::from_parts(ResponseParts {
            status: 200,
            headers: [("content-type", "text/plain")].into_iter().collect::<Headers>(),
            body: body.into(),
            info,
        })
        .unwrap()
    }

    #[test]
    fn test_format_plain_output() {
        let output = format_plain_output(&sample("hello"), &OutputOptions::default());
        assert!(output.contains("[GET]"));
        assert!(output.contains("https://example.com/"));
        assert!(output.contains("-> 200"));
        assert!(output.contains("Size: 5"));
        assert!(!output.contains("[Response Body]"));
    }

    #[test]
    fn test_format_plain_output_with_sections() {
        let options = OutputOptions {
            include_headers: true,
            include_body: true,
            ..Default::default()
        };
        let output = format_plain_output(&sample("hello"), &options);
        assert!(output.contains("[Response Headers]\ncontent-type: text/plain\n"));
        assert!(output.ends_with("[Response Body]\nhello\n"));
    }

    #[test]
    fn test_format_jsonl_output() {
        let options = OutputOptions {
            expect: &[201],
            include_headers: true,
            ..Default::default()
        };
        let line = format_jsonl_output(&sample("hello"), &options);
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["status_code"], 200);
        assert_eq!(value["ok"], false);
        assert_eq!(value["info"]["method"], "GET");
        assert_eq!(value["headers"]["content-type"], "text/plain");
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_render_xml_body() {
        let response = sample("<?xml version=\"1.0\"?><a><b>1</b></a>");
        let rendered = render_body(response.body());
        assert!(rendered.contains("<a>"));
        assert!(rendered.contains("<b>1</b>"));
    }
}
