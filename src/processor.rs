use anyhow::{Context, Result};
use regex::Regex;
use std::io::{self, BufRead};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use reqcore::http::{format_raw_request, parse_headers, parse_request_line};
use reqcore::{Client, DefaultResponseFactory, Headers, Options, Proxy, TransportHandle, Transport};

use crate::filter::should_filter_response;
use crate::output::{OutputOptions, format_jsonl_output, format_plain_output};
use crate::types::{Cli, OutputFormat};

/// Build the client shared by every request of a run
pub fn build_client(cli: &Cli) -> Client {
    let options = Options {
        timeout: cli.timeout,
        connect_timeout: cli.connect_timeout,
        max_redirects: cli.max_redirects,
        verify_tls: cli.verify_tls,
        compression: !cli.no_compression,
    };

    let mut client = Client::new()
        .with_options(options)
        .with_concurrency(cli.concurrency);
    if let Some(user_agent) = &cli.user_agent {
        client = client.with_user_agent(user_agent);
    }
    client
}

/// Prefix schemeless input with `http://`
fn with_default_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Settings applied to every request line
struct RequestTemplate {
    headers: Headers,
    proxy: Option<Proxy>,
}

impl RequestTemplate {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let proxy = cli
            .proxy
            .as_deref()
            .map(Proxy::parse)
            .transpose()
            .context("invalid --proxy")?;
        Ok(Self {
            headers: parse_headers(&cli.headers),
            proxy,
        })
    }

    fn prepare<T: Transport>(
        &self,
        cli: &Cli,
        client: &Client<T, DefaultResponseFactory>,
        line: &str,
    ) -> reqcore::Result<Option<TransportHandle>> {
        let (method, url, body) = parse_request_line(line);
        if url.is_empty() {
            return Ok(None);
        }

        let mut request = client.request(with_default_scheme(&url));
        request.set_method(method).set_proxy(self.proxy.clone());
        for (name, value) in &self.headers {
            request.add_header(name, value);
        }
        if let Some(body) = body {
            request.set_body(body);
        }
        if let Some((user, password)) = cli.credentials() {
            request.set_credentials(user, password);
        }

        request.prepare().map(Some)
    }
}

/// Send every request line as one batch and render the responses.
///
/// Lines that cannot be turned into a request are skipped with a warning.
/// A transport failure on any line fails the whole run.
pub async fn run_batch<T, I>(
    cli: &Cli,
    client: &Client<T, DefaultResponseFactory>,
    lines: I,
) -> Result<String>
where
    T: Transport,
    I: IntoIterator<Item = String>,
{
    let template = RequestTemplate::from_cli(cli)?;
    let filter_regex = cli
        .filter_regex
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter-regex")?;

    let mut handles = Vec::new();
    for line in lines {
        match template.prepare(cli, client, &line) {
            Ok(Some(handle)) => handles.push(handle),
            Ok(None) => {}
            Err(e) => warn!(line = %line.trim(), error = %e, "skipping request"),
        }
    }

    let raw_requests: Vec<Option<String>> = handles
        .iter()
        .map(|h| cli.include_req.then(|| format_raw_request(h)))
        .collect();

    info!(count = handles.len(), "sending requests");
    let responses = client.send_batch(handles).await?;

    let mut output = String::new();
    for (response, raw_request) in responses.iter().zip(&raw_requests) {
        if should_filter_response(response, &cli.filter_status, filter_regex.as_ref()) {
            continue;
        }

        let options = OutputOptions {
            expect: &cli.expect,
            raw_request: raw_request.as_deref(),
            include_headers: cli.include_headers,
            include_body: cli.include_body,
            colored: cli.output.is_none() && !cli.no_color,
        };
        output.push_str(&match cli.format {
            OutputFormat::Plain => format_plain_output(response, &options),
            OutputFormat::Jsonl => format_jsonl_output(response, &options),
        });
    }

    Ok(output)
}

/// Read request lines from stdin, send them and write the results
pub async fn process_requests_from_stdin(cli: Cli) -> Result<()> {
    let client = build_client(&cli);
    let lines: Vec<String> = io::stdin().lock().lines().map_while(std::result::Result::ok).collect();

    let output = run_batch(&cli, &client, lines).await?;
    write_output(&output, cli.output.as_deref()).await
}

/// Write output to file or stdout
async fn write_output(output_str: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let file = File::create(path)
            .await
            .with_context(|| format!("creating output file {}", path))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(output_str.as_bytes()).await?;
        writer.flush().await?;
    } else {
        print!("{}", output_str);
    }
    Ok(())
}
