use criterion::{Criterion, criterion_group, criterion_main};
use reqcore::http::parse_header_block;
use reqcore::{Client, Headers, Method, RawTransfer, Response, TransferInfo};
use std::hint::black_box;

const HEADER_BLOCK: &str = "HTTP/1.1 301 Moved Permanently\r\n\
Location: http://example.com/final\r\n\
Content-Length: 0\r\n\
\r\n\
HTTP/1.1 200 OK\r\n\
Content-Type: application/xml\r\n\
Content-Length: 1234\r\n\
Date: Mon, 12 Oct 2026 10:00:00 GMT\r\n\
Server: bench\r\n\
X-Amz-Request-Id: 4442587FB7D0A2F9\r\n\
X-Folded: first\r\n\
  second\r\n\
Set-Cookie: a=1\r\n\
Set-Cookie: b=2\r\n\
\r\n";

fn xml_body(entries: usize) -> String {
    let mut body = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ListBucketResult>");
    for i in 0..entries {
        body.push_str(&format!(
            "<Contents><Key>object-{i}</Key><Size>{}</Size></Contents>",
            i * 1024
        ));
    }
    body.push_str("</ListBucketResult>");
    body
}

/// Header block parsing, including a redirect hop and folded lines.
fn bench_parse_header_block(c: &mut Criterion) {
    c.bench_function("parse_header_block", |b| {
        b.iter(|| parse_header_block(black_box(HEADER_BLOCK)).unwrap())
    });
}

/// Response construction with raw and XML bodies.
fn bench_response_body(c: &mut Criterion) {
    let plain = "x".repeat(16 * 1024);
    let xml = xml_body(200);

    c.bench_function("response_new_plain", |b| {
        b.iter(|| Response::new(Headers::new(), black_box(plain.clone()), 200).unwrap())
    });

    c.bench_function("response_new_xml_200_entries", |b| {
        b.iter(|| Response::new(Headers::new(), black_box(xml.clone()), 200).unwrap())
    });
}

/// Splitting and parsing a complete transfer the way a send does.
fn bench_process_transfer(c: &mut Criterion) {
    let client = Client::new();
    let info = TransferInfo::new("http://example.com/final", Method::Get, 200);
    let transfer = RawTransfer::from_parts(HEADER_BLOCK, xml_body(50).as_bytes(), info);

    c.bench_function("client_process_transfer", |b| {
        b.iter(|| client.process(black_box(&transfer)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_parse_header_block,
    bench_response_body,
    bench_process_transfer
);
criterion_main!(benches);
