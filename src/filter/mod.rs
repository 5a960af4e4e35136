use regex::Regex;

use reqcore::{Body, Response};

/// Text a body filter is matched against
fn searchable_text(body: &Body) -> String {
    match body {
        Body::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Body::Xml(element) => {
            let mut out = Vec::new();
            if element.write(&mut out).is_err() {
                return String::new();
            }
            String::from_utf8_lossy(&out).into_owned()
        }
    }
}

/// Check if response should be filtered out based on criteria
pub fn should_filter_response(
    response: &Response,
    filter_status: &[u16],
    filter_regex: Option<&Regex>,
) -> bool {
    // Filter by status codes
    if !filter_status.is_empty() && !response.is_ok_with(filter_status) {
        return true;
    }

    // Filter by regex in response body
    if let Some(re) = filter_regex
        && !re.is_match(&searchable_text(response.body()))
    {
        return true;
    }

    false
}
