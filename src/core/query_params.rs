use std::collections::HashMap;

/// Decoded parameters of a URI or a bare query string. `+` decodes to a
/// space; a repeated key keeps its last value.
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let query = match uri.find('?') {
        Some(query_start) => &uri[query_start + 1..],
        None if uri.starts_with('/') => return params,
        None => uri,
    };

    for param in query.split('&').filter(|p| !p.is_empty()) {
        if let Some(eq_idx) = param.find('=') {
            let key = &param[..eq_idx];
            params.insert(key.to_string(), decode(&param[eq_idx + 1..]));
        } else {
            // Flag parameter without value
            params.insert(param.to_string(), String::new());
        }
    }

    params
}

fn decode(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Empty values count as missing.
pub fn get_string(params: &HashMap<String, String>, key: &str, default: Option<&str>) -> Option<String> {
    params
        .get(key)
        .filter(|s| !s.is_empty())
        .cloned()
        .or_else(|| default.map(|d| d.to_string()))
}

/// Only the literal `true` turns a flag on, as in `following=true`.
pub fn get_bool_flag(params: &HashMap<String, String>, key: &str) -> bool {
    matches!(params.get(key).map(String::as_str), Some("true"))
}

/// Page numbers and sizes: unparsable values fall back to `default`, and
/// the result is at least 1.
pub fn get_int(params: &HashMap<String, String>, key: &str, default: usize) -> usize {
    let parsed = params.get(key).and_then(|raw| raw.trim().parse::<usize>().ok());
    parsed.unwrap_or(default).max(1)
}
