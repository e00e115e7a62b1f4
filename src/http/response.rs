//! Echo payload returned by `POST /basic_post`.

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use serde::Serialize;

/// Request metadata echoed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoPayload {
    pub headers: BTreeMap<String, HeaderValues>,
    #[serde(rename = "bodyLength")]
    pub body_length: usize,
}

/// Values of one header: a string when sent once, an array when repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    fn push(&mut self, value: String) {
        match self {
            HeaderValues::One(first) => {
                *self = HeaderValues::Many(vec![std::mem::take(first), value]);
            }
            HeaderValues::Many(values) => values.push(value),
        }
    }
}

impl EchoPayload {
    pub fn new(headers: &HeaderMap, body_length: usize) -> Self {
        let mut echoed: BTreeMap<String, HeaderValues> = BTreeMap::new();

        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            match echoed.get_mut(name.as_str()) {
                Some(existing) => existing.push(value),
                None => {
                    echoed.insert(name.as_str().to_owned(), HeaderValues::One(value));
                }
            }
        }

        Self {
            headers: echoed,
            body_length,
        }
    }
}
