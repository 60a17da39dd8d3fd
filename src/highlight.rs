//! Segmentation of highlighted verse text
//!
//! The API marks matched words inline as
//! `<span style="color:NAME;"><b>WORD</b></span>`. Renderers turn the
//! segments into coloured runs; the session itself never looks at them.

use regex_lite::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Plain { text: String },
    Highlight { text: String, color: String },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Highlight { text, .. } => text,
        }
    }
}

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#"<span[^>]*style="[^"]*color:\s*([^;"]+);?[^"]*"[^>]*><b>(.*?)</b></span>"#).ok()
        })
        .as_ref()
}

/// Split `text` into plain and highlighted runs, in order.
pub fn segments(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let Some(re) = pattern() else {
        return vec![Segment::Plain { text: text.to_string() }];
    };

    let mut out = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let (Some(whole), Some(color), Some(word)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::Plain { text: text[last..whole.start()].to_string() });
        }
        out.push(Segment::Highlight {
            text: word.as_str().to_string(),
            color: color.as_str().trim().to_lowercase(),
        });
        last = whole.end();
    }
    if last < text.len() {
        out.push(Segment::Plain { text: text[last..].to_string() });
    }
    out
}

/// The text with highlight markup removed.
pub fn strip(text: &str) -> String {
    segments(text).iter().map(Segment::text).collect()
}
