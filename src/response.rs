use crate::messages::Notice;
use crate::prompt::{Field, FieldRequest};
use std::collections::BTreeMap;

/// Sections extracted from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// One entry per requested field; missing sections are empty strings.
    Fields(BTreeMap<Field, String>),
    /// Text that could not be mapped onto any requested field.
    Unparsed { error: String, raw: String },
}

impl ParsedResponse {
    pub fn get(&self, field: Field) -> Option<&str> {
        match self {
            ParsedResponse::Fields(fields) => fields.get(&field).map(String::as_str),
            ParsedResponse::Unparsed { .. } => None,
        }
    }

    /// String-keyed view, e.g. `{"name": "...", "backstory": "..."}`.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        match self {
            ParsedResponse::Fields(fields) => fields
                .iter()
                .map(|(field, text)| (field.key().to_string(), text.clone()))
                .collect(),
            ParsedResponse::Unparsed { error, raw } => BTreeMap::from([
                ("Error".to_string(), error.clone()),
                ("raw".to_string(), raw.clone()),
            ]),
        }
    }
}

/// What the caller gets when the completion came back without usable text.
pub fn fallback(request: &FieldRequest) -> ParsedResponse {
    let fields = request
        .iter()
        .map(|field| {
            let notice = match field {
                Field::Name => Notice::NoResponseName,
                Field::Backstory => Notice::NoCharacterGenerated,
                Field::Personality | Field::Playstyle => Notice::TryAgain,
            };
            (field, notice.to_string())
        })
        .collect();
    ParsedResponse::Fields(fields)
}

/// Splits `raw` into labeled sections.
///
/// A section opens on a line that starts with a requested label (any case)
/// directly followed by `:`, and runs until the next opening line. Text
/// before the first opening line is dropped; a repeated label keeps its
/// last occurrence.
pub fn parse_response(raw: Option<&str>, request: &FieldRequest) -> ParsedResponse {
    let Some(raw) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return fallback(request);
    };
    if request.is_empty() {
        return ParsedResponse::Unparsed {
            error: Notice::ExtractionFailed.to_string(),
            raw: raw.to_string(),
        };
    }

    let mut found: BTreeMap<Field, String> = request.iter().map(|f| (f, String::new())).collect();
    let mut current: Option<(Field, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some((field, rest)) = opening_label(line, request) {
            if let Some((prev, body)) = current.take() {
                found.insert(prev, join_body(&body));
            }
            current = Some((field, vec![rest]));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((prev, body)) = current {
        found.insert(prev, join_body(&body));
    }

    ParsedResponse::Fields(found)
}

fn opening_label<'a>(line: &'a str, request: &FieldRequest) -> Option<(Field, &'a str)> {
    request.iter().find_map(|field| {
        let label = field.label();
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let rest = line[label.len()..].strip_prefix(':')?;
        Some((field, rest.trim_start_matches([' ', '\t'])))
    })
}

fn join_body(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}
