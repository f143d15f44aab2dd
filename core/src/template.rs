//! Prompt templates with `{{{field}}}` placeholders.

use serde_json::{Map, Value};

use crate::error::TemplateError;

const OPEN: &str = "{{{";
const CLOSE: &str = "}}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    source: &'static str,
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl PromptTemplate {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Placeholder names in order of appearance (duplicates kept).
    pub fn placeholders(&self) -> Result<Vec<&'static str>, TemplateError> {
        Ok(segments(self.source)?
            .into_iter()
            .filter_map(|seg| match seg {
                Segment::Placeholder(name) => Some(name),
                Segment::Literal(_) => None,
            })
            .collect())
    }

    /// Substitutes every placeholder with the matching input field.
    /// Strings go in verbatim so JSON blobs reach the model untouched.
    pub fn render(&self, input: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for seg in segments(self.source)? {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = input
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                    match value {
                        Value::String(s) => out.push_str(s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn segments(source: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segs = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segs.push(Segment::Literal(&rest[..start]));
        }
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or(TemplateError::Unterminated(offset + start))?;
        segs.push(Segment::Placeholder(after_open[..end].trim()));

        let consumed = start + OPEN.len() + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        segs.push(Segment::Literal(rest));
    }
    Ok(segs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn substitutes_all_placeholders() {
        let t = PromptTemplate::new("Campaign: {{{campaignName}}}\nData (JSON): {{{costData}}}\n");
        let rendered = t
            .render(&record(json!({
                "campaignName": "Summer Pet Health",
                "costData": "{\n  \"budget\": 20000\n}"
            })))
            .unwrap();

        assert_eq!(
            rendered,
            "Campaign: Summer Pet Health\nData (JSON): {\n  \"budget\": 20000\n}\n"
        );
        assert!(!rendered.contains(OPEN));
    }

    #[test]
    fn lists_placeholders_in_order() {
        let t = PromptTemplate::new("{{{ a }}} and {{{b}}} then {{{a}}}");
        assert_eq!(t.placeholders().unwrap(), vec!["a", "b", "a"]);
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let t = PromptTemplate::new("Topic: {{{topic}}}");
        let err = t.render(&record(json!({ "subject": "cats" }))).unwrap_err();
        assert_eq!(err, TemplateError::UnknownPlaceholder("topic".into()));
    }

    #[test]
    fn unterminated_placeholder_reports_offset() {
        let t = PromptTemplate::new("ok {{{a}}} broken {{{b");
        assert_eq!(t.placeholders().unwrap_err(), TemplateError::Unterminated(18));
    }

    #[test]
    fn non_string_values_render_as_json() {
        let t = PromptTemplate::new("n={{{n}}}");
        assert_eq!(t.render(&record(json!({ "n": 4.5 }))).unwrap(), "n=4.5");
    }
}
