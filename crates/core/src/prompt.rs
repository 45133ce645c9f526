//! Prompt templates for slide generation.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches `{{name}}` placeholders.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Prompt that turns one document segment into slides.
///
/// Placeholders: `topic`, `contentSegment`.
pub const SLIDE_CONTENT_TEMPLATE: &str = r#"
You will be given a key topic and a portion of a document that provides detail about it. Create presentation slides from the document portion.

Guidelines:
- Create between one and ten slides, depending on how much non-repetitive information the portion contains.
- Keep the slides in the order the information appears in the document.
- Give each slide 4-6 concise bullet points, each holding a single key idea or fact.
- Use short phrases or short sentences for bullet points.
- Avoid repeating information across slides.
- Do not add commentary, explanations, or "Note:" sections.

Output format:
**slide title**
point 1
point 2
point 3

Key topic: '''{{topic}}'''

Document portion:
'''
{{contentSegment}}
'''

Output only the slide titles and bullet points.
"#;

/// Prompt that lists the key topics of a whole document.
///
/// Placeholder: `content`. Each topic comes back as a `**topic**` line
/// followed by the first words of its section.
pub const EXTRACT_TOPICS_TEMPLATE: &str = r#"
Analyze the document below and list its key topics in the order they appear.

Guidelines:
- A key topic is a major section or theme, substantial enough for at least one slide of 3-5 bullet points.
- Start a new topic when the subject clearly shifts: a new heading, a transitional phrase, or a change of focus.
- Do not repeat a topic unless it is substantially expanded later.

Output format:
**key topic 1**
first ten words of the section for key topic 1
**key topic 2**
first ten words of the section for key topic 2

Document:
'''
{{content}}
'''
"#;

/// Fill `{{name}}` placeholders from `values`; unknown names become empty.
pub fn render_template(template: &str, values: &HashMap<&str, &str>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            values.get(&caps[1]).copied().unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Build the slide-generation prompt for one document segment.
pub fn slide_content_prompt(topic: &str, segment: &str) -> String {
    let values = HashMap::from([("topic", topic), ("contentSegment", segment)]);
    render_template(SLIDE_CONTENT_TEMPLATE, &values)
}

/// Build the topic-extraction prompt for a whole document.
pub fn extract_topics_prompt(content: &str) -> String {
    let values = HashMap::from([("content", content)]);
    render_template(EXTRACT_TOPICS_TEMPLATE, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_topics_prompt() {
        let prompt = extract_topics_prompt("Chapter one.\nChapter two.");
        assert!(prompt.contains("Chapter one.\nChapter two."));
        assert!(!prompt.contains("{{content}}"));
    }

    #[test]
    fn test_render_known_placeholders() {
        let values = HashMap::from([("name", "World"), ("greeting", "Hello")]);
        assert_eq!(
            render_template("{{greeting}}, {{name}}!", &values),
            "Hello, World!"
        );
    }

    #[test]
    fn test_render_unknown_placeholder_is_blank() {
        let values = HashMap::new();
        assert_eq!(render_template("a{{missing}}b", &values), "ab");
    }

    #[test]
    fn test_render_leaves_non_placeholders() {
        let values = HashMap::from([("x", "1")]);
        assert_eq!(render_template("{x} {{ x }} {{x}}", &values), "{x} {{ x }} 1");
    }

    #[test]
    fn test_render_does_not_recurse() {
        let values = HashMap::from([("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(render_template("{{a}}", &values), "{{b}}");
    }

    #[test]
    fn test_slide_content_prompt() {
        let prompt = slide_content_prompt("Budget", "We spent less this year.");
        assert!(prompt.contains("Key topic: '''Budget'''"));
        assert!(prompt.contains("We spent less this year."));
        assert!(!prompt.contains("{{"));
    }
}
