//! `${placeholder}` substitution for the emitter's code templates.
//!
//! Substitution is total: in debug builds an unknown placeholder or an unused
//! map entry is an assertion failure, so templates and call sites cannot
//! drift apart silently.

use std::collections::HashSet;

/// A template paired with its substitution map, built fluently:
///
/// ```
/// use vkhpp_gen::template::Template;
///
/// let text = Template::new("enum class ${name} : ${underlying}")
///     .with("name", "Result")
///     .with("underlying", "int32_t")
///     .render();
/// assert_eq!(text, "enum class Result : int32_t");
/// ```
pub struct Template<'a> {
    template: &'a str,
    entries: Vec<(&'a str, String)>,
}

impl<'a> Template<'a> {
    pub fn new(template: &'a str) -> Self {
        Template {
            template,
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'a str, value: impl Into<String>) -> Self {
        debug_assert!(
            !self.entries.iter().any(|(k, _)| *k == key),
            "duplicate template key `{key}`"
        );
        self.entries.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        replace_with_map(self.template, &self.entries)
    }
}

/// Single-pass scan for `${key}` tokens, replacing each from `map`.
pub fn replace_with_map(template: &str, map: &[(&str, String)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut used: HashSet<&str> = HashSet::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .unwrap_or_else(|| panic!("unterminated placeholder in template: `{rest}`"));
        let key = &after[..end];
        match map.iter().find(|(k, _)| *k == key) {
            Some((k, v)) => {
                used.insert(*k);
                result.push_str(v);
            }
            None => {
                debug_assert!(false, "no value for placeholder `${{{key}}}`");
            }
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);

    debug_assert!(
        map.iter().all(|(k, _)| used.contains(*k)),
        "unused template entries: {:?}",
        map.iter()
            .map(|(k, _)| *k)
            .filter(|k| !used.contains(*k))
            .collect::<Vec<_>>()
    );
    result
}

/// True when `text` still contains an unsubstituted `${…}` token.
pub fn has_residual_placeholder(text: &str) -> bool {
    text.contains("${")
}
