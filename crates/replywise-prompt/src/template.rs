// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt template rendering.
//!
//! Three directive forms are understood:
//!
//! - `{{NAME}}` substitutes the variable, or nothing when it is absent.
//! - `{{#NAME}}...{{/NAME}}` renders its body only when `NAME` is present and non-empty.
//! - `{{^NAME}}...{{/NAME}}` renders its body only when `NAME` is absent or empty.
//!
//! Anything else between braces, unclosed sections and stray closing tags are
//! copied to the output unchanged. Rendering never fails.

use std::collections::BTreeMap;

/// Ordered bag of template variables.
///
/// A variable is either absent or present with a (possibly empty) value.
/// Both absent and empty values are falsy for section purposes, but only a
/// present variable is reported by [`TemplateVars::contains`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    values: BTreeMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets `name` only when `value` is `Some`.
    pub fn set_opt(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    /// Sets `name` to `"true"` when `on`, otherwise leaves it absent.
    pub fn set_flag(&mut self, name: impl Into<String>, on: bool) -> &mut Self {
        if on {
            self.set(name, "true");
        }
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// True when `name` is present with a non-empty value.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Renders `template` against `vars`.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    Template::parse(template).render(vars)
}

/// A parsed template, reusable across renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'a> {
    nodes: Vec<Node<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node<'a> {
    Text(&'a str),
    Var(&'a str),
    Section {
        name: &'a str,
        inverted: bool,
        body: Vec<Node<'a>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Var(&'a str),
    Open { name: &'a str, inverted: bool, raw: &'a str },
    Close { name: &'a str, raw: &'a str },
}

impl<'a> Template<'a> {
    pub fn parse(source: &'a str) -> Self {
        let tokens = tokenize(source);
        Self {
            nodes: build(&tokens),
        }
    }

    pub fn render(&self, vars: &TemplateVars) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, vars, &mut out);
        out
    }
}

fn render_nodes(nodes: &[Node<'_>], vars: &TemplateVars, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => out.push_str(vars.get(name).unwrap_or_default()),
            Node::Section {
                name,
                inverted,
                body,
            } => {
                if vars.is_truthy(name) != *inverted {
                    render_nodes(body, vars, out);
                }
            }
        }
    }
}

/// Variable names are ASCII letters, digits, `_`, `-` and `.`.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let tag_end = open + 2 + close + 2;
        if open > 0 {
            tokens.push(Token::Text(&source[offset..offset + open]));
        }
        let raw = &source[offset + open..offset + tag_end];
        tokens.push(classify(raw));
        offset += tag_end;
        rest = &source[offset..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn classify(raw: &str) -> Token<'_> {
    let inner = raw[2..raw.len() - 2].trim();
    let (sigil, name) = match inner.as_bytes().first() {
        Some(b'#' | b'^' | b'/') => (Some(inner.as_bytes()[0]), inner[1..].trim()),
        _ => (None, inner),
    };
    if !valid_name(name) {
        return Token::Text(raw);
    }
    match sigil {
        Some(b'#') => Token::Open {
            name,
            inverted: false,
            raw,
        },
        Some(b'^') => Token::Open {
            name,
            inverted: true,
            raw,
        },
        Some(_) => Token::Close { name, raw },
        None => Token::Var(name),
    }
}

/// Index of the tag closing the section opened at `tokens[0]`, counting
/// nested sections of the same name.
fn matching_close(tokens: &[Token<'_>], name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(1) {
        match token {
            Token::Open { name: n, .. } if *n == name => depth += 1,
            Token::Close { name: n, .. } if *n == name => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

fn build<'a>(tokens: &[Token<'a>]) -> Vec<Node<'a>> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Var(name) => nodes.push(Node::Var(name)),
            Token::Open {
                name,
                inverted,
                raw,
            } => match matching_close(&tokens[i..], name) {
                Some(close) => {
                    let body = build(&tokens[i + 1..i + close]);
                    nodes.push(Node::Section {
                        name,
                        inverted,
                        body,
                    });
                    i += close;
                }
                None => nodes.push(Node::Text(raw)),
            },
            Token::Close { raw, .. } => nodes.push(Node::Text(raw)),
        }
        i += 1;
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs.iter().copied().collect()
    }

    #[test]
    fn substitutes_variables() {
        let out = render("Hi {{NAME}}, thanks!", &vars(&[("NAME", "Ana")]));
        assert_eq!(out, "Hi Ana, thanks!");
    }

    #[test]
    fn missing_variable_renders_empty() {
        assert_eq!(render("[{{MISSING}}]", &TemplateVars::new()), "[]");
    }

    #[test]
    fn exactly_one_branch_renders() {
        let template = "{{#X}}a{{/X}}{{^X}}b{{/X}}";
        assert_eq!(render(template, &vars(&[("X", "v")])), "a");
        assert_eq!(render(template, &TemplateVars::new()), "b");
        assert_eq!(render(template, &vars(&[("X", "")])), "b");
    }

    #[test]
    fn variables_resolve_inside_sections() {
        let template = "{{#PHONE}}Call us at {{PHONE}} ({{NAME}}).{{/PHONE}}";
        let out = render(template, &vars(&[("PHONE", "555-0100"), ("NAME", "Cafe")]));
        assert_eq!(out, "Call us at 555-0100 (Cafe).");
    }

    #[test]
    fn nested_sections() {
        let template = "{{#A}}A{{#B}}B{{/B}}{{^B}}!B{{/B}}{{/A}}";
        assert_eq!(render(template, &vars(&[("A", "1"), ("B", "1")])), "AB");
        assert_eq!(render(template, &vars(&[("A", "1")])), "A!B");
        assert_eq!(render(template, &vars(&[("B", "1")])), "");
    }

    #[test]
    fn same_name_nesting_counts_depth() {
        let template = "{{#A}}x{{#A}}y{{/A}}z{{/A}}";
        assert_eq!(render(template, &vars(&[("A", "1")])), "xyz");
        assert_eq!(render(template, &TemplateVars::new()), "");
    }

    #[test]
    fn sections_need_not_balance_across_names() {
        // B opens inside A but closes outside it, so B stays literal.
        let template = "{{#A}}a{{#B}}b{{/A}}c{{/B}}";
        let out = render(template, &vars(&[("A", "1"), ("B", "1")]));
        assert_eq!(out, "a{{#B}}bc{{/B}}");
    }

    #[test]
    fn unknown_directives_are_verbatim() {
        let template = "{{! note }} {{> partial}} {{two words}} {{}}";
        assert_eq!(render(template, &TemplateVars::new()), template);
    }

    #[test]
    fn unclosed_section_and_stray_close_are_verbatim() {
        let out = render("{{#OPEN}}text {{/OTHER}}", &vars(&[("OPEN", "1")]));
        assert_eq!(out, "{{#OPEN}}text {{/OTHER}}");
    }

    #[test]
    fn unterminated_braces_are_verbatim() {
        assert_eq!(render("Hello {{NAME", &vars(&[("NAME", "x")])), "Hello {{NAME");
    }

    #[test]
    fn whitespace_inside_tags_is_ignored() {
        let out = render("{{# X }}[{{ X }}]{{/ X }}", &vars(&[("X", "v")]));
        assert_eq!(out, "[v]");
    }

    #[test]
    fn substituted_values_are_not_reinterpreted() {
        let out = render("{{A}}", &vars(&[("A", "{{B}}"), ("B", "boom")]));
        assert_eq!(out, "{{B}}");
    }

    #[test]
    fn present_empty_differs_from_absent() {
        let mut v = TemplateVars::new();
        v.set("EMPTY", "");
        assert!(v.contains("EMPTY"));
        assert!(!v.is_truthy("EMPTY"));
        assert!(!v.contains("ABSENT"));
    }

    #[test]
    fn parsed_template_is_reusable() {
        let template = Template::parse("{{#N}}n={{N}}{{/N}}{{^N}}none{{/N}}");
        assert_eq!(template.render(&vars(&[("N", "1")])), "n=1");
        assert_eq!(template.render(&TemplateVars::new()), "none");
    }

    proptest::proptest! {
        #[test]
        fn text_without_braces_is_identity(text in "[^{}]*") {
            proptest::prop_assert_eq!(render(&text, &TemplateVars::new()), text);
        }

        #[test]
        fn branches_are_mutually_exclusive(value in "[a-z]{0,4}") {
            let out = render("{{#X}}a{{/X}}{{^X}}b{{/X}}", &vars(&[("X", value.as_str())]));
            let expected = if value.is_empty() { "b" } else { "a" };
            proptest::prop_assert_eq!(out, expected);
        }
    }
}
