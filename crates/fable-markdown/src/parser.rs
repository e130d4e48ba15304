//! Reduce the token stream into a [`Story`].
//!
//! A single left-to-right pass over the lexemes with one token of lookahead
//! for paragraphs and a scan ahead to the next inline code span for
//! condition frames. Recoverable author errors stay inline on the affected
//! part and are also reported as [`Diagnostic`]s.

use std::collections::HashMap;
use std::ops::Range;

use fable_core::{
    Action, Comment, Condition, Header, Image, Link, Navigation, Paragraph, ParagraphVariant,
    Part, Section, State, Story,
};

use crate::config::{Dialect, ParserConfig};
use crate::diagnostics::{Diagnostic, Severity};
use crate::lexer::{Container, Lexeme, Token, lex};

/// Error text carried by conditions whose marker could not be parsed.
pub const CONDITION_ERROR: &str = "Could not parse condition";

/// Prefix of action error messages, also used to strip them on re-parse.
pub const JSON5_ERROR_PREFIX: &str = "JSON5:";

/// Result of parsing a story document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The story, complete even when diagnostics contain errors.
    pub story: Story,
    /// Errors and warnings in source order of discovery.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Parse a story document.
pub fn parse_with(source: &str, config: &ParserConfig) -> ParseResult {
    let lexemes = lex(source);
    tracing::trace!(tokens = lexemes.len(), "lexed story document");
    let mut reducer = Reducer::new(config.dialect);
    reducer.run(&lexemes);
    reducer.finish()
}

/// What an inline code span means.
#[derive(Debug, Clone, PartialEq)]
enum Marker<'a> {
    Navigation(Navigation),
    Open(&'a str),
    Else,
    Close,
    Other,
}

fn parse_navigation(code: &str) -> Option<Navigation> {
    let rest = code.strip_prefix("->")?;
    let rest = match rest.chars().next() {
        Some(c) if c.is_whitespace() => &rest[c.len_utf8()..],
        _ => rest,
    };
    let rest = rest.strip_prefix('[')?;
    let close = rest.find(']')?;
    let text = &rest[..close];
    let rest = rest[close + 1..].strip_prefix('(')?;
    let end = rest.find(')')?;
    Some(Navigation {
        text: text.to_string(),
        target: rest[..end].to_string(),
    })
}

fn is_else_marker(code: &str) -> bool {
    code.chars().filter(|c| !c.is_whitespace()).eq("}:{".chars())
}

/// Whether inline code opens a condition frame.
pub(crate) fn is_open_marker(code: &str) -> bool {
    !is_else_marker(code) && code.trim_end().ends_with('{')
}

fn classify(code: &str) -> Marker<'_> {
    if let Some(navigation) = parse_navigation(code) {
        Marker::Navigation(navigation)
    } else if is_else_marker(code) {
        Marker::Else
    } else if is_open_marker(code) {
        let trimmed = code.trim_end();
        Marker::Open(trimmed[..trimmed.len() - 1].trim())
    } else if code.trim_end().ends_with('}') {
        Marker::Close
    } else {
        Marker::Other
    }
}

fn strip_json5_errors(content: &str) -> String {
    content
        .split_inclusive('\n')
        .filter(|line| !line.starts_with(JSON5_ERROR_PREFIX))
        .collect()
}

fn variant(container: Container) -> Option<ParagraphVariant> {
    if container.blockquote {
        Some(ParagraphVariant::Blockquote)
    } else if container.list_item {
        Some(ParagraphVariant::Citation)
    } else {
        None
    }
}

/// An open condition and the branch currently collecting parts.
struct ConditionFrame {
    condition: Condition,
    in_false: bool,
    span: Range<usize>,
}

impl ConditionFrame {
    fn branch(&mut self) -> &mut Vec<Part> {
        if self.in_false {
            &mut self.condition.when_false
        } else {
            &mut self.condition.when_true
        }
    }
}

struct Reducer {
    dialect: Dialect,
    title: Option<String>,
    description: Vec<Part>,
    sections: Vec<Section>,
    current: Option<Section>,
    paragraph: Option<Paragraph>,
    frame: Option<ConditionFrame>,
    section_spans: HashMap<String, Range<usize>>,
    link_targets: Vec<(String, Range<usize>)>,
    diagnostics: Vec<Diagnostic>,
}

impl Reducer {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            title: None,
            description: Vec::new(),
            sections: Vec::new(),
            current: None,
            paragraph: None,
            frame: None,
            section_spans: HashMap::new(),
            link_targets: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(&mut self, lexemes: &[Lexeme]) {
        let mut skip_next = false;
        for (i, lexeme) in lexemes.iter().enumerate() {
            if skip_next {
                skip_next = false;
                continue;
            }
            let next = lexemes.get(i + 1);

            match &lexeme.token {
                Token::Heading {
                    level,
                    text,
                    anchor,
                } => self.heading(*level, text, anchor.as_deref(), &lexeme.span),
                Token::Text(text) => match &mut self.paragraph {
                    Some(paragraph) => paragraph.text.push_str(text),
                    None => {
                        self.paragraph = Some(Paragraph {
                            text: text.clone(),
                            variant: variant(lexeme.container),
                        });
                    }
                },
                Token::SoftBreak => {
                    if let Some(paragraph) = &mut self.paragraph
                        && matches!(next.map(|n| &n.token), Some(Token::Text(_)))
                    {
                        paragraph.text.push('\n');
                    }
                }
                Token::Break => {}
                Token::Image { alt, url } => {
                    let description = match next.map(|n| &n.token) {
                        Some(Token::Comment(text)) => {
                            skip_next = true;
                            Some(text.clone())
                        }
                        _ => None,
                    };
                    self.emit(Part::Image(Image {
                        text: alt.clone(),
                        url: (!url.is_empty()).then(|| url.clone()),
                        description,
                    }));
                }
                Token::Link { text, href } => {
                    self.link_targets.push((href.clone(), lexeme.span.clone()));
                    self.emit(Part::Link(Link {
                        text: text.clone(),
                        target: href.clone(),
                        key: None,
                    }));
                }
                Token::Code(code) => self.code(code, &lexeme.span, &lexemes[i + 1..]),
                Token::Fence { content, .. } => {
                    let action = self.action(content, &lexeme.span);
                    self.emit(action);
                }
                Token::Comment(text) => self.emit(Part::Comment(Comment { text: text.clone() })),
            }

            let after = lexemes.get(if skip_next { i + 2 } else { i + 1 });
            if !matches!(after.map(|n| &n.token), Some(Token::Text(_) | Token::SoftBreak)) {
                self.flush_paragraph();
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if let Some(mut paragraph) = self.paragraph.take() {
            let trimmed = paragraph.text.trim();
            if !trimmed.is_empty() {
                paragraph.text = trimmed.to_string();
                self.emit(Part::Paragraph(paragraph));
            }
        }
    }

    /// Route a part to the open frame, the current section or the description.
    fn emit(&mut self, part: Part) {
        if let Some(frame) = &mut self.frame {
            frame.branch().push(part);
        } else if let Some(section) = &mut self.current {
            section.parts.push(part);
        } else {
            self.description.push(part);
        }
    }

    fn close_frame(&mut self, reason: &str) {
        if let Some(frame) = self.frame.take() {
            tracing::debug!(condition = %frame.condition.condition, reason, "closing condition frame");
            self.diagnostics.push(
                Diagnostic::warning(frame.span.clone(), format!("condition {reason}"))
                    .with_label("opened here"),
            );
            self.emit(Part::Condition(frame.condition));
        }
    }

    fn finish_section(&mut self) {
        if let Some(section) = self.current.take() {
            self.sections.push(section);
        }
    }

    fn heading(&mut self, level: u8, text: &str, anchor: Option<&str>, span: &Range<usize>) {
        self.flush_paragraph();
        self.close_frame("is not closed before the next heading");

        if level == 1 {
            if self.title.is_some() {
                self.diagnostics
                    .push(Diagnostic::warning(span.clone(), "story title is set more than once"));
            }
            self.finish_section();
            self.title = Some(text.to_string());
            return;
        }

        if !self.dialect.starts_section(level) {
            self.emit(Part::Header(Header {
                text: text.to_string(),
            }));
            return;
        }

        self.finish_section();
        let mut section = Section::new(text);
        if let Some(id) = anchor.filter(|id| !id.is_empty()) {
            section.id = id.to_string();
        }
        if let Some(first) = self.section_spans.get(&section.id) {
            self.diagnostics.push(
                Diagnostic::warning(span.clone(), format!("duplicate section id `{}`", section.id))
                    .with_label("declared again here")
                    .with_related(first.clone(), "first declared here"),
            );
        } else {
            self.section_spans.insert(section.id.clone(), span.clone());
        }
        tracing::trace!(id = %section.id, level, "section");

        if level == 2 && self.dialect == Dialect::Chapter {
            section.parts.push(Part::Header(Header {
                text: text.to_string(),
            }));
        }
        self.current = Some(section);
    }

    fn code(&mut self, code: &str, span: &Range<usize>, rest: &[Lexeme]) {
        let marker = classify(code);
        if let Marker::Navigation(navigation) = marker {
            self.link_targets
                .push((navigation.target.clone(), span.clone()));
            self.emit(Part::Navigation(navigation));
            return;
        }

        let next_code = rest.iter().find_map(|l| match &l.token {
            Token::Code(code) => Some(code.as_str()),
            _ => None,
        });
        let next_opens = next_code.is_some_and(is_open_marker);
        let is_close = marker == Marker::Close;

        match marker {
            Marker::Open(expression) => {
                self.close_frame("is not closed before the next condition");
                let mut condition = Condition {
                    condition: expression.to_string(),
                    ..Condition::default()
                };
                if expression.is_empty() {
                    condition.error = Some(CONDITION_ERROR.to_string());
                    condition.markdown = Some(code.to_string());
                    self.diagnostics.push(
                        Diagnostic::error(span.clone(), "condition has no expression")
                            .with_label("expected an expression before `{`"),
                    );
                }
                self.frame = Some(ConditionFrame {
                    condition,
                    in_false: false,
                    span: span.clone(),
                });
            }
            Marker::Else => {
                if let Some(frame) = &mut self.frame {
                    let repeated = frame.in_false;
                    frame.in_false = true;
                    if repeated {
                        self.diagnostics.push(Diagnostic::warning(
                            span.clone(),
                            "condition already has an else branch",
                        ));
                    }
                } else {
                    self.stray_marker(code, span);
                }
            }
            Marker::Close => {
                if self.frame.is_none() {
                    self.stray_marker(code, span);
                }
            }
            Marker::Other => {
                self.diagnostics.push(
                    Diagnostic::warning(span.clone(), "inline code is not a condition marker")
                        .with_label("expected `expression {`, `}:{` or `}`"),
                );
                self.emit(Part::Condition(Condition {
                    error: Some(CONDITION_ERROR.to_string()),
                    markdown: Some(code.to_string()),
                    ..Condition::default()
                }));
            }
            Marker::Navigation(_) => {}
        }

        if is_close || next_code.is_none() || next_opens {
            if is_close {
                if let Some(frame) = self.frame.take() {
                    self.emit(Part::Condition(frame.condition));
                }
            } else {
                self.close_frame("has no closing `}`");
            }
        }
    }

    fn stray_marker(&mut self, code: &str, span: &Range<usize>) {
        self.diagnostics.push(
            Diagnostic::error(span.clone(), format!("`{code}` does not belong to a condition"))
                .with_label("no condition is open here"),
        );
        self.emit(Part::Condition(Condition {
            error: Some(CONDITION_ERROR.to_string()),
            markdown: Some(code.to_string()),
            ..Condition::default()
        }));
    }

    fn action(&mut self, content: &str, span: &Range<usize>) -> Part {
        let source = strip_json5_errors(content);
        match json5::from_str::<State>(&source) {
            Ok(state) => Part::action(state),
            Err(e) => {
                let message = e.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
                let error = format!("{JSON5_ERROR_PREFIX} {message}");
                self.diagnostics.push(
                    Diagnostic::error(span.clone(), error.clone())
                        .with_label("this block is not a JSON5 object"),
                );
                Part::Action(Action {
                    state: State::new(),
                    markdown: Some(source),
                    error: Some(error),
                    text: None,
                })
            }
        }
    }

    fn check_links(&mut self) {
        for (target, span) in &self.link_targets {
            if let Some(id) = target.strip_prefix('#')
                && !self.section_spans.contains_key(id)
            {
                self.diagnostics.push(Diagnostic::warning(
                    span.clone(),
                    format!("link target `{target}` matches no section"),
                ));
            }
        }
    }

    fn finish(mut self) -> ParseResult {
        self.flush_paragraph();
        self.close_frame("is not closed at the end of the story");
        self.finish_section();
        self.check_links();

        let mut settings = Action::default();
        if let Some(pos) = self
            .description
            .iter()
            .position(|p| matches!(p, Part::Action(_)))
            && let Part::Action(action) = self.description.remove(pos)
        {
            settings = action;
        }

        let mut story = Story {
            title: self.title.unwrap_or_default(),
            description: self.description,
            settings,
            sections: self.sections,
            images: Vec::new(),
        };
        story.index_images();
        tracing::debug!(
            sections = story.sections.len(),
            diagnostics = self.diagnostics.len(),
            "parsed story"
        );

        ParseResult {
            story,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use fable_core::Scalar;

    fn sections(source: &str) -> Vec<Section> {
        parse(source).sections
    }

    fn header_section(parts: Vec<Part>) -> Vec<Section> {
        vec![Section {
            id: "header".into(),
            heading: "Header".into(),
            parts,
        }]
    }

    fn condition(expr: &str, when_true: Vec<Part>, when_false: Vec<Part>) -> Part {
        Part::Condition(Condition {
            condition: expr.into(),
            when_true,
            when_false,
            ..Condition::default()
        })
    }

    fn quoted(text: &str, variant: ParagraphVariant) -> Part {
        Part::Paragraph(Paragraph {
            text: text.into(),
            variant: Some(variant),
        })
    }

    #[test]
    fn empty_section() {
        assert_eq!(sections("### Header"), header_section(vec![]));
    }

    #[test]
    fn title_and_description() {
        let story = parse("# Header\n\n test\n\n ### Subheader");
        assert_eq!(story.title, "Header");
        assert_eq!(story.description, vec![Part::paragraph("test")]);
        assert_eq!(story.sections, vec![Section::new("Subheader")]);
    }

    #[test]
    fn description_with_settings() {
        let story = parse("# Header\n\n test\n\n ```\n{\n\"a\": 2\n}\n``` \n\n ## Subheader");
        assert_eq!(story.description, vec![Part::paragraph("test")]);
        assert_eq!(story.settings, Action {
            state: State::new().with("a", 2),
            ..Action::default()
        });
        assert_eq!(
            story.sections,
            vec![Section::new("Subheader").with_part(Part::Header(Header {
                text: "Subheader".into()
            }))]
        );
    }

    #[test]
    fn content_before_any_heading_is_description() {
        let story = parse("Once upon a time.\n\n### Start");
        assert_eq!(story.title, "");
        assert_eq!(story.description, vec![Part::paragraph("Once upon a time.")]);
    }

    #[test]
    fn missing_settings_default_to_empty_action() {
        assert!(parse("# T\n\n### A").settings.is_empty());
    }

    #[test]
    fn explicit_section_id() {
        let story = parse("### The Cave <!--- #cave -->\n\ntext");
        assert_eq!(story.sections[0].id, "cave");
        assert_eq!(story.sections[0].heading, "The Cave");
    }

    #[test]
    fn images() {
        let image = |text: &str, url: &str, description: Option<&str>| {
            Part::Image(Image {
                text: text.into(),
                url: Some(url.into()),
                description: description.map(Into::into),
            })
        };
        assert_eq!(
            sections("### Header\n![imagetext](url)"),
            header_section(vec![image("imagetext", "url", None)])
        );
        assert_eq!(
            sections("### Header\n![imagetext](url)<!--- great image -->"),
            header_section(vec![image("imagetext", "url", Some("great image"))])
        );
        assert_eq!(
            sections("### Header\n![imagetext](url)<!--- great image -->![imagetext2](url2)"),
            header_section(vec![
                image("imagetext", "url", Some("great image")),
                image("imagetext2", "url2", None),
            ])
        );
    }

    #[test]
    fn images_are_indexed_inside_conditions() {
        let story = parse("### A\n\n![one](1)\n\n`x {`\n\n![two](2)\n\n`}`");
        let texts: Vec<_> = story.images.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn paragraphs() {
        assert_eq!(
            sections("### Header\ntextA\n\ntextB1 textB2\ntestC1 testC2"),
            header_section(vec![
                Part::paragraph("textA"),
                Part::paragraph("textB1 textB2\ntestC1 testC2"),
            ])
        );
    }

    #[test]
    fn blockquote_and_citation() {
        assert_eq!(
            sections("### Header\n>text"),
            header_section(vec![quoted("text", ParagraphVariant::Blockquote)])
        );
        assert_eq!(
            sections("### Header\n\n - text"),
            header_section(vec![quoted("text", ParagraphVariant::Citation)])
        );
    }

    #[test]
    fn emphasis_is_kept_literally() {
        assert_eq!(
            sections("### Header\n\nA *bold* ~~move~~ **indeed**"),
            header_section(vec![Part::paragraph("A *bold* ~~move~~ **indeed**")])
        );
    }

    #[test]
    fn actions() {
        let expected = |state: State| header_section(vec![Part::action(state)]);
        assert_eq!(
            sections("### Header\n```\n{\"test\": 1}\n```"),
            expected(State::new().with("test", 1))
        );
        assert_eq!(
            sections("### Header\n```json\n{\"test\": 1}\n```"),
            expected(State::new().with("test", 1))
        );
        assert_eq!(
            sections("### Header\n```\n{test: 1, // comment \n}\n```"),
            expected(State::new().with("test", 1))
        );
        assert_eq!(
            sections("### Header\n```\n {\"rollVarableD10\": \"[{strength}d10]\"\n}\n```"),
            expected(State::new().with("rollVarableD10", "[{strength}d10]"))
        );
    }

    #[test]
    fn nested_action_state() {
        let story = parse("### Header\n```\n{bag: {rope: 2}}\n```");
        let Part::Action(action) = &story.sections[0].parts[0] else {
            panic!("expected an action");
        };
        assert_eq!(action.state.lookup("bag.rope"), Some(&Scalar::Number(2.0)));
    }

    #[test]
    fn array_action_values_are_indexed() {
        let result = parse_with("### Header\n```\n{fruits: ['apple', 'pear']}\n```", &ParserConfig::default());
        assert!(!result.has_errors());
        let Part::Action(action) = &result.story.sections[0].parts[0] else {
            panic!("expected an action");
        };
        assert_eq!(action.state.lookup("fruits.1"), Some(&Scalar::Text("pear".into())));
    }

    #[test]
    fn malformed_action_keeps_source() {
        let result = parse_with("### Header\n```\n{faulty}}\n```", &ParserConfig::default());
        let Part::Action(action) = &result.story.sections[0].parts[0] else {
            panic!("expected an action");
        };
        assert!(action.state.is_empty());
        assert_eq!(action.markdown.as_deref(), Some("{faulty}}\n"));
        let error = action.error.as_deref().unwrap();
        assert!(error.starts_with("JSON5:"));
        assert!(!error.contains('\n'));
        assert!(result.has_errors());
    }

    #[test]
    fn previous_json5_errors_are_stripped() {
        let story = parse("### Header\n```\n{a: 1}\nJSON5: old message\n```");
        assert_eq!(
            story.sections[0].parts,
            vec![Part::action(State::new().with("a", 1))]
        );
    }

    #[test]
    fn links() {
        assert_eq!(
            sections("### Header\n\n [text](#url)\n\n"),
            header_section(vec![Part::link("text", "#url")])
        );
        assert_eq!(
            sections("### Header\n\n - [text](#url)\n- [text2](/url2)"),
            header_section(vec![Part::link("text", "#url"), Part::link("text2", "/url2")])
        );
        assert_eq!(
            sections("### Header\n\n [text](#url)\ntext2"),
            header_section(vec![Part::link("text", "#url"), Part::paragraph("text2")])
        );
    }

    #[test]
    fn navigation() {
        assert_eq!(
            sections("### Header\n\n`->[Onwards](#next)`\n\n`-> [Again](#next)`"),
            header_section(vec![
                Part::navigation("Onwards", "#next"),
                Part::navigation("Again", "#next"),
            ])
        );
    }

    #[test]
    fn condition_one_text() {
        assert_eq!(
            sections("### Header\n `1=1 {`\n\n text\n\n `}`"),
            header_section(vec![condition("1=1", vec![Part::paragraph("text")], vec![])])
        );
    }

    #[test]
    fn condition_else_text() {
        assert_eq!(
            sections("### Header\n `1=1 {`\n\n textA\ntextB\n\n`}:{`\n\ntext2\n\n`}`"),
            header_section(vec![condition(
                "1=1",
                vec![Part::paragraph("textA\ntextB")],
                vec![Part::paragraph("text2")],
            )])
        );
    }

    #[test]
    fn condition_state() {
        assert_eq!(
            sections("### Header\n `1<2 {`\n ```\n{a:1}\n```\n`}`"),
            header_section(vec![condition(
                "1<2",
                vec![Part::action(State::new().with("a", 1))],
                vec![],
            )])
        );
        assert_eq!(
            sections("### Header\n `1=1{`\n text2\n ```\n{a:1}\n```\n`}`"),
            header_section(vec![condition(
                "1=1",
                vec![
                    Part::paragraph("text2"),
                    Part::action(State::new().with("a", 1)),
                ],
                vec![],
            )])
        );
    }

    #[test]
    fn condition_missing_end() {
        let result = parse_with("### Header\n `1=1{`\n text1\n\ntext2\n\n", &ParserConfig::default());
        assert_eq!(
            result.story.sections,
            header_section(vec![
                condition("1=1", vec![], vec![]),
                Part::paragraph("text1"),
                Part::paragraph("text2"),
            ])
        );
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Warning && d.message.contains("closing"))
        );
    }

    #[test]
    fn condition_followed_by_new_condition() {
        assert_eq!(
            sections("### Header\n `1=1{`\n text1\n\n`2=2{`\n\n`}`"),
            header_section(vec![
                condition("1=1", vec![], vec![]),
                Part::paragraph("text1"),
                condition("2=2", vec![], vec![]),
            ])
        );
    }

    #[test]
    fn condition_close() {
        assert_eq!(
            sections("### Header\n `1=1{`\n text1\n\ntext2\n`}`\n\ntext3"),
            header_section(vec![
                condition(
                    "1=1",
                    vec![Part::paragraph("text1"), Part::paragraph("text2")],
                    vec![],
                ),
                Part::paragraph("text3"),
            ])
        );
        assert_eq!(
            sections("### Header\n `1=1{`\n text1\n\n`}`\ntext3"),
            header_section(vec![
                condition("1=1", vec![Part::paragraph("text1")], vec![]),
                Part::paragraph("text3"),
            ])
        );
    }

    #[test]
    fn condition_with_spaced_else() {
        let markdown = "### Header\n\n `[d20] <= {agility} {`\n\n\
            You take a graceful jump over the fence\n\n\
            `}: {`\n\n\
            You stumble on the fence but manage to get over.\n\n\
            `}`";
        assert_eq!(
            sections(markdown),
            header_section(vec![condition(
                "[d20] <= {agility}",
                vec![Part::paragraph("You take a graceful jump over the fence")],
                vec![Part::paragraph("You stumble on the fence but manage to get over.")],
            )])
        );
    }

    #[test]
    fn consecutive_conditions_with_links() {
        let markdown = [
            "### Header",
            "`{dice}>=0 & {dice}<=2 {`",
            " - [Om du har pekat ut en siffra mellan 0 och 2,](#chapter-108)",
            " `}`",
            " `{dice}>=3 & {dice}<=9 {`",
            " - [Om siffran är mellan 3 och 9,](#chapter-25)",
            " `}`",
        ]
        .join("\n\n");
        assert_eq!(
            sections(&markdown),
            header_section(vec![
                condition(
                    "{dice}>=0 & {dice}<=2",
                    vec![Part::link(
                        "Om du har pekat ut en siffra mellan 0 och 2,",
                        "#chapter-108"
                    )],
                    vec![],
                ),
                condition(
                    "{dice}>=3 & {dice}<=9",
                    vec![Part::link("Om siffran är mellan 3 och 9,", "#chapter-25")],
                    vec![],
                ),
            ])
        );
    }

    #[test]
    fn navigation_inside_condition() {
        assert_eq!(
            sections("### Header\n\n`{hp} <= 0 {`\n\n`->[Fall](#end)`\n\n`}`"),
            header_section(vec![condition(
                "{hp} <= 0",
                vec![Part::navigation("Fall", "#end")],
                vec![],
            )])
        );
    }

    #[test]
    fn stray_markers() {
        let result = parse_with("### Header\n\n`}`", &ParserConfig::default());
        assert_eq!(
            result.story.sections[0].parts,
            vec![Part::Condition(Condition {
                error: Some(CONDITION_ERROR.into()),
                markdown: Some("}".into()),
                ..Condition::default()
            })]
        );
        assert!(result.has_errors());
    }

    #[test]
    fn plain_inline_code_is_kept() {
        let result = parse_with("### A\n\nUse `sword` now", &ParserConfig::default());
        assert_eq!(
            result.story.sections[0].parts,
            vec![
                Part::paragraph("Use"),
                Part::Condition(Condition {
                    error: Some(CONDITION_ERROR.into()),
                    markdown: Some("sword".into()),
                    ..Condition::default()
                }),
                Part::paragraph("now"),
            ]
        );
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn empty_condition_is_an_error() {
        let result = parse_with("### Header\n\n`{`\n\ntext\n\n`}`", &ParserConfig::default());
        let Part::Condition(condition) = &result.story.sections[0].parts[0] else {
            panic!("expected a condition");
        };
        assert_eq!(condition.error.as_deref(), Some(CONDITION_ERROR));
        assert_eq!(condition.markdown.as_deref(), Some("{"));
        assert_eq!(condition.when_true, vec![Part::paragraph("text")]);
        assert!(result.has_errors());
    }

    #[test]
    fn frame_closes_at_heading() {
        let result = parse_with(
            "### A\n\n`x {`\n\n`->[Go](#b)`\n\n### B\n\ntext",
            &ParserConfig::default(),
        );
        assert_eq!(
            result.story.sections[0].parts,
            vec![condition("x", vec![Part::navigation("Go", "#b")], vec![])]
        );
        assert_eq!(result.story.sections[1].parts, vec![Part::paragraph("text")]);
        assert!(!result.has_errors());
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn comments_become_parts() {
        assert_eq!(
            sections("### Header\n\n<!--- remember the key -->\n\ntext"),
            header_section(vec![
                Part::Comment(Comment {
                    text: "remember the key".into()
                }),
                Part::paragraph("text"),
            ])
        );
    }

    #[test]
    fn flowchart_block_is_ignored() {
        let story = parse(
            "### A\n\ntext\n\n<!-- This chart is autogenerated -->\n```mermaid\nflowchart TD\n```\n",
        );
        assert_eq!(story.sections[0].parts, vec![Part::paragraph("text")]);
    }

    #[test]
    fn chapter_dialect_sections() {
        let story = parse("## One\n\ntext\n\n#### Two");
        let ids: Vec<_> = story.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert_eq!(
            story.sections[0].parts,
            vec![
                Part::Header(Header { text: "One".into() }),
                Part::paragraph("text")
            ]
        );
    }

    #[test]
    fn scene_dialect_headers() {
        let config = ParserConfig::default().with_dialect(Dialect::Scene);
        let story = parse_with("## Prologue\n\n### Gate\n\n## Night falls\n\ntext", &config).story;
        assert_eq!(
            story.description,
            vec![Part::Header(Header {
                text: "Prologue".into()
            })]
        );
        assert_eq!(story.sections.len(), 1);
        assert_eq!(
            story.sections[0].parts,
            vec![
                Part::Header(Header {
                    text: "Night falls".into()
                }),
                Part::paragraph("text"),
            ]
        );
    }

    #[test]
    fn duplicate_ids_warn() {
        let result = parse_with("### Cave\n\n### Cave", &ParserConfig::default());
        assert_eq!(result.story.sections.len(), 2);
        assert!(result.diagnostics.iter().any(|d| d.message.contains("duplicate")));
        assert!(!result.has_errors());
    }

    #[test]
    fn unknown_link_targets_warn() {
        let result = parse_with("### A\n\n- [Go](#nowhere)\n- [Web](https://x.org)", &ParserConfig::default());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("#nowhere"));
    }

    #[test]
    fn markers_are_classified() {
        assert_eq!(classify("1=1 {"), Marker::Open("1=1"));
        assert_eq!(classify("}:{"), Marker::Else);
        assert_eq!(classify("} : {"), Marker::Else);
        assert_eq!(classify("}"), Marker::Close);
        assert_eq!(classify("sword"), Marker::Other);
        assert_eq!(
            classify("->[a](#b) trailing"),
            Marker::Navigation(Navigation {
                text: "a".into(),
                target: "#b".into()
            })
        );
    }
}
