//! Flatten pulldown-cmark events into a story token stream.
//!
//! The reducer in [`crate::parser`] only needs a handful of token kinds, each
//! with its byte span and the containers (blockquote, list item) it sits in.
//! Emphasis markers are kept as literal text so author formatting survives a
//! round trip, and block ends become [`Token::Break`].

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Marker comment written above generated flowcharts.
pub const FLOWCHART_SENTINEL: &str = "<!-- This chart is autogenerated -->";

/// Fence info string of generated flowcharts.
pub const FLOWCHART_INFO: &str = "mermaid";

/// A story token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A heading with its text and an optional `<!--- #id -->` anchor.
    Heading {
        /// Heading level, 1 to 6.
        level: u8,
        /// Heading text without the anchor comment.
        text: String,
        /// Explicit section id.
        anchor: Option<String>,
    },
    /// Running text.
    Text(String),
    /// A soft or hard line break inside a block.
    SoftBreak,
    /// The end of a block.
    Break,
    /// An image.
    Image {
        /// Alt text.
        alt: String,
        /// Image location.
        url: String,
    },
    /// A link.
    Link {
        /// Link text.
        text: String,
        /// Link target.
        href: String,
    },
    /// Inline code: condition markers and navigation.
    Code(String),
    /// A fenced code block other than a flowchart.
    Fence {
        /// Info string after the opening fence.
        info: String,
        /// Block content.
        content: String,
    },
    /// The body of a `<!--- ... -->` comment.
    Comment(String),
}

/// Enclosing containers of a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Container {
    /// Inside a blockquote.
    pub blockquote: bool,
    /// Inside a list item.
    pub list_item: bool,
}

/// A token with its source span and containers.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token.
    pub token: Token,
    /// Byte range in the source.
    pub span: Range<usize>,
    /// Enclosing containers.
    pub container: Container,
}

/// Whether raw HTML is a story comment (`<!---`, three dashes).
pub fn is_comment(html: &str) -> bool {
    html.trim_start().starts_with("<!---")
}

/// The body of a story comment.
pub fn comment_body(html: &str) -> String {
    let html = html.trim();
    let body = html.strip_prefix("<!").unwrap_or(html);
    let body = body.strip_prefix("---").or_else(|| body.strip_prefix("--")).unwrap_or(body);
    let body = body.strip_suffix("-->").unwrap_or(body);
    body.trim().to_string()
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct HeadingBuf {
    level: u8,
    text: String,
    anchor: Option<String>,
    start: usize,
}

struct InlineBuf {
    text: String,
    target: String,
    start: usize,
}

struct CodeBlockBuf {
    info: Option<String>,
    content: String,
    start: usize,
}

#[derive(Default)]
struct Flattener<'a> {
    source: &'a str,
    tokens: Vec<Lexeme>,
    blockquotes: usize,
    list_items: usize,
    heading: Option<HeadingBuf>,
    link: Option<InlineBuf>,
    image: Option<InlineBuf>,
    code_block: Option<CodeBlockBuf>,
    html_block: Option<(String, usize)>,
}

impl<'a> Flattener<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    fn container(&self) -> Container {
        Container {
            blockquote: self.blockquotes > 0,
            list_item: self.list_items > 0,
        }
    }

    fn push(&mut self, token: Token, span: Range<usize>) {
        let container = self.container();
        self.tokens.push(Lexeme {
            token,
            span,
            container,
        });
    }

    fn push_break(&mut self, span: Range<usize>) {
        if !matches!(self.tokens.last(), Some(Lexeme { token: Token::Break, .. })) {
            self.push(Token::Break, span);
        }
    }

    /// Route inline text to whatever is collecting it.
    fn text(&mut self, text: &str, span: Range<usize>) {
        if let Some(image) = &mut self.image {
            image.text.push_str(text);
        } else if let Some(link) = &mut self.link {
            link.text.push_str(text);
        } else if let Some(heading) = &mut self.heading {
            heading.text.push_str(text);
        } else if let Some(Lexeme {
            token: Token::Text(prev),
            span: prev_span,
            ..
        }) = self.tokens.last_mut()
        {
            prev.push_str(text);
            prev_span.end = span.end;
        } else {
            self.push(Token::Text(text.to_string()), span);
        }
    }

    fn html(&mut self, html: &str, span: Range<usize>) {
        if let Some(heading) = &mut self.heading {
            if is_comment(html) {
                let body = comment_body(html);
                if let Some(id) = body.strip_prefix('#') {
                    heading.anchor = Some(id.trim().to_string());
                }
            }
            return;
        }
        let trimmed = html.trim();
        if trimmed == FLOWCHART_SENTINEL {
            return;
        }
        if is_comment(trimmed) {
            self.push(Token::Comment(comment_body(trimmed)), span);
        }
    }

    fn marker(&mut self, span: &Range<usize>, len: usize, at_start: bool) {
        let range = if at_start {
            span.start..(span.start + len).min(span.end)
        } else {
            span.end.saturating_sub(len).max(span.start)..span.end
        };
        if let Some(marker) = self.source.get(range.clone()) {
            self.text(marker, range);
        }
    }

    fn event(&mut self, event: Event<'_>, span: Range<usize>) {
        if let Some(block) = &mut self.code_block {
            match event {
                Event::Text(text) => block.content.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = self.code_block.take() {
                        let span = block.start..span.end;
                        if let Some(info) = block.info
                            && info != FLOWCHART_INFO
                        {
                            self.push(
                                Token::Fence {
                                    info,
                                    content: block.content,
                                },
                                span.clone(),
                            );
                        }
                        self.push_break(span);
                    }
                }
                _ => {}
            }
            return;
        }

        if self.html_block.is_some() {
            match event {
                Event::Html(html) => {
                    if let Some((buf, _)) = &mut self.html_block {
                        buf.push_str(&html);
                    }
                }
                Event::End(TagEnd::HtmlBlock) => {
                    if let Some((html, start)) = self.html_block.take() {
                        self.html(&html, start..span.end);
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(Tag::HtmlBlock) => self.html_block = Some((String::new(), span.start)),
            Event::Start(Tag::Heading { level, .. }) => {
                self.heading = Some(HeadingBuf {
                    level: heading_level(level),
                    text: String::new(),
                    anchor: None,
                    start: span.start,
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = self.heading.take() {
                    self.push(
                        Token::Heading {
                            level: heading.level,
                            text: heading.text.trim().to_string(),
                            anchor: heading.anchor,
                        },
                        heading.start..span.end,
                    );
                }
            }
            Event::Start(Tag::BlockQuote { .. }) => self.blockquotes += 1,
            Event::End(TagEnd::BlockQuote { .. }) => {
                self.push_break(span);
                self.blockquotes = self.blockquotes.saturating_sub(1);
            }
            Event::Start(Tag::Item) => self.list_items += 1,
            Event::End(TagEnd::Item) => {
                self.push_break(span);
                self.list_items = self.list_items.saturating_sub(1);
            }
            Event::End(TagEnd::Paragraph) => self.push_break(span),
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => Some(info.trim().to_string()),
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some(CodeBlockBuf {
                    info,
                    content: String::new(),
                    start: span.start,
                });
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some(InlineBuf {
                    text: String::new(),
                    target: dest_url.to_string(),
                    start: span.start,
                });
            }
            Event::End(TagEnd::Image) => {
                if let Some(image) = self.image.take() {
                    self.push(
                        Token::Image {
                            alt: image.text,
                            url: image.target,
                        },
                        image.start..span.end,
                    );
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.link = Some(InlineBuf {
                    text: String::new(),
                    target: dest_url.to_string(),
                    start: span.start,
                });
            }
            Event::End(TagEnd::Link) => {
                if let Some(link) = self.link.take() {
                    self.push(
                        Token::Link {
                            text: link.text,
                            href: link.target,
                        },
                        link.start..span.end,
                    );
                }
            }
            Event::Start(Tag::Emphasis) => self.marker(&span, 1, true),
            Event::End(TagEnd::Emphasis) => self.marker(&span, 1, false),
            Event::Start(Tag::Strong) => self.marker(&span, 2, true),
            Event::End(TagEnd::Strong) => self.marker(&span, 2, false),
            Event::Start(Tag::Strikethrough) => self.marker(&span, 2, true),
            Event::End(TagEnd::Strikethrough) => self.marker(&span, 2, false),
            Event::Text(text) => self.text(&text, span),
            Event::Code(code) => {
                if self.heading.is_some() || self.link.is_some() || self.image.is_some() {
                    self.text(&code, span);
                } else {
                    self.push(Token::Code(code.to_string()), span);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if self.heading.is_some() || self.link.is_some() || self.image.is_some() {
                    self.text(" ", span);
                } else {
                    self.push(Token::SoftBreak, span);
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html, span),
            _ => {}
        }
    }
}

/// Tokenize a story document.
pub fn lex(source: &str) -> Vec<Lexeme> {
    let mut flattener = Flattener::new(source);
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    for (event, span) in parser.into_offset_iter() {
        flattener.event(event, span);
    }
    flattener.tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        lex(source).into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn heading_with_anchor() {
        assert_eq!(
            tokens("### The Cave <!--- #cave -->"),
            vec![Token::Heading {
                level: 3,
                text: "The Cave".into(),
                anchor: Some("cave".into()),
            }]
        );
    }

    #[test]
    fn paragraph_lines() {
        assert_eq!(
            tokens("textB1 textB2\ntestC1 testC2"),
            vec![
                Token::Text("textB1 textB2".into()),
                Token::SoftBreak,
                Token::Text("testC1 testC2".into()),
                Token::Break,
            ]
        );
    }

    #[test]
    fn text_fragments_merge() {
        assert_eq!(
            tokens("4+[d1] < 4 and *very* so"),
            vec![Token::Text("4+[d1] < 4 and *very* so".into()), Token::Break]
        );
    }

    #[test]
    fn image_and_comment() {
        assert_eq!(
            tokens("![imagetext](url)<!--- great image -->"),
            vec![
                Token::Image {
                    alt: "imagetext".into(),
                    url: "url".into(),
                },
                Token::Comment("great image".into()),
                Token::Break,
            ]
        );
    }

    #[test]
    fn multi_line_comment() {
        let lexemes = lex("<!--- first line\nsecond line -->\n\ntext");
        assert_eq!(lexemes[0].token, Token::Comment("first line\nsecond line".into()));
        assert_eq!(lexemes[1].token, Token::Text("text".into()));
    }

    #[test]
    fn containers_are_tracked() {
        let lexemes = lex("> quoted\n\n- item");
        let quoted = &lexemes[0];
        assert_eq!(quoted.token, Token::Text("quoted".into()));
        assert!(quoted.container.blockquote);
        let item = lexemes
            .iter()
            .find(|l| l.token == Token::Text("item".into()))
            .unwrap();
        assert!(item.container.list_item);
        assert!(!item.container.blockquote);
    }

    #[test]
    fn fences_and_flowcharts() {
        let source = "```\n{a: 1}\n```\n\n<!-- This chart is autogenerated -->\n```mermaid\nflowchart TD\n```\n";
        assert_eq!(
            tokens(source),
            vec![
                Token::Fence {
                    info: String::new(),
                    content: "{a: 1}\n".into(),
                },
                Token::Break,
            ]
        );
    }

    #[test]
    fn inline_code_and_links() {
        assert_eq!(
            tokens("`1=1 {`\n\n- [Go](#cave)"),
            vec![
                Token::Code("1=1 {".into()),
                Token::Break,
                Token::Link {
                    text: "Go".into(),
                    href: "#cave".into(),
                },
                Token::Break,
            ]
        );
    }

    #[test]
    fn comment_bodies() {
        assert!(is_comment("<!--- note -->"));
        assert!(!is_comment("<!-- note -->"));
        assert_eq!(comment_body("<!--- note -->"), "note");
        assert_eq!(comment_body("<!--- #id -->"), "#id");
    }
}
