//! Sanitized-HTML rendering as styled egui text.
//!
//! egui has no HTML engine, so the rendered view flattens a sanitized
//! fragment into blocks of styled spans: inline tags become text styling,
//! block tags become line breaks, `pre` becomes a code block. Everything
//! unrecognized just flows through as text, which is the right degradation
//! for a pastebin.

use eframe::egui::{self, Color32};
use scraper::node::Node;
use scraper::Html;

/// A styled run of text within one block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub underline: bool,
    pub strike: bool,
    pub link: Option<String>,
}

/// One visual block of the rendered fragment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MarkupBlock {
    Paragraph(Vec<TextSpan>),
    Heading(u8, Vec<TextSpan>),
    Bullet(Vec<TextSpan>),
    Quote(Vec<TextSpan>),
    CodeBlock(String),
    Rule,
}

/// Inherited styling while walking the fragment tree.
#[derive(Debug, Clone, Default)]
struct StyleCtx {
    bold: bool,
    italic: bool,
    code: bool,
    underline: bool,
    strike: bool,
    link: Option<String>,
    heading: Option<u8>,
    quote: bool,
    bullet: bool,
}

struct Walker {
    blocks: Vec<MarkupBlock>,
    current: Vec<TextSpan>,
}

impl Walker {
    fn flush(&mut self, ctx: &StyleCtx) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        let block = if let Some(level) = ctx.heading {
            MarkupBlock::Heading(level, spans)
        } else if ctx.bullet {
            MarkupBlock::Bullet(spans)
        } else if ctx.quote {
            MarkupBlock::Quote(spans)
        } else {
            MarkupBlock::Paragraph(spans)
        };
        self.blocks.push(block);
    }

    fn walk(&mut self, node: scraper::ego_tree::NodeRef<'_, Node>, ctx: &StyleCtx) {
        match node.value() {
            Node::Text(text) => {
                let text = text.text.to_string();
                if text.trim().is_empty() {
                    // Collapse inter-tag whitespace into a single space
                    if !self.current.is_empty() && !text.is_empty() {
                        self.current.push(TextSpan {
                            text: " ".to_string(),
                            bold: false,
                            italic: false,
                            code: false,
                            underline: false,
                            strike: false,
                            link: None,
                        });
                    }
                    return;
                }
                self.current.push(TextSpan {
                    text,
                    bold: ctx.bold,
                    italic: ctx.italic,
                    code: ctx.code,
                    underline: ctx.underline,
                    strike: ctx.strike,
                    link: ctx.link.clone(),
                });
            }
            Node::Element(element) => {
                let mut child_ctx = ctx.clone();
                let name = element.name();
                match name {
                    "b" | "strong" => child_ctx.bold = true,
                    "i" | "em" => child_ctx.italic = true,
                    "u" | "ins" => child_ctx.underline = true,
                    "s" | "del" | "strike" => child_ctx.strike = true,
                    "code" => child_ctx.code = true,
                    "a" => {
                        child_ctx.link = element.attr("href").map(|h| h.to_string());
                    }
                    "br" => {
                        self.flush(ctx);
                        return;
                    }
                    "hr" => {
                        self.flush(ctx);
                        self.blocks.push(MarkupBlock::Rule);
                        return;
                    }
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        self.flush(ctx);
                        child_ctx.heading =
                            Some(name.as_bytes()[1].saturating_sub(b'0'));
                        for child in node.children() {
                            self.walk(child, &child_ctx);
                        }
                        self.flush(&child_ctx);
                        return;
                    }
                    "p" | "div" | "section" | "article" | "ul" | "ol" | "table" | "tr" => {
                        self.flush(ctx);
                        for child in node.children() {
                            self.walk(child, &child_ctx);
                        }
                        self.flush(&child_ctx);
                        return;
                    }
                    "li" => {
                        self.flush(ctx);
                        child_ctx.bullet = true;
                        for child in node.children() {
                            self.walk(child, &child_ctx);
                        }
                        self.flush(&child_ctx);
                        return;
                    }
                    "blockquote" => {
                        self.flush(ctx);
                        child_ctx.quote = true;
                        for child in node.children() {
                            self.walk(child, &child_ctx);
                        }
                        self.flush(&child_ctx);
                        return;
                    }
                    "pre" => {
                        self.flush(ctx);
                        let text: String = scraper::ElementRef::wrap(node)
                            .map(|el| el.text().collect())
                            .unwrap_or_default();
                        self.blocks.push(MarkupBlock::CodeBlock(text));
                        return;
                    }
                    "img" => {
                        // Sanitized fragments may keep images; show them as
                        // links rather than fetching arbitrary sources.
                        if let Some(src) = element.attr("src") {
                            self.current.push(TextSpan {
                                text: "[image]".to_string(),
                                bold: ctx.bold,
                                italic: ctx.italic,
                                code: ctx.code,
                                underline: ctx.underline,
                                strike: ctx.strike,
                                link: Some(src.to_string()),
                            });
                        }
                        return;
                    }
                    _ => {}
                }
                for child in node.children() {
                    self.walk(child, &child_ctx);
                }
            }
            _ => {}
        }
    }
}

/// Flatten a sanitized fragment into renderable blocks.
pub(crate) fn blocks_from_markup(sanitized: &str) -> Vec<MarkupBlock> {
    let fragment = Html::parse_fragment(sanitized);
    let mut walker = Walker {
        blocks: Vec::new(),
        current: Vec::new(),
    };
    let ctx = StyleCtx::default();
    for child in fragment.root_element().children() {
        walker.walk(child, &ctx);
    }
    walker.flush(&ctx);
    walker.blocks
}

fn rich_text(span: &TextSpan, size: f32, strong: bool) -> egui::RichText {
    let mut rich = egui::RichText::new(&span.text).size(size);
    if span.bold || strong {
        rich = rich.strong();
    }
    if span.italic {
        rich = rich.italics();
    }
    if span.underline {
        rich = rich.underline();
    }
    if span.strike {
        rich = rich.strikethrough();
    }
    if span.code {
        rich = rich.monospace().background_color(Color32::from_gray(40));
    }
    rich
}

fn render_spans(ui: &mut egui::Ui, spans: &[TextSpan], size: f32, strong: bool) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            let rich = rich_text(span, size, strong);
            match &span.link {
                Some(url) => {
                    ui.hyperlink_to(rich.color(Color32::from_rgb(110, 170, 255)), url);
                }
                None => {
                    ui.label(rich);
                }
            }
        }
    });
}

/// Render a sanitized fragment into the current UI.
pub fn render_markup(ui: &mut egui::Ui, sanitized: &str) {
    for block in blocks_from_markup(sanitized) {
        match block {
            MarkupBlock::Paragraph(spans) => render_spans(ui, &spans, 14.0, false),
            MarkupBlock::Heading(level, spans) => {
                let size = match level {
                    1 => 22.0,
                    2 => 19.0,
                    3 => 17.0,
                    _ => 15.0,
                };
                render_spans(ui, &spans, size, true);
                ui.add_space(2.0);
            }
            MarkupBlock::Bullet(spans) => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label(egui::RichText::new("  • ").size(14.0));
                    for span in &spans {
                        let rich = rich_text(span, 14.0, false);
                        match &span.link {
                            Some(url) => {
                                ui.hyperlink_to(
                                    rich.color(Color32::from_rgb(110, 170, 255)),
                                    url,
                                );
                            }
                            None => {
                                ui.label(rich);
                            }
                        }
                    }
                });
            }
            MarkupBlock::Quote(spans) => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label(
                        egui::RichText::new("▌ ")
                            .size(14.0)
                            .color(Color32::from_gray(120)),
                    );
                    for span in &spans {
                        ui.label(rich_text(span, 14.0, false).italics().color(Color32::from_gray(170)));
                    }
                });
            }
            MarkupBlock::CodeBlock(text) => {
                egui::Frame::new()
                    .fill(Color32::from_gray(30))
                    .corner_radius(4.0)
                    .inner_margin(egui::Margin::symmetric(8, 6))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(text.trim_end()).monospace().size(13.0));
                    });
            }
            MarkupBlock::Rule => {
                ui.separator();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_styles_become_spans() {
        let blocks = blocks_from_markup("plain <b>bold</b> <i>italic</i>");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            MarkupBlock::Paragraph(spans) => {
                assert!(spans.iter().any(|s| s.text == "bold" && s.bold));
                assert!(spans.iter().any(|s| s.text == "italic" && s.italic));
                assert!(spans.iter().any(|s| s.text.contains("plain") && !s.bold));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_paragraphs_split_blocks() {
        let blocks = blocks_from_markup("<p>one</p><p>two</p>");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_links_carry_their_href() {
        let blocks =
            blocks_from_markup(r#"<a href="https://example.com/x">click</a>"#);
        match &blocks[0] {
            MarkupBlock::Paragraph(spans) => {
                assert_eq!(spans[0].link.as_deref(), Some("https://example.com/x"));
                assert_eq!(spans[0].text, "click");
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_pre_becomes_code_block() {
        let blocks = blocks_from_markup("<pre>let x = 1;\nlet y = 2;</pre>");
        assert_eq!(
            blocks,
            vec![MarkupBlock::CodeBlock("let x = 1;\nlet y = 2;".into())]
        );
    }

    #[test]
    fn test_list_items_become_bullets() {
        let blocks = blocks_from_markup("<ul><li>one</li><li>two</li></ul>");
        let bullets = blocks
            .iter()
            .filter(|b| matches!(b, MarkupBlock::Bullet(_)))
            .count();
        assert_eq!(bullets, 2);
    }

    #[test]
    fn test_headings_keep_their_level() {
        let blocks = blocks_from_markup("<h2>title</h2><p>body</p>");
        assert!(matches!(&blocks[0], MarkupBlock::Heading(2, _)));
    }

    #[test]
    fn test_nested_styles_combine() {
        let blocks = blocks_from_markup("<b><i>both</i></b>");
        match &blocks[0] {
            MarkupBlock::Paragraph(spans) => {
                assert!(spans[0].bold && spans[0].italic);
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }
}
