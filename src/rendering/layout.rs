//! Block layout primitives for the built-in backend.

use scraper::{node::Element, Html, Selector};

use crate::{Card, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        let total = self.box_model.margin + self.box_model.border + self.box_model.padding;
        self.rect.width.saturating_sub(total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Title,
    Paragraph,
    Image,
}

/// A layout node couples a box with its content: wrapped text for title and
/// paragraph nodes, the source attribute for image nodes.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub src: Option<String>,
    pub elem_type: ElementType,
    pub scale: usize,
}

const IMAGE_BOX: u32 = 120;

/// Compute a basic block layout for the card in the given viewport.
/// - Stacks blocks vertically with simple margins/padding
/// - Title (`h1`) renders at scale=2, paragraphs at scale=1
/// - Images become fixed square boxes; the painter fills in the pixels
pub fn layout_card(card: &Card, viewport: Viewport) -> Vec<LayoutNode> {
    let doc = Html::parse_fragment(card.html());
    let mut y = 8u32; // top padding
    let page_width = viewport.width;
    let mut nodes = Vec::new();

    let flow_sel = Selector::parse("h1, p, img").unwrap();
    for node in doc.select(&flow_sel) {
        match node.value().name() {
            "h1" => {
                let text = node.text().collect::<String>();
                if text.trim().is_empty() {
                    continue;
                }
                let padding = 8u32;
                let box_h = 8 * 2 + padding * 2;
                nodes.push(LayoutNode {
                    lb: block_box(y, page_width, box_h, 8, padding),
                    text: text.trim().to_string(),
                    src: None,
                    elem_type: ElementType::Title,
                    scale: 2,
                });
                y += box_h + 8;
            }
            "img" => {
                let src = image_src(node.value());
                let box_h = IMAGE_BOX.min(viewport.height.saturating_sub(y));
                nodes.push(LayoutNode {
                    lb: LayoutBox {
                        rect: Rect {
                            x: 8,
                            y: y as i32,
                            width: IMAGE_BOX.min(page_width.saturating_sub(16)),
                            height: box_h,
                        },
                        box_model: BoxModel {
                            margin: 8,
                            border: 0,
                            padding: 0,
                        },
                    },
                    text: String::new(),
                    src,
                    elem_type: ElementType::Image,
                    scale: 1,
                });
                y += box_h + 8;
            }
            _ => {
                let txt = node.text().collect::<String>();
                if txt.trim().is_empty() {
                    continue;
                }
                let padding = 6u32;
                let content_w = page_width.saturating_sub(16).saturating_sub(padding * 2);
                let chars_per_line = if content_w >= 8 {
                    (content_w / 8) as usize
                } else {
                    1
                };
                let text = wrap_text(&txt, chars_per_line);
                let lines = (text.lines().count() as u32).max(1);
                let box_h = lines * 8 + padding * 2;
                nodes.push(LayoutNode {
                    lb: block_box(y, page_width, box_h, 6, padding),
                    text,
                    src: None,
                    elem_type: ElementType::Paragraph,
                    scale: 1,
                });
                y += box_h + 6;
            }
        }
        if y >= viewport.height {
            break;
        }
    }

    nodes
}

fn block_box(y: u32, page_width: u32, height: u32, margin: u32, padding: u32) -> LayoutBox {
    LayoutBox {
        rect: Rect {
            x: 8,
            y: y as i32,
            width: page_width.saturating_sub(16),
            height,
        },
        box_model: BoxModel {
            margin,
            border: 0,
            padding,
        },
    }
}

fn image_src(el: &Element) -> Option<String> {
    el.attr("src").map(str::to_string)
}

/// Greedy word wrap at a crude 8px-per-char metric.
fn wrap_text(text: &str, chars_per_line: usize) -> String {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.len() + word.len() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(cur);
            cur = word.to_string();
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_places_title_images_and_paragraphs_in_order() {
        let card = Card::default_template();
        let v = Viewport {
            width: 400,
            height: 800,
        };
        let nodes = layout_card(&card, v);
        assert!(nodes.len() >= 4);
        assert_eq!(nodes[0].elem_type, ElementType::Image);
        assert_eq!(nodes[1].elem_type, ElementType::Title);
        assert_eq!(nodes[1].scale, 2);
        assert!(nodes
            .iter()
            .skip(2)
            .all(|n| n.elem_type == ElementType::Paragraph));
        assert!(nodes[2].lb.rect.width > 0);
    }

    #[test]
    fn layout_stops_at_viewport_bottom() {
        let card = Card::default_template();
        let v = Viewport {
            width: 200,
            height: 140,
        };
        let nodes = layout_card(&card, v);
        let last = nodes.last().unwrap();
        assert!(last.lb.rect.y < v.height as i32);
    }

    #[test]
    fn wrap_text_breaks_long_lines() {
        let wrapped = wrap_text("one two three four", 9);
        assert!(wrapped.lines().count() >= 2);
        assert!(wrapped.lines().all(|l| l.len() <= 9));
    }
}
