//! Paint command set for the built-in backend.

use crate::rendering::layout::{ElementType, LayoutNode};

pub type Rgba = (u8, u8, u8, u8);

const TITLE_INK: Rgba = (120, 30, 60, 255);
const BODY_INK: Rgba = (40, 40, 40, 255);
const CARD_FILL: Rgba = (255, 250, 252, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// An image box; the rasterizer decodes or placeholders the source.
    ImageBox {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        src: Option<String>,
    },
}

/// Lower layout nodes into paint commands. Text renders as one glyph block
/// per non-space character in an 8px grid, which is crude but deterministic.
pub fn commands_for(nodes: &[LayoutNode]) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    for node in nodes {
        let r = &node.lb.rect;
        match node.elem_type {
            ElementType::Image => {
                cmds.push(PaintCommand::ImageBox {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                    src: node.src.clone(),
                });
            }
            _ => {
                cmds.push(PaintCommand::SolidRect {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                    rgba: CARD_FILL,
                });
                let ink = if node.elem_type == ElementType::Title {
                    TITLE_INK
                } else {
                    BODY_INK
                };
                let pad = node.lb.box_model.padding as i32;
                let cell = 8 * node.scale as i32;
                for (row, line) in node.text.lines().enumerate() {
                    for (col, ch) in line.chars().enumerate() {
                        if ch.is_whitespace() {
                            continue;
                        }
                        cmds.push(PaintCommand::SolidRect {
                            x: r.x + pad + col as i32 * cell,
                            y: r.y + pad + row as i32 * cell,
                            width: (cell - 1).max(1) as u32,
                            height: (cell - 1).max(1) as u32,
                            rgba: ink,
                        });
                    }
                }
            }
        }
    }
    cmds
}
