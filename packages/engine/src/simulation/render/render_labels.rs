//! Frame → draw commands.
//!
//! Shapes are emitted before labels so text is never covered by a pill.

use crate::rigid_body::RigidBody;

use super::draw::{DrawCommand, TextAlign, TextBaseline};
use super::init::Surface;

/// Everything a frame needs to be drawn
pub struct FrameState<'a> {
    pub bodies: &'a [RigidBody],
    pub surface: &'a Surface,
    /// CSS font shorthand for the current device class
    pub font: &'a str,
}

/// Rounded rectangles for every visible body.
pub fn render_shapes(frame: &FrameState<'_>) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    for body in frame.bodies.iter().filter(|b| b.style.visible) {
        let w = body.width();
        let h = body.height();
        out.extend([
            DrawCommand::Save,
            DrawCommand::Translate { x: body.pos.x, y: body.pos.y },
            DrawCommand::Rotate(body.angle),
            DrawCommand::RoundedRect {
                x: -w / 2.0,
                y: -h / 2.0,
                width: w,
                height: h,
                radius: body.chamfer,
            },
            DrawCommand::SetFillStyle(body.style.fill.clone()),
            DrawCommand::Fill,
        ]);
        if body.style.line_width > 0.0 {
            out.extend([
                DrawCommand::SetStrokeStyle(body.style.stroke.clone()),
                DrawCommand::SetLineWidth(body.style.line_width),
                DrawCommand::Stroke,
            ]);
        }
        out.push(DrawCommand::Restore);
    }
    out
}

/// Text centered on each labelled body, rotated with it.
pub fn render_labels(frame: &FrameState<'_>) -> Vec<DrawCommand> {
    let mut out = vec![
        DrawCommand::SetFont(frame.font.to_string()),
        DrawCommand::SetTextAlign(TextAlign::Center),
        DrawCommand::SetTextBaseline(TextBaseline::Middle),
    ];
    for body in frame.bodies {
        let Some(label) = body.label.as_ref() else {
            continue;
        };
        out.extend([
            DrawCommand::Save,
            DrawCommand::Translate { x: body.pos.x, y: body.pos.y },
            DrawCommand::Rotate(body.angle),
            DrawCommand::SetFillStyle(label.color.clone()),
            DrawCommand::FillText {
                text: label.text.clone(),
                x: 0.0,
                y: 0.0,
            },
            DrawCommand::Restore,
        ]);
    }
    out
}

/// Clear, shapes, then labels.
pub fn render_frame(frame: &FrameState<'_>) -> Vec<DrawCommand> {
    let mut out = vec![DrawCommand::Clear {
        width: frame.surface.viewport.width,
        height: frame.surface.viewport.height,
        pixel_ratio: frame.surface.pixel_ratio,
    }];
    out.extend(render_shapes(frame));
    out.extend(render_labels(frame));
    out
}
