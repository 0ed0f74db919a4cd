/// One canvas 2D call, recorded so frames can be checked without a canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Reset the transform to `pixel_ratio` and clear the whole surface
    Clear { width: f32, height: f32, pixel_ratio: f32 },
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate(f32),
    SetFont(String),
    SetTextAlign(TextAlign),
    SetTextBaseline(TextBaseline),
    SetFillStyle(String),
    SetStrokeStyle(String),
    SetLineWidth(f32),
    /// Path for a rounded rectangle with top-left at (x, y)
    RoundedRect { x: f32, y: f32, width: f32, height: f32, radius: f32 },
    Fill,
    Stroke,
    FillText { text: String, x: f32, y: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Center,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Center => "center",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    Middle,
}

impl TextBaseline {
    pub fn as_str(self) -> &'static str {
        match self {
            TextBaseline::Middle => "middle",
        }
    }
}
