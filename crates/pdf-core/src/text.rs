//! Text rendering utilities

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) to render text
/// at a specific position with alignment support.
///
/// # Arguments
/// * `operand` - Encoded string operand, either a literal `(abc)` or hex `<0041>`
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate of the baseline in points (PDF coordinates, from bottom)
/// * `align` - Which point of the text run `x` refers to
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    operand: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };

    let final_x = x + x_offset;

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{operand} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Generate operators for a filled rectangle in its own graphics state
pub fn generate_rect_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{x} {y} {width} {height} re\nf\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}
