//! Fixed slot geometry of the A4 sticker template
//!
//! All positions are millimeters measured from the top-left corner of the
//! page. The anchors were measured from the printed template and are not a
//! regular grid, so they are kept as a lookup table.

/// Number of stickers on a sheet
pub const SLOT_COUNT: usize = 12;

/// Number of sticker columns
pub const COLUMNS: usize = 3;

/// A point in millimeters, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmPoint {
    pub x: f64,
    pub y: f64,
}

const fn mm(x: f64, y: f64) -> MmPoint {
    MmPoint { x, y }
}

/// Geometry and typography of one sticker sheet
///
/// Slots are row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    /// Top-left corner of each QR slot
    pub qr_positions: [MmPoint; SLOT_COUNT],
    /// Side length of the square QR slot
    pub qr_size: f64,
    /// Label anchor of each slot; only `y` (the baseline reference) is used
    pub label_positions: [MmPoint; SLOT_COUNT],
    /// Left edge of each sticker column
    pub column_edges: [f64; COLUMNS],
    /// Width of a sticker column
    pub column_width: f64,
    /// Widest a label may be before the font shrinks
    pub max_text_width: f64,
    /// Starting label font size in points
    pub font_ceiling: f32,
    /// Smallest label font size in points
    pub font_floor: f32,
    /// Font size decrement in points
    pub font_step: f32,
    /// Baseline drop below the anchor, as a fraction of the font size
    pub baseline_factor: f64,
}

impl SheetLayout {
    /// Layout of the stock A4 sticker template
    pub const REFERENCE: SheetLayout = SheetLayout {
        qr_positions: [
            mm(45.58, 36.09),
            mm(113.03, 35.98),
            mm(179.44, 35.98),
            mm(45.56, 103.10),
            mm(112.62, 103.08),
            mm(179.28, 103.21),
            mm(45.30, 170.23),
            mm(112.34, 170.22),
            mm(179.00, 170.34),
            mm(45.28, 237.00),
            mm(112.32, 236.98),
            mm(178.98, 237.10),
        ],
        qr_size: 14.43,
        label_positions: [
            mm(22.11, 66.99),
            mm(89.02, 67.07),
            mm(156.10, 66.99),
            mm(21.85, 134.15),
            mm(88.68, 134.15),
            mm(155.68, 134.15),
            mm(21.60, 201.23),
            mm(88.43, 201.23),
            mm(155.59, 201.23),
            mm(21.85, 268.13),
            mm(88.17, 268.30),
            mm(155.17, 268.47),
        ],
        column_edges: [8.0, 75.0, 142.0],
        column_width: 63.0,
        max_text_width: 46.0,
        font_ceiling: 9.0,
        font_floor: 5.0,
        font_step: 0.5,
        baseline_factor: 0.3,
    };

    /// Horizontal center of the column that holds `slot`, in millimeters
    pub fn label_center_mm(&self, slot: usize) -> f64 {
        self.column_edges[slot % COLUMNS] + self.column_width / 2.0
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}
