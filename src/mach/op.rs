use serde::{Deserialize, Serialize};

/// One normalized drawing instruction.
///
/// The serialized form is `{"op": "<tag>", ...fields}` with the tag being
/// the camel-cased variant name, shared with the native executor's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    SetDrawColor { c: i32 },
    DrawPixel { x: i32, y: i32 },
    DrawLine { x0: i32, y0: i32, x1: i32, y1: i32 },
    DrawBox { x: i32, y: i32, w: i32, h: i32 },
    DrawFrame { x: i32, y: i32, w: i32, h: i32 },
    DrawCircle { x: i32, y: i32, r: i32 },
    DrawDisc { x: i32, y: i32, r: i32 },
    DrawStr { x: i32, y: i32, text: String },
    SetFont { name: String },
    SetCursor { x: i32, y: i32 },
    Print { text: String },
    Println { text: String },
    GfxVLine { x: i32, y: i32, h: i32 },
    GfxHLine { x: i32, y: i32, w: i32 },
    GfxRect { x: i32, y: i32, w: i32, h: i32 },
    GfxFillRect { x: i32, y: i32, w: i32, h: i32 },
    /// Only produced by the native executor.
    GfxLine { x0: i32, y0: i32, x1: i32, y1: i32 },
}
