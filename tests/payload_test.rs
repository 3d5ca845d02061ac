mod common;
use common::*;
use serde_json::json;
use u8g2::font::EXPLICIT;
use u8g2::mach::{render, ExecutorOutput, Operation, RenderRequest};

#[test]
fn test_compile_result_json() {
    let result = compile_str("#define W 4\nu8g2.drawBox(0, 0, W, 2);\nu8g2.drawPixel(Q, 1);");
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value,
        json!({
            "ops": [{"op": "drawBox", "x": 0, "y": 0, "w": 4, "h": 2}],
            "stats": {"lines": 3, "defines": 1, "consts": 0},
            "errors": ["UNEVALUABLE ARGUMENT IN 3; drawPixel ARGUMENT 1: Q"]
        })
    );
}

#[test]
fn test_request_defaults() {
    let request: RenderRequest = serde_json::from_value(json!({
        "width": 8,
        "height": 8,
        "ops": [{"op": "gfxFillRect", "x": 0, "y": 0, "w": 2, "h": 2}]
    }))
    .unwrap();
    assert_eq!(request.scale, 2);
    assert!(request.text_use_draw_color);
    assert!(!request.invert && !request.grid);
    let frame = render(&request);
    assert_eq!(frame.canvas.pixels().iter().filter(|&&p| p == 0).count(), 16);
}

#[test]
fn test_legacy_single_font() {
    let mut request = RenderRequest::new(8, 8);
    request.font = Some(font_a());
    let fonts = request.font_map();
    assert_eq!(fonts.keys().collect::<Vec<_>>(), vec![EXPLICIT]);
    let value = serde_json::to_value(&request).unwrap();
    assert!(value.get("fonts").is_none());
    assert_eq!(value["textUseDrawColor"], true);
    let frame = render(&request);
    assert_eq!(frame.state.font.as_deref(), Some(EXPLICIT));
}

#[test]
fn test_fonts_map_wins_over_legacy_font() {
    let mut request = RenderRequest::new(8, 8);
    request.font = Some(font_a());
    request.fonts = Some(Default::default());
    assert!(request.font_map().is_empty());
    assert_eq!(render(&request).state.font, None);
}

#[test]
fn test_executor_output() {
    let output: ExecutorOutput = serde_json::from_str(
        r#"{"width":96,"height":32,"ops":[
            {"op":"gfxLine","x0":0,"y0":0,"x1":95,"y1":31},
            {"op":"print","text":"ok"}
        ]}"#,
    )
    .unwrap();
    assert_eq!((output.width, output.height), (Some(96), Some(32)));
    assert_eq!(
        output.ops[0],
        Operation::GfxLine {
            x0: 0,
            y0: 0,
            x1: 95,
            y1: 31
        }
    );
    let bare: ExecutorOutput = serde_json::from_str(r#"{"ops":[]}"#).unwrap();
    assert_eq!(bare.width, None);
}

#[test]
fn test_huge_payload_size_is_capped() {
    let request: RenderRequest = serde_json::from_value(json!({
        "width": 4000000000u64,
        "height": 1,
        "scale": 2,
        "ops": [{"op": "drawLine", "x0": 0, "y0": 0, "x1": 2147483647, "y1": 0}]
    }))
    .unwrap();
    let frame = render(&request);
    assert_eq!(frame.canvas.width(), u8g2::mach::MAX_SIDE);
    assert_eq!(frame.canvas.height(), 2);
    assert_eq!(frame.canvas.get(0, 0), Some(0));
}
