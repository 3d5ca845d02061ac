//! # U8g2 Preview
//!
//! Preview what U8g2 and Adafruit GFX drawing code will put on a small
//! monochrome display, without building or flashing the firmware.
//!
//! The source is never compiled as C++. A best-effort scan picks out the
//! drawing calls, evaluates their arguments against the `#define` macros and
//! numeric constants of the file, and replays them on a simulated display.
//! ```text
//! $ u8g2-preview sketch.ino
//! 128x64 @x2 ops:12 font:u8g2_font_6x10_tf crc:5C1D22A0
//! ```
//!
//! Fonts named in `setFont` calls are looked up as BDF files in a local
//! cache directory and, when a repository URL is configured, fetched from
//! it. Anything that cannot be resolved is drawn with a built-in 5x7 font.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/chapter_1.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_1;

pub mod config;
pub mod font;
pub mod lang;
pub mod mach;
