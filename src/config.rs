/*!
# Configuration

Preview settings, loaded from an optional JSON file and then overridden by
command-line flags and by a `size: WxH` hint in the source comments.

*/

use crate::error;
use crate::font::{parse_bdf, BitmapFont, DirectorySource, FontResolver, HttpSource};
use crate::lang::{Dimensions, Error};
use crate::mach::{Operation, RenderRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub invert: bool,
    pub grid: bool,
    pub text_use_draw_color: bool,
    /// BDF file installed as the override font.
    pub bdf_path: Option<PathBuf>,
    pub font_dir: PathBuf,
    /// Remote font repository. Empty disables fetching.
    pub fetch_base_url: String,
    pub auto_fetch: bool,
    pub cache_limit_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 128,
            height: 64,
            scale: 2,
            invert: false,
            grid: false,
            text_use_draw_color: true,
            bdf_path: None,
            font_dir: default_font_dir(),
            fetch_base_url: String::new(),
            auto_fetch: true,
            cache_limit_mb: 100,
        }
    }
}

fn default_font_dir() -> PathBuf {
    let base = match std::env::var_os("XDG_CACHE_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".cache"),
            None => PathBuf::from(".cache"),
        },
    };
    base.join("u8g2-preview").join("fonts")
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = read(path)?;
        serde_json::from_str(&text)
            .map_err(|e| error!(BadConfig; &format!("{}: {}", path.display(), e)))
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Takes width and height from a `size: WxH` comment, if the source has
    /// one.
    pub fn apply_size_hint(&mut self, source: &str) -> Option<Dimensions> {
        let hint = size_hint(source)?;
        self.width = hint.width;
        self.height = hint.height;
        Some(hint)
    }

    pub fn request(&self, ops: Vec<Operation>) -> RenderRequest {
        let mut request = RenderRequest::new(self.width, self.height);
        request.scale = self.scale;
        request.invert = self.invert;
        request.grid = self.grid;
        request.text_use_draw_color = self.text_use_draw_color;
        request.ops = ops;
        request
    }

    /// The cache directory, plus the remote repository when fetching is on.
    pub fn font_resolver(&self) -> FontResolver {
        let resolver = FontResolver::new().with_source(DirectorySource::new(&self.font_dir));
        if self.auto_fetch && !self.fetch_base_url.is_empty() {
            resolver.with_source(HttpSource::new(
                &self.fetch_base_url,
                &self.font_dir,
                self.cache_limit_mb,
            ))
        } else {
            resolver
        }
    }

    /// The override font, when `bdf_path` is set.
    pub fn explicit_font(&self) -> Result<Option<BitmapFont>> {
        match &self.bdf_path {
            Some(path) => Ok(Some(parse_bdf(&read(path)?))),
            None => Ok(None),
        }
    }
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        let msg = format!("{}: {}", path.display(), e);
        match e.kind() {
            ErrorKind::NotFound => error!(FileNotFound; &msg),
            _ => error!(InternalError; &msg),
        }
    })
}

/// Canvas size from the first comment carrying `size: WxH` (also `size=WxH`
/// or `size WxH`). Line comments are searched before block comments.
pub fn size_hint(source: &str) -> Option<Dimensions> {
    comments(source).into_iter().find_map(match_size)
}

fn comments(source: &str) -> Vec<&str> {
    let mut found = vec![];
    let mut rest = source;
    while let Some(start) = rest.find("//") {
        let end = rest[start..].find('\n').map_or(rest.len(), |n| start + n);
        found.push(&rest[start..end]);
        rest = &rest[end..];
    }
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(n) => {
                let end = start + 2 + n + 2;
                found.push(&rest[start..end]);
                rest = &rest[end..];
            }
            None => break,
        }
    }
    found
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn match_size(text: &str) -> Option<Dimensions> {
    for (pos, _) in text.match_indices("size") {
        if text[..pos].chars().next_back().map_or(false, is_word) {
            continue;
        }
        if let Some(dims) = parse_size(&text[pos + 4..]) {
            return Some(dims);
        }
    }
    None
}

fn parse_size(s: &str) -> Option<Dimensions> {
    let s = s.trim_start();
    let s = s.strip_prefix(|c: char| c == ':' || c == '=').unwrap_or(s).trim_start();
    let (width, s) = leading_number(s)?;
    let s = s.trim_start();
    let s = s.strip_prefix(|c: char| c == 'x' || c == 'X' || c == '×')?.trim_start();
    let (height, rest) = leading_number(s)?;
    if rest.chars().next().map_or(false, is_word) || width == 0 || height == 0 {
        return None;
    }
    Some(Dimensions { width, height })
}

fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| s.len());
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}
