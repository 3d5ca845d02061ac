use super::{parse_bdf, system::guess_size, BitmapFont};
use crate::error;
use crate::lang::Error;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

/// Font map key for a font supplied directly by the user.
pub const EXPLICIT: &str = "__explicit__";

const PREFIX: &str = "u8g2_font_";

/// Distinct `u8g2_font_*` identifiers passed to `setFont`, in order of first
/// appearance.
pub fn font_names(source: &str) -> Vec<String> {
    let mut names: Vec<String> = vec![];
    let mut rest = source;
    while let Some(pos) = rest.find("setFont") {
        rest = &rest[pos + "setFont".len()..];
        if let Some(name) = set_font_argument(rest) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn set_font_argument(s: &str) -> Option<&str> {
    let s = s.trim_start().strip_prefix('(')?.trim_start();
    if !s.starts_with(PREFIX) {
        return None;
    }
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or_else(|| s.len());
    let (name, tail) = s.split_at(end);
    if tail.trim_start().starts_with(')') && name.len() > PREFIX.len() {
        Some(name)
    } else {
        None
    }
}

/// BDF file names worth trying for a U8g2 font identifier, most specific
/// first.
pub fn candidates_for(token: &str) -> Vec<String> {
    let raw = token.strip_prefix(PREFIX).unwrap_or(token);
    let parts: Vec<&str> = raw.split('_').filter(|p| !p.is_empty()).collect();
    let mut candidates = Candidates::default();
    for k in (1..=parts.len()).rev() {
        candidates.push_name(&parts[..k].join("_"));
    }
    let base = parts.join("_");
    let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() < base.len() && !stem.is_empty() {
        candidates.push_name(stem);
    }
    if base.to_ascii_lowercase().contains("japanese") {
        let size = guess_size(&base).unwrap_or(16);
        for variant in &["", "1", "2", "3"] {
            candidates.push(format!("unifont_japanese{}-{}.bdf", variant, size));
        }
    }
    candidates.0
}

#[derive(Default)]
struct Candidates(Vec<String>);

impl Candidates {
    fn push(&mut self, file: String) {
        if !self.0.contains(&file) {
            self.0.push(file);
        }
    }

    fn push_name(&mut self, name: &str) {
        self.push(format!("{}.bdf", name));
        self.push(format!("{}.bdf", name.to_lowercase()));
        if let Some((alpha, a, b)) = split_dimensions(name) {
            let hyphenated = format!("{}-{}x{}.bdf", alpha, a, b);
            self.push(hyphenated.clone());
            self.push(hyphenated.to_lowercase());
        }
    }
}

/// Splits `prefixAxB` into its letters and the two numbers.
fn split_dimensions(name: &str) -> Option<(&str, &str, &str)> {
    let digits = name.find(|c: char| c.is_ascii_digit())?;
    let (alpha, size) = name.split_at(digits);
    if alpha.is_empty() || !alpha.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let (a, b) = size.split_at(size.find('x')?);
    let b = &b[1..];
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        Some((alpha, a, b))
    } else {
        None
    }
}

/// Somewhere BDF text can be loaded from by file name.
pub trait FontSource {
    fn label(&self) -> &str;
    /// `Ok(None)` means the source does not have this file.
    fn load(&self, file_name: &str) -> Result<Option<String>>;
}

/// A directory of previously fetched BDF files.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> DirectorySource {
        DirectorySource { dir: dir.into() }
    }
}

impl FontSource for DirectorySource {
    fn label(&self) -> &str {
        "cache"
    }

    fn load(&self, file_name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.dir.join(file_name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error!(FontFetch; &format!("{}: {}", file_name, e))),
        }
    }
}

/// Downloads `<base>/<file>` and keeps a copy in the cache directory, which
/// is trimmed back under its size limit after every store.
pub struct HttpSource {
    base_url: String,
    cache_dir: PathBuf,
    limit_bytes: u64,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new<P: Into<PathBuf>>(base_url: &str, cache_dir: P, limit_mb: u64) -> HttpSource {
        HttpSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
            limit_bytes: limit_mb * 1024 * 1024,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn fetch(&self, url: &str) -> reqwest::Result<Option<String>> {
        let response = self.client.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        response.error_for_status()?.text().map(Some)
    }

    fn store(&self, file_name: &str, text: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(self.cache_dir.join(file_name), text)?;
        trim_dir(&self.cache_dir, self.limit_bytes)
    }
}

impl FontSource for HttpSource {
    fn label(&self) -> &str {
        "fetch"
    }

    fn load(&self, file_name: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, file_name);
        let text = match self.fetch(&url) {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(None),
            Err(e) => return Err(error!(FontFetch; &format!("{}: {}", url, e))),
        };
        if !text.lines().any(|line| line.starts_with("STARTFONT")) {
            return Err(error!(FontFetch; &format!("{}: NOT A BDF FILE", url)));
        }
        if let Err(e) = self.store(file_name, &text) {
            return Err(error!(FontFetch; &format!("{}: {}", file_name, e)));
        }
        Ok(Some(text))
    }
}

/// Deletes the oldest files in `dir` until their total size fits in
/// `limit_bytes`.
fn trim_dir(dir: &Path, limit_bytes: u64) -> std::io::Result<()> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_file() {
            files.push((meta.modified()?, meta.len(), entry.path()));
        }
    }
    let mut total: u64 = files.iter().map(|(_, len, _)| len).sum();
    if total <= limit_bytes {
        return Ok(());
    }
    files.sort();
    for (_, len, path) in files {
        fs::remove_file(path)?;
        total -= len;
        if total <= limit_bytes {
            break;
        }
    }
    Ok(())
}

/// Parsed fonts kept between renders, so a watch loop does not hit the
/// disk or network again for fonts it already has or already failed on.
#[derive(Default)]
pub struct FontCache {
    fonts: HashMap<String, BitmapFont>,
    misses: HashSet<String>,
}

impl FontCache {
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn clear(&mut self) {
        self.fonts.clear();
        self.misses.clear();
    }
}

/// Fonts resolved for one source text.
#[derive(Debug, Default)]
pub struct Resolved {
    pub fonts: BTreeMap<String, BitmapFont>,
    pub diagnostics: Vec<Error>,
    /// One line per font found, naming the source and file it came from.
    pub notes: Vec<String>,
}

/// Tries each source in order, and every candidate file name within a
/// source, until one yields BDF text.
#[derive(Default)]
pub struct FontResolver {
    sources: Vec<Box<dyn FontSource>>,
}

impl FontResolver {
    pub fn new() -> FontResolver {
        FontResolver::default()
    }

    pub fn with_source<S: FontSource + 'static>(mut self, source: S) -> FontResolver {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolves every font named by a `setFont` call in `source`.
    pub fn resolve(&self, source: &str, explicit: Option<BitmapFont>, cache: &mut FontCache) -> Resolved {
        self.resolve_names(font_names(source), explicit, cache)
    }

    pub fn resolve_names<I>(&self, names: I, explicit: Option<BitmapFont>, cache: &mut FontCache) -> Resolved
    where
        I: IntoIterator<Item = String>,
    {
        let mut resolved = Resolved::default();
        for token in names {
            if let Some(font) = cache.fonts.get(&token) {
                resolved.fonts.insert(token, font.clone());
                continue;
            }
            if cache.misses.contains(&token) {
                continue;
            }
            match self.load(&token, &mut resolved) {
                Some(font) => {
                    cache.fonts.insert(token.clone(), font.clone());
                    resolved.fonts.insert(token, font);
                }
                None => {
                    resolved
                        .diagnostics
                        .push(error!(FontFetch; &format!("NOT FOUND {}", token)));
                    cache.misses.insert(token);
                }
            }
        }
        if let Some(font) = explicit {
            resolved.fonts.insert(EXPLICIT.to_string(), font);
        }
        resolved
    }

    fn load(&self, token: &str, resolved: &mut Resolved) -> Option<BitmapFont> {
        let candidates = candidates_for(token);
        for source in &self.sources {
            for file in &candidates {
                match source.load(file) {
                    Ok(Some(text)) => {
                        resolved
                            .notes
                            .push(format!("{} {} -> {}", source.label(), file, token));
                        return Some(parse_bdf(&text));
                    }
                    Ok(None) => {}
                    Err(e) => resolved.diagnostics.push(e),
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_font_names() {
        let source = "u8g2.setFont(u8g2_font_6x10_tf);\n\
                      u8g2.setFont( u8g2_font_ncenB14_tr );\n\
                      u8g2.setFont(u8g2_font_6x10_tf);\n\
                      u8g2.setFont(myFont);";
        assert_eq!(font_names(source), vec!["u8g2_font_6x10_tf", "u8g2_font_ncenB14_tr"]);
    }

    #[test]
    fn test_candidates() {
        assert_eq!(
            candidates_for("u8g2_font_ncenB14_tr"),
            vec!["ncenB14_tr.bdf", "ncenb14_tr.bdf", "ncenB14.bdf", "ncenb14.bdf"]
        );
        let helv = candidates_for("u8g2_font_helvR08");
        assert_eq!(helv, vec!["helvR08.bdf", "helvr08.bdf", "helvR.bdf", "helvr.bdf"]);
        let cands = candidates_for("u8g2_font_fixed6x10_tf");
        assert!(cands.contains(&"fixed-6x10.bdf".to_string()));
        let jp = candidates_for("u8g2_font_unifont_t_japanese");
        assert!(jp.contains(&"unifont_japanese2-16.bdf".to_string()));
    }

    struct MemorySource {
        files: Vec<(&'static str, &'static str)>,
        requests: RefCell<Vec<String>>,
    }

    impl FontSource for MemorySource {
        fn label(&self) -> &str {
            "memory"
        }

        fn load(&self, file_name: &str) -> Result<Option<String>> {
            self.requests.borrow_mut().push(file_name.to_string());
            Ok(self
                .files
                .iter()
                .find(|(name, _)| *name == file_name)
                .map(|(_, text)| text.to_string()))
        }
    }

    #[test]
    fn test_resolver_caches_misses() {
        let resolver = FontResolver::new().with_source(MemorySource {
            files: vec![("ncenB14.bdf", "STARTFONT 2.1\nFONT ncen\nENDFONT\n")],
            requests: RefCell::new(vec![]),
        });
        let source = "setFont(u8g2_font_ncenB14_tr); setFont(u8g2_font_nope_tf);";
        let mut cache = FontCache::default();
        let first = resolver.resolve(source, None, &mut cache);
        assert_eq!(first.fonts["u8g2_font_ncenB14_tr"].name, "ncen");
        assert_eq!(first.diagnostics.len(), 1);
        assert_eq!(cache.len(), 1);
        let second = resolver.resolve(source, None, &mut cache);
        assert!(second.diagnostics.is_empty());
        assert!(second.notes.is_empty());
        assert_eq!(second.fonts.len(), 1);
    }
}
