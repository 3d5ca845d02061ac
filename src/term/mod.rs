extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;

mod preview;
mod repl;

use ansi_term::{Colour, Style};
use clap::{ArgAction, Parser};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use u8g2::config::{self, Config};
use u8g2::error;
use u8g2::font::{BitmapFont, FontCache, FontResolver};
use u8g2::lang::{self, Error, SystemClock};
use u8g2::mach::{self, ExecutorOutput, Frame, Operation};

type Result<T> = std::result::Result<T, Error>;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "u8g2-preview",
    version,
    about = "Preview U8g2 and Adafruit GFX drawing code in the terminal"
)]
struct Cli {
    #[arg(value_name = "FILE", help = "Firmware source to preview")]
    file: Option<PathBuf>,
    #[arg(short = 'c', long = "config", value_name = "FILE", help = "JSON settings file")]
    config: Option<PathBuf>,
    #[arg(short = 'W', long, help = "Display width in pixels")]
    width: Option<u32>,
    #[arg(short = 'H', long, help = "Display height in pixels")]
    height: Option<u32>,
    #[arg(short = 's', long, help = "Device pixels per display pixel")]
    scale: Option<u32>,
    #[arg(long, action = ArgAction::SetTrue, help = "White on black")]
    invert: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Overlay a pixel grid (scale 2 and up)")]
    grid: bool,
    #[arg(
        long = "text-foreground",
        action = ArgAction::SetTrue,
        help = "Draw text in the foreground colour whatever the draw colour"
    )]
    text_foreground: bool,
    #[arg(long = "bdf", value_name = "FILE", help = "BDF font used for every setFont")]
    bdf: Option<PathBuf>,
    #[arg(long = "font-dir", value_name = "DIR", help = "BDF cache directory")]
    font_dir: Option<PathBuf>,
    #[arg(long = "fetch-url", value_name = "URL", help = "Font repository to download BDF files from")]
    fetch_url: Option<String>,
    #[arg(long = "no-fetch", action = ArgAction::SetTrue, help = "Never download fonts")]
    no_fetch: bool,
    #[arg(long = "cache-limit-mb", value_name = "MB")]
    cache_limit_mb: Option<u64>,
    #[arg(short = 'o', long = "out", value_name = "FILE.pgm", help = "Write the frame as a PGM image")]
    out: Option<PathBuf>,
    #[arg(short = 'z', long, default_value_t = 1, help = "Enlarge the PGM image")]
    zoom: u32,
    #[arg(long = "emit-ops", action = ArgAction::SetTrue, help = "Print the compile result as JSON")]
    emit_ops: bool,
    #[arg(long = "ops", value_name = "FILE", help = "Render the JSON printed by the native executor")]
    ops: Option<PathBuf>,
    #[arg(short = 'w', long, action = ArgAction::SetTrue, help = "Re-render when FILE changes")]
    watch: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Type drawing code interactively")]
    repl: bool,
    #[arg(long = "no-preview", action = ArgAction::SetTrue, help = "Skip the terminal preview")]
    no_preview: bool,
    #[arg(short = 'q', long, action = ArgAction::SetTrue, help = "Only print warnings and errors")]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        config.invert |= self.invert;
        config.grid |= self.grid;
        if self.text_foreground {
            config.text_use_draw_color = false;
        }
        if let Some(path) = &self.bdf {
            config.bdf_path = Some(path.clone());
        }
        if let Some(dir) = &self.font_dir {
            config.font_dir = dir.clone();
        }
        if let Some(url) = &self.fetch_url {
            config.fetch_base_url = url.clone();
        }
        if self.no_fetch {
            config.auto_fetch = false;
        }
        if let Some(limit) = self.cache_limit_mb {
            config.cache_limit_mb = limit;
        }
        Ok(config)
    }
}

/// Tagged progress lines on stderr.
pub struct Log {
    quiet: bool,
}

impl Log {
    pub fn info(&self, tag: &str, message: &str) {
        if !self.quiet {
            eprintln!("{}", Style::new().dimmed().paint(format!("[{}] {}", tag, message)));
        }
    }

    pub fn warn(&self, message: &dyn std::fmt::Display) {
        eprintln!("{}", Colour::Yellow.paint(format!("[warn] {}", message)));
    }

    pub fn error(&self, error: &Error) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
    }
}

pub fn main() {
    let cli = Cli::parse();
    let log = Log { quiet: cli.quiet };
    if let Err(error) = run(&cli, &log) {
        log.error(&error);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, log: &Log) -> Result<()> {
    let config = cli.config()?;
    if cli.repl {
        let mut previewer = Previewer::new(config, log)?;
        return repl::main_loop(&mut previewer).map_err(io_error);
    }
    if let Some(path) = &cli.ops {
        let mut previewer = Previewer::new(config, log)?;
        let frame = previewer.preview_executor_output(&config::read(path)?)?;
        return show(cli, &frame);
    }
    let file = match &cli.file {
        Some(file) => file,
        None => return Err(error!(FileNotFound; "NO INPUT FILE")),
    };
    if cli.emit_ops {
        let source = config::read(file)?;
        let mut config = config;
        config.apply_size_hint(&source);
        let result = lang::compile(&source, &config.dimensions(), &SystemClock);
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| error!(InternalError; &e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }
    let mut previewer = Previewer::new(config, log)?;
    if cli.watch {
        watch(cli, file, &mut previewer)
    } else {
        let frame = previewer.preview_source(&config::read(file)?);
        show(cli, &frame)
    }
}

fn show(cli: &Cli, frame: &Frame) -> Result<()> {
    println!("{}", frame.summary());
    if !cli.no_preview {
        print!("{}", preview::half_blocks(&frame.canvas, frame.scale));
    }
    if let Some(path) = &cli.out {
        fs::write(path, frame.canvas.zoomed(cli.zoom).to_pgm())
            .map_err(|e| error!(InternalError; &format!("{}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Renders FILE every time its modification time changes, until Ctrl-C.
fn watch(cli: &Cli, file: &Path, previewer: &mut Previewer) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .map_err(|e| error!(InternalError; &e.to_string()))?;
    let mut last_seen: Option<SystemTime> = None;
    while !interrupted.load(Ordering::SeqCst) {
        let modified = fs::metadata(file).and_then(|meta| meta.modified()).ok();
        if modified.is_some() && modified != last_seen {
            last_seen = modified;
            match config::read(file) {
                Ok(source) => {
                    let frame = previewer.preview_source(&source);
                    if let Err(error) = show(cli, &frame) {
                        previewer.log.error(&error);
                    }
                }
                Err(error) => previewer.log.error(&error),
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

/// Compile, font and render settings shared by every frame of a session.
pub struct Previewer<'a> {
    config: Config,
    resolver: FontResolver,
    explicit: Option<BitmapFont>,
    cache: FontCache,
    log: &'a Log,
}

impl<'a> Previewer<'a> {
    fn new(config: Config, log: &'a Log) -> Result<Previewer<'a>> {
        let explicit = config.explicit_font()?;
        if let (Some(path), Some(font)) = (&config.bdf_path, &explicit) {
            log.info(
                "font",
                &format!("{} -> {} ({} glyphs)", path.display(), font.name, font.glyphs.len()),
            );
        }
        Ok(Previewer {
            resolver: config.font_resolver(),
            config,
            explicit,
            cache: FontCache::default(),
            log,
        })
    }

    pub fn forget_fonts(&mut self) {
        self.cache.clear();
    }

    pub fn preview_source(&mut self, source: &str) -> Frame {
        let mut config = self.config.clone();
        if let Some(hint) = config.apply_size_hint(source) {
            self.log
                .info("hint", &format!("size {}x{} from comment", hint.width, hint.height));
        }
        let result = lang::compile(source, &config.dimensions(), &SystemClock);
        self.log.info(
            "compile",
            &format!(
                "ops={} lines={} defines={} consts={}",
                result.operations.len(),
                result.stats.lines,
                result.stats.defines,
                result.stats.consts
            ),
        );
        for diagnostic in &result.diagnostics {
            self.log.warn(diagnostic);
        }
        let resolved = self
            .resolver
            .resolve(source, self.explicit.clone(), &mut self.cache);
        self.render(&config, result.operations, resolved)
    }

    pub fn preview_executor_output(&mut self, json: &str) -> Result<Frame> {
        let output: ExecutorOutput =
            serde_json::from_str(json).map_err(|e| error!(BadConfig; &e.to_string()))?;
        let mut config = self.config.clone();
        config.width = output.width.unwrap_or(config.width);
        config.height = output.height.unwrap_or(config.height);
        let mut seen = HashSet::new();
        let names: Vec<String> = output
            .ops
            .iter()
            .filter_map(|op| match op {
                Operation::SetFont { name } if name.starts_with("u8g2_font_") => Some(name.clone()),
                _ => None,
            })
            .filter(|name| seen.insert(name.clone()))
            .collect();
        let resolved = self
            .resolver
            .resolve_names(names, self.explicit.clone(), &mut self.cache);
        Ok(self.render(&config, output.ops, resolved))
    }

    fn render(&self, config: &Config, ops: Vec<Operation>, resolved: u8g2::font::Resolved) -> Frame {
        for note in &resolved.notes {
            self.log.info("font", note);
        }
        for diagnostic in &resolved.diagnostics {
            self.log.warn(diagnostic);
        }
        let mut request = config.request(ops);
        request.fonts = Some(resolved.fonts);
        mach::render(&request)
    }
}

fn io_error(error: std::io::Error) -> Error {
    error!(InternalError; &error.to_string())
}
