// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `glyphdiff`: render every glyph of a font with two rasterizer builds and
//! write an HTML report of the glyphs that differ.
//!
//! ```text
//! glyphdiff <BASE> <TEST> <CHAR_SIZE> <FONT> [--dpi N] [--out-dir DIR]
//!           [--images-dir NAME] [--report NAME] [--legacy-capture-backend]
//! ```
//!
//! `BASE` and `TEST` are paths to FreeType shared libraries, or one of the
//! built-in backends `builtin:skrifa` and `builtin:skrifa-hinted`.
//!
//! Logging is controlled by `GLYPHDIFF_LOG` (`env_logger` syntax, default `info`).
//!
//! Exit status: 0 on success, 1 if the run failed before a report was written,
//! 2 for usage errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glyphdiff::{
    CaptureSource, DEFAULT_DPI, LoadError, RasterizationBackend, RunConfig, RunError, RunSummary,
};
use glyphdiff_freetype::FreeTypeBackend;
use glyphdiff_skrifa::{SkrifaBackend, Variant};
use log::{debug, info};

const BUILTIN_PREFIX: &str = "builtin:";

/// Where a backend comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
enum BackendSource {
    /// A backend compiled into this binary, by name.
    Builtin(String),
    /// A FreeType shared library.
    Library(PathBuf),
}

impl From<String> for BackendSource {
    fn from(value: String) -> Self {
        match value.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => Self::Builtin(name.to_owned()),
            None => Self::Library(PathBuf::from(value)),
        }
    }
}

impl BackendSource {
    fn load(&self) -> Result<Box<dyn RasterizationBackend>, LoadError> {
        match self {
            Self::Builtin(name) => {
                let variant = Variant::from_name(name).ok_or_else(|| LoadError::Unknown {
                    name: format!("{BUILTIN_PREFIX}{name}"),
                })?;
                Ok(Box::new(SkrifaBackend::new(variant)))
            }
            Self::Library(path) => Ok(Box::new(FreeTypeBackend::load(path)?)),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "glyphdiff", version, about, long_about = None)]
struct Cli {
    /// Base build: a FreeType shared library or `builtin:<name>`.
    base: BackendSource,
    /// Build under test: a FreeType shared library or `builtin:<name>`.
    test: BackendSource,
    /// Character size in points.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    char_size: u32,
    /// Font file to compare.
    font: PathBuf,
    /// Rendering resolution in dots per inch.
    #[arg(long, default_value_t = DEFAULT_DPI, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,
    /// Directory to write the report into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Directory for glyph images, relative to the output directory.
    #[arg(long, default_value = "images")]
    images_dir: PathBuf,
    /// File name of the report, relative to the output directory.
    #[arg(long, default_value = "index.html")]
    report: PathBuf,
    /// Capture base images with the test build, as older harnesses did.
    #[arg(long)]
    legacy_capture_backend: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            char_size: self.char_size,
            dpi: self.dpi,
            capture_base_with: if self.legacy_capture_backend {
                CaptureSource::TestBackend
            } else {
                CaptureSource::BaseBackend
            },
            out_dir: self.out_dir.clone(),
            images_dir: self.images_dir.clone(),
            report_name: self.report.clone(),
        }
    }
}

fn execute(cli: &Cli) -> Result<RunSummary, RunError> {
    let base = cli.base.load()?;
    let test = cli.test.load()?;
    debug!("base: {}, test: {}", base.label(), test.label());
    glyphdiff::run(base.as_ref(), test.as_ref(), &cli.font, &cli.run_config())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("GLYPHDIFF_LOG", "info"))
        .init();

    match execute(&cli) {
        Ok(summary) => {
            info!(
                "{} divergent glyph(s); report at {}",
                summary.rows,
                summary.report_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("glyphdiff: {err}");
            ExitCode::FAILURE
        }
    }
}
