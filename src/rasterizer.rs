// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use resvg::{tiny_skia, usvg};

/// A rasterization failure.
///
/// Returned by [`Rasterizer::rasterize`]. The caller decides whether it matters.
#[derive(Debug)]
pub enum RasterError {
    /// The external tool cannot be started.
    Spawn(io::Error),

    /// The external tool exited with a non-zero status.
    ///
    /// `None` when it was terminated by a signal.
    Status(Option<i32>),

    /// The derived SVG cannot be read back.
    Read(io::Error),

    /// The derived SVG cannot be parsed.
    Parse(usvg::Error),

    /// The SVG has a zero or too large size.
    InvalidSize,

    /// The PNG cannot be encoded or saved.
    Save(String),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            RasterError::Spawn(ref e) => {
                write!(f, "the rasterizer cannot be started cause {}", e)
            }
            RasterError::Status(Some(code)) => {
                write!(f, "the rasterizer exited with code {}", code)
            }
            RasterError::Status(None) => {
                write!(f, "the rasterizer was terminated by a signal")
            }
            RasterError::Read(ref e) => {
                write!(f, "failed to read the SVG cause {}", e)
            }
            RasterError::Parse(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            RasterError::InvalidSize => {
                write!(f, "SVG has an invalid size")
            }
            RasterError::Save(ref e) => {
                write!(f, "failed to save a PNG cause {}", e)
            }
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            RasterError::Spawn(ref e) | RasterError::Read(ref e) => Some(e),
            RasterError::Parse(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Renders an SVG file into a PNG file.
pub trait Rasterizer {
    /// Renders `svg` into `png`, overwriting it.
    fn rasterize(&self, svg: &Path, png: &Path) -> Result<(), RasterError>;
}


/// Shells out to Inkscape: `inkscape <svg> -o <png>`.
///
/// No version or availability check is performed.
#[derive(Clone, Debug)]
pub struct Inkscape {
    /// The executable to run.
    ///
    /// Resolved through `PATH` when not absolute.
    pub program: PathBuf,
}

impl Default for Inkscape {
    fn default() -> Self {
        Inkscape { program: PathBuf::from("inkscape") }
    }
}

impl Rasterizer for Inkscape {
    fn rasterize(&self, svg: &Path, png: &Path) -> Result<(), RasterError> {
        Command::new(&self.program)
            .arg(svg)
            .arg("-o")
            .arg(png)
            .run()
    }
}

trait CommandExt {
    fn run(&mut self) -> Result<(), RasterError>;
}

impl CommandExt for Command {
    fn run(&mut self) -> Result<(), RasterError> {
        let status = self.status().map_err(RasterError::Spawn)?;
        if status.success() {
            Ok(())
        } else {
            Err(RasterError::Status(status.code()))
        }
    }
}


/// Renders in-process using `resvg`.
///
/// The image is rendered at the SVG intrinsic size.
#[derive(Clone, Default)]
pub struct Builtin {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Builtin {
    /// Creates a rasterizer with system fonts loaded.
    ///
    /// Without fonts, `text` elements are not rendered.
    pub fn with_system_fonts() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        Builtin { fontdb: Arc::new(fontdb) }
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl Rasterizer for Builtin {
    fn rasterize(&self, svg: &Path, png: &Path) -> Result<(), RasterError> {
        let data = std::fs::read(svg).map_err(RasterError::Read)?;

        let mut opt = usvg::Options::default();
        opt.resources_dir = svg.parent().map(Path::to_path_buf);
        opt.fontdb = self.fontdb.clone();

        let tree = usvg::Tree::from_data(&data, &opt).map_err(RasterError::Parse)?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or(RasterError::InvalidSize)?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap.save_png(png).map_err(|e| RasterError::Save(e.to_string()))
    }
}


/// Skips rasterization entirely.
#[derive(Clone, Copy, Default, Debug)]
pub struct Disabled;

impl Rasterizer for Disabled {
    fn rasterize(&self, _: &Path, _: &Path) -> Result<(), RasterError> {
        Ok(())
    }
}
