// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io;
use std::path::PathBuf;

use crate::rasterizer::RasterError;

/// List of all fatal errors.
///
/// Any of them aborts the run. Pairs processed before the error are kept as is.
#[derive(Debug)]
pub enum Error {
    /// The scanned directory cannot be listed.
    ReadDir {
        /// The failed path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A source SVG cannot be read.
    ///
    /// Also occurs when the file is not valid UTF-8.
    Read {
        /// The failed path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A derived SVG cannot be written.
    Write {
        /// The failed path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A derived SVG cannot be rasterized.
    ///
    /// Only reported in strict mode.
    Rasterization {
        /// The derived SVG path.
        path: PathBuf,
        /// The underlying error.
        source: RasterError,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::ReadDir { ref path, ref source } => {
                write!(f, "failed to list {:?} cause {}", path, source)
            }
            Error::Read { ref path, ref source } => {
                write!(f, "failed to read {:?} cause {}", path, source)
            }
            Error::Write { ref path, ref source } => {
                write!(f, "failed to write {:?} cause {}", path, source)
            }
            Error::Rasterization { ref path, ref source } => {
                write!(f, "failed to rasterize {:?} cause {}", path, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::ReadDir { ref source, .. }
            | Error::Read { ref source, .. }
            | Error::Write { ref source, .. } => Some(source),
            Error::Rasterization { ref source, .. } => Some(source),
        }
    }
}
