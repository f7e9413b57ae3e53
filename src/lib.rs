// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`darken` generates dark variants of SVG icons.

For every `name.svg` in a directory it writes `name_dark.svg`, with one
literal color replaced by another, and rasterizes it to `name_dark.png`.

```no_run
let opt = darken::Options::default();
let report = darken::process_dir(std::path::Path::new("."), &opt, &darken::Inkscape::default())?;
for (pair, e) in report.failures() {
    eprintln!("{} was not rasterized: {}", pair.derived(), e);
}
# Ok::<(), darken::Error>(())
```
*/

#![warn(missing_docs)]

use std::path::Path;

use log::{debug, info, warn};

mod error;
mod rasterizer;

pub use crate::error::Error;
pub use crate::rasterizer::{Builtin, Disabled, Inkscape, RasterError, Rasterizer};

const SVG_EXT: &str = ".svg";
const PNG_EXT: &str = ".png";


/// Processing options.
#[derive(Clone, Debug)]
pub struct Options {
    /// The literal to replace.
    ///
    /// Matched exactly and case-sensitively.
    ///
    /// Default: `#000000`
    pub from: String,

    /// The replacement literal.
    ///
    /// Default: `#eff1f5`
    pub to: String,

    /// Excludes sources containing it and is inserted before `.svg` in derived names.
    ///
    /// Default: `_dark`
    pub marker: String,

    /// Makes a rasterization failure fatal.
    ///
    /// Otherwise it is logged and the run goes on.
    ///
    /// Default: false
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            from: "#000000".to_string(),
            to: "#eff1f5".to_string(),
            marker: "_dark".to_string(),
            strict: false,
        }
    }
}


/// A source SVG and the derived SVG generated from it.
///
/// Both are file names relative to the processed directory.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FilePair {
    source: String,
    derived: String,
}

impl FilePair {
    /// Pairs `source` with its derived name.
    ///
    /// Returns `None` when `source` is not eligible.
    pub fn new(source: &str, opt: &Options) -> Option<Self> {
        if !is_source(source, opt) {
            return None;
        }

        Some(FilePair {
            source: source.to_string(),
            derived: derived_name(source, opt),
        })
    }

    /// Returns the source file name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the derived SVG file name.
    pub fn derived(&self) -> &str {
        &self.derived
    }

    /// Returns the PNG file name.
    pub fn png(&self) -> String {
        png_name(&self.derived)
    }
}

/// Checks that `name` is a source SVG.
///
/// It must end with `.svg` and must not contain the marker anywhere.
pub fn is_source(name: &str, opt: &Options) -> bool {
    name.ends_with(SVG_EXT) && !name.contains(opt.marker.as_str())
}

/// Inserts the marker before the first `.svg` in `name`.
///
/// `name` stays unchanged when there is no `.svg` in it.
pub fn derived_name(name: &str, opt: &Options) -> String {
    name.replacen(SVG_EXT, &format!("{}{}", opt.marker, SVG_EXT), 1)
}

/// Replaces the trailing `.svg` of `name` with `.png`.
///
/// Appends `.png` when there is no such suffix.
pub fn png_name(name: &str) -> String {
    let stem = name.strip_suffix(SVG_EXT).unwrap_or(name);
    format!("{}{}", stem, PNG_EXT)
}

/// Replaces every occurrence of `opt.from` in `text` with `opt.to`.
///
/// An empty `opt.from` matches nothing.
pub fn darken(text: &str, opt: &Options) -> String {
    if opt.from.is_empty() {
        return text.to_string();
    }

    text.replace(opt.from.as_str(), &opt.to)
}

/// Pairs every eligible entry, in the listing order.
pub fn discover<I, S>(entries: I, opt: &Options) -> Vec<FilePair>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries.into_iter().filter_map(|name| FilePair::new(name.as_ref(), opt)).collect()
}

/// Lists names of all entries in `dir`, in the platform order.
///
/// Names that are not valid UTF-8 are skipped, since they cannot end with `.svg`
/// by our rules anyway.
pub fn list_dir(dir: &Path) -> Result<Vec<String>, Error> {
    let read_err = |source: std::io::Error| Error::ReadDir { path: dir.to_path_buf(), source };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => debug!("Skipping a non-UTF-8 entry {:?}.", name),
        }
    }

    Ok(names)
}

/// Writes the derived SVG of `pair`.
///
/// An existing derived file is overwritten.
pub fn convert(dir: &Path, pair: &FilePair, opt: &Options) -> Result<(), Error> {
    let src = dir.join(&pair.source);
    let text = std::fs::read_to_string(&src).map_err(|source| Error::Read { path: src, source })?;

    let dst = dir.join(&pair.derived);
    std::fs::write(&dst, darken(&text, opt)).map_err(|source| Error::Write { path: dst, source })
}


/// A processed pair.
#[derive(Debug)]
pub struct Processed {
    /// The pair.
    pub pair: FilePair,

    /// The rasterization result.
    ///
    /// The derived SVG is always written at this point.
    pub raster: Result<(), RasterError>,
}

/// A run report.
#[derive(Debug, Default)]
pub struct Report {
    /// All processed pairs, in the processing order.
    pub processed: Vec<Processed>,
}

impl Report {
    /// Returns pairs which PNG was not produced.
    pub fn failures(&self) -> impl Iterator<Item = (&FilePair, &RasterError)> {
        self.processed.iter().filter_map(|p| match p.raster {
            Ok(()) => None,
            Err(ref e) => Some((&p.pair, e)),
        })
    }
}

/// Converts and rasterizes each pair, in order.
///
/// Stops at the first read or write error. Rasterization errors are collected
/// into the report, unless `opt.strict` is set.
pub fn process_pairs(
    dir: &Path,
    pairs: Vec<FilePair>,
    opt: &Options,
    rasterizer: &dyn Rasterizer,
) -> Result<Report, Error> {
    let mut report = Report::default();
    for pair in pairs {
        convert(dir, &pair, opt)?;
        info!("'{}' -> '{}'.", pair.source, pair.derived);

        let svg = dir.join(&pair.derived);
        let png = dir.join(pair.png());
        let raster = match rasterizer.rasterize(&svg, &png) {
            Ok(()) => Ok(()),
            Err(source) if opt.strict => {
                return Err(Error::Rasterization { path: svg, source });
            }
            Err(e) => {
                warn!("Failed to rasterize '{}' cause {}.", pair.derived, e);
                Err(e)
            }
        };

        report.processed.push(Processed { pair, raster });
    }

    Ok(report)
}

/// Lists `dir` and processes every eligible entry.
pub fn process_dir(dir: &Path, opt: &Options, rasterizer: &dyn Rasterizer) -> Result<Report, Error> {
    let pairs = discover(list_dir(dir)?, opt);
    process_pairs(dir, pairs, opt, rasterizer)
}


#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_source {
        ($name:ident, $file:expr, $result:expr) => {
            #[test]
            fn $name() {
                assert_eq!(is_source($file, &Options::default()), $result);
            }
        };
    }

    test_source!(plain_svg,         "icon.svg",         true);
    test_source!(dark_svg,          "icon_dark.svg",    false);
    test_source!(dark_in_the_middle,"a_darker.svg",     false);
    test_source!(dark_prefix,       "_dark-icon.svg",   false);
    test_source!(png,               "icon.png",         false);
    test_source!(upper_case_ext,    "icon.SVG",         false);
    test_source!(svg_not_suffix,    "icon.svg.bak",     false);
    test_source!(bare_ext,          ".svg",             true);

    macro_rules! test_derived {
        ($name:ident, $file:expr, $derived:expr, $png:expr) => {
            #[test]
            fn $name() {
                let pair = FilePair::new($file, &Options::default()).unwrap();
                assert_eq!(pair.source(), $file);
                assert_eq!(pair.derived(), $derived);
                assert_eq!(pair.png(), $png);
            }
        };
    }

    test_derived!(derived_plain,    "icon.svg",         "icon_dark.svg",        "icon_dark.png");
    test_derived!(derived_dotted,   "app.menu.svg",     "app.menu_dark.svg",    "app.menu_dark.png");
    test_derived!(derived_first,    "a.svg.svg",        "a_dark.svg.svg",       "a_dark.svg.png");
    test_derived!(derived_spaces,   "my icon.svg",      "my icon_dark.svg",     "my icon_dark.png");

    #[test]
    fn ineligible_pair() {
        assert_eq!(FilePair::new("icon_dark.svg", &Options::default()), None);
    }

    #[test]
    fn custom_marker() {
        let opt = Options { marker: "-night".to_string(), ..Options::default() };
        assert!(is_source("icon_dark.svg", &opt));
        assert!(!is_source("icon-night.svg", &opt));
        assert_eq!(derived_name("icon.svg", &opt), "icon-night.svg");
    }

    #[test]
    fn darken_fill() {
        let opt = Options::default();
        assert_eq!(darken(r##"<path fill="#000000"/>"##, &opt), r##"<path fill="#eff1f5"/>"##);
    }

    #[test]
    fn darken_every_occurrence() {
        let opt = Options::default();
        assert_eq!(
            darken("#000000;#000000 #0000000", &opt),
            "#eff1f5;#eff1f5 #eff1f50"
        );
    }

    #[test]
    fn darken_is_exact() {
        let opt = Options::default();
        assert_eq!(
            darken(r##"<svg fill="#000" stroke="#000000" color="black" x="#00000A"/>"##, &opt),
            r##"<svg fill="#000" stroke="#eff1f5" color="black" x="#00000A"/>"##
        );

        let text = r##"<svg fill="#000"/><g stroke="black"/>"##;
        assert_eq!(darken(text, &opt), text);
    }

    #[test]
    fn darken_ignores_empty_pattern() {
        let opt = Options { from: String::new(), ..Options::default() };
        assert_eq!(darken("<svg/>", &opt), "<svg/>");
    }

    #[test]
    fn discover_keeps_order() {
        let entries = ["b.svg", "a_dark.svg", "notes.txt", "a.svg", "icon.png"];
        let pairs: Vec<_> = discover(entries.iter(), &Options::default())
            .into_iter()
            .map(|p| p.derived().to_string())
            .collect();
        assert_eq!(pairs, ["b_dark.svg", "a_dark.svg"]);
    }

    #[test]
    fn discover_empty() {
        let entries: Vec<String> = Vec::new();
        assert!(discover(entries, &Options::default()).is_empty());
    }
}
