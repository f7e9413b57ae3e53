// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path;
use std::str::FromStr;

macro_rules! timed {
    ($args:expr, $name:expr, $task:expr) => {
        if $args.perf {
            let now = std::time::Instant::now();
            let res = $task;
            println!("{}: {:.2}ms", $name, now.elapsed().as_micros() as f64 / 1000.0);
            res
        } else {
            $task
        }
    };
}

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process() -> Result<(), String> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(args.log_level);
        }
    }

    let names = timed!(args, "Listing", darken::list_dir(&args.dir).map_err(|e| e.to_string()))?;
    let pairs = darken::discover(names, &args.opt);

    if args.dry_run {
        for pair in &pairs {
            println!("{} -> {} -> {}", pair.source(), pair.derived(), pair.png());
        }

        return Ok(());
    }

    let rasterizer = timed!(args, "Rasterizer init", make_rasterizer(&args));

    let report = timed!(args, "Processing",
        darken::process_pairs(&args.dir, pairs, &args.opt, rasterizer.as_ref())
    ).map_err(|e| e.to_string())?;

    let failed = report.failures().count();
    if failed != 0 {
        log::warn!("{} of {} PNG files were not produced.", failed, report.processed.len());
    }

    Ok(())
}

const HELP: &str = "\
darken generates dark variants of SVG icons.

For every <name>.svg in DIR, writes <name>_dark.svg with one color replaced
and rasterizes it into <name>_dark.png.
Files which names contain the marker are never used as a source.

USAGE:
  darken [OPTIONS] [DIR]

  darken
  darken icons
  darken --rasterizer builtin --to '#cdd6f4' icons

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version

  --from COLOR                  Sets the color to replace. Matched literally
                                [default: #000000]
  --to COLOR                    Sets the replacement color
                                [default: #eff1f5]
  --marker TEXT                 Sets the derived files marker
                                [default: _dark]

  --rasterizer NAME             Selects the PNG rasterizer
                                [default: inkscape]
                                [possible values: inkscape, builtin, none]
  --inkscape PATH               Sets the Inkscape executable
                                [default: inkscape]
  --skip-system-fonts           Disables system fonts loading
                                for the builtin rasterizer
  --strict                      Fails on the first rasterization error
                                instead of skipping it

  --dry-run                     Prints found pairs without writing anything
  --perf                        Prints performance stats
  --quiet                       Disables warnings
  -v, --verbose                 Prints each processed file

ARGS:
  [DIR]                         Directory to process [default: .]
";

#[derive(Clone, Copy, PartialEq, Debug)]
enum RasterizerKind {
    Inkscape,
    Builtin,
    None,
}

impl FromStr for RasterizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inkscape" => Ok(RasterizerKind::Inkscape),
            "builtin" => Ok(RasterizerKind::Builtin),
            "none" => Ok(RasterizerKind::None),
            _ => Err(format!("'{}' is not a known rasterizer", s)),
        }
    }
}

#[derive(Debug)]
struct CliArgs {
    from: Option<String>,
    to: Option<String>,
    marker: Option<String>,

    rasterizer: RasterizerKind,
    inkscape: Option<path::PathBuf>,
    skip_system_fonts: bool,
    strict: bool,

    dry_run: bool,
    perf: bool,
    quiet: bool,
    verbose: bool,

    dir: Option<path::PathBuf>,
}

fn collect_args() -> Result<CliArgs, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let args = CliArgs {
        from:               input.opt_value_from_fn("--from", parse_literal)?,
        to:                 input.opt_value_from_fn("--to", parse_literal)?,
        marker:             input.opt_value_from_fn("--marker", parse_marker)?,

        rasterizer:         input.opt_value_from_str("--rasterizer")?
                                 .unwrap_or(RasterizerKind::Inkscape),
        inkscape:           input.opt_value_from_str("--inkscape")?,
        skip_system_fonts:  input.contains("--skip-system-fonts"),
        strict:             input.contains("--strict"),

        dry_run:            input.contains("--dry-run"),
        perf:               input.contains("--perf"),
        quiet:              input.contains("--quiet"),
        verbose:            input.contains(["-v", "--verbose"]),

        dir:                input.opt_free_from_str()?,
    };

    let rest = input.finish();
    if !rest.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments {:?}", rest),
        });
    }

    Ok(args)
}

fn parse_literal(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("COLOR cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn parse_marker(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("marker cannot be empty".to_string())
    } else if s.contains(".svg") {
        Err("marker cannot contain '.svg'".to_string())
    } else {
        Ok(s.to_string())
    }
}

struct Args {
    dir: path::PathBuf,
    opt: darken::Options,
    rasterizer: RasterizerKind,
    inkscape: Option<path::PathBuf>,
    skip_system_fonts: bool,
    dry_run: bool,
    perf: bool,
    quiet: bool,
    log_level: log::LevelFilter,
}

fn parse_args() -> Result<Args, String> {
    let args = collect_args().map_err(|e| e.to_string())?;

    if args.inkscape.is_some() && args.rasterizer != RasterizerKind::Inkscape {
        println!("Warning: --inkscape has no effect without the inkscape rasterizer.");
    }

    if args.skip_system_fonts && args.rasterizer != RasterizerKind::Builtin {
        println!("Warning: --skip-system-fonts has no effect without the builtin rasterizer.");
    }

    let defaults = darken::Options::default();
    let opt = darken::Options {
        from: args.from.unwrap_or(defaults.from),
        to: args.to.unwrap_or(defaults.to),
        marker: args.marker.unwrap_or(defaults.marker),
        strict: args.strict,
    };

    let log_level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    Ok(Args {
        dir: args.dir.unwrap_or_else(|| path::PathBuf::from(".")),
        opt,
        rasterizer: args.rasterizer,
        inkscape: args.inkscape,
        skip_system_fonts: args.skip_system_fonts,
        dry_run: args.dry_run,
        perf: args.perf,
        quiet: args.quiet,
        log_level,
    })
}

fn make_rasterizer(args: &Args) -> Box<dyn darken::Rasterizer> {
    match args.rasterizer {
        RasterizerKind::Inkscape => {
            let mut inkscape = darken::Inkscape::default();
            if let Some(ref program) = args.inkscape {
                inkscape.program = program.clone();
            }

            Box::new(inkscape)
        }
        RasterizerKind::Builtin => {
            if args.skip_system_fonts {
                Box::new(darken::Builtin::default())
            } else {
                Box::new(darken::Builtin::with_system_fonts())
            }
        }
        RasterizerKind::None => Box::new(darken::Disabled),
    }
}


/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
