extern crate clap;
#[macro_use] extern crate log;
#[macro_use] extern crate lazy_static;
extern crate fern;
extern crate chrono;
extern crate regex;
extern crate term_grid;
extern crate thiserror;

pub mod analyzer;

use clap::{App, AppSettings, Arg};
use analyzer::error::{ParseError, EXIT_OK};

use std::ffi::OsString;
use std::io::{self, Write};

/// Environment variable holding the log verbosity.
const LOG_ENV: &str = "IPPCODE_LOG";

const EXIT_CODES: &str = "\
EXIT CODES:
     0  success
    10  missing parameter or forbidden combination of parameters
    11  unable to open or read the input
    12  unable to open or write the output
    21  missing or invalid header in the IPPcode22 source
    22  unknown or invalid opcode in the IPPcode22 source
    23  other lexical or syntax error in the IPPcode22 source
    99  internal error (not caused by the input or the parameters)";

#[derive(Clone, PartialEq, Eq, Debug)]
enum Command {
    Help(String),
    Analyze,
}

fn main() {
    initialize_logging(log_level(std::env::var(LOG_ENV).ok().as_deref()));

    let code = match run(std::env::args_os()) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            error!("{}", err);
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn run<I: IntoIterator<Item = OsString>>(args: I) -> Result<(), ParseError> {
    let stdout = io::stdout();

    if let Command::Help(text) = process_arguments(args)? {
        let mut out = stdout.lock();
        return out
            .write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| ParseError::Output(e.to_string()));
    }

    let stdin = io::stdin();
    let program = analyzer::parse(stdin.lock())?;

    if log_enabled!(log::Level::Debug) {
        debug!("program listing:\n{}", program.listing());
    }

    program.write_xml(&mut stdout.lock())
}

fn build_app() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Reads IPPcode22 source from standard input, checks its lexical and syntactic \
                validity and writes the XML representation of the program to standard output.")
        .after_help(EXIT_CODES)
        .setting(AppSettings::DisableVersion)
        .setting(AppSettings::DisableHelpFlags)
        .setting(AppSettings::ColorNever)
        .arg(Arg::with_name("help")
            .long("help")
            .takes_value(false)
            .multiple(false)
            .help("Prints this help text. May not be combined with other parameters"))
}

/// Decides what to do from the command line.
/// `--help` is the only parameter and it must stand alone.
fn process_arguments<I, T>(args: I) -> Result<Command, ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let app = build_app();
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let matches = app.clone().get_matches_from_safe(args.clone()).map_err(|e| {
        let reason = e.message.lines().next().unwrap_or("invalid parameters");
        ParseError::Param(reason.trim_start_matches("error: ").to_owned())
    })?;

    if !matches.is_present("help") {
        return Ok(Command::Analyze);
    }
    if args.len() != 2 {
        return Err(ParseError::Param("--help may not be combined with other parameters".to_owned()));
    }

    let mut text: Vec<u8> = Vec::new();
    app.write_help(&mut text)
        .map_err(|e| ParseError::Internal(e.message))?;
    text.push(b'\n');
    String::from_utf8(text)
        .map(Command::Help)
        .map_err(|e| ParseError::Internal(e.to_string()))
}

/// Maps the log setting to a level. Accepts level names or the verbosity counts 0-3.
fn log_level(setting: Option<&str>) -> log::LevelFilter {
    match setting.map(str::trim) {
        None | Some("") | Some("0") => log::LevelFilter::Error,
        Some("1") => log::LevelFilter::Warn,
        Some("2") => log::LevelFilter::Info,
        Some("3") => log::LevelFilter::Debug,
        Some(name) => name.parse().unwrap_or(log::LevelFilter::Error),
    }
}

/// Logs go to stderr: stdout carries the XML document.
fn initialize_logging(level: log::LevelFilter) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply().ok();
}
