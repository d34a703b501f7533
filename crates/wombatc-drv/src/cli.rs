//! Command-line surface.
//!
//! ```text
//! wombatc [options] <source-file>
//!   -o <file>   write executable to <file>
//!   -C          compile only (stop after .asm generation)
//!   -S          compile and assemble (stop before linking)
//!   -run        compile, link, and execute the result
//!   -q          quiet
//!   -v0         verbose
//!   -v1         debug
//!   -ast        dump AST after parsing
//!   -lx         dump tokens after lexing
//!   --version   print version and exit 0
//!   --help      print usage and exit 0
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Printed by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Printed by `--help` and after usage errors.
pub const USAGE: &str = "\
usage: wombatc [options] <source-file>

options:
  -o <file>   write executable to <file>
  -C          compile only (stop after .asm generation)
  -S          compile and assemble (stop before linking)
  -run        compile, link, and execute the result
  -q          quiet
  -v0         verbose
  -v1         debug
  -ast        dump AST after parsing
  -lx         dump tokens after lexing
  --version   print version and exit 0
  --help      print usage and exit 0";

/// How noisy the driver is on stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

/// Where the pipeline stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// `-C`: stop after writing the `.asm` file.
    CompileOnly,
    /// `-S`: stop after assembling the object file.
    Assemble,
    /// Default: assemble and link an executable.
    Link,
    /// `-run`: link, then execute the result.
    Run,
}

/// A fully parsed build invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: BuildMode,
    pub verbosity: Verbosity,
    pub dump_ast: bool,
    pub dump_tokens: bool,
}

/// What the user asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CliRequest {
    Version,
    Help,
    Build(Config),
}

/// Argument errors, reported before any compilation starts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no input file")]
    NoInput,
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' expects a value")]
    MissingValue(String),
    #[error("multiple input files are not supported")]
    MultipleInputs,
}

/// Parses the argument vector (without the program name).
pub fn parse_args(args: &[String]) -> Result<CliRequest, UsageError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut mode = BuildMode::Link;
    let mut verbosity = Verbosity::Normal;
    let mut dump_ast = false;
    let mut dump_tokens = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" => return Ok(CliRequest::Version),
            "--help" => return Ok(CliRequest::Help),
            "-o" => {
                let value = iter.next().ok_or_else(|| UsageError::MissingValue("-o".into()))?;
                output = Some(PathBuf::from(value));
            }
            "-C" => mode = BuildMode::CompileOnly,
            "-S" => mode = BuildMode::Assemble,
            "-run" => mode = BuildMode::Run,
            "-q" => verbosity = Verbosity::Quiet,
            "-v0" => verbosity = Verbosity::Verbose,
            "-v1" => verbosity = Verbosity::Debug,
            "-ast" => dump_ast = true,
            "-lx" => dump_tokens = true,
            other if other.starts_with('-') => {
                return Err(UsageError::UnknownOption(other.to_owned()))
            }
            path => {
                if input.is_some() {
                    return Err(UsageError::MultipleInputs);
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    let input = input.ok_or(UsageError::NoInput)?;
    Ok(CliRequest::Build(Config {
        input,
        output,
        mode,
        verbosity,
        dump_ast,
        dump_tokens,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_version_and_help_short_circuit() {
        assert!(matches!(
            parse_args(&strings(&["--version", "x.wo"])),
            Ok(CliRequest::Version)
        ));
        assert!(matches!(
            parse_args(&strings(&["--help"])),
            Ok(CliRequest::Help)
        ));
    }

    #[test]
    fn test_plain_build() {
        let Ok(CliRequest::Build(config)) = parse_args(&strings(&["main.wo"])) else {
            panic!("expected a build request");
        };
        assert_eq!(config.input, PathBuf::from("main.wo"));
        assert_eq!(config.mode, BuildMode::Link);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(!config.dump_ast);
        assert!(!config.dump_tokens);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_all_flags() {
        let Ok(CliRequest::Build(config)) = parse_args(&strings(&[
            "-C", "-q", "-ast", "-lx", "-o", "out.obj", "prog.wo",
        ])) else {
            panic!("expected a build request");
        };
        assert_eq!(config.mode, BuildMode::CompileOnly);
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert!(config.dump_ast);
        assert!(config.dump_tokens);
        assert_eq!(config.output, Some(PathBuf::from("out.obj")));
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(parse_args(&strings(&["-C"])), Err(UsageError::NoInput));
        assert_eq!(parse_args(&[]), Err(UsageError::NoInput));
    }

    #[test]
    fn test_unknown_option() {
        assert_eq!(
            parse_args(&strings(&["--frobnicate", "x.wo"])),
            Err(UsageError::UnknownOption("--frobnicate".into()))
        );
    }

    #[test]
    fn test_dash_o_requires_a_value() {
        assert_eq!(
            parse_args(&strings(&["x.wo", "-o"])),
            Err(UsageError::MissingValue("-o".into()))
        );
    }

    #[test]
    fn test_two_inputs_rejected() {
        assert_eq!(
            parse_args(&strings(&["a.wo", "b.wo"])),
            Err(UsageError::MultipleInputs)
        );
    }

    #[test]
    fn test_run_mode() {
        let Ok(CliRequest::Build(config)) = parse_args(&strings(&["-run", "a.wo"])) else {
            panic!("expected a build request");
        };
        assert_eq!(config.mode, BuildMode::Run);
    }
}
