//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for
//! coolc.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for coolc.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to the COOL source file.
    #[arg(index = 1)]
    pub input: Option<std::path::PathBuf>,

    /// The path to the COOL source file (alternative to the positional).
    #[arg(short, long)]
    pub file: Option<std::path::PathBuf>,

    /// The path to the output assembly (default: input with `.cl` replaced
    /// by `.mips`).
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,

    /// Whether to dump the parsed AST (for debugging).
    #[arg(long)]
    pub dump_parsed: bool,

    /// Whether to dump the type-checked AST (for debugging).
    #[arg(long)]
    pub dump_typed: bool,

    /// Whether to dump the CIL program (for debugging).
    #[arg(long)]
    pub dump_cil: bool,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }

    pub fn file(&self) -> Option<std::path::PathBuf> {
        self.file.clone().or_else(|| self.input.clone())
    }
}

/// Enum for specifying the log level of coolc.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the compiler.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including per-pass details.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
