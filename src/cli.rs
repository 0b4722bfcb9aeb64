use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Compile classes into stack VM code", long_about = None, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// A source file or a directory of source files
    #[arg(value_hint = ValueHint::AnyPath)]
    pub path: PathBuf,
    /// Write the .vm files here instead of next to their sources
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,
    #[arg(long, help = "print the token stream of each file", default_value_t = false)]
    pub tokens: bool,
    #[arg(long, help = "print each subroutine's symbol tables", default_value_t = false)]
    pub symbols: bool,
    #[arg(long, help = "print the VM code instead of writing files", default_value_t = false)]
    pub stdout: bool,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
