use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipstream")]
#[command(version)]
#[command(about = "Stream files and directories into a ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipstream -o site.zip public/        archive the public directory into site.zip\n  \
  zipstream -l 0 photos/ > photos.zip  store without compression, write to stdout\n  \
  zipstream logs/ | ssh host 'cat > logs.zip'   stream over a pipe")]
pub struct Cli {
    /// Files or directories to add
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<String>,

    /// Output archive (default: stdout)
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<String>,

    /// Compression level, 0 = store
    #[arg(short = 'l', value_name = "LEVEL", default_value_t = 6,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Log more (-vv for trace output)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode, no per-entry messages
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn writes_to_stdout(&self) -> bool {
        matches!(self.output.as_deref(), None | Some("-"))
    }

    /// Default log filter, overridden by `RUST_LOG`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
