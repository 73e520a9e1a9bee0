use tracing::level_filters::LevelFilter;

/// Level of verbosity in debugs
#[derive(Clone, Debug, clap::ValueEnum)]
pub enum MyVerbosity {
    /// Quiet
    Quiet,
    /// Normal
    Normal,
    /// Verbose
    Verbose,
    /// Very Verbose
    VeryVerbose,
    /// Debug
    Debug,
}

impl From<MyVerbosity> for LevelFilter {
    fn from(val: MyVerbosity) -> Self {
        match val {
            MyVerbosity::Quiet => LevelFilter::OFF,
            MyVerbosity::Normal => LevelFilter::INFO,
            MyVerbosity::Verbose => LevelFilter::DEBUG,
            MyVerbosity::VeryVerbose => LevelFilter::TRACE,
            MyVerbosity::Debug => LevelFilter::TRACE,
        }
    }
}
