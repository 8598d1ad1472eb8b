use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch repository metadata and refresh the package store
    #[clap(name = "sync", visible_alias = "S")]
    Sync {
        /// Download even when the remote metadata is unchanged
        #[arg(required = false, short, long)]
        force: bool,

        /// Repositories to sync (default: all enabled)
        #[arg(required = false, num_args = 0..)]
        repositories: Vec<String>,
    },

    /// Rebuild package rows from stored metadata without network access
    #[clap(name = "reload")]
    Reload {
        /// Repositories to reload (default: all enabled)
        #[arg(required = false, num_args = 0..)]
        repositories: Vec<String>,
    },

    /// Show the availability matrix of extensions
    #[command(arg_required_else_help = true)]
    #[clap(name = "matrix", visible_alias = "m")]
    Matrix {
        /// Extension or package names
        #[arg(required = true)]
        extensions: Vec<String>,

        /// Also list the matched packages
        #[arg(required = false, short, long)]
        packages: bool,
    },

    /// Write one JSON document per extension
    #[clap(name = "export")]
    Export,

    /// Dump the package store as CSV
    #[clap(name = "dump")]
    Dump {
        /// Write to this path instead of `<data_path>/package.csv`
        #[arg(required = false, short, long)]
        output: Option<String>,
    },

    /// List extensions that are not available everywhere, per platform
    #[clap(name = "gaps")]
    Gaps {
        /// Only show these platforms, e.g. `el9.x86_64`
        #[arg(required = false, short, long, value_delimiter = ',')]
        platform: Option<Vec<String>>,
    },

    /// Print the configuration file to stdout
    #[clap(name = "config")]
    Config,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig {
        /// Write to this path instead of the default location
        #[arg(required = false, short, long)]
        output: Option<String>,
    },
}
