use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "claude-limits")]
#[command(about = "Check Claude.ai usage limits for your Pro/Max subscription")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Field to look up when no subcommand is given (e.g. "five", "7day")
    pub query: Option<String>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Cache TTL in seconds (0 disables the cache)
    #[arg(long, default_value = "30", global = true)]
    pub cache: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show usage limits (default)
    Limits {
        /// Fuzzy field name; prints just that value
        query: Option<String>,
    },

    /// Run as an MCP server on stdio
    Serve,

    /// Install a status line script and register it in Claude Code settings
    InstallScript(InstallArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    /// Script name (see --list)
    #[arg(required_unless_present = "list")]
    pub name: Option<String>,

    /// Destination file
    #[arg(required_unless_present = "list")]
    pub path: Option<String>,

    /// Overwrite an existing file and statusLine entry
    #[arg(short, long)]
    pub force: bool,

    /// List available scripts
    #[arg(short, long)]
    pub list: bool,

    /// Write .claude/settings.json in the current directory instead of the user settings
    #[arg(long)]
    pub project: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Query from `limits <query>` or the bare root positional.
    pub fn query(&self) -> Option<&str> {
        match &self.command {
            Some(Commands::Limits { query }) => query.as_deref(),
            _ => self.query.as_deref(),
        }
    }
}
