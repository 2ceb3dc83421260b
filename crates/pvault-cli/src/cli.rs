use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pvault",
    about = "Process Vault: versioned BPMN process diagrams",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./pvault.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show element changes between two BPMN files
    Diff(DiffArgs),
    /// Show size and complexity metrics of a BPMN file
    Metrics(MetricsArgs),
    /// Search BPMN files, or the processes in the store
    Search(SearchArgs),
    /// Create, list and summarize processes
    Process(ProcessArgs),
    /// Save a BPMN file as the next version of a process
    Commit(CommitArgs),
    /// Show the version history of a process
    Log(LogArgs),
    /// Show recent versions across a board
    BoardLog(BoardLogArgs),
    /// Show one version
    Show(ShowArgs),
    /// Diff two versions of a process
    Compare(CompareArgs),
    /// Restore an old version as a new version
    Restore(RestoreArgs),
    /// Set the review status of a version
    Status(StatusArgs),
    /// Check version history integrity
    Verify(VerifyArgs),
    /// Manage assistant agents
    Agents(AgentsArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Extra attribute to compare besides the configured ones
    #[arg(long = "track")]
    pub track: Vec<String>,
}

#[derive(Args)]
pub struct MetricsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,
    /// BPMN files to search; without files the store is searched
    pub files: Vec<PathBuf>,
    #[arg(long)]
    pub board: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
}

#[derive(Args)]
pub struct ProcessArgs {
    #[command(subcommand)]
    pub action: ProcessAction,
}

#[derive(Subcommand)]
pub enum ProcessAction {
    /// Register a new process, optionally with an initial diagram
    Create {
        title: String,
        #[arg(long)]
        board: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List processes
    List {
        #[arg(long)]
        board: Option<String>,
    },
    /// Board dashboard figures
    Stats {
        #[arg(long)]
        board: Option<String>,
    },
}

#[derive(Args)]
pub struct CommitArgs {
    pub process: String,
    pub file: PathBuf,
    #[arg(short, long)]
    pub message: Option<String>,
    #[arg(long)]
    pub thumbnail: Option<PathBuf>,
    /// Review status (defaults to the configured status)
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args)]
pub struct LogArgs {
    pub process: String,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct BoardLogArgs {
    pub board: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Version id, or a version number together with --process
    pub version: String,
    #[arg(long)]
    pub process: Option<String>,
    /// Print the stored XML snapshot
    #[arg(long)]
    pub xml: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    pub process: String,
    pub from: u32,
    pub to: u32,
}

#[derive(Args)]
pub struct RestoreArgs {
    pub process: String,
    pub number: u32,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    pub version: String,
    pub status: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// A single process; all processes when omitted
    pub process: Option<String>,
    #[arg(long)]
    pub board: Option<String>,
}

#[derive(Args)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub action: Option<AgentAction>,
}

#[derive(Subcommand)]
pub enum AgentAction {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "openai")]
        provider: String,
        #[arg(long)]
        api_key: String,
        #[arg(long, default_value = "")]
        model: String,
    },
    Remove {
        /// Agent id or name
        agent: String,
    },
}
