use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;

use pvault_assist::{AgentConfig, AgentConfigStore, AgentProvider};
use pvault_diff::SemanticDiffer;
use pvault_history::tables::PROCESSES;
use pvault_history::{
    search_processes, BoardAnalytics, HistoryError, HistoryValidator, SearchFilters, VersionHistory,
};
use pvault_store::{to_row, JsonFileRowStore, RowStore};
use pvault_types::{
    BoardId, NewVersion, Process, ProcessId, ProcessStatus, ProcessVersion, UserId, VersionId,
    VersionStatus,
};
use pvault_xml::{find_named_element, ProcessMetrics};

use crate::cli::*;
use crate::config::CliConfig;
use crate::output::{print_json, render_diff, render_entry, render_report, render_version, status_label};

type History = VersionHistory<JsonFileRowStore>;

/// Dispatch a parsed command line.
pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(&config, format, args),
        Command::Metrics(args) => cmd_metrics(format, args),
        Command::Search(args) => cmd_search(&config, format, args).await,
        Command::Process(args) => cmd_process(&config, format, args).await,
        Command::Commit(args) => cmd_commit(&config, format, args).await,
        Command::Log(args) => cmd_log(&config, format, args).await,
        Command::BoardLog(args) => cmd_board_log(&config, format, args).await,
        Command::Show(args) => cmd_show(&config, format, args).await,
        Command::Compare(args) => cmd_compare(&config, format, args).await,
        Command::Restore(args) => cmd_restore(&config, format, args).await,
        Command::Status(args) => cmd_status(&config, format, args).await,
        Command::Verify(args) => cmd_verify(&config, format, args).await,
        Command::Agents(args) => cmd_agents(&config, format, args),
    }
}

async fn open_history(config: &CliConfig) -> anyhow::Result<History> {
    let store = JsonFileRowStore::open(&config.store_path)
        .await
        .with_context(|| format!("opening store {}", config.store_path.display()))?;
    Ok(VersionHistory::with_config(store, config.history.clone()))
}

fn read_diagram(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn author(config: &CliConfig, explicit: Option<String>) -> UserId {
    UserId::new(explicit.unwrap_or_else(|| config.author.clone()))
}

// --- File commands ---

fn cmd_diff(config: &CliConfig, format: OutputFormat, args: DiffArgs) -> anyhow::Result<()> {
    let old = read_diagram(&args.old)?;
    let new = read_diagram(&args.new)?;
    let mut tracked = config.history.tracked_attributes.clone();
    for name in args.track {
        tracked = tracked.with(name);
    }
    let diff = SemanticDiffer::new(tracked).diff(&old, &new);

    match format {
        OutputFormat::Json => print_json(&diff),
        OutputFormat::Text => {
            println!("{} → {}", args.old.display().to_string().bold(), args.new.display().to_string().bold());
            print!("{}", render_diff(&diff));
            Ok(())
        }
    }
}

fn cmd_metrics(format: OutputFormat, args: MetricsArgs) -> anyhow::Result<()> {
    let metrics = ProcessMetrics::from_xml(&read_diagram(&args.file)?);
    match format {
        OutputFormat::Json => print_json(&metrics),
        OutputFormat::Text => {
            println!("{}", args.file.display().to_string().bold());
            println!("  Elements:   {}", metrics.total_elements);
            println!("  Tasks:      {}", metrics.tasks);
            println!("  Gateways:   {}", metrics.gateways);
            println!("  Events:     {}", metrics.events);
            println!("  Complexity: {}", metrics.complexity_score.to_string().cyan());
            println!("  Estimate:   {}h", metrics.estimated_duration_hours);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct FileMatch {
    file: String,
    element_id: Option<String>,
    kind: String,
    name: String,
}

async fn cmd_search(config: &CliConfig, format: OutputFormat, args: SearchArgs) -> anyhow::Result<()> {
    if !args.files.is_empty() {
        let mut matches = Vec::new();
        for path in &args.files {
            if let Some(m) = find_named_element(&read_diagram(path)?, &args.query) {
                matches.push(FileMatch {
                    file: path.display().to_string(),
                    element_id: m.element_id.clone(),
                    kind: m.kind.clone(),
                    name: m.name.clone(),
                });
            }
        }
        return match format {
            OutputFormat::Json => print_json(&matches),
            OutputFormat::Text => {
                if matches.is_empty() {
                    println!("No matches.");
                }
                for m in &matches {
                    println!("{}: Found in {}: \"{}\"", m.file.bold(), m.kind, m.name);
                }
                Ok(())
            }
        };
    }

    let filters = SearchFilters {
        status: args.status.as_deref().map(str::parse::<ProcessStatus>).transpose()?,
        tag: args.tag,
        responsible_role: args.role,
        department: args.department,
    };
    let board = args.board.as_deref().map(str::parse::<BoardId>).transpose()?;
    let history = open_history(config).await?;
    let processes = history.processes(board.as_ref()).await?;
    let hits = search_processes(&processes, &args.query, &filters);

    match format {
        OutputFormat::Json => print_json(&hits),
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("No matches.");
            }
            for hit in &hits {
                let snippet = hit.snippet.as_deref().unwrap_or("");
                println!("{}  {}  [{:?}] {}", hit.process_id.short_id().dimmed(), hit.title.bold(), hit.matched, snippet);
            }
            Ok(())
        }
    }
}

// --- Process commands ---

async fn cmd_process(config: &CliConfig, format: OutputFormat, args: ProcessArgs) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    match args.action {
        ProcessAction::Create { title, board, description, tags, file } => {
            let board = match board {
                Some(board) => board.parse::<BoardId>()?,
                None => BoardId::new(),
            };
            let mut process = Process::new(board, title, author(config, None));
            process.description = description;
            process.tags = tags;
            history.store().insert(PROCESSES, to_row(&process)?).await?;

            let first = match file {
                Some(path) => {
                    let new = NewVersion::new(process.id, read_diagram(&path)?, author(config, None))
                        .with_comment("Initial version");
                    Some(history.create_version(new).await?)
                }
                None => None,
            };

            match format {
                OutputFormat::Json => print_json(&process),
                OutputFormat::Text => {
                    println!("{} Created process {}", "✓".green().bold(), process.title.bold());
                    println!("  Id:    {}", process.id.to_string().cyan());
                    println!("  Board: {}", process.board_id);
                    if let Some(v) = first {
                        println!("  Saved {}", v.label().yellow());
                    }
                    Ok(())
                }
            }
        }
        ProcessAction::List { board } => {
            let board = board.as_deref().map(str::parse::<BoardId>).transpose()?;
            let processes = history.processes(board.as_ref()).await?;
            match format {
                OutputFormat::Json => print_json(&processes),
                OutputFormat::Text => {
                    if processes.is_empty() {
                        println!("No processes.");
                    }
                    for p in &processes {
                        println!("{}  {:<32} {:<15} v{}", p.id.to_string().cyan(), p.title.bold(), p.status, p.version);
                    }
                    Ok(())
                }
            }
        }
        ProcessAction::Stats { board } => {
            let board = board.as_deref().map(str::parse::<BoardId>).transpose()?;
            let analytics = BoardAnalytics::from_processes(&history.processes(board.as_ref()).await?);
            match format {
                OutputFormat::Json => print_json(&analytics),
                OutputFormat::Text => {
                    println!("{analytics}");
                    Ok(())
                }
            }
        }
    }
}

// --- Version commands ---

async fn cmd_commit(config: &CliConfig, format: OutputFormat, args: CommitArgs) -> anyhow::Result<()> {
    let process: ProcessId = args.process.parse()?;
    let xml = read_diagram(&args.file)?;
    pvault_xml::parse_document(&xml).with_context(|| format!("{} is not well-formed XML", args.file.display()))?;

    let mut new = NewVersion::new(process, xml, author(config, args.author));
    if let Some(message) = args.message {
        new = new.with_comment(message);
    }
    if let Some(path) = &args.thumbnail {
        new = new.with_thumbnail(read_diagram(path)?);
    }
    if let Some(status) = &args.status {
        new = new.with_status(status.parse()?);
    }

    let history = open_history(config).await?;
    let version = match history.create_version(new).await {
        Ok(version) => version,
        Err(e @ HistoryError::StalePointer { .. }) => {
            if let Some(saved) = e.saved_version() {
                eprintln!("{} saved {} but the process still points at its previous version", "warning:".yellow().bold(), saved.label());
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    print_saved(format, &version, "Saved")
}

fn print_saved(format: OutputFormat, version: &ProcessVersion, verb: &str) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(version),
        OutputFormat::Text => {
            println!("{} {verb} {} [{}]", "✓".green().bold(), version.label().yellow().bold(), status_label(version.status));
            println!("  Id: {}", version.id.to_string().dimmed());
            if let Some(comment) = &version.comment {
                println!("  {comment}");
            }
            Ok(())
        }
    }
}

async fn cmd_log(config: &CliConfig, format: OutputFormat, args: LogArgs) -> anyhow::Result<()> {
    let process: ProcessId = args.process.parse()?;
    let history = open_history(config).await?;
    let mut entries = history.list_versions(&process).await;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No versions.");
            }
            for entry in &entries {
                println!("{}", render_entry(entry, args.oneline));
            }
            Ok(())
        }
    }
}

async fn cmd_board_log(config: &CliConfig, format: OutputFormat, args: BoardLogArgs) -> anyhow::Result<()> {
    let board: BoardId = args.board.parse()?;
    let history = open_history(config).await?;
    let entries = history.list_board_versions(&board).await;
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No versions.");
            }
            for entry in &entries {
                println!("{}", render_entry(entry, false));
            }
            Ok(())
        }
    }
}

async fn find_version(history: &History, version: &str, process: Option<&str>) -> anyhow::Result<ProcessVersion> {
    match (process, version.parse::<u32>()) {
        (Some(process), Ok(number)) => Ok(history.version_by_number(&process.parse::<ProcessId>()?, number).await?),
        _ => Ok(history.get_version(&version.parse::<VersionId>()?).await?),
    }
}

async fn cmd_show(config: &CliConfig, format: OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    let version = find_version(&history, &args.version, args.process.as_deref()).await?;
    if args.xml {
        println!("{}", version.xml());
        return Ok(());
    }
    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            print!("{}", render_version(&version));
            Ok(())
        }
    }
}

async fn cmd_compare(config: &CliConfig, format: OutputFormat, args: CompareArgs) -> anyhow::Result<()> {
    let process: ProcessId = args.process.parse()?;
    let history = open_history(config).await?;
    let from = history.version_by_number(&process, args.from).await?;
    let to = history.version_by_number(&process, args.to).await?;
    let diff = history.compare_versions(&from.id, &to.id).await?;
    match format {
        OutputFormat::Json => print_json(&diff),
        OutputFormat::Text => {
            println!("{} → {}", from.label().yellow(), to.label().yellow());
            print!("{}", render_diff(&diff));
            Ok(())
        }
    }
}

async fn cmd_restore(config: &CliConfig, format: OutputFormat, args: RestoreArgs) -> anyhow::Result<()> {
    let process: ProcessId = args.process.parse()?;
    let history = open_history(config).await?;
    let target = history.version_by_number(&process, args.number).await?;
    let version = history.restore(&process, &target.id, author(config, args.author)).await?;
    print_saved(format, &version, "Restored as")
}

async fn cmd_status(config: &CliConfig, format: OutputFormat, args: StatusArgs) -> anyhow::Result<()> {
    let id: VersionId = args.version.parse()?;
    let status: VersionStatus = args.status.parse()?;
    let history = open_history(config).await?;
    let version = history.update_status(&id, status).await?;
    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            println!("{} {} is now {}", "✓".green().bold(), version.label().yellow(), status_label(version.status));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct ReportView {
    process: String,
    version_count: usize,
    valid: bool,
    violations: Vec<String>,
}

async fn cmd_verify(config: &CliConfig, format: OutputFormat, args: VerifyArgs) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    let reports = match args.process {
        Some(process) => vec![HistoryValidator::validate_process(&history, &process.parse::<ProcessId>()?).await?],
        None => {
            let board = args.board.as_deref().map(str::parse::<BoardId>).transpose()?;
            HistoryValidator::validate_all(&history, board.as_ref()).await?
        }
    };
    let failed = reports.iter().filter(|r| !r.is_valid()).count();

    match format {
        OutputFormat::Json => {
            let views: Vec<ReportView> = reports
                .iter()
                .map(|r| ReportView {
                    process: r.process.to_string(),
                    version_count: r.version_count,
                    valid: r.is_valid(),
                    violations: r.violations.iter().map(|v| v.description.clone()).collect(),
                })
                .collect();
            print_json(&views)?;
        }
        OutputFormat::Text => {
            for report in &reports {
                print!("{}", render_report(report));
            }
            if failed == 0 {
                println!("{} {} histories verified", "✓".green().bold(), reports.len());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} histories failed verification", reports.len());
    }
    Ok(())
}

// --- Agents ---

#[derive(Serialize)]
struct AgentView<'a> {
    id: &'a str,
    name: &'a str,
    provider: AgentProvider,
    model: Option<&'a str>,
    api_key: String,
}

impl<'a> From<&'a AgentConfig> for AgentView<'a> {
    fn from(agent: &'a AgentConfig) -> Self {
        Self {
            id: &agent.id,
            name: &agent.name,
            provider: agent.provider,
            model: agent.effective_model(),
            api_key: agent.masked_key(),
        }
    }
}

fn cmd_agents(config: &CliConfig, format: OutputFormat, args: AgentsArgs) -> anyhow::Result<()> {
    let store = AgentConfigStore::new(&config.agents_path);
    match args.action.unwrap_or(AgentAction::List) {
        AgentAction::List => {
            let agents = store.list()?;
            match format {
                OutputFormat::Json => {
                    let views: Vec<AgentView<'_>> = agents.iter().map(AgentView::from).collect();
                    print_json(&views)
                }
                OutputFormat::Text => {
                    if agents.is_empty() {
                        println!("No agents configured.");
                    }
                    for agent in &agents {
                        println!(
                            "{}  {} ({}, {})  {}",
                            agent.id.dimmed(),
                            agent.name.bold(),
                            agent.provider,
                            agent.effective_model().unwrap_or("-"),
                            agent.masked_key()
                        );
                    }
                    Ok(())
                }
            }
        }
        AgentAction::Add { name, provider, api_key, model } => {
            let agent = AgentConfig::new(name, provider.parse()?, api_key, model);
            store.save(agent.clone())?;
            println!("{} Added agent {} ({})", "✓".green().bold(), agent.name.bold(), agent.id.dimmed());
            Ok(())
        }
        AgentAction::Remove { agent } => {
            let found = store.find(&agent)?;
            store.delete(&found.id)?;
            println!("Removed agent {}", found.name.bold());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    const V1: &str = r#"<bpmn:definitions xmlns:bpmn="x"><bpmn:process id="P"><bpmn:task id="T1" name="Review"/></bpmn:process></bpmn:definitions>"#;
    const V2: &str = r#"<bpmn:definitions xmlns:bpmn="x"><bpmn:process id="P"><bpmn:task id="T1" name="Check"/><bpmn:task id="T2"/></bpmn:process></bpmn:definitions>"#;

    struct Workspace {
        dir: tempfile::TempDir,
        config: std::path::PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = dir.path().join("pvault.toml");
            std::fs::write(&config, "author = \"user-ana\"\n").unwrap();
            std::fs::write(dir.path().join("v1.bpmn"), V1).unwrap();
            std::fs::write(dir.path().join("v2.bpmn"), V2).unwrap();
            Self { dir, config }
        }

        fn file(&self, name: &str) -> String {
            self.dir.path().join(name).display().to_string()
        }

        async fn run(&self, args: &[&str]) -> anyhow::Result<()> {
            let config = self.config.display().to_string();
            let mut argv = vec!["pvault", "--config", config.as_str(), "--format", "json"];
            argv.extend_from_slice(args);
            run_command(Cli::try_parse_from(argv)?).await
        }

        async fn history(&self) -> History {
            let config = CliConfig::load(Some(&self.config)).unwrap();
            open_history(&config).await.unwrap()
        }
    }

    #[tokio::test]
    async fn commit_restore_and_verify_round() {
        let ws = Workspace::new();
        ws.run(&["process", "create", "Invoices", "--file", &ws.file("v1.bpmn")])
            .await
            .unwrap();

        let history = ws.history().await;
        let process = history.processes(None).await.unwrap().remove(0);
        let pid = process.id.to_string();
        assert_eq!(process.version, 1);

        ws.run(&["commit", &pid, &ws.file("v2.bpmn"), "-m", "Rename review"]).await.unwrap();
        ws.run(&["restore", &pid, "1"]).await.unwrap();
        ws.run(&["compare", &pid, "1", "2"]).await.unwrap();
        ws.run(&["verify", &pid]).await.unwrap();

        let history = ws.history().await;
        let versions = history.read_history(&process.id).await.unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(versions[2].bpmn_xml.as_deref(), Some(V1));
        assert_eq!(versions[2].created_by, UserId::new("user-ana"));
        assert_eq!(versions[1].comment.as_deref(), Some("Rename review"));

        let v3 = versions[2].id.to_string();
        ws.run(&["status", &v3, "rejected"]).await.unwrap();
        let history = ws.history().await;
        assert_eq!(history.get_version(&versions[2].id).await.unwrap().status, VersionStatus::Rejected);
    }

    #[tokio::test]
    async fn malformed_commit_is_refused() {
        let ws = Workspace::new();
        std::fs::write(ws.dir.path().join("bad.bpmn"), "<definitions><task").unwrap();
        let pid = ProcessId::new().to_string();
        assert!(ws.run(&["commit", &pid, &ws.file("bad.bpmn")]).await.is_err());
        assert!(ws.run(&["status", "not-an-id", "approved"]).await.is_err());
    }

    #[tokio::test]
    async fn file_commands_need_no_store() {
        let ws = Workspace::new();
        ws.run(&["diff", &ws.file("v1.bpmn"), &ws.file("v2.bpmn")]).await.unwrap();
        ws.run(&["metrics", &ws.file("v2.bpmn")]).await.unwrap();
        ws.run(&["search", "review", &ws.file("v1.bpmn")]).await.unwrap();
        assert!(!ws.dir.path().join("pvault.json").exists());
    }

    #[tokio::test]
    async fn agents_add_and_remove() {
        let ws = Workspace::new();
        ws.run(&["agents", "add", "Modeler", "--api-key", "sk-test-1234"]).await.unwrap();
        let store = AgentConfigStore::new(ws.dir.path().join("agents.json"));
        assert_eq!(store.list().unwrap().len(), 1);

        ws.run(&["agents", "remove", "modeler"]).await.unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(ws.run(&["agents", "remove", "modeler"]).await.is_err());
    }
}
