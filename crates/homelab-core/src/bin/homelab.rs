//! Command-line interface for the homelab workstation tool.
//!
//! Lists the projects under the projects directory and the Git modules
//! inside a project's source directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use homelab_core::{
    l10n::{Localizer, DEFAULT_LOCALE},
    logging::init_logging,
    DefaultScanner, HomelabConfig, RemoteResolver, RepoRecord,
};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Homelab - list development projects and their Git modules
#[derive(Parser, Debug)]
#[command(
    name = "homelab",
    version,
    about = "List development projects and the Git modules inside them",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the projects
    #[arg(long = "projects-dir", value_name = "PATH", global = true)]
    projects_dir: Option<PathBuf>,

    /// Subdirectory of a project that holds its modules ("" for the project itself)
    #[arg(long = "source-dir", value_name = "DIR", global = true)]
    source_dir: Option<String>,

    /// How origin URLs are looked up
    #[arg(long = "resolver", value_enum, global = true)]
    resolver: Option<ResolverArg>,

    /// Output as JSON instead of a table
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Sort results by name or hosting service
    #[arg(
        short = 's',
        long = "sort",
        value_enum,
        default_value_t = SortProfile::Name,
        global = true
    )]
    sort: SortProfile,

    /// Locale for messages (e.g., en, de)
    #[arg(short = 'l', long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with projects
    Projects {
        #[command(subcommand)]
        action: ProjectsCommand,
    },
    /// Work with the modules of a project
    Modules {
        #[command(subcommand)]
        action: ModulesCommand,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    /// List the Git repositories directly under the projects directory
    List,
}

#[derive(Subcommand, Debug)]
enum ModulesCommand {
    /// List the Git repositories below a project's source directory
    List {
        /// Project name (directory under the projects directory)
        project: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved configuration as JSON
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolverArg {
    /// Run `git remote get-url origin`
    Git,
    /// Read the remote in-process with gitoxide
    Gix,
}

impl From<ResolverArg> for RemoteResolver {
    fn from(arg: ResolverArg) -> Self {
        match arg {
            ResolverArg::Git => RemoteResolver::Git,
            ResolverArg::Gix => RemoteResolver::Gix,
        }
    }
}

/// Sorting profiles for organizing results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortProfile {
    /// Sort alphabetically by name
    Name,
    /// Group by hosting service and account, then name
    Service,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = HomelabConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    let localizer = build_localizer(config.locale.as_deref())?;
    let scanner = DefaultScanner::new().with_resolver(config.resolver);

    match &cli.command {
        Command::Projects {
            action: ProjectsCommand::List,
        } => {
            let root = config.projects_dir.clone();
            announce(&cli, &localizer, &root);
            let mut projects = scanner
                .scan_projects(&root)
                .await
                .with_context(|| format!("Failed to list projects in {}", root.display()))?;
            sort_records(&mut projects, cli.sort);
            output(&cli, &localizer, &projects, "scan-no-projects", &root)
        }
        Command::Modules {
            action: ModulesCommand::List { project },
        } => {
            let root = config.project_source_dir(project);
            announce(&cli, &localizer, &root);
            let mut modules = scanner
                .scan_modules(&root)
                .await
                .with_context(|| format!("Failed to list modules of project '{}'", project))?;
            sort_records(&mut modules, cli.sort);
            output(&cli, &localizer, &modules, "scan-no-modules", &root)
        }
        Command::Config {
            action: ConfigCommand::Show,
        } => {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{}", json);
            Ok(())
        }
    }
}

/// Command-line flags win over the store and the environment.
fn apply_overrides(config: &mut HomelabConfig, cli: &Cli) {
    if let Some(dir) = &cli.projects_dir {
        config.set_projects_dir(dir);
    }
    if let Some(source_dir) = &cli.source_dir {
        config.source_dir = source_dir.clone();
    }
    if let Some(resolver) = cli.resolver {
        config.resolver = resolver.into();
    }
    if let Some(locale) = &cli.locale {
        config.locale = Some(locale.clone());
    }
}

fn build_localizer(locale: Option<&str>) -> Result<Localizer> {
    match locale {
        Some(locale) => {
            Localizer::new(locale).with_context(|| format!("Failed to load locale: {}", locale))
        }
        None => Localizer::from_system()
            .or_else(|_| Localizer::new(DEFAULT_LOCALE))
            .context("Failed to load default locale"),
    }
}

fn announce(cli: &Cli, localizer: &Localizer, root: &Path) {
    if !cli.json && cli.verbose {
        let path = root.display().to_string();
        eprintln!("{}", localizer.get("scan-started", Some(&[("path", path.as_str())])));
    }
}

fn output(
    cli: &Cli,
    localizer: &Localizer,
    records: &[RepoRecord],
    empty_msg: &str,
    root: &Path,
) -> Result<()> {
    if cli.json {
        output_json(records)
    } else {
        output_table(records, localizer, empty_msg, root);
        Ok(())
    }
}

/// Sorts records according to the specified profile
fn sort_records(records: &mut [RepoRecord], profile: SortProfile) {
    let by_name = |a: &RepoRecord, b: &RepoRecord| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    };

    match profile {
        SortProfile::Name => records.sort_by(by_name),
        SortProfile::Service => {
            // Repositories without a recognised service go last.
            records.sort_by(|a, b| {
                let key = |r: &RepoRecord| (r.service().is_none(), r.service(), r.account());
                match key(a).cmp(&key(b)) {
                    Ordering::Equal => by_name(a, b),
                    other => other,
                }
            });
        }
    }
}

/// Outputs records as a JSON array to stdout
fn output_json(records: &[RepoRecord]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Outputs records as a formatted table to stdout
fn output_table(records: &[RepoRecord], localizer: &Localizer, empty_msg: &str, root: &Path) {
    if records.is_empty() {
        let path = root.display().to_string();
        println!("{}", localizer.get(empty_msg, Some(&[("path", path.as_str())])));
        return;
    }

    let header_name = localizer.get("header-name", None);
    let header_service = localizer.get("header-service", None);
    let header_remote = localizer.get("header-remote", None);

    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(10)
        .max(header_name.chars().count())
        .min(50);
    let service_width = 10.max(header_service.chars().count());

    println!(
        "{:<name_width$}  {:<service_width$}  {}",
        header_name, header_service, header_remote
    );
    println!("{}", "=".repeat(name_width + service_width + 40));

    for record in records {
        let service = record
            .service()
            .unwrap_or_else(|| localizer.get("service-unknown", None));
        let remote = if record.has_remote() {
            record.git_repo_url.clone()
        } else {
            localizer.get("remote-none", None)
        };

        println!(
            "{:<name_width$}  {:<service_width$}  {}",
            truncate(&record.name, name_width),
            truncate(&service, service_width),
            remote
        );
    }

    println!();
    let count = records.len().to_string();
    println!("{}", localizer.get("scan-complete", Some(&[("count", count.as_str())])));
}

/// Truncates a string to a maximum width, adding "..." if truncated
fn truncate(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        "...".to_string()
    } else {
        s.chars().take(max_width - 3).collect::<String>() + "..."
    }
}
