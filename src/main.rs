use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lab::browse::{BrowseRequest, BrowseTarget, LocatorError};
use lab::browser::{LaunchError, SystemOpener, UrlOpener};
use lab::credentials::{CredentialError, CredentialStore};
use lab::git::{GitCli, ProjectPath, RemoteError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_RESOLUTION: i32 = 5;
const EXIT_ENVIRONMENT: i32 = 6;

#[derive(Subcommand, Debug)]
enum DomainCommands {
    /// Append a domain to the preferred list (lowest priority)
    Add {
        /// GitLab host, e.g. gitlab.example.com
        domain: String,
    },
    /// Show preferred domains, highest priority first
    List,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a repository, issue, merge request, pipeline or file page in the browser
    Browse {
        /// Resource reference: #12 / i12 / I12 (issue), !3 / m3 / M3 (merge request),
        /// p7 / P7 (pipeline); a bare prefix opens the list page
        #[arg(conflicts_with = "current")]
        reference: Option<String>,

        /// Browse a file or directory of the repository
        #[arg(short, long, conflicts_with_all = ["current", "reference"])]
        path: Option<PathBuf>,

        /// Browse the current directory of the repository
        #[arg(short = 'C', long)]
        current: bool,

        /// Browse another project on the same server (namespace/project)
        #[arg(short = 'P', long)]
        project: Option<ProjectPath>,

        /// Print the URL instead of opening a browser
        #[arg(short, long)]
        url_only: bool,
    },
    /// Print the private token stored for a domain, asking for one if missing
    Token {
        /// GitLab host, e.g. gitlab.example.com
        domain: String,

        /// Ask for a new token even if one is stored
        #[arg(long)]
        reset: bool,
    },
    /// Manage preferred GitLab domains
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },
}

#[derive(Parser, Debug)]
#[command(name = "lab")]
#[command(about = "Browse GitLab pages of the current repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lab/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    // Load credentials
    let mut store = CredentialStore::new(cli.config.map(PathBuf::from));
    if let Err(e) = store.init() {
        eprintln!("Config error: {}", e);
        std::process::exit(EXIT_CONFIG);
    }
    let (token_count, domain_count) = match store.load() {
        Ok(config) => (config.tokens.collapsed().len(), config.preferred_domains.len()),
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} tokens and {} preferred domains from {}",
            token_count,
            domain_count,
            store.path().map(|p| p.display().to_string()).unwrap_or_default()
        );
    }

    let use_colors = lab::output::should_use_colors();

    let result = match cli.command {
        Commands::Browse {
            reference,
            path,
            current,
            project,
            url_only,
        } => run_browse(
            &mut store,
            BrowseArgs {
                reference,
                path,
                current,
                project,
                url_only,
            },
            cli.verbose,
            use_colors,
        ),
        Commands::Token { domain, reset } => run_token(&mut store, &domain, reset),
        Commands::Domain { command } => run_domain(&mut store, command, use_colors),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

struct BrowseArgs {
    reference: Option<String>,
    path: Option<PathBuf>,
    current: bool,
    project: Option<ProjectPath>,
    url_only: bool,
}

fn run_browse(
    store: &mut CredentialStore,
    args: BrowseArgs,
    verbose: bool,
    use_colors: bool,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let target = BrowseTarget::from_args(
        args.reference.as_deref(),
        args.path.as_deref(),
        args.current,
        &cwd,
    )?;
    let request = BrowseRequest {
        target,
        project: args.project,
    };

    if verbose {
        eprintln!("Browse target: {:?}", request.target);
    }

    let inspector = GitCli::new();
    let resolved = lab::browse::browse_url(&inspector, store, &request)?;

    if verbose {
        match &resolved.remote {
            Some(remote) => eprintln!("Remote: {}", lab::output::format_remote(remote, use_colors)),
            None => eprintln!("Remote: none, using configured domain"),
        }
    }

    if args.url_only {
        println!("{}", resolved.url);
        return Ok(());
    }

    let opener = SystemOpener::detect();
    if verbose {
        match opener.command() {
            Some(command) => eprintln!("Browser launcher: {}", command.display()),
            None => eprintln!("Browser launcher: none found"),
        }
    }

    match opener.open(&resolved.url) {
        Ok(()) => {
            println!("{}", lab::output::format_opening(&resolved.url, use_colors));
            Ok(())
        }
        Err(e) => {
            println!("{}", lab::output::format_manual_open(&resolved.url, use_colors));
            Err(e.into())
        }
    }
}

fn run_token(store: &mut CredentialStore, domain: &str, reset: bool) -> anyhow::Result<()> {
    let token = if reset {
        let token = lab::credentials::prompt_for_token(domain)
            .map_err(|e| CredentialError::Prompt(format!("{:#}", e)))?;
        store.save_token(domain, &token)?;
        token
    } else {
        store.get_or_prompt(domain)?
    };

    println!("{}", token);
    Ok(())
}

fn run_domain(
    store: &mut CredentialStore,
    command: DomainCommands,
    use_colors: bool,
) -> anyhow::Result<()> {
    match command {
        DomainCommands::Add { domain } => {
            if store.preferred_domains()?.iter().any(|d| *d == domain) {
                eprintln!("{} is already a preferred domain", domain);
                return Ok(());
            }
            store.save_preferred_domain(&domain)?;
            println!("Added {} to preferred domains", domain);
        }
        DomainCommands::List => {
            println!(
                "{}",
                lab::output::format_domain_list(store.preferred_domains()?, use_colors)
            );
        }
    }
    Ok(())
}

/// Map the first recognised error in the chain to an exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CredentialError>() {
            return match e {
                CredentialError::Prompt(_) => EXIT_AUTH,
                _ => EXIT_CONFIG,
            };
        }
        if let Some(e) = cause.downcast_ref::<LocatorError>() {
            return if e.is_environment() {
                EXIT_ENVIRONMENT
            } else {
                EXIT_RESOLUTION
            };
        }
        if let Some(e) = cause.downcast_ref::<RemoteError>() {
            return match e {
                RemoteError::Git(_) => EXIT_ENVIRONMENT,
                _ => EXIT_RESOLUTION,
            };
        }
        if cause.downcast_ref::<LaunchError>().is_some() {
            return EXIT_ENVIRONMENT;
        }
    }
    EXIT_RESOLUTION
}
