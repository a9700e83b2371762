use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Executables tried in order on platforms without a fixed launcher
pub const BROWSER_CANDIDATES: &[&str] = &[
    "xdg-open",
    "cygstart",
    "x-www-browser",
    "firefox",
    "opera",
    "mozilla",
    "netscape",
];

#[derive(Debug)]
pub enum LaunchError {
    NoBrowser,
    Spawn { command: String, message: String },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::NoBrowser => write!(f, "No browser launcher found in PATH"),
            LaunchError::Spawn { command, message } => {
                write!(f, "Failed to start {}: {}", command, message)
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Program plus leading arguments; the URL is appended when launching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BrowserCommand {
    fn fixed(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Choose the browser launcher for `os` (as in `std::env::consts::OS`).
///
/// macOS and Windows have fixed launchers. Elsewhere the first candidate that
/// `resolve` finds wins; `None` means no browser is available.
pub fn search_browser_launcher<F>(os: &str, resolve: F) -> Option<BrowserCommand>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    match os {
        "macos" => Some(BrowserCommand::fixed("open", &[])),
        // empty title, otherwise `start` treats a quoted URL as the window title
        "windows" => Some(BrowserCommand::fixed("cmd", &["/C", "start", ""])),
        _ => BROWSER_CANDIDATES.iter().find_map(|&candidate| {
            resolve(candidate).map(|path| BrowserCommand {
                program: path.to_string_lossy().into_owned(),
                args: Vec::new(),
            })
        }),
    }
}

/// Launcher for the running platform, probing `PATH` with `which`
pub fn system_browser() -> Option<BrowserCommand> {
    search_browser_launcher(std::env::consts::OS, |name| which::which(name).ok())
}

/// Opens URLs. Kept behind a trait so callers can be tested without a browser.
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<(), LaunchError>;
}

/// Spawns the platform browser and returns without waiting for it.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener {
    command: Option<BrowserCommand>,
}

impl SystemOpener {
    pub fn detect() -> Self {
        Self {
            command: system_browser(),
        }
    }

    pub fn with_command(command: Option<BrowserCommand>) -> Self {
        Self { command }
    }

    pub fn command(&self) -> Option<&BrowserCommand> {
        self.command.as_ref()
    }
}

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), LaunchError> {
        let command = self.command.as_ref().ok_or(LaunchError::NoBrowser)?;

        Command::new(&command.program)
            .args(&command.args)
            .arg(url)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                command: command.display(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}
