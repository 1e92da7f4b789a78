//! Headless driver for the codepad editor session.
//!
//! Provides the `codepad` binary, which drives the same
//! [`EditorController`] a graphical view would: every subcommand goes
//! through the controller's load, save and run operations, and the
//! notifications the view would show are printed to stderr.
//!
//! Configuration comes from the `CODEPAD_*` environment variables read by
//! [`ClientConfig::from_env`].

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;

use codepad_core::{ExecutionPhase, OutputKind, ProjectId};
use codepad_session::{
    ClientConfig, EditorController, Notification, NotificationLevel, SaveOutcome, StartOutcome,
};

/// Codepad editor session tools.
#[derive(Parser)]
#[command(name = "codepad", about = "Run, load and save codepad projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file through the execution service.
    Run {
        /// File whose contents become the editor buffer.
        file: PathBuf,

        /// Load this project first; its language and version are used.
        #[arg(short, long)]
        project: Option<String>,

        /// Run the file contents as a selection (no filename is sent).
        #[arg(long)]
        selection: bool,
    },
    /// Print a project's code.
    Load {
        project: String,
    },
    /// Replace a project's code with the contents of a file.
    Save {
        project: String,
        file: PathBuf,
    },
    /// Store the session token sent with project requests.
    Login {
        token: String,
    },
    /// Forget the stored session token.
    Logout,
    /// Toggle between the dark and light theme.
    Theme,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let (controller, notes) = match EditorController::from_config(&config) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(
                path = %config.settings_path.display(),
                error = %e,
                "settings unavailable"
            );
            eprintln!("Error: {}", e);
            process::exit(3);
        }
    };
    let mut session = Session { controller, notes };

    let exit_code = match cli.command {
        Commands::Run {
            file,
            project,
            selection,
        } => session.run(&file, project, selection).await,
        Commands::Load { project } => session.load(project).await,
        Commands::Save { project, file } => session.save(project, &file).await,
        Commands::Login { token } => session.login(token),
        Commands::Logout => session.logout(),
        Commands::Theme => session.toggle_theme(),
    };

    session.controller.close();
    process::exit(exit_code);
}

struct Session {
    controller: EditorController,
    notes: UnboundedReceiver<Notification>,
}

/// Exit codes: 0 = success, 1 = the operation failed, 2 = the program ran
/// and failed, 3 = local I/O error.
impl Session {
    async fn run(&mut self, file: &Path, project: Option<String>, selection: bool) -> i32 {
        let source = match read_source(file) {
            Ok(source) => source,
            Err(code) => return code,
        };

        if let Some(id) = project {
            if self.controller.open(ProjectId::new(id)).await.is_none() {
                self.flush_notes();
                return 1;
            }
        }
        self.controller.on_content_changed(source.clone());

        let outcome = if selection {
            self.controller.on_selection_changed(&source);
            self.controller.run_selection().await
        } else {
            self.controller.run_all().await
        };
        self.flush_notes();

        let Some(outcome) = outcome.finished() else {
            if let StartOutcome::Rejected { phase } = &outcome {
                tracing::warn!(%phase, "run rejected");
                eprintln!("Error: a run is already {}", phase);
            }
            return 1;
        };
        for line in outcome.output.iter().flat_map(|lines| lines.iter()) {
            match line.kind {
                OutputKind::Output => println!("{:>4} | {}", line.line_number, line.content),
                OutputKind::Error => eprintln!("{:>4} ! {}", line.line_number, line.content),
            }
        }
        match outcome.phase {
            ExecutionPhase::Completed => 0,
            _ if outcome.result.is_some() => 2,
            _ => 1,
        }
    }

    async fn load(&mut self, id: String) -> i32 {
        let loaded = self.controller.open(ProjectId::new(id)).await;
        self.flush_notes();
        match loaded {
            Some(project) => {
                eprintln!("{} ({} {})", project.name, project.language, project.version);
                println!("{}", project.code);
                0
            }
            None => 1,
        }
    }

    async fn save(&mut self, id: String, file: &Path) -> i32 {
        let source = match read_source(file) {
            Ok(source) => source,
            Err(code) => return code,
        };
        // Loading first only fills in language and version; failure is not
        // fatal because the save targets the id either way.
        self.controller.open(ProjectId::new(id)).await;
        self.drain_notes();
        self.controller.on_content_changed(source);

        let outcome = self.controller.save().await;
        self.flush_notes();
        match outcome {
            SaveOutcome::Saved => 0,
            _ => 1,
        }
    }

    fn login(&mut self, token: String) -> i32 {
        match self.controller.settings().login(token) {
            Ok(()) => {
                eprintln!("Logged in.");
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings write failed");
                eprintln!("Error: {}", e);
                3
            }
        }
    }

    fn logout(&mut self) -> i32 {
        match self.controller.settings().logout() {
            Ok(()) => {
                eprintln!("Logged out.");
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings write failed");
                eprintln!("Error: {}", e);
                3
            }
        }
    }

    fn toggle_theme(&mut self) -> i32 {
        let theme = self.controller.toggle_theme();
        let failed = self
            .drain_notes()
            .iter()
            .any(|n| n.level == NotificationLevel::Error);
        println!("{}", theme);
        if failed {
            3
        } else {
            0
        }
    }

    fn drain_notes(&mut self) -> Vec<Notification> {
        let mut drained = Vec::new();
        while let Ok(note) = self.notes.try_recv() {
            drained.push(note);
        }
        drained
    }

    fn flush_notes(&mut self) {
        for note in self.drain_notes() {
            match note.level {
                NotificationLevel::Success => eprintln!("{}", note.message),
                NotificationLevel::Error => eprintln!("Error: {}", note.message),
            }
        }
    }
}

fn read_source(path: &Path) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "source read failed");
        eprintln!("Error: failed to read '{}': {}", path.display(), e);
        3
    })
}
