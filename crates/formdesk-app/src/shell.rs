//! Line-oriented UI glue for the forms surface.
//!
//! # Design
//! - Commands run sequentially on the shell's own task; download results are
//!   picked up between commands with `tokio::select!`.
//! - Notifications are printed by a separate renderer attached to the bus. It
//!   replays the retained history first, so the listing published while the
//!   first surface activated is printed even though the renderer starts later.

use std::io::Write as _;

use async_trait::async_trait;
use formdesk_events::{Attachment, Event, EventEnvelope};
use formdesk_surface::{
    Confirmation, DeleteOutcome, DeletePrompt, SurfaceController, SurfaceDeps,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const HELP: &str = "commands: ls | select <n> | delete [name] | download | abandon | rotate | status | metrics | help | quit";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Re-list the directory.
    List,
    /// Select a row of the last listing.
    Select(usize),
    /// Delete the named form, or the selected one.
    Delete(Option<String>),
    /// Start a download.
    Download,
    /// Stop watching the running download.
    Abandon,
    /// Tear the surface down and rebuild it.
    Rotate,
    /// Print the surface state.
    Status,
    /// Print the metrics registry.
    Metrics,
    /// Print the command list.
    Help,
    /// Leave the shell.
    Quit,
}

/// Reasons a line is not a valid command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The verb is not known.
    #[error("unknown command")]
    Unknown {
        /// Verb as typed.
        command: String,
    },
    /// The verb needs an argument.
    #[error("missing argument")]
    MissingArgument {
        /// Verb as typed.
        command: &'static str,
    },
    /// The row number is not a number.
    #[error("invalid row number")]
    InvalidIndex {
        /// Value as typed.
        value: String,
    },
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns a [`CommandError`] describing why the line was rejected.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    let command = match verb.to_ascii_lowercase().as_str() {
        "ls" | "list" | "refresh" => ShellCommand::List,
        "select" => {
            let value = argument.ok_or(CommandError::MissingArgument { command: "select" })?;
            let index = value.parse().map_err(|_| CommandError::InvalidIndex {
                value: value.to_string(),
            })?;
            ShellCommand::Select(index)
        }
        "delete" | "rm" => ShellCommand::Delete(argument.map(str::to_string)),
        "download" => ShellCommand::Download,
        "abandon" => ShellCommand::Abandon,
        "rotate" => ShellCommand::Rotate,
        "status" => ShellCommand::Status,
        "metrics" => ShellCommand::Metrics,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        _ => {
            return Err(CommandError::Unknown {
                command: verb.to_string(),
            });
        }
    };
    Ok(Some(command))
}

/// Text shown for a notification, if it is shown at all.
#[must_use]
pub fn render_event(event: &Event) -> Option<String> {
    let text = match event {
        Event::ListUpdated { names } if names.is_empty() => "no forms".to_string(),
        Event::ListUpdated { names } => names
            .iter()
            .enumerate()
            .map(|(index, name)| format!("{index:>3}  {name}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Event::ListFailed { message } => format!("cannot list forms: {message}"),
        Event::DeleteResult {
            name,
            success: true,
        } => format!("deleted {name}"),
        Event::DeleteResult {
            name,
            success: false,
        } => format!("could not delete {name}"),
        Event::SelectionRequired => "select a form first".to_string(),
        Event::DownloadFinished { success: true } => "download finished".to_string(),
        Event::DownloadFinished { success: false } => "download failed".to_string(),
        Event::DownloadProgressChanged { running: true } => "downloading...".to_string(),
        Event::DownloadProgressChanged { running: false } => return None,
    };
    Some(text)
}

/// Print the retained backlog, then every notification published after it,
/// until the bus goes away.
#[must_use]
pub fn spawn_renderer(attachment: Attachment) -> JoinHandle<()> {
    let Attachment {
        backlog,
        mut stream,
    } = attachment;
    tokio::spawn(async move {
        for envelope in &backlog {
            render_envelope(envelope);
        }
        while let Some(item) = stream.next().await {
            match item {
                Ok(envelope) => render_envelope(&envelope),
                Err(err) => warn!(error = %err, "renderer fell behind; notifications skipped"),
            }
        }
    })
}

fn render_envelope(envelope: &EventEnvelope) {
    debug!(event_id = envelope.id, kind = envelope.event.kind(), "rendering event");
    if let Some(text) = render_event(&envelope.event) {
        println!("{text}");
    }
}

/// Delete confirmation answered from the shell's input.
struct LinePrompt<'a, R> {
    lines: &'a mut Lines<R>,
}

#[async_trait]
impl<'a, R> DeletePrompt for LinePrompt<'a, R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&mut self, name: &str) -> Confirmation {
        print!("delete {name}? [y/N] ");
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(answer)) if matches!(answer.trim(), "y" | "Y" | "yes") => {
                Confirmation::Confirm
            }
            Ok(_) => Confirmation::Cancel,
            Err(err) => {
                warn!(error = %err, "confirmation could not be read; cancelling");
                Confirmation::Cancel
            }
        }
    }
}

/// Interactive shell owning the current surface instance.
pub struct Shell<R> {
    deps: SurfaceDeps,
    surface: SurfaceController,
    lines: Lines<R>,
}

impl<R> Shell<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Build the first surface and activate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the first listing fails.
    pub fn new(deps: SurfaceDeps, input: R) -> AppResult<Self> {
        let mut surface = SurfaceController::new(deps.clone());
        surface
            .activate()
            .map_err(|err| AppError::surface("surface.activate", err))?;
        Ok(Self {
            deps,
            surface,
            lines: input.lines(),
        })
    }

    /// Current surface, for inspection.
    #[must_use]
    pub const fn surface(&self) -> &SurfaceController {
        &self.surface
    }

    /// Run commands until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            tokio::select! {
                line = self.lines.next_line() => {
                    let Some(line) = line.map_err(|err| AppError::io("shell.read_line", err))? else {
                        debug!("input closed");
                        break;
                    };
                    if !self.execute(&line).await? {
                        break;
                    }
                }
                Some(success) = self.surface.next_completion() => {
                    if let Err(err) = self.surface.handle_download_finished(success) {
                        println!("error: {err}");
                    }
                }
            }
        }
        info!("shell exited");
        Ok(())
    }

    /// Execute one line; returns `false` when the shell should stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics registry cannot be rendered.
    pub async fn execute(&mut self, line: &str) -> AppResult<bool> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(err) => {
                println!("{err}: {}", line.trim());
                println!("{HELP}");
                return Ok(true);
            }
        };
        debug!(?command, "shell command");

        match command {
            ShellCommand::List => {
                if let Err(err) = self.surface.request_refresh() {
                    println!("error: {err}");
                }
            }
            ShellCommand::Select(index) => match self.surface.select(index) {
                Ok(selection) => println!("selected {}", selection.name),
                Err(err) => println!("error: {err}"),
            },
            ShellCommand::Delete(name) => {
                let mut prompt = LinePrompt {
                    lines: &mut self.lines,
                };
                let outcome = match name {
                    Some(name) => self.surface.request_delete(&name, &mut prompt).await,
                    None => self.surface.delete_selected(&mut prompt).await,
                };
                match outcome {
                    Ok(DeleteOutcome::Cancelled) => println!("deletion cancelled"),
                    Ok(_) => {}
                    Err(err) => println!("error: {err}"),
                }
            }
            ShellCommand::Download => {
                if let Err(err) = self.surface.request_download() {
                    println!("error: {err}");
                }
            }
            ShellCommand::Abandon => {
                if self.surface.abandon_download() {
                    println!("download continues in the background");
                } else {
                    println!("no download in progress");
                }
            }
            ShellCommand::Rotate => self.rotate(),
            ShellCommand::Status => self.print_status(),
            ShellCommand::Metrics => {
                let rendered = self
                    .deps
                    .metrics
                    .render()
                    .map_err(|err| AppError::telemetry("metrics.render", err))?;
                print!("{rendered}");
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn rotate(&mut self) {
        self.surface.deactivate();
        let mut next = SurfaceController::new(self.deps.clone());
        if let Err(err) = next.activate() {
            println!("error: {err}");
        }
        self.surface = next;
        info!("surface rebuilt");
    }

    fn print_status(&self) {
        let surface = &self.surface;
        println!("phase: {}", surface.phase().label());
        println!("forms: {}", surface.snapshot().len());
        match surface.selection() {
            Some(selection) => println!("selected: {} ({})", selection.name, selection.index),
            None => println!("selected: none"),
        }
        match surface.task() {
            Some(task) => println!("download: {} ({})", task.status().label(), task.id()),
            None => println!("download: none"),
        }
        println!("progress: {}", if surface.progress_visible() { "shown" } else { "hidden" });
        println!(
            "parked download: {}",
            if self.deps.registry.is_occupied() { "yes" } else { "no" }
        );
    }
}
