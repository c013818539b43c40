mod backend_bridge;
mod config;
mod controller;
mod ui;

use std::{
    io::{self, BufRead, IsTerminal},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpQaBackend;
use crossbeam_channel::{bounded, never, select, Receiver};
use tracing_subscriber::EnvFilter;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::{state::UiState, upload::SelectedFile, PageController};
use ui::{
    terminal::{render_inline, Markup, TerminalSurface},
    Surface,
};

const HELP: &str = "\
Commands:
  file <path>       select a PDF
  upload [path]     upload the selected PDF, or the one at <path>
  ask <question>    ask about the uploaded PDF (a bare line works too)
  status            show the current document and page state
  help              show this help
  quit              exit";

#[derive(Parser, Debug)]
#[command(about = "Upload a PDF to a document QA service and ask questions about it")]
struct Args {
    /// Settings file; `docqa.toml` in the working directory is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// Select this file at startup.
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    no_color: bool,
    /// Print status, document and answer regions as HTML fragments.
    #[arg(long, conflicts_with = "no_color")]
    html: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputCommand {
    Select(Option<PathBuf>),
    Upload(Option<PathBuf>),
    Ask(String),
    Status,
    Help,
    Quit,
}

enum Step {
    Continue,
    InputClosed,
    Stop,
}

/// Blank lines yield `None`; anything that is not a command is a question.
fn parse_input(line: &str) -> Option<InputCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let path = || (!rest.is_empty()).then(|| PathBuf::from(rest));
    let command = match word {
        "file" => InputCommand::Select(path()),
        "upload" => InputCommand::Upload(path()),
        "ask" => InputCommand::Ask(rest.to_string()),
        "status" if rest.is_empty() => InputCommand::Status,
        "help" if rest.is_empty() => InputCommand::Help,
        "quit" | "exit" if rest.is_empty() => InputCommand::Quit,
        _ => InputCommand::Ask(line.to_string()),
    };
    Some(command)
}

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (line_tx, line_rx) = bounded(16);
    thread::Builder::new()
        .name("docqa-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!("failed to read stdin: {err}");
                        break;
                    }
                }
            }
        })
        .context("failed to start stdin reader")?;
    Ok(line_rx)
}

fn print_status<S: Surface>(controller: &PageController<S>) {
    let page = controller.page();
    match (controller.session().is_loaded(), page.document()) {
        (true, Some(info)) => println!("{}", info.summary()),
        _ => println!("No PDF uploaded."),
    }
    if let Some(label) = page.file_label() {
        println!("Selected file: {label}");
    }
    match controller.ui_state() {
        UiState::Idle => println!("Idle."),
        UiState::StatusMessage(_, text) => println!("Status: {text}"),
        UiState::QuestionsVisible => println!("Ready for questions."),
        UiState::AnswerLoading => println!("Waiting for an answer..."),
        UiState::AnswerVisible => {
            if let Some(rendered) = page.answer().content() {
                println!(
                    "Last answer: {}",
                    render_inline(rendered.answer.nodes(), false)
                );
            }
        }
    }
}

fn run_command<S: Surface>(controller: &mut PageController<S>, command: InputCommand) -> Step {
    match command {
        InputCommand::Select(path) => controller.select_file(path.map(SelectedFile::from_path)),
        InputCommand::Upload(Some(path)) => {
            controller.select_file(Some(SelectedFile::from_path(path)));
            let _ = controller.submit_selected_document();
        }
        InputCommand::Upload(None) => {
            let _ = controller.submit_selected_document();
        }
        InputCommand::Ask(question) => {
            let _ = controller.submit_question(&question);
        }
        InputCommand::Status => print_status(controller),
        InputCommand::Help => println!("{HELP}"),
        InputCommand::Quit => return Step::Stop,
    }
    Step::Continue
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing::info!(server_url = %settings.server_url, "starting docqa");

    let backend = HttpQaBackend::new(
        &settings.server_url,
        &settings.upload_path,
        &settings.ask_path,
    )?;
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(settings.command_queue_capacity);
    let (ui_tx, ui_rx) = bounded(settings.command_queue_capacity);
    let worker = runtime::launch(Arc::new(backend), cmd_rx, ui_tx)
        .context("failed to start backend worker")?;

    let markup = if args.html {
        Markup::Html
    } else if !args.no_color && io::stdout().is_terminal() {
        Markup::Ansi
    } else {
        Markup::Plain
    };
    let surface = TerminalSurface::new(io::stdout(), markup);
    let mut controller =
        PageController::new(cmd_tx.clone(), surface, settings.accepted_media_type);

    println!("{HELP}");
    controller.select_file(args.file.map(SelectedFile::from_path));

    let mut input_rx = spawn_stdin_reader()?;
    let mut input_open = true;
    while input_open || controller.has_pending_requests() {
        let step = select! {
            recv(input_rx) -> line => match line {
                Ok(line) => match parse_input(&line) {
                    Some(command) => run_command(&mut controller, command),
                    None => Step::Continue,
                },
                Err(_) => Step::InputClosed,
            },
            recv(ui_rx) -> event => match event {
                Ok(event) => {
                    controller.handle_event(event);
                    Step::Continue
                }
                Err(_) => {
                    tracing::warn!("backend worker stopped unexpectedly");
                    Step::Stop
                }
            },
        };
        match step {
            Step::Continue => {}
            Step::InputClosed => {
                tracing::debug!("stdin closed; finishing pending requests");
                input_rx = never();
                input_open = false;
            }
            Step::Stop => break,
        }
    }

    // Releases tasks still blocked on a full event queue.
    drop(ui_rx);
    if cmd_tx.send(BackendCommand::Shutdown).is_err() {
        tracing::debug!("backend worker already stopped");
    }
    if worker.join().is_err() {
        tracing::warn!("backend worker panicked");
    }
    Ok(())
}


#[cfg(test)]
#[path = "tests/end_to_end_tests.rs"]
mod end_to_end_tests;
