//! Console host: plays the page around the widget, turning stdin lines into
//! pointer interactions and printing the widget regions after each one.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use notibell_shared::NotificationId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::AppError;
use crate::page::{Interaction, MemoryPage};
use crate::view::ViewController;

const HELP: &str = "commands: toggle | open <id> | delete <id> | read-all | click <element> | show | quit";

/// Shared line reader; prompts and the command loop take turns on it.
pub struct LineSource {
    lines: Mutex<Lines<Box<dyn AsyncBufRead + Unpin + Send>>>,
}

impl LineSource {
    pub fn new(reader: Box<dyn AsyncBufRead + Unpin + Send>) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }

    pub fn stdin() -> Self {
        Self::new(Box::new(BufReader::new(tokio::io::stdin())))
    }

    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Terminal-side prompts: confirmation reads `y`/`n`, alerts go to stderr.
pub struct ConsoleInteraction {
    input: Arc<LineSource>,
    assume_yes: bool,
}

impl ConsoleInteraction {
    pub fn new(input: Arc<LineSource>) -> Self {
        Self {
            input,
            assume_yes: false,
        }
    }

    /// Answers every confirmation with yes without reading input.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }
}

#[async_trait]
impl Interaction for ConsoleInteraction {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", message);
        std::io::stdout().flush().ok();
        match self.input.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "confirm: reading answer failed");
                false
            }
        }
    }

    async fn alert(&self, message: &str) {
        eprintln!("! {}", message);
    }

    async fn navigate(&self, url: &str) {
        println!("-> {}", url);
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "예" | "네")
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Open(NotificationId),
    Delete(NotificationId),
    ReadAll,
    Click(String),
    Show,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().ok_or_else(|| HELP.to_string())?;
        let arg = parts.next();
        let need = |what: &str| {
            arg.map(str::to_string)
                .ok_or_else(|| format!("{verb}: missing {what}"))
        };
        match verb {
            "toggle" | "t" => Ok(ConsoleCommand::Toggle),
            "open" | "o" => Ok(ConsoleCommand::Open(need("id")?.as_str().into())),
            "delete" | "d" => Ok(ConsoleCommand::Delete(need("id")?.as_str().into())),
            "read-all" | "r" => Ok(ConsoleCommand::ReadAll),
            "click" | "c" => Ok(ConsoleCommand::Click(need("element")?)),
            "show" | "s" => Ok(ConsoleCommand::Show),
            "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
            other => Err(format!("unknown command {other:?}; {HELP}")),
        }
    }
}

/// Reads commands until `quit`, end of input or cancellation.
pub async fn run_console(
    view: Arc<ViewController>,
    page: Arc<MemoryPage>,
    input: Arc<LineSource>,
    cancel: CancellationToken,
) -> Result<(), AppError> {
    let ids = view.ids().clone();
    println!("{HELP}");
    print!("{}", page.snapshot(&ids));
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = input.next_line() => line?,
        };
        let Some(line) = line else {
            info!("console input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match line.parse::<ConsoleCommand>() {
            Ok(c) => c,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        match cmd {
            ConsoleCommand::Toggle => {
                view.toggle_dropdown().await;
            }
            ConsoleCommand::Open(id) => match page.open_action(&ids.list, &id) {
                Some(action) if view.is_open() => view.dispatch(action).await,
                _ => eprintln!("no visible notification {id}"),
            },
            ConsoleCommand::Delete(id) => match page.delete_action(&ids.list, &id) {
                Some(action) if view.is_open() => view.dispatch(action).await,
                _ => eprintln!("no visible notification {id}"),
            },
            ConsoleCommand::ReadAll => view.handle_mark_all_read().await,
            ConsoleCommand::Click(target) => {
                page.click(&target);
                // Let the document listener see the event before printing.
                tokio::task::yield_now().await;
            }
            ConsoleCommand::Show => {}
            ConsoleCommand::Quit => break,
        }
        print!("{}", page.snapshot(&ids));
    }
    Ok(())
}
