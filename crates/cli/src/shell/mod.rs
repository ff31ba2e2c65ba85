mod command;
mod completer;
mod context;
mod highlighter;
mod prompt;
pub(crate) mod view;

use modelpeek_core::logging::LogControl;
use modelpeek_core::{config, PeekConfig};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal,
};
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{settings::Style, Table};
use tracing::{error, info, warn};

use self::command::{parse_shell_command, ShellCommand, COMMAND_PREFIX, SYNTAX_HELP};
use self::completer::PeekCompleter;
use self::highlighter::PeekHighlighter;
use self::prompt::PeekPrompt;

pub use self::context::ShellContext;

// Shell configuration constants
const SHELL_HISTORY_SIZE: usize = 500;

/// What the loop does after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct ReplServer {
    context: ShellContext,
    config: PeekConfig,
    logging: Arc<LogControl>,
    interactive: bool,
}

impl ReplServer {
    pub fn new(context: ShellContext, config: PeekConfig, logging: Arc<LogControl>) -> Self {
        Self {
            context,
            config,
            logging,
            interactive: std::io::stdin().is_terminal(),
        }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.interactive {
            return self.run_piped();
        }

        let stats = self.context.stats();
        println!("Model: {}", self.context.model_path().display());
        println!(
            "Completion index: {} types, {} property sets{}",
            stats.types,
            stats.property_sets,
            if stats.degraded { " (degraded)" } else { "" }
        );
        println!("Type /help for commands, /syntax for the query language.");

        let line_editor = self.setup_line_editor()?;
        self.run_loop(line_editor)
    }

    fn setup_line_editor(&self) -> Result<Reedline, Box<dyn std::error::Error>> {
        let commands = ShellCommand::command_names();

        let completer = Box::new(PeekCompleter::new(commands.clone(), self.context.clone()));
        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history_file = config::history_file();
        if let Some(parent) = history_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let history = match FileBackedHistory::with_file(SHELL_HISTORY_SIZE, history_file.clone())
        {
            Ok(history) => history,
            Err(e) => {
                warn!("History file {} unavailable: {}", history_file.display(), e);
                FileBackedHistory::new(SHELL_HISTORY_SIZE)?
            }
        };

        let highlighter = Box::new(PeekHighlighter::new(commands, self.config.vocabulary()));

        Ok(Reedline::create()
            .with_history(Box::new(history))
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(
                    nu_ansi_term::Style::new()
                        .italic()
                        .fg(nu_ansi_term::Color::LightGray),
                ),
            ))
            .with_edit_mode(Box::new(Emacs::new(keybindings))))
    }

    fn run_loop(&self, mut line_editor: Reedline) -> Result<(), Box<dyn std::error::Error>> {
        let prompt = PeekPrompt::new(self.context.model_name());

        loop {
            match line_editor.read_line(&prompt) {
                Ok(Signal::Success(buffer)) => {
                    if self.process_line(&buffer) == Flow::Exit {
                        break;
                    }
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Ok(Signal::CtrlC) => {
                    println!("(Use Ctrl-D or /exit to leave)");
                }
                Ok(other) => info!("Ignoring shell event {:?}", other),
                Err(e) => {
                    error!("Line editor failed: {}", e);
                    return Err(Box::new(e));
                }
            }
        }
        Ok(())
    }

    /// Runs every stdin line as a query or command until EOF or `/exit`.
    fn run_piped(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Reading queries from stdin");
        for line in std::io::stdin().lock().lines() {
            if self.process_line(&line?) == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    fn process_line(&self, line: &str) -> Flow {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Flow::Continue;
        }
        if let Some(rest) = trimmed.strip_prefix(COMMAND_PREFIX) {
            return match parse_shell_command(rest) {
                Ok(Some(cmd)) => self.handle_command(cmd),
                Ok(None) => Flow::Continue,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    Flow::Continue
                }
            };
        }

        match self.context.execute(trimmed) {
            Ok(result) => {
                for line in view::result_lines(&result, self.interactive) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                warn!("Query {:?} failed: {}", trimmed, e);
                eprintln!("Query failed: {}", e);
            }
        }
        Flow::Continue
    }

    fn handle_command(&self, cmd: ShellCommand) -> Flow {
        match cmd {
            ShellCommand::Exit => return Flow::Exit,
            ShellCommand::Reindex => {
                let start = std::time::Instant::now();
                let stats = self.context.reindex();
                println!(
                    "Index rebuilt in {:?}: {} types, {} property sets",
                    start.elapsed(),
                    stats.types,
                    stats.property_sets
                );
            }
            ShellCommand::Stats => {
                println!("{}", Table::new(view::stat_rows(&self.context.stats())));
            }
            ShellCommand::Complete { text, cursor } => {
                let cursor = cursor.unwrap_or_else(|| text.chars().count());
                let (ctx, candidates) = self.context.complete(&text, cursor);
                println!("{}", view::describe_context(&ctx));
                if !candidates.is_empty() {
                    let rows: Vec<_> = candidates.iter().map(view::CandidateView::from).collect();
                    println!("{}", Table::new(rows).with(Style::psql()));
                }
            }
            ShellCommand::Syntax => println!("{}", SYNTAX_HELP),
            ShellCommand::Debug => match self.logging.toggle_debug() {
                Ok(true) => println!(
                    "Debug logging on (written to {})",
                    config::log_dir().display()
                ),
                Ok(false) => println!("Debug logging off"),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
        Flow::Continue
    }
}

pub fn run(
    model: PathBuf,
    config: &PeekConfig,
    logging: Arc<LogControl>,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = ShellContext::open(model, config)?;
    let server = ReplServer::new(context, config.clone(), logging);
    server.run()
}
