use clap::error::ErrorKind;
use clap::Parser;

/// Prefix marking a line as a shell command rather than a query
pub const COMMAND_PREFIX: char = '/';

/// Shell commands, entered as `/name [args]`
#[derive(Parser, Clone, Debug, PartialEq)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
    /// Rescan the model and rebuild the completion index
    Reindex,
    /// Show completion index statistics
    Stats,
    /// Show how a partial query is classified and what it completes to
    Complete {
        /// Partial query text (quote it when it contains spaces)
        text: String,
        /// Cursor position in characters (defaults to the end of TEXT)
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// Show the query syntax
    Syntax,
    /// Toggle debug logging
    Debug,
}

impl ShellCommand {
    pub fn command_names() -> Vec<String> {
        use clap::CommandFactory;
        let cmd = Self::command();
        let mut names = vec!["help".to_string(), "quit".to_string()];
        names.extend(cmd.get_subcommands().map(|s| s.get_name().to_string()));
        names.sort();
        names.dedup();
        names
    }
}

/// Parses the text after the `/` prefix. `Ok(None)` means clap already
/// printed help.
pub fn parse_shell_command(
    input: &str,
) -> Result<Option<ShellCommand>, Box<dyn std::error::Error>> {
    let args = shlex::split(input).ok_or("Invalid quoting")?;

    match ShellCommand::try_parse_from(args) {
        Ok(c) => Ok(Some(c)),
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelp
                || e.kind() == ErrorKind::DisplayVersion
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                println!("{}", e);
                return Ok(None);
            }
            Err(Box::new(e))
        }
    }
}

pub const SYNTAX_HELP: &str = "\
QUERIES
  Type[, facet ...][ + Type[, facet ...]] [; value path ...]

  IfcWall                                  all walls (subtypes included)
  IfcWall + IfcDoor                        walls and doors
  IfcElement, !IfcWall                     elements that are not walls
  IfcWall, Name=\"Basic Wall\"               comparison (= != > >= < <= *= !*=)
  IfcWall, Pset_WallCommon.IsExternal=TRUE property comparison
  IfcWall, material=Concrete               keywords compare through a value path
  IfcWall ; Name ; type.Name               one tab-separated line per element
  IfcWallType ; Layers.count ; Layers.0.Name

TAB COMPLETION
  IfcW<TAB>                    types present in the model
  IfcWall, <TAB>               attributes, keywords and property sets of walls
  IfcWall, Name<TAB>           comparison operators
  IfcWall, Name=<TAB>          values observed on walls
  IfcWall, Pset_WallCommon.<TAB>   properties of that set
  IfcWall ; type.<TAB>         attributes reachable through the path";
