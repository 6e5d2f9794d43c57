use std::process;

/// A usage error caused by the command line itself.
///
/// Every message embeds the exact token the user typed so it can be shown
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("No such option: {name}{}", suggestion(.possibilities))]
    NoSuchOption { name: String, possibilities: Vec<String> },

    #[error("Ambiguous option: {name} (possible options: {})", .candidates.join(", "))]
    AmbiguousOption { name: String, candidates: Vec<String> },

    #[error("{message}")]
    BadOptionUsage { name: String, message: String },

    #[error("{message}")]
    BadArgumentUsage { name: String, message: String },

    #[error("No such command '{name}'.{}", command_suggestion(.possibilities))]
    NoSuchCommand { name: String, possibilities: Vec<String> },

    #[error("Missing command.")]
    MissingCommand,

    #[error("Got unexpected extra argument{} ({})", plural(.args), .args.join(" "))]
    UnexpectedExtraArgs { args: Vec<String> },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        2
    }

    /// Prints the message to stderr and terminates the process.
    pub fn exit(self) -> ! {
        eprintln!("Error: {self}");
        process::exit(self.exit_code())
    }
}

fn suggestion(possibilities: &[String]) -> String {
    let mut sorted = possibilities.to_vec();
    sorted.sort();
    match sorted.as_slice() {
        [] => String::new(),
        [it] => format!(" Did you mean {it}?"),
        _ => format!(" (Possible options: {})", sorted.join(", ")),
    }
}

fn command_suggestion(possibilities: &[String]) -> String {
    let mut sorted = possibilities.to_vec();
    sorted.sort();
    match sorted.as_slice() {
        [] => String::new(),
        [it] => format!(" Did you mean '{it}'?"),
        _ => format!(" (Possible commands: {})", sorted.join(", ")),
    }
}

fn plural(items: &[String]) -> &'static str {
    if items.len() == 1 {
        ""
    } else {
        "s"
    }
}

/// A mistake in how a parser or command tree was declared.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid start character for option ({flag})")]
    InvalidFlag { flag: String },

    #[error("option `{dest}` declares no flags")]
    NoFlags { dest: String },

    #[error("flag `{flag}` is declared more than once")]
    DuplicateFlag { flag: String },

    #[error("`{name}` must consume at least one value")]
    ZeroArity { name: String },

    #[error("only one variadic argument is allowed, got `{first}` and `{second}`")]
    MultipleVariadic { first: String, second: String },

    #[error("subcommand `{name}` is declared more than once")]
    DuplicateSubcommand { name: String },

    #[error("chained command `{parent}` cannot have a subcommand group `{name}`")]
    GroupInChain { parent: String, name: String },
}
