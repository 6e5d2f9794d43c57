//! Moderately small command line tokenizer and command tree walker.
//!
//! The crate turns a flat argument vector into option values, leftover
//! positionals and the order in which declared parameters were touched,
//! distributes positionals over argument slots, routes through nested
//! subcommands and, for shell completion, works out which parameter the
//! word under the cursor belongs to.
//!
//! ```
//! use argtree::{Action, ArgumentSpec, Command, Nargs, OptionSpec, Value};
//!
//! let cli = Command::builder("tool")
//!     .option(OptionSpec::new(["-v", "--verbose"], Action::Count).dest("verbose"))
//!     .option(OptionSpec::new(["-o", "--output"], Action::Store).dest("output"))
//!     .argument(ArgumentSpec::new("src", Nargs::Variadic))
//!     .build()
//!     .unwrap();
//!
//! let out = cli.parser().parse_args(vec!["-vofile".into(), "a".into()], cli.settings()).unwrap();
//! assert_eq!(out.values["verbose"], Value::Count(1));
//! assert_eq!(out.values["output"], Value::Str("file".into()));
//! ```
//!
//! Trees can also be declared with [`command!`]:
//!
//! ```
//! let cli = argtree::command! {
//!     /// Doc comments become help strings.
//!     cmd tool {
//!         count -v, --verbose
//!         cmd cp
//!             arg src: ...
//!             arg dst
//!         {
//!             store -m, --mode ?
//!             append --exclude: 2
//!             store_const --force = true
//!             append_const --tag = "copied"
//!         }
//!         chain cmd run {
//!             cmd step arg name {}
//!         }
//!     }
//! }
//! .unwrap();
//!
//! let contexts = cli.dispatch("tool", vec!["cp".into(), "a".into(), "b".into()]).unwrap();
//! assert_eq!(contexts[1].command_path(), "tool cp");
//! ```
//!
//! A flag is an action keyword followed by an optional short name and a
//! required long one; the destination key is the long name in snake case.
//! `store` and `append` take `: N` values (one by default) and `store` may
//! end with `?` to make its value optional. Arguments are declared between
//! the command name and its body, with `: N` or `: ...` for variadic.

mod error;
mod parser;
mod settings;
mod spec;
mod split;
mod suggest;
mod unpack;

pub mod command;
pub mod complete;

pub use argtree_macros::command;

pub use crate::{
    command::{Command, CommandBuilder, Context},
    error::{Error, RegistryError},
    parser::{OptionParser, ParseOutput},
    settings::Settings,
    spec::{split_opt, Action, ArgumentSpec, Nargs, OptionSpec, Param, ParamId, Value, ValueHint},
    split::split_arg_string,
    unpack::{unpack_args, Unpacked},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;
