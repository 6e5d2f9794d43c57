//! Shell completion: walks a partial command line down the command tree and
//! works out what the word under the cursor should be completed as.
//!
//! Nothing here fails. A malformed line just stops the walk at the last
//! command that could be resolved.

use std::{fmt, str::FromStr};

use crate::{
    command::Context, split_arg_string, Command, Nargs, Param, ParamId, Settings, ValueHint,
};

/// What the incomplete word is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Starts with an option prefix.
    OptionName,
    /// Value of the given option, which was typed just before.
    OptionValue(ParamId),
    /// Value of the given argument, which still has room.
    Argument(ParamId),
    /// Anything else: a subcommand name if the command has children.
    SubcommandName,
}

#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub context: Context<'a>,
    pub target: Target,
    /// The word being completed, after `--name=` splitting.
    pub incomplete: String,
}

impl<'a> Resolved<'a> {
    pub fn command(&self) -> &'a Command {
        self.context.command
    }

    /// The parameter that governs the word, if any.
    pub fn param(&self) -> Option<&'a Param> {
        match self.target {
            Target::OptionValue(id) | Target::Argument(id) => self.command().param(id),
            Target::OptionName | Target::SubcommandName => None,
        }
    }

    pub fn completions(&self) -> Vec<CompletionItem> {
        match self.target {
            Target::OptionValue(_) | Target::Argument(_) => match self.param() {
                Some(param) => value_items(param.hint(), &self.incomplete),
                None => Vec::new(),
            },
            Target::OptionName | Target::SubcommandName => {
                let mut res = self.subcommand_items();
                if self.incomplete.chars().next().map_or(false, |it| !it.is_alphanumeric()) {
                    res.extend(self.option_items());
                }
                res
            }
        }
    }

    fn subcommand_items(&self) -> Vec<CompletionItem> {
        let mut cmds = self
            .command()
            .subcommands()
            .filter(|it| it.name().starts_with(&self.incomplete))
            .collect::<Vec<_>>();
        cmds.sort_by(|l, r| l.name().cmp(r.name()));
        cmds.into_iter()
            .map(|it| CompletionItem {
                value: it.name().to_string(),
                kind: ItemKind::Plain,
                help: it.help().and_then(|it| it.lines().next()).map(str::to_string),
            })
            .collect()
    }

    fn option_items(&self) -> Vec<CompletionItem> {
        let mut res = Vec::new();
        for (id, opt) in self.command().parser().options() {
            if !opt.action().accumulates() && self.context.order.contains(&id) {
                continue;
            }
            for flag in opt.flags().iter().filter(|it| it.starts_with(&self.incomplete)) {
                res.push(CompletionItem {
                    value: flag.clone(),
                    kind: ItemKind::Plain,
                    help: opt.get_help().map(str::to_string),
                });
            }
        }
        res
    }
}

fn value_items(hint: &ValueHint, incomplete: &str) -> Vec<CompletionItem> {
    let echo = |kind| vec![CompletionItem { value: incomplete.to_string(), kind, help: None }];
    match hint {
        ValueHint::Any => Vec::new(),
        ValueHint::Choices(choices) => choices
            .iter()
            .filter(|it| it.starts_with(incomplete))
            .map(|it| CompletionItem { value: it.clone(), kind: ItemKind::Plain, help: None })
            .collect(),
        ValueHint::Path | ValueHint::File => echo(ItemKind::File),
        ValueHint::Dir => echo(ItemKind::Dir),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Plain,
    /// Let the shell complete file names.
    File,
    /// Let the shell complete directory names.
    Dir,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Plain => "plain",
            ItemKind::File => "file",
            ItemKind::Dir => "dir",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub value: String,
    pub kind: ItemKind,
    pub help: Option<String>,
}

/// Descends from `cli` through every subcommand named in `args` and returns
/// the context of the deepest one reached.
///
/// `settings` apply to the root only; every level parses resiliently.
pub fn resolve_context<'a>(
    cli: &'a Command,
    prog_name: &str,
    args: &[String],
    settings: &Settings,
) -> Context<'a> {
    let settings = settings.clone().with_resilient_parsing(true);
    let mut ctx = match cli.make_context(prog_name, args.to_vec(), &settings) {
        Ok(it) => it,
        Err(err) => {
            log::debug!("completion could not parse `{prog_name}`: {err}");
            return Context::bare(cli, prog_name);
        }
    };

    let mut args = pending(&ctx);
    while !args.is_empty() {
        let cmd = ctx.command;
        if !cmd.is_group() {
            break;
        }

        if !cmd.is_chain() {
            let (sub, rest) = match lookup(cmd, args) {
                Some(it) => it,
                None => return ctx,
            };
            let settings = sub.settings().clone().with_resilient_parsing(true);
            ctx = match descend(&ctx, sub, rest, &settings) {
                Some(it) => it,
                None => return ctx,
            };
            args = pending(&ctx);
            continue;
        }

        let mut last = None;
        while !args.is_empty() {
            let (sub, rest) = match lookup(cmd, args) {
                Some(it) => it,
                None => return ctx,
            };
            let settings = sub
                .settings()
                .clone()
                .with_extra_args(true)
                .with_interspersed_args(false)
                .with_resilient_parsing(true);
            let sub_ctx = match descend(&ctx, sub, rest, &settings) {
                Some(it) => it,
                None => return ctx,
            };
            args = sub_ctx.args.clone();
            last = Some(sub_ctx);
        }
        if let Some(sub_ctx) = last {
            ctx = sub_ctx;
        }
        args = pending(&ctx);
    }
    ctx
}

fn pending(ctx: &Context<'_>) -> Vec<String> {
    ctx.protected_args.iter().chain(&ctx.args).cloned().collect()
}

fn lookup(cmd: &Command, mut args: Vec<String>) -> Option<(&Command, Vec<String>)> {
    if args.is_empty() {
        return None;
    }
    let rest = args.split_off(1);
    let sub = cmd.resolve_command(&args[0])?;
    Some((sub, rest))
}

fn descend<'a>(
    parent: &Context<'a>,
    sub: &'a Command,
    args: Vec<String>,
    settings: &Settings,
) -> Option<Context<'a>> {
    log::debug!("completion descends into `{}` with {args:?}", sub.name());
    match sub.make_child(&parent.path, sub.name().to_string(), args, settings) {
        Ok(it) => Some(it),
        Err(err) => {
            log::debug!("completion stops at `{}`: {err}", parent.command_path());
            None
        }
    }
}

/// Classifies `incomplete` against the deepest context. `args` are the
/// complete words typed before it.
pub fn resolve_incomplete<'a>(context: Context<'a>, args: &[String], incomplete: &str) -> Resolved<'a> {
    let cmd = context.command;
    let options_done = args.iter().any(|it| it == "--");
    let mut incomplete = incomplete.to_string();
    let mut attached_to = None;

    if incomplete == "=" {
        incomplete.clear();
    } else if !options_done && starts_option(cmd, &incomplete) {
        if let Some((name, value)) = incomplete.split_once('=') {
            let parser = cmd.parser();
            attached_to = parser
                .lookup_flag(name, cmd.settings())
                .filter(|&id| parser.option(id).map_or(false, |it| it.takes_value()));
            incomplete = value.to_string();
        }
    }

    let target = if attached_to.is_none() && !options_done && starts_option(cmd, &incomplete) {
        Target::OptionName
    } else if let Some(id) = attached_to.or(context.pending) {
        Target::OptionValue(id)
    } else if let Some(id) = incomplete_argument(&context) {
        Target::Argument(id)
    } else {
        Target::SubcommandName
    };
    log::debug!("completing {incomplete:?} in `{}` as {target:?}", context.command_path());

    Resolved { context, target, incomplete }
}

fn starts_option(cmd: &Command, word: &str) -> bool {
    word.chars().next().map_or(false, |it| cmd.parser().is_prefix_char(it))
}

fn incomplete_argument(ctx: &Context<'_>) -> Option<ParamId> {
    ctx.command
        .parser()
        .arguments()
        .find(|(_, arg)| arg.get_nargs() == Nargs::Variadic || !ctx.params.contains_key(arg.dest()))
        .map(|(id, _)| id)
}

/// Root command plus everything needed to answer a completion request.
#[derive(Debug, Clone)]
pub struct Completer<'a> {
    cli: &'a Command,
    prog_name: String,
    settings: Settings,
}

impl<'a> Completer<'a> {
    pub fn new(cli: &'a Command, prog_name: impl Into<String>) -> Self {
        Self { cli, prog_name: prog_name.into(), settings: cli.settings().clone() }
    }

    /// Settings for the root command, instead of its own.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn resolve(&self, args: &[String], incomplete: &str) -> Resolved<'a> {
        let ctx = resolve_context(self.cli, &self.prog_name, args, &self.settings);
        resolve_incomplete(ctx, args, incomplete)
    }

    pub fn completions(&self, args: &[String], incomplete: &str) -> Vec<CompletionItem> {
        self.resolve(args, incomplete).completions()
    }

    /// Answers a request in `shell`'s wire format, one item per line.
    pub fn complete(&self, shell: Shell, comp_words: &str, comp_cword: &str) -> String {
        let (args, incomplete) = shell.completion_args(comp_words, comp_cword);
        let items = self.completions(&args, &incomplete);
        items.iter().map(|it| shell.format_item(it)).collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported shell `{0}`")]
pub struct UnknownShell(pub String);

impl FromStr for Shell {
    type Err = UnknownShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(UnknownShell(s.to_string())),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        })
    }
}

impl Shell {
    pub fn format_item(self, item: &CompletionItem) -> String {
        let kind = item.kind.as_str();
        match self {
            Shell::Bash => format!("{kind},{}", item.value),
            Shell::Zsh => format!("{kind}\n{}\n{}", item.value, item.help.as_deref().unwrap_or("_")),
            Shell::Fish => match &item.help {
                Some(help) => format!("{kind},{}\t{help}", item.value),
                None => format!("{kind},{}", item.value),
            },
        }
    }

    /// Splits the shell's word line into the complete args (program name
    /// dropped) and the incomplete word.
    ///
    /// Bash and zsh pass the cursor word index; fish passes the word
    /// itself. An index that does not parse is taken to be past the end.
    pub fn completion_args(self, comp_words: &str, comp_cword: &str) -> (Vec<String>, String) {
        let words = split_arg_string(comp_words);
        match self {
            Shell::Bash | Shell::Zsh => {
                let cword = comp_cword.trim().parse::<usize>().unwrap_or(words.len());
                let end = cword.min(words.len());
                let args = words.get(1..end).map(<[String]>::to_vec).unwrap_or_default();
                let incomplete = words.get(cword).cloned().unwrap_or_default();
                (args, incomplete)
            }
            Shell::Fish => {
                let mut args = words.get(1..).map(<[String]>::to_vec).unwrap_or_default();
                let incomplete = comp_cword.to_string();
                if !incomplete.is_empty() && args.last() == Some(&incomplete) {
                    args.pop();
                }
                (args, incomplete)
            }
        }
    }
}
