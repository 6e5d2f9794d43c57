//! Command tree and the strict invocation walk over it.

use std::mem;

use indexmap::IndexMap;

use crate::{
    parser::{Normalizer, OptionParser},
    suggest::close_matches,
    ArgumentSpec, Error, OptionSpec, Param, ParamId, RegistryError, Result, Settings, Value,
};

/// A node of the command tree: its own parameters plus named children.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    help: Option<String>,
    parser: OptionParser,
    settings: Settings,
    subcommands: IndexMap<String, Command>,
    group: bool,
    chain: bool,
    normalizer: Option<Normalizer>,
}

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    help: Option<String>,
    params: Vec<Param>,
    subcommands: Vec<CommandBuilder>,
    chain: bool,
    settings: Option<Settings>,
    normalizer: Option<Normalizer>,
}

impl CommandBuilder {
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.params.push(Param::Opt(spec));
        self
    }

    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        self.params.push(Param::Arg(spec));
        self
    }

    pub fn subcommand(mut self, cmd: CommandBuilder) -> Self {
        self.subcommands.push(cmd);
        self
    }

    /// Lets several subcommands follow each other on one command line.
    pub fn chain(mut self) -> Self {
        self.chain = true;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Rewrites option and subcommand names before matching. Inherited by
    /// subcommands that set none of their own.
    pub fn token_normalize(mut self, f: fn(&str) -> String) -> Self {
        self.normalizer = Some(Normalizer(f));
        self
    }

    pub fn build(self) -> Result<Command, RegistryError> {
        let mut parser = OptionParser::with_normalizer(self.normalizer);
        for param in self.params {
            match param {
                Param::Opt(it) => parser.add_option(it)?,
                Param::Arg(it) => parser.add_argument(it)?,
            };
        }

        let group = self.chain || !self.subcommands.is_empty();
        let settings =
            self.settings.unwrap_or_else(|| Settings::default().with_interspersed_args(!group));

        let mut subcommands = IndexMap::new();
        for sub in self.subcommands {
            let sub = CommandBuilder { normalizer: sub.normalizer.or(self.normalizer), ..sub };
            let sub = sub.build()?;
            if self.chain && sub.is_group() {
                return Err(RegistryError::GroupInChain { parent: self.name, name: sub.name });
            }
            if subcommands.contains_key(&sub.name) {
                return Err(RegistryError::DuplicateSubcommand { name: sub.name });
            }
            subcommands.insert(sub.name.clone(), sub);
        }

        Ok(Command {
            name: self.name,
            help: self.help,
            parser,
            settings,
            subcommands,
            group,
            chain: self.chain,
            normalizer: self.normalizer,
        })
    }
}

impl Command {
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            help: None,
            params: Vec::new(),
            subcommands: Vec::new(),
            chain: false,
            settings: None,
            normalizer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn parser(&self) -> &OptionParser {
        &self.parser
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn params(&self) -> &[Param] {
        self.parser.params()
    }

    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.parser.param(id)
    }

    pub fn subcommands(&self) -> impl Iterator<Item = &Command> {
        self.subcommands.values()
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    pub fn is_chain(&self) -> bool {
        self.chain
    }

    /// Looks a child up by its exact name, then by its normalised name.
    pub fn resolve_command(&self, name: &str) -> Option<&Command> {
        self.subcommands.get(name).or_else(|| {
            let normalized = self.normalizer?.apply(name);
            self.subcommands.get(&normalized)
        })
    }

    /// Parses one level of the command line.
    ///
    /// For a group the first leftover token is kept aside as the
    /// subcommand name (all of them for a chained group); a leaf rejects
    /// leftovers unless `settings` allow extra args or resilient parsing.
    pub fn make_context(
        &self,
        info_name: impl Into<String>,
        args: Vec<String>,
        settings: &Settings,
    ) -> Result<Context<'_>> {
        self.make_child(&[], info_name.into(), args, settings)
    }

    pub(crate) fn make_child(
        &self,
        parent_path: &[String],
        info_name: String,
        args: Vec<String>,
        settings: &Settings,
    ) -> Result<Context<'_>> {
        log::debug!("parsing `{info_name}` with {args:?}");
        let out = self.parser.parse_args(args, settings)?;

        let (protected_args, args) = if self.chain {
            (out.args, Vec::new())
        } else if self.group {
            let mut rest = out.args;
            let tail = if rest.is_empty() { Vec::new() } else { rest.split_off(1) };
            (rest, tail)
        } else {
            if !out.args.is_empty() && !settings.allow_extra_args && !settings.resilient_parsing {
                return Err(Error::UnexpectedExtraArgs { args: out.args });
            }
            (Vec::new(), out.args)
        };

        let mut path = parent_path.to_vec();
        path.push(info_name);
        Ok(Context {
            command: self,
            path,
            params: out.values,
            order: out.order,
            pending: out.pending,
            protected_args,
            args,
        })
    }

    /// Runs the full invocation walk and returns the context of every
    /// command on the way, root first.
    pub fn dispatch(&self, prog_name: &str, args: Vec<String>) -> Result<Vec<Context<'_>>> {
        let root = self.make_context(prog_name, args, &self.settings)?;
        let mut res = Vec::new();
        descend(root, &mut res)?;
        Ok(res)
    }

    /// Pops the subcommand name off `args`, failing the way an invocation
    /// should when it names nothing.
    fn resolve_strict(&self, mut args: Vec<String>) -> Result<(&Command, Vec<String>)> {
        if args.is_empty() {
            return Err(Error::MissingCommand);
        }
        let rest = args.split_off(1);
        let name = args.remove(0);
        if let Some(cmd) = self.resolve_command(&name) {
            return Ok((cmd, rest));
        }
        // A flag in subcommand position is reported as an option error.
        if self.parser.looks_like_option(&name) {
            self.parser.parse_args(vec![name.clone()], &self.settings)?;
        }
        let possibilities = close_matches(&name, self.subcommands.keys().map(String::as_str));
        Err(Error::NoSuchCommand { name, possibilities })
    }
}

fn descend<'a>(ctx: Context<'a>, res: &mut Vec<Context<'a>>) -> Result<()> {
    let cmd = ctx.command;
    if !cmd.is_group() {
        res.push(ctx);
        return Ok(());
    }
    if ctx.protected_args.is_empty() {
        return Err(Error::MissingCommand);
    }
    let mut args = ctx.protected_args.iter().chain(&ctx.args).cloned().collect::<Vec<_>>();
    let path = ctx.path.clone();
    res.push(ctx);

    if !cmd.is_chain() {
        let (sub, rest) = cmd.resolve_strict(args)?;
        let sub_ctx = sub.make_child(&path, sub.name.clone(), rest, &sub.settings)?;
        return descend(sub_ctx, res);
    }

    while !args.is_empty() {
        let (sub, rest) = cmd.resolve_strict(args)?;
        let settings = sub.settings.clone().with_extra_args(true).with_interspersed_args(false);
        let mut sub_ctx = sub.make_child(&path, sub.name.clone(), rest, &settings)?;
        args = mem::take(&mut sub_ctx.args);
        res.push(sub_ctx);
    }
    Ok(())
}

/// The outcome of parsing one level of the command line.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub command: &'a Command,
    /// Names the user invoked, from the program name down to this command.
    pub path: Vec<String>,
    pub params: IndexMap<String, Value>,
    pub order: Vec<ParamId>,
    /// Option whose values the command line ended before.
    pub pending: Option<ParamId>,
    /// Subcommand names (and whatever follows them, for chains) still to
    /// be resolved.
    pub protected_args: Vec<String>,
    pub args: Vec<String>,
}

impl<'a> Context<'a> {
    pub(crate) fn bare(command: &'a Command, info_name: &str) -> Context<'a> {
        Context {
            command,
            path: vec![info_name.to_string()],
            params: IndexMap::new(),
            order: Vec::new(),
            pending: None,
            protected_args: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn command_path(&self) -> String {
        self.path.join(" ")
    }
}
