use std::{
    collections::{BTreeSet, HashMap},
    fmt, mem,
};

use indexmap::IndexMap;

use crate::{
    spec::{split_opt, ArgumentSpec, Nargs, OptionSpec, Param, ParamId, Value},
    suggest::close_matches,
    unpack::{unpack_args, Unpacked},
    Error, RegistryError, Result, Settings,
};

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

/// Rewrites the name part of flags and subcommand names before matching,
/// e.g. to make them case-insensitive.
#[derive(Clone, Copy)]
pub(crate) struct Normalizer(pub(crate) fn(&str) -> String);

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Normalizer")
    }
}

impl Normalizer {
    pub(crate) fn apply(self, name: &str) -> String {
        (self.0)(name)
    }
}

/// Mutable accumulator of a single parse pass.
#[derive(Debug)]
pub(crate) struct ParsingState {
    /// Values by destination key, in first-touched order.
    pub(crate) opts: IndexMap<String, Value>,
    /// Positionals seen so far.
    pub(crate) largs: Vec<String>,
    /// Parameters in the order they were matched, repeats included.
    pub(crate) order: Vec<ParamId>,
    /// Option that ran out of input before all its values were given.
    pub(crate) pending: Option<ParamId>,
    // Reversed, so the front of the queue is the last element.
    rargs: Vec<String>,
}

impl ParsingState {
    pub(crate) fn new(mut args: Vec<String>) -> Self {
        args.reverse();
        Self { opts: IndexMap::new(), largs: Vec::new(), order: Vec::new(), pending: None, rargs: args }
    }

    fn next(&mut self) -> Option<String> {
        self.rargs.pop()
    }

    fn peek(&self) -> Option<&str> {
        self.rargs.last().map(String::as_str)
    }

    fn push_front(&mut self, arg: String) {
        self.rargs.push(arg)
    }

    fn take_remaining(&mut self) -> Vec<String> {
        let mut res = mem::take(&mut self.rargs);
        res.reverse();
        res
    }

    pub(crate) fn into_output(self) -> ParseOutput {
        ParseOutput { values: self.opts, args: self.largs, order: self.order, pending: self.pending }
    }
}

/// What a parse pass hands back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub values: IndexMap<String, Value>,
    /// Positionals no argument slot claimed.
    pub args: Vec<String>,
    pub order: Vec<ParamId>,
    /// Option the input ended in the middle of, e.g. `--output` with no
    /// value after it. Only survives a failed pass in resilient mode or
    /// an option whose value is optional.
    pub pending: Option<ParamId>,
}

/// Registry of options and arguments plus the matcher that runs over it.
///
/// Built once, then shared read-only by any number of parse calls.
#[derive(Debug, Clone)]
pub struct OptionParser {
    params: Vec<Param>,
    short_opts: HashMap<String, ParamId>,
    long_opts: IndexMap<String, ParamId>,
    args: Vec<ParamId>,
    prefixes: BTreeSet<String>,
    normalizer: Option<Normalizer>,
}

impl Default for OptionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionParser {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            short_opts: HashMap::new(),
            long_opts: IndexMap::new(),
            args: Vec::new(),
            prefixes: ["-", "--"].iter().map(|it| it.to_string()).collect(),
            normalizer: None,
        }
    }

    pub(crate) fn with_normalizer(normalizer: Option<Normalizer>) -> Self {
        Self { normalizer, ..Self::new() }
    }

    pub fn add_option(&mut self, mut spec: OptionSpec) -> Result<ParamId, RegistryError> {
        if spec.flags.is_empty() {
            bail!(RegistryError::NoFlags { dest: spec.dest.clone().unwrap_or_default() })
        }
        if spec.takes_value() && spec.nargs == 0 {
            bail!(RegistryError::ZeroArity { name: spec.display_name().to_string() })
        }

        let id = ParamId(self.params.len());
        let flags = spec.flags.iter().map(|it| self.normalize_opt(it)).collect::<Vec<_>>();
        let mut short = Vec::new();
        let mut long = Vec::new();
        let mut prefixes = Vec::new();
        for flag in &flags {
            let (prefix, name) = split_opt(flag);
            if prefix.is_empty() || name.is_empty() {
                bail!(RegistryError::InvalidFlag { flag: flag.clone() })
            }
            let taken = self.short_opts.contains_key(flag)
                || self.long_opts.contains_key(flag)
                || short.contains(flag)
                || long.contains(flag);
            if taken {
                bail!(RegistryError::DuplicateFlag { flag: flag.clone() })
            }
            prefixes.extend(prefix.chars().next().map(String::from));
            if prefix.chars().count() == 1 && name.chars().count() == 1 {
                short.push(flag.clone());
            } else {
                long.push(flag.clone());
                prefixes.push(prefix.to_string());
            }
        }

        self.prefixes.extend(prefixes);
        self.short_opts.extend(short.into_iter().map(|it| (it, id)));
        self.long_opts.extend(long.into_iter().map(|it| (it, id)));
        spec.flags = flags;
        self.params.push(Param::Opt(spec));
        Ok(id)
    }

    pub fn add_argument(&mut self, spec: ArgumentSpec) -> Result<ParamId, RegistryError> {
        match spec.nargs {
            Nargs::Exactly(0) => bail!(RegistryError::ZeroArity { name: spec.dest.clone() }),
            Nargs::Variadic => {
                let first = self
                    .arguments()
                    .find(|(_, it)| it.nargs == Nargs::Variadic)
                    .map(|(_, it)| it.dest.clone());
                if let Some(first) = first {
                    bail!(RegistryError::MultipleVariadic { first, second: spec.dest.clone() })
                }
            }
            Nargs::Exactly(_) => (),
        }
        let id = ParamId(self.params.len());
        self.params.push(Param::Arg(spec));
        self.args.push(id);
        Ok(id)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.params.get(id.0)
    }

    pub fn option(&self, id: ParamId) -> Option<&OptionSpec> {
        self.param(id).and_then(Param::as_option)
    }

    pub fn argument(&self, id: ParamId) -> Option<&ArgumentSpec> {
        self.param(id).and_then(Param::as_argument)
    }

    pub fn options(&self) -> impl Iterator<Item = (ParamId, &OptionSpec)> {
        self.params.iter().enumerate().filter_map(|(i, it)| Some((ParamId(i), it.as_option()?)))
    }

    /// Arguments in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = (ParamId, &ArgumentSpec)> {
        self.args.iter().filter_map(move |&id| Some((id, self.argument(id)?)))
    }

    /// Whether `c` starts some registered flag.
    pub fn is_prefix_char(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.prefixes.contains(&*c.encode_utf8(&mut buf))
    }

    /// Parses `args` and returns option values, unclaimed positionals and
    /// touch order.
    pub fn parse_args(&self, args: Vec<String>, settings: &Settings) -> Result<ParseOutput> {
        let mut state = ParsingState::new(args);
        if let Err(err) = self.parse_into(&mut state, settings) {
            if !settings.resilient_parsing {
                return Err(err);
            }
            log::debug!("resilient parse stopped early: {err}");
        }
        Ok(state.into_output())
    }

    fn parse_into(&self, state: &mut ParsingState, settings: &Settings) -> Result<()> {
        self.process_args_for_options(state, settings)?;
        self.process_args_for_args(state)
    }

    fn process_args_for_options(&self, state: &mut ParsingState, settings: &Settings) -> Result<()> {
        while let Some(arg) = state.next() {
            if arg == "--" {
                log::trace!("`--` ends option parsing");
                return Ok(());
            }
            if self.looks_like_option(&arg) {
                self.process_opts(arg, state, settings)?;
            } else if settings.allow_interspersed_args {
                log::trace!("positional {arg:?}");
                state.largs.push(arg);
            } else {
                log::trace!("positional {arg:?} ends option parsing");
                state.push_front(arg);
                return Ok(());
            }
        }
        Ok(())
    }

    fn process_args_for_args(&self, state: &mut ParsingState) -> Result<()> {
        let mut pool = state.largs.clone();
        pool.extend(state.take_remaining());
        let nargs = self.arguments().map(|(_, it)| it.nargs).collect::<Vec<_>>();
        let (slots, rest) = unpack_args(pool, &nargs);
        for ((id, spec), slot) in self.arguments().zip(slots) {
            self.process_argument(id, spec, slot, state)?;
        }
        state.largs = rest;
        Ok(())
    }

    /// True for tokens the matcher treats as flags. A lone prefix
    /// character and negative numbers that no short flag claims are
    /// positionals.
    pub(crate) fn looks_like_option(&self, arg: &str) -> bool {
        let mut chars = arg.chars();
        let (first, second) = match (chars.next(), chars.next()) {
            (Some(first), Some(second)) => (first, second),
            _ => return false,
        };
        if !self.is_prefix_char(first) {
            return false;
        }
        let numeric = first == '-'
            && (second.is_ascii_digit() || second == '.')
            && arg[1..].parse::<f64>().is_ok();
        !numeric || self.short_opts.contains_key(&format!("-{second}"))
    }

    fn process_opts(&self, arg: String, state: &mut ParsingState, settings: &Settings) -> Result<()> {
        let (long_opt, explicit_value) = match arg.split_once('=') {
            Some((opt, value)) => (opt, Some(value.to_string())),
            None => (arg.as_str(), None),
        };
        let long_opt = self.normalize_opt(long_opt);

        match self.match_long_opt(&long_opt, explicit_value, state, settings) {
            // `--foo` never falls back to short clusters.
            Err(Error::NoSuchOption { .. }) if !self.prefixes.contains(head(&arg, 2)) => {
                self.match_short_opt(&arg, state, settings)
            }
            Err(Error::NoSuchOption { .. }) if settings.ignore_unknown_options => {
                log::trace!("unknown option {arg:?} kept as positional");
                state.largs.push(arg);
                Ok(())
            }
            res => res,
        }
    }

    fn match_long_opt(
        &self,
        opt: &str,
        explicit_value: Option<String>,
        state: &mut ParsingState,
        settings: &Settings,
    ) -> Result<()> {
        let id = self.resolve_long(opt, settings)?;
        let option = match self.option(id) {
            Some(it) => it,
            None => bail!(no_such_option(opt, Vec::new())),
        };
        let value = if option.takes_value() {
            self.value_from_state(id, opt, option, explicit_value, state)?
        } else if explicit_value.is_some() {
            bail!(Error::BadOptionUsage {
                name: opt.to_string(),
                message: format!("Option '{opt}' does not take a value."),
            })
        } else {
            None
        };
        process_option(id, option, value, state);
        Ok(())
    }

    fn match_short_opt(&self, arg: &str, state: &mut ParsingState, settings: &Settings) -> Result<()> {
        let mut chars = arg.char_indices();
        let prefix = match chars.next() {
            Some((_, it)) => it,
            None => return Ok(()),
        };
        let mut unknown = String::new();

        for (idx, ch) in chars {
            let opt = self.normalize_opt(&format!("{prefix}{ch}"));
            let found = self.short_opts.get(&opt).and_then(|&id| Some((id, self.option(id)?)));
            let (id, option) = match found {
                Some(it) => it,
                None if settings.ignore_unknown_options => {
                    unknown.push(ch);
                    continue;
                }
                None => bail!(no_such_option(&opt, Vec::new())),
            };

            if !option.takes_value() {
                process_option(id, option, None, state);
                continue;
            }
            // The rest of the cluster is the first value.
            let end = idx + ch.len_utf8();
            let inline = (end < arg.len()).then(|| arg[end..].to_string());
            let done = inline.is_some();
            let value = self.value_from_state(id, &opt, option, inline, state)?;
            process_option(id, option, value, state);
            if done {
                break;
            }
        }

        if !unknown.is_empty() {
            log::trace!("unknown short options {unknown:?} kept as positional");
            state.largs.push(format!("{prefix}{unknown}"));
        }
        Ok(())
    }

    /// Collects the values of `option`. `attached` is a value written in
    /// the same word as the flag (`--out=x`, `-ox`) and is never mistaken
    /// for a flag.
    fn value_from_state(
        &self,
        id: ParamId,
        name: &str,
        option: &OptionSpec,
        attached: Option<String>,
        state: &mut ParsingState,
    ) -> Result<Option<Value>> {
        let nargs = option.nargs;
        match attached {
            Some(value) if nargs == 1 => return Ok(Some(Value::Str(value))),
            Some(value) => state.push_front(value),
            None => {
                let next_is_flag = state.peek().map_or(false, |it| self.looks_like_option(it));
                if nargs == 1 && option.optional_value && next_is_flag {
                    return Ok(Some(Value::FlagNeedsValue));
                }
            }
        }
        if state.rargs.len() < nargs {
            state.pending = Some(id);
            if option.optional_value {
                return Ok(Some(Value::FlagNeedsValue));
            }
            let message = if nargs == 1 {
                format!("Option '{name}' requires an argument.")
            } else {
                format!("Option '{name}' requires {nargs} arguments.")
            };
            bail!(Error::BadOptionUsage { name: name.to_string(), message })
        }
        if nargs == 1 {
            return Ok(state.next().map(Value::Str));
        }
        let values = (0..nargs).map(|_| state.next()).collect();
        Ok(Some(Value::Tuple(values)))
    }

    fn process_argument(
        &self,
        id: ParamId,
        spec: &ArgumentSpec,
        slot: Unpacked,
        state: &mut ParsingState,
    ) -> Result<()> {
        let value = match slot {
            Unpacked::Single(value) => value.map(Value::Str),
            Unpacked::Tuple(values) => {
                let holes = values.iter().filter(|it| it.is_none()).count();
                if holes == values.len() {
                    None
                } else if holes != 0 {
                    bail!(Error::BadArgumentUsage {
                        name: spec.dest.clone(),
                        message: format!("Argument '{}' takes {} values.", spec.dest, values.len()),
                    })
                } else {
                    Some(Value::Tuple(values))
                }
            }
            Unpacked::Variadic(values) => Some(Value::List(values.into_iter().map(Value::Str).collect())),
        };
        log::trace!("argument {} -> {value:?}", spec.dest);
        if let Some(value) = value {
            state.opts.insert(spec.dest.clone(), value);
        }
        state.order.push(id);
        Ok(())
    }

    /// Exact long flag, or its unique abbreviation when allowed.
    fn resolve_long(&self, opt: &str, settings: &Settings) -> Result<ParamId> {
        if let Some(&id) = self.long_opts.get(opt) {
            return Ok(id);
        }

        let (prefix, name) = split_opt(opt);
        if settings.allow_abbreviations && prefix.chars().count() > 1 && !name.is_empty() {
            let hits = self
                .long_opts
                .iter()
                .filter(|(flag, _)| flag.starts_with(opt))
                .map(|(flag, &id)| (flag.as_str(), id))
                .collect::<Vec<_>>();
            let mut ids = hits.iter().map(|it| it.1).collect::<Vec<_>>();
            ids.sort();
            ids.dedup();
            match ids.as_slice() {
                [] => (),
                [id] => {
                    log::trace!("{opt} abbreviates {}", hits[0].0);
                    return Ok(*id);
                }
                _ => {
                    let mut candidates = hits.iter().map(|it| it.0.to_string()).collect::<Vec<_>>();
                    candidates.sort();
                    bail!(Error::AmbiguousOption { name: opt.to_string(), candidates })
                }
            }
        }

        let possibilities = close_matches(opt, self.long_opts.keys().map(String::as_str));
        bail!(no_such_option(opt, possibilities))
    }

    /// Looks a complete flag up the way the matcher would, without
    /// consuming anything. Used by completion.
    pub(crate) fn lookup_flag(&self, flag: &str, settings: &Settings) -> Option<ParamId> {
        let flag = self.normalize_opt(flag);
        self.short_opts.get(&flag).copied().or_else(|| self.resolve_long(&flag, settings).ok())
    }

    fn normalize_opt(&self, opt: &str) -> String {
        match self.normalizer {
            Some(normalizer) => {
                let (prefix, name) = split_opt(opt);
                format!("{prefix}{}", normalizer.apply(name))
            }
            None => opt.to_string(),
        }
    }
}

fn process_option(id: ParamId, option: &OptionSpec, value: Option<Value>, state: &mut ParsingState) {
    log::trace!("option {} -> {value:?}", option.display_name());
    if let Some(dest) = &option.dest {
        match state.opts.get_mut(dest) {
            Some(slot) => {
                let old = mem::replace(slot, Value::FlagNeedsValue);
                *slot = option.action.fold(Some(old), value);
            }
            None => {
                state.opts.insert(dest.clone(), option.action.fold(None, value));
            }
        }
    }
    state.order.push(id);
}

fn no_such_option(name: &str, possibilities: Vec<String>) -> Error {
    Error::NoSuchOption { name: name.to_string(), possibilities }
}

fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
