use std::fmt;

/// Index of a declared option or argument inside the parser that owns it.
///
/// Touch order is recorded as a list of these rather than as references,
/// so the parse result does not borrow from the command tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub(crate) usize);

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A parsed value stored under a destination key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    /// Values of a slot with a fixed arity above one; `None` marks a slot
    /// that received no token.
    Tuple(Vec<Option<String>>),
    List(Vec<Value>),
    Count(u32),
    /// An option with an optional value was given without one.
    FlagNeedsValue,
}

/// What happens to the destination slot each time an option is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Overwrite with the consumed value.
    Store,
    /// Overwrite with the payload, consuming nothing.
    StoreConst(Value),
    /// Push the consumed value.
    Append,
    /// Push the payload, consuming nothing.
    AppendConst(Value),
    /// Increment an integer.
    Count,
}

impl Action {
    pub fn takes_value(&self) -> bool {
        matches!(self, Action::Store | Action::Append)
    }

    /// Whether repeating the option on one command line is meaningful.
    pub fn accumulates(&self) -> bool {
        matches!(self, Action::Append | Action::AppendConst(_) | Action::Count)
    }

    pub(crate) fn fold(&self, slot: Option<Value>, value: Option<Value>) -> Value {
        match self {
            Action::Store => value.unwrap_or(Value::FlagNeedsValue),
            Action::StoreConst(konst) => konst.clone(),
            Action::Append => push(slot, value.unwrap_or(Value::FlagNeedsValue)),
            Action::AppendConst(konst) => push(slot, konst.clone()),
            Action::Count => match slot {
                Some(Value::Count(n)) => Value::Count(n.saturating_add(1)),
                _ => Value::Count(1),
            },
        }
    }
}

fn push(slot: Option<Value>, value: Value) -> Value {
    match slot {
        Some(Value::List(mut items)) => {
            items.push(value);
            Value::List(items)
        }
        _ => Value::List(vec![value]),
    }
}

/// Declared number of tokens a positional slot consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nargs {
    Exactly(usize),
    /// Consumes whatever the other slots leave over.
    Variadic,
}

/// Completion source for the values of an option or argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValueHint {
    #[default]
    Any,
    Choices(Vec<String>),
    Path,
    File,
    Dir,
}

/// Splits a flag into its prefix and name: `--foo` -> (`--`, `foo`),
/// `-f` -> (`-`, `f`), `+w` -> (`+`, `w`), `foo` -> (``, `foo`).
pub fn split_opt(opt: &str) -> (&str, &str) {
    let mut chars = opt.chars();
    let first = match chars.next() {
        Some(it) => it,
        None => return ("", ""),
    };
    if first.is_alphanumeric() {
        return ("", opt);
    }
    let len = first.len_utf8();
    if chars.next() == Some(first) {
        opt.split_at(2 * len)
    } else {
        opt.split_at(len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub(crate) flags: Vec<String>,
    pub(crate) dest: Option<String>,
    pub(crate) action: Action,
    pub(crate) nargs: usize,
    pub(crate) optional_value: bool,
    pub(crate) help: Option<String>,
    pub(crate) hint: ValueHint,
}

impl OptionSpec {
    pub fn new<I, S>(flags: I, action: Action) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nargs = if action.takes_value() { 1 } else { 0 };
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
            dest: None,
            action,
            nargs,
            optional_value: false,
            help: None,
            hint: ValueHint::Any,
        }
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Number of values consumed after the flag. Ignored by actions that
    /// take no value.
    pub fn nargs(mut self, nargs: usize) -> Self {
        if self.action.takes_value() {
            self.nargs = nargs;
        }
        self
    }

    /// Allows a `Store` option to appear without its value.
    pub fn optional_value(mut self) -> Self {
        self.optional_value = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn hint(mut self, hint: ValueHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn get_dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn get_nargs(&self) -> usize {
        self.nargs
    }

    pub fn takes_value(&self) -> bool {
        self.action.takes_value()
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn get_hint(&self) -> &ValueHint {
        &self.hint
    }

    /// Name used in messages about this option: the first long flag, or
    /// the first flag at all.
    pub fn display_name(&self) -> &str {
        self.flags
            .iter()
            .find(|it| split_opt(it).0.len() > 1)
            .or_else(|| self.flags.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub(crate) dest: String,
    pub(crate) nargs: Nargs,
    pub(crate) help: Option<String>,
    pub(crate) hint: ValueHint,
}

impl ArgumentSpec {
    pub fn new(dest: impl Into<String>, nargs: Nargs) -> Self {
        Self { dest: dest.into(), nargs, help: None, hint: ValueHint::Any }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn hint(mut self, hint: ValueHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn get_nargs(&self) -> Nargs {
        self.nargs
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn get_hint(&self) -> &ValueHint {
        &self.hint
    }
}

/// A declared parameter, as stored in a parser's registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Opt(OptionSpec),
    Arg(ArgumentSpec),
}

impl Param {
    pub fn as_option(&self) -> Option<&OptionSpec> {
        match self {
            Param::Opt(it) => Some(it),
            Param::Arg(_) => None,
        }
    }

    pub fn as_argument(&self) -> Option<&ArgumentSpec> {
        match self {
            Param::Arg(it) => Some(it),
            Param::Opt(_) => None,
        }
    }

    pub fn hint(&self) -> &ValueHint {
        match self {
            Param::Opt(it) => &it.hint,
            Param::Arg(it) => &it.hint,
        }
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            Param::Opt(it) => it.get_help(),
            Param::Arg(it) => it.get_help(),
        }
    }
}
