#[derive(Debug)]
pub(crate) struct Cmd {
    pub(crate) name: String,
    pub(crate) doc: Option<String>,
    pub(crate) chain: bool,
    pub(crate) args: Vec<Arg>,
    pub(crate) flags: Vec<Flag>,
    pub(crate) subcommands: Vec<Cmd>,
}

#[derive(Debug)]
pub(crate) struct Arg {
    pub(crate) name: String,
    pub(crate) nargs: Nargs,
    pub(crate) doc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nargs {
    Exactly(usize),
    Variadic,
}

#[derive(Debug)]
pub(crate) struct Flag {
    pub(crate) action: Action,
    /// Without the leading `--`.
    pub(crate) long: String,
    /// Without the leading `-`.
    pub(crate) short: Option<String>,
    pub(crate) nargs: usize,
    pub(crate) optional: bool,
    pub(crate) doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Store,
    Append,
    StoreConst(Const),
    AppendConst(Const),
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Const {
    Str(String),
    Bool(bool),
}
