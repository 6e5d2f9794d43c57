/// Switches that change how a single parse pass treats the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Keep scanning for options after the first positional. When off, the
    /// first positional and everything after it are left untouched.
    pub allow_interspersed_args: bool,
    /// Unknown flags become positionals instead of errors.
    pub ignore_unknown_options: bool,
    /// Stop quietly at the first usage error and return what was parsed
    /// so far.
    pub resilient_parsing: bool,
    /// A leaf command tolerates leftover positionals.
    pub allow_extra_args: bool,
    /// `--verb` may stand for `--verbose` when nothing else starts with it.
    pub allow_abbreviations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_interspersed_args: true,
            ignore_unknown_options: false,
            resilient_parsing: false,
            allow_extra_args: false,
            allow_abbreviations: true,
        }
    }
}

impl Settings {
    pub fn with_interspersed_args(mut self, yes: bool) -> Self {
        self.allow_interspersed_args = yes;
        self
    }

    pub fn with_ignore_unknown_options(mut self, yes: bool) -> Self {
        self.ignore_unknown_options = yes;
        self
    }

    pub fn with_resilient_parsing(mut self, yes: bool) -> Self {
        self.resilient_parsing = yes;
        self
    }

    pub fn with_extra_args(mut self, yes: bool) -> Self {
        self.allow_extra_args = yes;
        self
    }

    pub fn with_abbreviations(mut self, yes: bool) -> Self {
        self.allow_abbreviations = yes;
        self
    }
}
