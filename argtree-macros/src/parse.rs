use std::{fmt, mem};

#[cfg(not(test))]
use proc_macro::{Delimiter, TokenStream, TokenTree};
#[cfg(test)]
use proc_macro2::{Delimiter, TokenStream, TokenTree};

use crate::ast;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) struct Error {
    msg: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.msg, f)
    }
}

macro_rules! format_err {
    ($($tt:tt)*) => {
        Error { msg: format!($($tt)*) }
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

pub(crate) fn parse(ts: TokenStream) -> Result<ast::Cmd> {
    let p = &mut Parser::new(ts);
    let doc = opt_doc(p)?;
    let mut cmd = cmd(p)?;
    cmd.doc = doc;
    if !p.end() {
        bail!("expected a single top-level `cmd`")
    }
    Ok(cmd)
}

fn cmd(p: &mut Parser) -> Result<ast::Cmd> {
    let chain = p.eat_keyword("chain");
    p.expect_keyword("cmd")?;

    let name = cmd_name(p)?;
    let mut res = ast::Cmd {
        name,
        doc: None,
        chain,
        args: Vec::new(),
        flags: Vec::new(),
        subcommands: Vec::new(),
    };

    while !p.at_delim(Delimiter::Brace) {
        let doc = opt_doc(p)?;
        p.expect_keyword("arg")?;
        let mut arg = arg(p)?;
        arg.doc = doc;
        if arg.nargs == ast::Nargs::Variadic {
            if let Some(prev) = res.args.iter().find(|it| it.nargs == ast::Nargs::Variadic) {
                bail!("only one variadic argument is allowed, got `{}` and `{}`", prev.name, arg.name)
            }
        }
        res.args.push(arg);
    }

    p.enter_delim(Delimiter::Brace)?;
    while !p.end() {
        let doc = opt_doc(p)?;
        if p.at_keyword("cmd") || p.at_keyword("chain") {
            let mut sub = cmd(p)?;
            sub.doc = doc;
            if res.chain && (sub.chain || !sub.subcommands.is_empty()) {
                bail!("chained command `{}` cannot have a subcommand group `{}`", res.name, sub.name)
            }
            if res.subcommands.iter().any(|it| it.name == sub.name) {
                bail!("duplicate subcommand `{}`", sub.name)
            }
            res.subcommands.push(sub);
        } else {
            let mut flag = flag(p)?;
            flag.doc = doc;
            let clash = res.flags.iter().find(|it| {
                it.long == flag.long || (it.short.is_some() && it.short == flag.short)
            });
            if let Some(prev) = clash {
                let dup = match &flag.short {
                    Some(short) if prev.long != flag.long => format!("-{short}"),
                    _ => format!("--{}", flag.long),
                };
                bail!("duplicate flag `{dup}`")
            }
            res.flags.push(flag);
        }
    }
    p.exit_delim()?;
    Ok(res)
}

fn arg(p: &mut Parser) -> Result<ast::Arg> {
    let name = cmd_name(p)?;
    let nargs = if p.eat_punct(':') {
        if p.eat_ellipsis() {
            ast::Nargs::Variadic
        } else {
            let n = p.expect_usize()?;
            if n == 0 {
                bail!("argument `{name}` must take at least one value")
            }
            ast::Nargs::Exactly(n)
        }
    } else {
        ast::Nargs::Exactly(1)
    };
    Ok(ast::Arg { name, nargs, doc: None })
}

fn flag(p: &mut Parser) -> Result<ast::Flag> {
    let kind = p.expect_ident()?;

    let mut short = None;
    let mut name = flag_name(p)?;
    if !name.starts_with("--") {
        if name.chars().count() != 2 {
            bail!("short name must be a single character: `{name}`")
        }
        if !p.eat_punct(',') {
            bail!("long option is required for `{name}`")
        }
        short = Some(name[1..].to_string());
        name = flag_name(p)?;
        if !name.starts_with("--") {
            bail!("long name must begin with `--`: `{name}`")
        }
    }
    let long = name[2..].to_string();

    let (action, nargs, optional) = match kind.as_str() {
        "store" | "append" => {
            let nargs = if p.eat_punct(':') { p.expect_usize()? } else { 1 };
            if nargs == 0 {
                bail!("`--{long}` must take at least one value")
            }
            let optional = p.eat_punct('?');
            if kind == "append" {
                if optional {
                    bail!("only `store` flags can have an optional value: `--{long}`")
                }
                (ast::Action::Append, nargs, false)
            } else {
                (ast::Action::Store, nargs, optional)
            }
        }
        "store_const" | "append_const" => {
            p.expect_punct('=')?;
            let konst = konst(p)?;
            let action = if kind == "store_const" {
                ast::Action::StoreConst(konst)
            } else {
                ast::Action::AppendConst(konst)
            };
            (action, 0, false)
        }
        "count" => (ast::Action::Count, 0, false),
        _ => bail!(
            "expected one of `store`, `append`, `store_const`, `append_const`, `count`, got `{kind}`"
        ),
    };

    Ok(ast::Flag { action, long, short, nargs, optional, doc: None })
}

fn konst(p: &mut Parser) -> Result<ast::Const> {
    if p.eat_keyword("true") {
        return Ok(ast::Const::Bool(true));
    }
    if p.eat_keyword("false") {
        return Ok(ast::Const::Bool(false));
    }
    p.expect_string()
        .map(ast::Const::Str)
        .map_err(|_| format_err!("expected a string, `true` or `false` after `=`"))
}

/// Consecutive `///` lines, joined.
fn opt_doc(p: &mut Parser) -> Result<Option<String>> {
    let mut lines = Vec::new();
    while p.eat_punct('#') {
        p.enter_delim(Delimiter::Bracket)?;
        p.expect_keyword("doc")?;
        p.expect_punct('=')?;
        let line = p.expect_string()?;
        lines.push(line.strip_prefix(' ').map(str::to_string).unwrap_or(line));
        p.exit_delim()?;
    }
    Ok(if lines.is_empty() { None } else { Some(lines.join("\n")) })
}

fn cmd_name(p: &mut Parser) -> Result<String> {
    let name = p.expect_name()?;
    if name.starts_with('-') {
        bail!("command name can't begin with `-`: `{name}`");
    }
    Ok(name)
}

fn flag_name(p: &mut Parser) -> Result<String> {
    let name = p.expect_name()?;
    if !name.starts_with('-') {
        bail!("flag name should begin with `-`: `{name}`");
    }
    Ok(name)
}

struct Parser {
    stack: Vec<Vec<TokenTree>>,
    ts: Vec<TokenTree>,
}

impl Parser {
    fn new(ts: TokenStream) -> Self {
        let mut ts = ts.into_iter().collect::<Vec<_>>();
        ts.reverse();
        Self { stack: Vec::new(), ts }
    }

    fn at_delim(&mut self, delimiter: Delimiter) -> bool {
        match self.ts.last() {
            Some(TokenTree::Group(g)) => g.delimiter() == delimiter,
            _ => false,
        }
    }
    fn enter_delim(&mut self, delimiter: Delimiter) -> Result<()> {
        match self.ts.pop() {
            Some(TokenTree::Group(g)) if g.delimiter() == delimiter => {
                let mut ts = g.stream().into_iter().collect::<Vec<_>>();
                ts.reverse();
                let ts = mem::replace(&mut self.ts, ts);
                self.stack.push(ts);
            }
            _ => bail!("expected `{}`", open(delimiter)),
        }
        Ok(())
    }
    fn exit_delim(&mut self) -> Result<()> {
        if !self.end() {
            let next = self.ts.last().map(|it| it.to_string()).unwrap_or_default();
            bail!("unexpected `{next}`")
        }
        match self.stack.pop() {
            Some(ts) => self.ts = ts,
            None => bail!("unbalanced delimiters"),
        }
        Ok(())
    }
    fn end(&mut self) -> bool {
        self.ts.last().is_none()
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if !self.eat_keyword(kw) {
            let next = self.ts.last().map(|it| it.to_string()).unwrap_or_default();
            bail!("expected `{kw}`, got `{next}`")
        }
        Ok(())
    }
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_keyword(&mut self, kw: &str) -> bool {
        match self.ts.last() {
            Some(TokenTree::Ident(ident)) => ident.to_string() == kw,
            _ => false,
        }
    }

    fn expect_name(&mut self) -> Result<String> {
        self.eat_name().ok_or_else(|| {
            let next = self.ts.pop().map(|it| it.to_string()).unwrap_or_default();
            format_err!("expected a name, got: `{next}`")
        })
    }
    /// A dash-separated name such as `--dry-run`, glued from separate
    /// tokens.
    fn eat_name(&mut self) -> Option<String> {
        let mut buf = String::new();
        let mut prev_ident = false;
        loop {
            match self.ts.last() {
                Some(TokenTree::Punct(p)) if p.as_char() == '-' => {
                    prev_ident = false;
                    buf.push('-');
                }
                Some(TokenTree::Ident(ident)) if !prev_ident => {
                    prev_ident = true;
                    buf.push_str(&ident.to_string());
                }
                _ => break,
            }
            self.ts.pop();
        }
        if buf.is_empty() {
            None
        } else {
            Some(buf)
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Ident(ident)) => Ok(ident.to_string()),
            Some(tt) => bail!("expected ident, got `{tt}`"),
            None => bail!("expected ident"),
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<()> {
        if !self.eat_punct(punct) {
            bail!("expected `{punct}`")
        }
        Ok(())
    }
    fn eat_punct(&mut self, punct: char) -> bool {
        match self.ts.last() {
            Some(TokenTree::Punct(p)) if p.as_char() == punct => {
                self.ts.pop();
                true
            }
            _ => false,
        }
    }
    fn lookahead_punct(&mut self, punct: char, n: usize) -> bool {
        match self.ts.iter().rev().nth(n) {
            Some(TokenTree::Punct(p)) => p.as_char() == punct,
            _ => false,
        }
    }
    fn eat_ellipsis(&mut self) -> bool {
        if (0..3).all(|n| self.lookahead_punct('.', n)) {
            self.ts.truncate(self.ts.len() - 3);
            true
        } else {
            false
        }
    }

    fn expect_usize(&mut self) -> Result<usize> {
        match self.ts.pop() {
            Some(TokenTree::Literal(lit)) => {
                let text = lit.to_string();
                text.parse().map_err(|_| format_err!("expected a number, got `{text}`"))
            }
            _ => bail!("expected a number"),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Literal(lit)) if lit.to_string().starts_with('"') => {
                let text = lit.to_string();
                Ok(unescape(&text[1..text.len() - 1]))
            }
            _ => bail!("expected a string"),
        }
    }
}

fn open(delimiter: Delimiter) -> &'static str {
    match delimiter {
        Delimiter::Brace => "{",
        Delimiter::Bracket => "[",
        Delimiter::Parenthesis => "(",
        Delimiter::None => "group",
    }
}

fn unescape(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => res.push('\n'),
            Some('t') => res.push('\t'),
            Some(other) => res.push(other),
            None => (),
        }
    }
    res
}
