use std::fmt::Write;

use crate::ast;

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

/// Expands to a builder chain evaluating to
/// `Result<argtree::Command, argtree::RegistryError>`.
pub(crate) fn emit(cmd: &ast::Cmd) -> String {
    let mut buf = String::new();
    emit_builder(&mut buf, cmd, 0);
    w!(buf, "\n.build()");
    buf
}

fn emit_builder(buf: &mut String, cmd: &ast::Cmd, indent: usize) {
    let pad = " ".repeat(indent + 4);
    w!(buf, "argtree::Command::builder({:?})", cmd.name);
    if let Some(doc) = &cmd.doc {
        w!(buf, "\n{pad}.help({doc:?})");
    }
    if cmd.chain {
        w!(buf, "\n{pad}.chain()");
    }

    for arg in &cmd.args {
        let nargs = match arg.nargs {
            ast::Nargs::Exactly(n) => format!("argtree::Nargs::Exactly({n})"),
            ast::Nargs::Variadic => "argtree::Nargs::Variadic".to_string(),
        };
        w!(buf, "\n{pad}.argument(argtree::ArgumentSpec::new({:?}, {nargs})", arg.name);
        emit_help(buf, &arg.doc);
        w!(buf, ")");
    }

    for flag in &cmd.flags {
        let mut names = Vec::new();
        if let Some(short) = &flag.short {
            names.push(format!("\"-{short}\""));
        }
        names.push(format!("\"--{}\"", flag.long));
        w!(
            buf,
            "\n{pad}.option(argtree::OptionSpec::new([{}], {}).dest({:?})",
            names.join(", "),
            action(&flag.action),
            flag.dest()
        );
        if flag.nargs > 1 {
            w!(buf, ".nargs({})", flag.nargs);
        }
        if flag.optional {
            w!(buf, ".optional_value()");
        }
        emit_help(buf, &flag.doc);
        w!(buf, ")");
    }

    for sub in &cmd.subcommands {
        w!(buf, "\n{pad}.subcommand(");
        emit_builder(buf, sub, indent + 4);
        w!(buf, ")");
    }
}

fn emit_help(buf: &mut String, doc: &Option<String>) {
    if let Some(doc) = doc {
        w!(buf, ".help({doc:?})");
    }
}

fn action(action: &ast::Action) -> String {
    match action {
        ast::Action::Store => "argtree::Action::Store".to_string(),
        ast::Action::Append => "argtree::Action::Append".to_string(),
        ast::Action::StoreConst(konst) => format!("argtree::Action::StoreConst({})", value(konst)),
        ast::Action::AppendConst(konst) => format!("argtree::Action::AppendConst({})", value(konst)),
        ast::Action::Count => "argtree::Action::Count".to_string(),
    }
}

fn value(konst: &ast::Const) -> String {
    match konst {
        ast::Const::Str(it) => format!("argtree::Value::Str(String::from({it:?}))"),
        ast::Const::Bool(it) => format!("argtree::Value::Bool({it})"),
    }
}

impl ast::Flag {
    fn dest(&self) -> String {
        snake(&self.long)
    }
}

fn snake(s: &str) -> String {
    s.replace('-', "_")
}
