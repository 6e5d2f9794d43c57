use argtree::{Action, ArgumentSpec, Command, Nargs, OptionSpec, RegistryError, Settings, Value, ValueHint};
use expect_test::expect;

use crate::check;

pub(crate) fn tool() -> Command {
    Command::builder("tool")
        .option(OptionSpec::new(["-v", "--verbose"], Action::Count).dest("verbose"))
        .subcommand(
            Command::builder("add")
                .help("Add files.\n\nStages the given paths.")
                .option(
                    OptionSpec::new(["-n", "--dry-run"], Action::StoreConst(Value::Bool(true)))
                        .dest("dry_run")
                        .help("Only print what would change."),
                )
                .option(
                    OptionSpec::new(["-m", "--mode"], Action::Store)
                        .dest("mode")
                        .hint(ValueHint::Choices(vec!["fast".into(), "slow".into()])),
                )
                .argument(ArgumentSpec::new("paths", Nargs::Variadic).hint(ValueHint::File)),
        )
        .subcommand(
            Command::builder("remove")
                .help("Remove a file.")
                .argument(ArgumentSpec::new("name", Nargs::Exactly(1))),
        )
        .subcommand(
            Command::builder("remote").help("Manage remotes.").subcommand(
                Command::builder("show").argument(
                    ArgumentSpec::new("name", Nargs::Exactly(1))
                        .hint(ValueHint::Choices(vec!["origin".into(), "upstream".into()])),
                ),
            ),
        )
        .subcommand(Command::builder("status").help("Show status."))
        .build()
        .unwrap()
}

pub(crate) fn pipe() -> Command {
    Command::builder("pipe")
        .chain()
        .subcommand(Command::builder("read").argument(ArgumentSpec::new("src", Nargs::Exactly(1))))
        .subcommand(
            Command::builder("upper")
                .option(OptionSpec::new(["--all"], Action::StoreConst(Value::Bool(true))).dest("all")),
        )
        .subcommand(
            Command::builder("write").option(
                OptionSpec::new(["-o", "--out"], Action::Store).dest("out").hint(ValueHint::File),
            ),
        )
        .build()
        .unwrap()
}

#[test]
fn nested_dispatch() {
    let cli = tool();
    check(
        |args| cli.dispatch("tool", args),
        "-v add --dry-run a b",
        expect![[r#"
            tool: {"verbose": Count(1)} ["add"] ["--dry-run", "a", "b"]
            tool add: {"dry_run": Bool(true), "paths": List([Str("a"), Str("b")])} [] []
        "#]],
    );
    check(
        |args| cli.dispatch("tool", args),
        "remote show origin",
        expect![[r#"
            tool: {} ["remote"] ["show", "origin"]
            tool remote: {} ["show"] ["origin"]
            tool remote show: {"name": Str("origin")} [] []
        "#]],
    );
}

#[test]
fn group_options_precede_the_subcommand() {
    let cli = tool();
    check(
        |args| cli.dispatch("tool", args),
        "status -v",
        expect!["No such option: -v"],
    );
}

#[test]
fn dispatch_errors() {
    let cli = tool();
    check(|args| cli.dispatch("tool", args), "", expect!["Missing command."]);
    check(|args| cli.dispatch("tool", args), "remote", expect!["Missing command."]);
    check(|args| cli.dispatch("tool", args), "ad", expect!["No such command 'ad'. Did you mean 'add'?"]);
    check(|args| cli.dispatch("tool", args), "-v --nope", expect!["No such option: --nope"]);
    check(
        |args| cli.dispatch("tool", args),
        "remove a b",
        expect!["Got unexpected extra argument (b)"],
    );
}

#[test]
fn leaf_extra_args() {
    let cli = tool();
    let remove = cli.resolve_command("remove").unwrap();
    let ctx = remove
        .make_context("remove", vec!["a".into(), "b".into()], &Settings::default().with_extra_args(true))
        .unwrap();
    assert_eq!(ctx.params["name"], Value::Str("a".into()));
    assert_eq!(ctx.args, vec!["b".to_string()]);
    assert!(ctx.protected_args.is_empty());
}

#[test]
fn normalized_subcommands() {
    let cli = Command::builder("tool")
        .token_normalize(lower)
        .subcommand(
            Command::builder("add").option(OptionSpec::new(["--force"], Action::Count).dest("force")),
        )
        .build()
        .unwrap();
    check(
        |args| cli.dispatch("tool", args),
        "ADD --FORCE",
        expect![[r#"
            tool: {} ["ADD"] ["--FORCE"]
            tool add: {"force": Count(1)} [] []
        "#]],
    );
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}

#[test]
fn chained_dispatch() {
    let cli = pipe();
    check(
        |args| cli.dispatch("pipe", args),
        "read in.txt upper --all write -o out.txt",
        expect![[r#"
            pipe: {} ["read", "in.txt", "upper", "--all", "write", "-o", "out.txt"] []
            pipe read: {"src": Str("in.txt")} [] []
            pipe upper: {"all": Bool(true)} [] []
            pipe write: {"out": Str("out.txt")} [] []
        "#]],
    );
    check(|args| cli.dispatch("pipe", args), "", expect!["Missing command."]);
    check(
        |args| cli.dispatch("pipe", args),
        "read a uper",
        expect!["No such command 'uper'. Did you mean 'upper'?"],
    );
}

#[test]
fn tree_errors() {
    let dup = Command::builder("tool")
        .subcommand(Command::builder("a"))
        .subcommand(Command::builder("a"))
        .build();
    assert_eq!(dup.unwrap_err(), RegistryError::DuplicateSubcommand { name: "a".into() });

    let nested = Command::builder("tool")
        .chain()
        .subcommand(Command::builder("g").subcommand(Command::builder("leaf")))
        .build();
    assert_eq!(nested.unwrap_err(), RegistryError::GroupInChain { parent: "tool".into(), name: "g".into() });

    let chained_leaf = Command::builder("tool").chain().subcommand(Command::builder("inner").chain()).build();
    assert_eq!(
        chained_leaf.unwrap_err(),
        RegistryError::GroupInChain { parent: "tool".into(), name: "inner".into() }
    );

    let bad_child = Command::builder("tool")
        .subcommand(Command::builder("a").option(OptionSpec::new(["-x", "-x"], Action::Count)))
        .build();
    assert_eq!(bad_child.unwrap_err(), RegistryError::DuplicateFlag { flag: "-x".into() });
}
