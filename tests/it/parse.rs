use argtree::{
    unpack_args, Action, ArgumentSpec, Error, Nargs, OptionParser, OptionSpec, RegistryError, Settings,
    Unpacked, Value,
};
use expect_test::expect;

use crate::check;

fn tool() -> OptionParser {
    let mut p = OptionParser::new();
    p.add_option(OptionSpec::new(["-v", "--verbose"], Action::Count).dest("verbose")).unwrap();
    p.add_option(OptionSpec::new(["-o", "--output"], Action::Store).dest("output")).unwrap();
    p.add_option(OptionSpec::new(["--x"], Action::Append).dest("x")).unwrap();
    p.add_option(OptionSpec::new(["--version"], Action::StoreConst(Value::Bool(true))).dest("version"))
        .unwrap();
    p.add_option(OptionSpec::new(["-p", "--point"], Action::Store).nargs(2).dest("point")).unwrap();
    p.add_option(OptionSpec::new(["--color"], Action::Store).optional_value().dest("color")).unwrap();
    p.add_option(OptionSpec::new(["-q"], Action::AppendConst(Value::Str("q".into()))).dest("tags"))
        .unwrap();
    p
}

fn parse(settings: Settings) -> impl FnOnce(Vec<String>) -> argtree::Result<argtree::ParseOutput> {
    move |args| tool().parse_args(args, &settings)
}

fn default() -> impl FnOnce(Vec<String>) -> argtree::Result<argtree::ParseOutput> {
    parse(Settings::default())
}

#[test]
fn short_cluster_with_inline_value() {
    check(
        default(),
        "-vofile a",
        expect![[r#"
            verbose = Count(1)
            output = Str("file")
            args: ["a"]
            order: [#0, #1]
        "#]],
    );
    check(
        default(),
        "-qq -vv",
        expect![[r#"
            tags = List([Str("q"), Str("q")])
            verbose = Count(2)
            args: []
            order: [#6, #6, #0, #0]
        "#]],
    );
}

#[test]
fn append_keeps_encounter_order() {
    check(
        default(),
        "--x 1 --x 2 --x 3",
        expect![[r#"
            x = List([Str("1"), Str("2"), Str("3")])
            args: []
            order: [#2, #2, #2]
        "#]],
    );
}

#[test]
fn long_prefixes() {
    check(
        default(),
        "--verb -v --out=f",
        expect![[r#"
            verbose = Count(2)
            output = Str("f")
            args: []
            order: [#0, #0, #1]
        "#]],
    );
    check(
        default(),
        "--ver",
        expect!["Ambiguous option: --ver (possible options: --verbose, --version)"],
    );
    check(
        parse(Settings::default().with_abbreviations(false)),
        "--verb",
        expect!["No such option: --verb (Possible options: --verbose, --version)"],
    );
}

#[test]
fn double_dash_ends_options() {
    check(
        default(),
        "a -- -v --x b",
        expect![[r#"
            args: ["a", "-v", "--x", "b"]
            order: []
        "#]],
    );
}

#[test]
fn option_errors() {
    check(default(), "--outptu x", expect!["No such option: --outptu Did you mean --output?"]);
    check(default(), "-vz", expect!["No such option: -z"]);
    check(default(), "-o", expect!["Option '-o' requires an argument."]);
    check(default(), "-p 1", expect!["Option '-p' requires 2 arguments."]);
    check(default(), "--version=yes", expect!["Option '--version' does not take a value."]);
}

#[test]
fn multi_value_option() {
    check(
        default(),
        "-p 1 2 -o=-1",
        expect![[r#"
            point = Tuple([Some("1"), Some("2")])
            output = Str("=-1")
            args: []
            order: [#4, #1]
        "#]],
    );
}

#[test]
fn optional_value() {
    check(
        default(),
        "--color --verbose",
        expect![[r#"
            color = FlagNeedsValue
            verbose = Count(1)
            args: []
            order: [#5, #0]
        "#]],
    );
    check(
        default(),
        "--color red",
        expect![[r#"
            color = Str("red")
            args: []
            order: [#5]
        "#]],
    );
    check(
        default(),
        "--color",
        expect![[r#"
            color = FlagNeedsValue
            args: []
            order: [#5]
        "#]],
    );
}

#[test]
fn attached_values_are_literal() {
    check(
        default(),
        "--color=-v --output=--x",
        expect![[r#"
            color = Str("-v")
            output = Str("--x")
            args: []
            order: [#5, #1]
        "#]],
    );
    check(
        default(),
        "-o-v --point=-1 -2",
        expect![[r#"
            output = Str("-v")
            point = Tuple([Some("-1"), Some("-2")])
            args: []
            order: [#1, #4]
        "#]],
    );
}

#[test]
fn pending_option_is_reported() {
    let resilient = Settings::default().with_resilient_parsing(true);
    let out = tool().parse_args(vec!["-v".into(), "--point".into(), "1".into()], &resilient).unwrap();
    assert_eq!(out.pending.map(|it| it.to_string()), Some("#4".to_string()));
    assert_eq!(out.values.get("point"), None);

    let out = tool().parse_args(vec!["--color".into()], &Settings::default()).unwrap();
    assert_eq!(out.pending.map(|it| it.to_string()), Some("#5".to_string()));

    let out = tool().parse_args(vec!["-o".into(), "-o".into()], &Settings::default()).unwrap();
    assert_eq!(out.pending, None);
    assert_eq!(out.values["output"], Value::Str("-o".into()));
}

#[test]
fn positional_lookalikes() {
    check(
        default(),
        "-1 - -v -2.5",
        expect![[r#"
            verbose = Count(1)
            args: ["-1", "-", "-2.5"]
            order: [#0]
        "#]],
    );
    let out = tool().parse_args(vec![String::new(), "-v".into()], &Settings::default()).unwrap();
    assert_eq!(out.args, vec![String::new()]);

    let mut p = OptionParser::new();
    p.add_option(OptionSpec::new(["-1"], Action::StoreConst(Value::Bool(true))).dest("one")).unwrap();
    let out = p.parse_args(vec!["-1".into()], &Settings::default()).unwrap();
    assert_eq!(out.values["one"], Value::Bool(true));
}

#[test]
fn unknown_options_as_positionals() {
    check(
        parse(Settings::default().with_ignore_unknown_options(true)),
        "--nope -vz a",
        expect![[r#"
            verbose = Count(1)
            args: ["--nope", "-z", "a"]
            order: [#0]
        "#]],
    );
}

#[test]
fn posix_strict_mode() {
    check(
        parse(Settings::default().with_interspersed_args(false)),
        "-v a -v",
        expect![[r#"
            verbose = Count(1)
            args: ["a", "-v"]
            order: [#0]
        "#]],
    );
}

#[test]
fn resilient_parsing_keeps_what_it_has() {
    check(
        parse(Settings::default().with_resilient_parsing(true)),
        "-v a --bogus -o x",
        expect![[r#"
            verbose = Count(1)
            args: ["a"]
            order: [#0]
        "#]],
    );
}

#[test]
fn custom_prefixes() {
    let mut p = OptionParser::new();
    p.add_option(OptionSpec::new(["+w", "++warn"], Action::Count).dest("w")).unwrap();
    check(
        move |args| p.parse_args(args, &Settings::default()),
        "+ww ++wa",
        expect![[r#"
            w = Count(3)
            args: []
            order: [#0, #0, #0]
        "#]],
    );
}

#[test]
fn normalized_flags() {
    let cli = argtree::Command::builder("tool")
        .token_normalize(lower)
        .option(OptionSpec::new(["--Verbose"], Action::Count).dest("verbose"))
        .build()
        .unwrap();
    check(
        |args| cli.parser().parse_args(args, cli.settings()),
        "--VERBOSE --verb",
        expect![[r#"
            verbose = Count(2)
            args: []
            order: [#0, #0]
        "#]],
    );
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}

fn cp() -> OptionParser {
    let mut p = OptionParser::new();
    p.add_option(OptionSpec::new(["-v"], Action::Count).dest("verbose")).unwrap();
    p.add_argument(ArgumentSpec::new("src", Nargs::Exactly(1))).unwrap();
    p.add_argument(ArgumentSpec::new("mid", Nargs::Variadic)).unwrap();
    p.add_argument(ArgumentSpec::new("dst", Nargs::Exactly(1))).unwrap();
    p
}

#[test]
fn arguments_bind_after_options() {
    check(
        |args| cp().parse_args(args, &Settings::default()),
        "a b -v c d e",
        expect![[r#"
            verbose = Count(1)
            src = Str("a")
            mid = List([Str("b"), Str("c"), Str("d")])
            dst = Str("e")
            args: []
            order: [#0, #1, #2, #3]
        "#]],
    );
    check(
        |args| cp().parse_args(args, &Settings::default()),
        "a",
        expect![[r#"
            src = Str("a")
            mid = List([])
            args: []
            order: [#1, #2, #3]
        "#]],
    );
}

#[test]
fn tuple_arguments() {
    let pair = || {
        let mut p = OptionParser::new();
        p.add_argument(ArgumentSpec::new("pair", Nargs::Exactly(2))).unwrap();
        p
    };
    check(
        |args| pair().parse_args(args, &Settings::default()),
        "x y z",
        expect![[r#"
            pair = Tuple([Some("x"), Some("y")])
            args: ["z"]
            order: [#0]
        "#]],
    );
    check(
        |args| pair().parse_args(args, &Settings::default()),
        "",
        expect![[r#"
            args: []
            order: [#0]
        "#]],
    );
    check(
        |args| pair().parse_args(args, &Settings::default()),
        "x",
        expect!["Argument 'pair' takes 2 values."],
    );
}

#[test]
fn unpacker_shapes() {
    let strings = |it: &[&str]| it.iter().map(|it| it.to_string()).collect::<Vec<_>>();
    let (slots, rest) = unpack_args(
        strings(&["a", "b", "c", "d", "e"]),
        &[Nargs::Exactly(1), Nargs::Variadic, Nargs::Exactly(1)],
    );
    assert_eq!(
        slots,
        vec![
            Unpacked::Single(Some("a".into())),
            Unpacked::Variadic(strings(&["b", "c", "d"])),
            Unpacked::Single(Some("e".into())),
        ]
    );
    assert!(rest.is_empty());

    let (slots, _) = unpack_args(strings(&["a"]), &[Nargs::Exactly(2), Nargs::Variadic]);
    assert_eq!(slots, vec![Unpacked::Tuple(vec![Some("a".into()), None]), Unpacked::Variadic(vec![])]);
}

#[test]
fn registry_errors() {
    let mut p = tool();
    assert_eq!(
        p.add_option(OptionSpec::new(["-v"], Action::Count)),
        Err(RegistryError::DuplicateFlag { flag: "-v".into() })
    );
    assert_eq!(
        p.add_option(OptionSpec::new(["--a", "--a"], Action::Count)),
        Err(RegistryError::DuplicateFlag { flag: "--a".into() })
    );
    assert_eq!(
        p.add_option(OptionSpec::new(["name"], Action::Count)).unwrap_err().to_string(),
        "Invalid start character for option (name)"
    );
    assert_eq!(
        p.add_option(OptionSpec::new(Vec::<String>::new(), Action::Count).dest("d")),
        Err(RegistryError::NoFlags { dest: "d".into() })
    );
    assert_eq!(
        p.add_option(OptionSpec::new(["--n"], Action::Store).nargs(0)),
        Err(RegistryError::ZeroArity { name: "--n".into() })
    );
    // A failed registration leaves no trace.
    let out = p.parse_args(vec!["--a".into()], &Settings::default());
    assert!(matches!(out, Err(Error::NoSuchOption { .. })));

    let mut p = cp();
    assert_eq!(
        p.add_argument(ArgumentSpec::new("more", Nargs::Variadic)),
        Err(RegistryError::MultipleVariadic { first: "mid".into(), second: "more".into() })
    );
    assert_eq!(
        p.add_argument(ArgumentSpec::new("none", Nargs::Exactly(0))),
        Err(RegistryError::ZeroArity { name: "none".into() })
    );
}
