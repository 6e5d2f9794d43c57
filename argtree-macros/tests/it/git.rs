use argtree::{Action, Command, Param, Value};
use expect_test::expect;

use crate::check;

fn git() -> Command {
    argtree::command! {
        /// A tiny version control system.
        cmd git {
            count -v, --verbose
            store -C, --directory

            /// Stage paths.
            cmd add
                arg paths: ...
            {
                /// Only print what would change.
                store_const -n, --dry-run = true
                store --mode ?
                append --tag: 2
            }

            cmd rm
                arg name
            {
                append_const --force = "yes"
            }
        }
    }
    .unwrap()
}

#[test]
fn definitions() {
    let cli = git();
    assert_eq!(cli.help(), Some("A tiny version control system."));
    assert!(cli.is_group());

    let add = cli.resolve_command("add").unwrap();
    assert_eq!(add.help(), Some("Stage paths."));
    let dry_run = add.params().iter().filter_map(Param::as_option).next().unwrap();
    assert_eq!(dry_run.flags(), ["-n", "--dry-run"]);
    assert_eq!(dry_run.get_dest(), Some("dry_run"));
    assert_eq!(dry_run.action(), &Action::StoreConst(Value::Bool(true)));
    assert_eq!(dry_run.get_help(), Some("Only print what would change."));
}

#[test]
fn dispatch() {
    let cli = git();
    check(
        |args| cli.dispatch("git", args),
        "-v add -n --mode --tag a b x y",
        expect![[r#"
            git: {"verbose": Count(1)} ["-n", "--mode", "--tag", "a", "b", "x", "y"]
            git add: {"dry_run": Bool(true), "mode": FlagNeedsValue, "tag": List([Tuple([Some("a"), Some("b")])]), "paths": List([Str("x"), Str("y")])} []
        "#]],
    );
    check(
        |args| cli.dispatch("git", args),
        "-C /tmp rm --force file --force",
        expect![[r#"
            git: {"directory": Str("/tmp")} ["--force", "file", "--force"]
            git rm: {"force": List([Str("yes"), Str("yes")]), "name": Str("file")} []
        "#]],
    );
}

#[test]
fn usage_errors() {
    let cli = git();
    check(|args| cli.dispatch("git", args), "-C", expect!["Option '-C' requires an argument."]);
    check(
        |args| cli.dispatch("git", args),
        "add --tag a",
        expect!["Option '--tag' requires 2 arguments."],
    );
    check(
        |args| cli.dispatch("git", args),
        "rm",
        expect![[r#"
            git: {} []
            git rm: {} []
        "#]],
    );
    check(|args| cli.dispatch("git", args), "mv", expect!["No such command 'mv'."]);
}
