use argtree::Command;
use expect_test::expect;

use crate::check;

fn pipe() -> Command {
    argtree::command! {
        chain cmd pipe {
            cmd read arg src {}
            cmd upper {
                store_const --all = true
            }
        }
    }
    .unwrap()
}

#[test]
fn chained() {
    let cli = pipe();
    assert!(cli.is_chain());
    check(
        |args| cli.dispatch("pipe", args),
        "read a upper --all read b",
        expect![[r#"
            pipe: {} []
            pipe read: {"src": Str("a")} []
            pipe upper: {"all": Bool(true)} []
            pipe read: {"src": Str("b")} []
        "#]],
    );
}
