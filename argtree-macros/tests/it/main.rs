mod chain;
mod git;

use std::fmt::Write;

use argtree::Context;
use expect_test::Expect;

fn check<'a, F>(f: F, args: &str, expect: Expect)
where
    F: FnOnce(Vec<String>) -> argtree::Result<Vec<Context<'a>>>,
{
    let args = args.split_ascii_whitespace().map(String::from).collect::<Vec<_>>();
    match f(args) {
        Ok(contexts) => {
            let mut buf = String::new();
            for ctx in &contexts {
                let _ = writeln!(buf, "{}: {:?} {:?}", ctx.command_path(), ctx.params, ctx.args);
            }
            expect.assert_eq(&buf);
        }
        Err(err) => {
            expect.assert_eq(&err.to_string());
        }
    }
}
