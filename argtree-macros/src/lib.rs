mod ast;
mod emit;
mod parse;

/// Declares a command tree.
///
/// Expands to a `Result<argtree::Command, argtree::RegistryError>`
/// expression; see the `argtree` crate docs for the syntax.
#[proc_macro]
pub fn command(_ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    #[cfg(not(test))]
    {
        let text = match parse::parse(_ts) {
            Ok(cmd) => emit::emit(&cmd),
            Err(err) => format!("compile_error!({:?})", format!("invalid command syntax, {err}")),
        };
        text.parse().unwrap()
    }
    #[cfg(test)]
    unimplemented!()
}

#[cfg(test)]
pub fn compile(src: &str) -> String {
    use proc_macro2::TokenStream;

    let ts = src.parse::<TokenStream>().unwrap();
    let cmd = parse::parse(ts).unwrap();
    emit::emit(&cmd)
}
