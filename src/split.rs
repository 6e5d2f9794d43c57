/// Splits a command line the way a POSIX shell would, without failing on
/// input that is still being typed.
///
/// An unterminated quote keeps the partial token and a trailing lone
/// backslash is dropped, so `example 'my file` gives `["example", "my file"]`
/// and `example my\` gives `["example", "my"]`.
pub fn split_arg_string(line: &str) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Whitespace,
        Word,
        Single,
        Double,
    }

    let mut res = Vec::new();
    let mut token = String::new();
    let mut state = State::Whitespace;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Whitespace | State::Word => match c {
                c if c.is_whitespace() => {
                    if state == State::Word {
                        res.push(std::mem::take(&mut token));
                    }
                    state = State::Whitespace;
                }
                '\'' => state = State::Single,
                '"' => state = State::Double,
                '\\' => match chars.next() {
                    Some(escaped) => {
                        token.push(escaped);
                        state = State::Word;
                    }
                    None => break,
                },
                c => {
                    token.push(c);
                    state = State::Word;
                }
            },
            State::Single => match c {
                '\'' => state = State::Word,
                c => token.push(c),
            },
            State::Double => match c {
                '"' => state = State::Word,
                '\\' => match chars.peek() {
                    Some(&next) if matches!(next, '"' | '\\' | '$' | '`') => {
                        token.push(next);
                        chars.next();
                    }
                    Some(&'\n') => {
                        chars.next();
                    }
                    Some(_) => token.push('\\'),
                    None => break,
                },
                c => token.push(c),
            },
        }
    }

    // Anything but plain whitespace here means a token was started, even an
    // empty quoted one.
    if state != State::Whitespace || !token.is_empty() {
        res.push(token);
    }
    res
}
