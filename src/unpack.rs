use std::collections::VecDeque;

use crate::Nargs;

/// Tokens assigned to one positional slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unpacked {
    /// Slot of arity one; `None` if no token was left for it.
    Single(Option<String>),
    /// Slot of a fixed arity other than one, padded with `None`.
    Tuple(Vec<Option<String>>),
    /// The variadic slot.
    Variadic(Vec<String>),
}

/// Distributes `args` over slots declared with `nargs_spec`.
///
/// Slots before the variadic one are filled from the front, slots after it
/// from the back, and the variadic slot takes whatever is in between.
/// Without a variadic slot the unclaimed tail is returned as the remainder.
/// Missing tokens are padded with `None`; reporting them is up to the
/// caller. A second variadic slot (rejected at registration) receives
/// nothing.
pub fn unpack_args(args: Vec<String>, nargs_spec: &[Nargs]) -> (Vec<Unpacked>, Vec<String>) {
    let mut args = VecDeque::from(args);
    let mut spec = nargs_spec.iter().copied().collect::<VecDeque<_>>();
    let mut res = Vec::with_capacity(spec.len());
    let mut star = None;

    let fetch = |args: &mut VecDeque<String>, reversed: bool| {
        if reversed {
            args.pop_back()
        } else {
            args.pop_front()
        }
    };

    loop {
        let reversed = star.is_some();
        let nargs = if reversed { spec.pop_back() } else { spec.pop_front() };
        let nargs = match nargs {
            Some(it) => it,
            None => break,
        };
        match nargs {
            Nargs::Exactly(1) => res.push(Unpacked::Single(fetch(&mut args, reversed))),
            Nargs::Exactly(n) => {
                let mut values = (0..n).map(|_| fetch(&mut args, reversed)).collect::<Vec<_>>();
                if reversed {
                    values.reverse();
                }
                res.push(Unpacked::Tuple(values));
            }
            Nargs::Variadic => {
                if star.is_none() {
                    star = Some(res.len());
                }
                res.push(Unpacked::Variadic(Vec::new()));
            }
        }
    }

    if let Some(star) = star {
        if let Some(slot) = res.get_mut(star) {
            *slot = Unpacked::Variadic(args.drain(..).collect());
        }
        if let Some(tail) = res.get_mut(star + 1..) {
            tail.reverse();
        }
    }

    (res, args.into())
}
