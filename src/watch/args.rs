//! Argument values of watched functions.

use std::fmt::Debug;

/// Arguments of a watched function, rendered one value per position.
///
/// Implemented for scalars, strings, `Vec` and `Option` (one position each)
/// and for tuples of up to six `Debug` values (one position per element).
/// Other argument types opt in with an empty impl, which shows no values:
///
/// ```ignore
/// impl WatchArgs for TrainConfig {}
/// ```
pub trait WatchArgs {
    fn arg_values(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WatchArgs for () {}

macro_rules! single_arg {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl WatchArgs for $ty {
                fn arg_values(&self) -> Vec<String> {
                    vec![format!("{:?}", self)]
                }
            }
        )+
    };
}

single_arg!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, &str,
);

impl<T: Debug> WatchArgs for Vec<T> {
    fn arg_values(&self) -> Vec<String> {
        vec![format!("{:?}", self)]
    }
}

impl<T: Debug> WatchArgs for Option<T> {
    fn arg_values(&self) -> Vec<String> {
        vec![format!("{:?}", self)]
    }
}

macro_rules! tuple_args {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Debug),+> WatchArgs for ($($name,)+) {
            fn arg_values(&self) -> Vec<String> {
                vec![$(format!("{:?}", self.$idx)),+]
            }
        }
    };
}

tuple_args!(A 0);
tuple_args!(A 0, B 1);
tuple_args!(A 0, B 1, C 2);
tuple_args!(A 0, B 1, C 2, D 3);
tuple_args!(A 0, B 1, C 2, D 3, E 4);
tuple_args!(A 0, B 1, C 2, D 3, E 4, F 5);

/// `name=value` pairs for the named positions; `_` hides a position.
pub(crate) fn render_params(names: &[String], values: &[String]) -> Option<String> {
    let pairs: Vec<String> = names
        .iter()
        .zip(values)
        .filter(|(name, _)| name.as_str() != "_")
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join(", "))
    }
}
