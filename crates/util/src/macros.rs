/// Cast an integer expression to a usize using TryInto. Values that do not fit are a logic error.
#[macro_export]
macro_rules! cast_usize {
    ($e:expr) => {{
        let Ok(u) = <_ as TryInto<usize>>::try_into($e) else {
            unreachable!("value does not fit in a usize")
        };
        u
    }};
}
pub use cast_usize;
