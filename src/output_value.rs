use std::{collections::HashMap, time::Duration};

use crate::{args::RawBuffer, report::format::format_with_underscores};

/// Outputs and error values are formatted via OutputValue for the report.
///
/// The return value of a value-returning function shows up in the "Result" column, the value
/// computed by the error metric in the "Error" column. Floats are printed with 6 decimals.
///
/// # Example
/// In a compression benchmark the output could be the compressed size, and the error the
/// difference in size to the baseline. Any value that is interesting to compare.
pub trait OutputValue {
    /// The formatted value.
    /// If the value is None, the cell is left empty.
    fn format(&self) -> Option<String>;
    /// The name of the column title when used as output. The default is "Result".
    fn column_title() -> &'static str {
        "Result"
    }
}

impl OutputValue for () {
    fn format(&self) -> Option<String> {
        None
    }
}

macro_rules! impl_display {
    ($($t:ty),* $(,)?) => {$(
        impl OutputValue for $t {
            fn format(&self) -> Option<String> {
                Some(self.to_string())
            }
        }
    )*};
}

impl_display!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String,
    &'static str
);

impl OutputValue for f32 {
    fn format(&self) -> Option<String> {
        Some(format!("{:.6}", self))
    }
}
impl OutputValue for f64 {
    fn format(&self) -> Option<String> {
        Some(format!("{:.6}", self))
    }
}

impl<T: OutputValue> OutputValue for Option<T> {
    fn format(&self) -> Option<String> {
        self.as_ref().and_then(OutputValue::format)
    }
    fn column_title() -> &'static str {
        T::column_title()
    }
}

impl OutputValue for Duration {
    fn format(&self) -> Option<String> {
        Some(crate::report::format::format_runtime(self.as_nanos() as f64))
    }
}

impl<T> OutputValue for Vec<T> {
    fn format(&self) -> Option<String> {
        Some(format_with_underscores(self.len() as u64))
    }
    fn column_title() -> &'static str {
        "Vec(len)"
    }
}
impl<T> OutputValue for RawBuffer<T> {
    fn format(&self) -> Option<String> {
        Some(format_with_underscores(self.len() as u64))
    }
    fn column_title() -> &'static str {
        "Buffer(len)"
    }
}
impl<K, V, S> OutputValue for HashMap<K, V, S> {
    fn format(&self) -> Option<String> {
        Some(format_with_underscores(self.len() as u64))
    }
    fn column_title() -> &'static str {
        "Map(len)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_have_six_decimals() {
        assert_eq!(12.0f64.format(), Some("12.000000".to_string()));
        assert_eq!((-0.5f32).format(), Some("-0.500000".to_string()));
    }

    #[test]
    fn plain_values() {
        assert_eq!(3i64.format(), Some("3".to_string()));
        assert_eq!(().format(), None);
        assert_eq!(None::<u32>.format(), None);
        assert_eq!(Some(7u32).format(), Some("7".to_string()));
        assert_eq!(Duration::from_micros(3).format(), Some("3.0000 us".to_string()));
    }

    #[test]
    fn collections_report_their_length() {
        let value = vec![0u8; 1_234_567];
        assert_eq!(value.format(), Some("1_234_567".to_string()));
        assert_eq!(<Vec<u8>>::column_title(), "Vec(len)");
        assert_eq!(<u8>::column_title(), "Result");
    }
}
