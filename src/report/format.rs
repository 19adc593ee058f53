/// Rendered in place of values that were not measured yet.
pub const PLACEHOLDER: &str = "-";

/// Unit suffixes for runtimes, indexed by the power of 1000 relative to nanoseconds, starting
/// at -1.
const RUNTIME_UNITS: [&str; 5] = ["ps", "ns", "us", "ms", "s"];

/// Formats a runtime given in nanoseconds with 4 decimals in the largest unit that does not
/// exceed its order of magnitude.
///
/// Supported units are ps, ns, us, ms and s. Runtimes of a second and above always use
/// seconds. A runtime of zero (not measured) or a non-finite one renders as `0.0000 s`.
///
/// # Examples
/// ```
/// use benchcmp::report::format::format_runtime;
/// assert_eq!(format_runtime(1500.0), "1.5000 us");
/// assert_eq!(format_runtime(0.25), "250.0000 ps");
/// assert_eq!(format_runtime(0.0), "0.0000 s");
/// ```
pub fn format_runtime(runtime_ns: f64) -> String {
    if runtime_ns == 0.0 || !runtime_ns.is_finite() {
        return "0.0000 s".to_string();
    }
    let order = runtime_ns.abs().log10().floor() as i32;
    let mut group = order.div_euclid(3).clamp(-1, 3);
    let mut scaled = runtime_ns / 1000f64.powi(group);
    // 999.99996 rounds to 1000.0000 at 4 decimals, which belongs to the next unit.
    if group < 3 && (scaled.abs() * 1e4).round() >= 1e7 {
        group += 1;
        scaled = runtime_ns / 1000f64.powi(group);
    }
    let unit = RUNTIME_UNITS[(group + 1) as usize];
    format!("{:.4} {}", scaled, unit)
}

/// Formats a speedup factor with 6 decimals, e.g. `2.500000x fast`.
pub fn format_speedup(speedup: Option<f64>) -> String {
    match speedup {
        Some(speedup) if speedup.is_finite() => format!("{:.6}x fast", speedup),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Formats a number by adding underscores to separate thousands for better readability.
///
/// For example, `1000000` becomes `1_000_000`.
pub fn format_with_underscores(number: u64) -> String {
    let num_str = number.to_string();
    let mut result = String::new();
    let chars: Vec<_> = num_str.chars().rev().collect();
    for (i, char) in chars.iter().enumerate() {
        if i % 3 == 0 && i != 0 {
            result.push('_');
        }
        result.push(*char);
    }
    result.chars().rev().collect()
}

/// bytes size for 1 kilobyte
pub const KB: u64 = 1_000;

static UNITS: &str = "KMGTPE";

/// Converts a byte size to a human-readable string representation.
///
/// For example, `1_500` bytes becomes `1.5 KB`, and `2_000_000` bytes becomes `2.0 MB`.
pub fn bytes_to_string(bytes: u64) -> String {
    if bytes < KB {
        return format!("{} B", bytes);
    }
    let size = bytes as f64;
    let exp = ((size.log10() / 3.0) as usize).clamp(1, UNITS.len());
    format!(
        "{:.1} {}B",
        size / KB.pow(exp as u32) as f64,
        UNITS.as_bytes()[exp - 1] as char,
    )
}
