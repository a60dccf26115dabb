/// Remove every carriage return and line feed from `s`.
///
/// Bare `\n`, bare `\r` and `\r\n` are all dropped, so the result can be
/// written into a single header line without starting a new one.
///
/// ```
/// use mailsmith::message::strip_line_breaks;
///
/// assert_eq!(strip_line_breaks("Hi\r\nBcc: evil@x.com"), "HiBcc: evil@x.com");
/// ```
pub fn strip_line_breaks(s: &str) -> String {
    s.chars().filter(|&c| c != '\r' && c != '\n').collect()
}

pub(crate) fn strip_all<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| strip_line_breaks(value.as_ref()))
        .collect()
}
