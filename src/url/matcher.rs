/// Checks whether `candidate` ends with `base` on a dot boundary
///
/// `shop.example.com` is a dot-boundary suffix match of `example.com`, while
/// `myexample.com` is not. Equal strings do not count as a suffix match.
///
/// # Examples
///
/// ```
/// use seekora::url::is_dot_suffix;
///
/// assert!(is_dot_suffix("shop.example.com", "example.com"));
/// assert!(!is_dot_suffix("example.com", "example.com"));
/// assert!(!is_dot_suffix("myexample.com", "example.com"));
/// ```
pub fn is_dot_suffix(candidate: &str, base: &str) -> bool {
    if base.is_empty() || candidate.len() <= base.len() {
        return false;
    }

    candidate
        .strip_suffix(base)
        .map(|prefix| prefix.ends_with('.'))
        .unwrap_or(false)
}
