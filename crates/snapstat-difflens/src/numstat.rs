use std::sync::OnceLock;

use regex::Regex;

static NUMSTAT_LINE: OnceLock<Regex> = OnceLock::new();

fn numstat_line() -> &'static Regex {
    NUMSTAT_LINE.get_or_init(|| {
        Regex::new(r"^([0-9]+|-)\s+([0-9]+|-)\s+(.+)").expect("numstat pattern is valid")
    })
}

/// One line of `git diff --numstat` output.
///
/// # Examples
///
/// ```
/// use snapstat_difflens::numstat::NumstatEntry;
///
/// let entry = NumstatEntry::parse("3\t1\t{v1 => v2}/src/main.c").unwrap();
/// assert_eq!(entry.additions, Some(3));
/// assert_eq!(entry.path, "v2/src/main.c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    /// Added lines; `None` for binary files or counts that do not parse.
    pub additions: Option<u64>,
    /// Removed lines; `None` for binary files or counts that do not parse.
    pub removals: Option<u64>,
    /// Path of the file on the new side, rename notation resolved.
    pub path: String,
}

impl NumstatEntry {
    /// Parse a numstat line, returning `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = numstat_line().captures(line)?;
        Some(Self {
            additions: caps[1].parse().ok(),
            removals: caps[2].parse().ok(),
            path: resolve_new_path(&caps[3]),
        })
    }
}

/// Parse every numstat line in `output`, skipping lines that do not match.
pub fn parse_numstat(output: &str) -> Vec<NumstatEntry> {
    output.lines().filter_map(NumstatEntry::parse).collect()
}

/// New-side path of a numstat path that may use rename notation.
///
/// `pre/{old => new}/post` becomes `pre/new/post`, `old => new` becomes
/// `new`, and any other text is returned as is.
///
/// # Examples
///
/// ```
/// use snapstat_difflens::numstat::resolve_new_path;
///
/// assert_eq!(resolve_new_path("{a => b}/x.c"), "b/x.c");
/// assert_eq!(resolve_new_path("a/x.c => /dev/null"), "/dev/null");
/// assert_eq!(resolve_new_path("src/x.c"), "src/x.c");
/// ```
pub fn resolve_new_path(raw: &str) -> String {
    if let Some((prefix, rest)) = raw.split_once('{') {
        if let Some((inner, suffix)) = rest.split_once('}') {
            if let Some((_, new)) = inner.split_once("=>") {
                let new = new.trim();
                if new.is_empty() {
                    // `dir/{ => }` style: the braces stood for a whole path component.
                    return format!("{prefix}{}", suffix.trim_start_matches('/'));
                }
                return format!("{prefix}{new}{suffix}");
            }
        }
    }
    match raw.split_once("=>") {
        Some((_, new)) => new.trim().to_string(),
        None => raw.trim().to_string(),
    }
}
