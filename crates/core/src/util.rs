use std::path::{Path, PathBuf};

use url::Url;

pub trait UrlExt {
    fn with_segments<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>;
    fn path_and_query(&self) -> &str;
}

impl UrlExt for Url {
    /// Append percent-encoded path segments to the existing path.
    /// URLs that cannot be a base are returned unchanged.
    #[inline]
    fn with_segments<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut out = self.clone();
        if let Ok(mut path) = out.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        out
    }

    #[inline]
    fn path_and_query(&self) -> &str { &self[url::Position::BeforePath..] }
}

/// Join two paths, only including the normal components.
pub fn join_normalized(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let mut out = base.as_ref().to_path_buf();
    out.extend(path.as_ref().components().filter(|v| matches!(v, std::path::Component::Normal(_))));
    out
}

/// Format a size in bytes to a human-readable string.
/// Uses SI (kilo = 1000) units, formatted to two decimal places.
pub fn size(value: u64) -> String {
    let units = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    let mut value = value as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < units.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", value, units[unit])
}
