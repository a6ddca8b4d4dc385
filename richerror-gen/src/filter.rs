//! Tag filtering of catalog entries.

use crate::catalog::ErrorData;

/// Which catalog entries take part in a run.
///
/// Tags are compared case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    /// Keep entries with at least one of these tags.
    Include(Vec<String>),
    /// Keep entries with none of these tags.
    Exclude(Vec<String>),
}

impl TagFilter {
    /// Builds a filter from comma-separated flag values. When both lists are
    /// non-empty the include list wins.
    pub fn from_flags(include: Option<&str>, exclude: Option<&str>) -> Self {
        let include = include.map(split_tags).unwrap_or_default();
        let exclude = exclude.map(split_tags).unwrap_or_default();
        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => {
                tracing::warn!(
                    include = %include.join(","),
                    exclude = %exclude.join(","),
                    "include and exclude tags both given; ignoring exclude tags"
                );
                Self::Include(include)
            }
            (false, true) => Self::Include(include),
            (true, false) => Self::Exclude(exclude),
            (true, true) => Self::All,
        }
    }

    /// The first tag of `entry` named by the filter list, if any.
    fn matching_tag<'a>(tags: &[String], entry: &'a ErrorData) -> Option<&'a str> {
        entry
            .tags
            .iter()
            .find(|tag| {
                let tag = normalize(tag);
                tags.iter().any(|wanted| *wanted == tag)
            })
            .map(String::as_str)
    }

    pub fn keeps(&self, entry: &ErrorData) -> bool {
        match self {
            Self::All => true,
            Self::Include(tags) => Self::matching_tag(tags, entry).is_some(),
            Self::Exclude(tags) => Self::matching_tag(tags, entry).is_none(),
        }
    }

    /// Entries the filter keeps, in catalog order.
    pub fn apply<'a>(&self, entries: &'a [ErrorData]) -> Vec<&'a ErrorData> {
        entries
            .iter()
            .filter(|entry| {
                let kept = self.keeps(entry);
                if kept {
                    match self {
                        Self::Include(tags) => tracing::debug!(
                            code = %entry.code,
                            tag = Self::matching_tag(tags, entry).unwrap_or_default(),
                            "entry matches include tag"
                        ),
                        _ => tracing::debug!(code = %entry.code, "entry kept"),
                    }
                }
                kept
            })
            .collect()
    }

    pub fn describe(&self) -> String {
        match self {
            Self::All => "all entries".to_string(),
            Self::Include(tags) => format!("entries tagged any of: {}", tags.join(", ")),
            Self::Exclude(tags) => format!("entries tagged none of: {}", tags.join(", ")),
        }
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize)
        .filter(|tag| !tag.is_empty())
        .collect()
}
