//! Dotted attribute paths used by property overrides
//!
//! A path such as `inputs[0].default_value` or `image.colorspace_settings.name`
//! is parsed once when the template loads. Whether the attributes exist is only
//! known when the path is evaluated against a live node.

use std::fmt;
use std::str::FromStr;

use crate::constants::template::PATH_SEPARATOR;

/// Index applied to a collection attribute (`inputs[0]`, `inputs[Base Color]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathIndex {
    Position(usize),
    Key(String),
}

impl fmt::Display for PathIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathIndex::Position(position) => write!(f, "{position}"),
            PathIndex::Key(key) => write!(f, "{key}"),
        }
    }
}

/// One segment of a property path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<PathIndex>,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A parsed, syntactically valid property path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Segments walked with attribute gets before the final set
    pub fn parents(&self) -> &[PathSegment] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The segment that is assigned
    pub fn leaf(&self) -> &PathSegment {
        // Parsing guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Build a single-segment path from an attribute name
    pub fn attribute(name: &str) -> Result<Self, String> {
        name.parse()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = String;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err("path is empty".to_string());
        }

        let segments = split_segments(path)?
            .into_iter()
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        // A trailing index would assign into a collection, which no host supports.
        if segments.last().and_then(|s| s.index.as_ref()).is_some() {
            return Err("the last segment cannot be indexed".to_string());
        }

        Ok(Self { segments })
    }
}

/// Split on separators that are not inside brackets, so keys like
/// `inputs[Base.Color]` survive.
fn split_segments(path: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced ']' at {i}"))?;
            }
            c if c == PATH_SEPARATOR && depth == 0 => {
                parts.push(&path[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unclosed '['".to_string());
    }
    parts.push(&path[start..]);
    Ok(parts)
}

fn parse_segment(raw: &str) -> Result<PathSegment, String> {
    let (name, index) = match raw.find('[') {
        Some(open) => {
            if !raw.ends_with(']') {
                return Err(format!("segment '{raw}' has text after its index"));
            }
            let inner = &raw[open + 1..raw.len() - 1];
            if inner.is_empty() {
                return Err(format!("segment '{raw}' has an empty index"));
            }
            if inner.contains('[') || inner.contains(']') {
                return Err(format!("segment '{raw}' has a nested index"));
            }
            let index = match inner.parse::<usize>() {
                Ok(position) => PathIndex::Position(position),
                Err(_) => PathIndex::Key(inner.trim_matches('"').to_string()),
            };
            (&raw[..open], Some(index))
        }
        None => (raw, None),
    };

    if name.is_empty() {
        return Err("empty segment".to_string());
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("segment '{name}' is not an identifier"));
    }

    Ok(PathSegment {
        name: name.to_string(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let path: PropertyPath = "image.colorspace_settings.name".parse().unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.leaf().name, "name");
        assert_eq!(path.parents()[1].name, "colorspace_settings");
        assert_eq!(path.to_string(), "image.colorspace_settings.name");
    }

    #[test]
    fn test_indexed_segments() {
        let path: PropertyPath = "inputs[0].default_value".parse().unwrap();
        assert_eq!(path.parents()[0].index, Some(PathIndex::Position(0)));

        let keyed: PropertyPath = "inputs[Base Color].default_value".parse().unwrap();
        assert_eq!(
            keyed.parents()[0].index,
            Some(PathIndex::Key("Base Color".to_string()))
        );
        assert_eq!(keyed.to_string(), "inputs[Base Color].default_value");
    }

    #[test]
    fn test_rejected_paths() {
        let rejected = [
            "", "a..b", ".a", "a.", "inputs[0", "inputs[]", "a]b", "inputs[0]", "bad-name",
        ];
        for bad in rejected {
            assert!(bad.parse::<PropertyPath>().is_err(), "accepted '{bad}'");
        }
    }
}
