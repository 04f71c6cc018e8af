use std::fmt;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        KeySegment::Str(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        KeySegment::Str(value)
    }
}

impl From<&String> for KeySegment {
    fn from(value: &String) -> Self {
        KeySegment::Str(value.clone())
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        KeySegment::Int(value)
    }
}

impl From<bool> for KeySegment {
    fn from(value: bool) -> Self {
        KeySegment::Bool(value)
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Str(s) => write!(f, "{:?}", s),
            KeySegment::Int(n) => write!(f, "{}", n),
            KeySegment::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Ordered sequence of segments identifying one cacheable resource,
/// e.g. `["products", "featured"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<KeySegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns a new key with `segment` appended.
    pub fn with(&self, segment: impl Into<KeySegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// Segment-wise prefix match. The empty key is a prefix of every key.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", segment)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching_is_segment_wise() {
        let products = QueryKey::new(["products"]);
        let featured = QueryKey::new(["products", "featured"]);
        let productions = QueryKey::new(["productions"]);

        assert!(featured.starts_with(&products));
        assert!(products.starts_with(&products));
        assert!(!products.starts_with(&featured));
        assert!(!productions.starts_with(&products));
        assert!(productions.starts_with(&QueryKey::default()));
    }

    #[test]
    fn mixed_segments() {
        let key = QueryKey::new(["products"]).with(7i64).with(true);
        assert_eq!(
            key.segments(),
            &[
                KeySegment::Str("products".to_string()),
                KeySegment::Int(7),
                KeySegment::Bool(true)
            ]
        );
        assert_eq!(key.to_string(), r#"["products",7,true]"#);
    }
}
