use bytes::Bytes;

/// An ordered list of response headers.
///
/// Lookup is case-insensitive and returns the first match. Duplicates are
/// kept and insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    pairs: Vec<(Bytes, Bytes)>,
}

impl Headers {
    /// Creates an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the first header whose name matches `name`, ignoring ASCII case.
    ///
    /// Returns its position and value.
    pub fn find(&self, name: &str) -> Option<(usize, &Bytes)> {
        self.pairs
            .iter()
            .enumerate()
            .find(|(_, (n, _))| n.eq_ignore_ascii_case(name.as_bytes()))
            .map(|(index, (_, value))| (index, value))
    }

    /// Returns whether a header named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Appends a header to the end of the list.
    pub fn append(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Replaces the value at `index`, keeping the original name and position.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, value: impl Into<Bytes>) {
        self.pairs[index].1 = value.into();
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.pairs.iter().map(|(n, v)| (n, v))
    }

    /// Number of headers, duplicates included.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Consumes the list, returning the raw pairs.
    pub fn into_vec(self) -> Vec<(Bytes, Bytes)> {
        self.pairs
    }
}

impl From<Vec<(Bytes, Bytes)>> for Headers {
    fn from(pairs: Vec<(Bytes, Bytes)>) -> Self {
        Self { pairs }
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<Bytes>,
    V: Into<Bytes>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Headers {
        [
            ("Content-Type", "text/plain"),
            ("Set-Cookie", "a=1"),
            ("set-cookie", "b=2"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_find_case_insensitive() {
        let headers = sample();
        let (index, value) = headers.find("content-type").unwrap();
        assert_eq!(index, 0);
        assert_eq!(value, "text/plain");
        assert!(headers.find("CONTENT-TYPE").is_some());
    }

    #[test]
    fn test_find_first_duplicate() {
        let headers = sample();
        let (index, value) = headers.find("SET-COOKIE").unwrap();
        assert_eq!(index, 1);
        assert_eq!(value, "a=1");
    }

    #[test]
    fn test_find_missing() {
        assert!(sample().find("content-length").is_none());
        assert!(!Headers::new().contains("content-type"));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut headers = sample();
        headers.append("X-Extra", "1");
        assert_eq!(headers.len(), 4);
        let names: Vec<_> = headers.iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(
            names,
            vec!["Content-Type", "Set-Cookie", "set-cookie", "X-Extra"]
        );
    }

    #[test]
    fn test_replace_in_place() {
        let mut headers = sample();
        headers.replace(2, "c=3");
        let pairs = headers.into_vec();
        assert_eq!(pairs[2].0, "set-cookie");
        assert_eq!(pairs[2].1, "c=3");
        assert_eq!(pairs[1].1, "a=1");
    }
}
