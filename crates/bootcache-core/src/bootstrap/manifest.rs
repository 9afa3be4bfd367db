//! Bootstrap index parsing.
//!
//! The index is plain text, one `filename|fingerprint` pair per line. Empty
//! lines are skipped. Any other line that does not split into exactly two
//! non-empty fields invalidates the whole index.

use super::BootstrapError;
use serde::Serialize;

/// Field separator within an index line.
pub const FIELD_SEPARATOR: char = '|';

/// One artifact named by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    pub filename: String,
    pub fingerprint: String,
}

/// Ordered list of artifacts, as published by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactManifest {
    entries: Vec<ArtifactEntry>,
}

impl ArtifactManifest {
    /// Parse a raw index body.
    pub fn parse(raw: &str) -> Result<Self, BootstrapError> {
        let mut entries = Vec::new();
        for (i, line) in raw.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    return Err(BootstrapError::MalformedIndex {
                        line: i + 1,
                        raw: raw.to_string(),
                    })
                }
            }
        }
        Ok(ArtifactManifest { entries })
    }

    pub fn entries(&self) -> &[ArtifactEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ArtifactManifest {
    type Item = &'a ArtifactEntry;
    type IntoIter = std::slice::Iter<'a, ArtifactEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<ArtifactEntry> for ArtifactManifest {
    fn from_iter<I: IntoIterator<Item = ArtifactEntry>>(iter: I) -> Self {
        ArtifactManifest {
            entries: iter.into_iter().collect(),
        }
    }
}

fn parse_line(line: &str) -> Option<ArtifactEntry> {
    let mut fields = line.split(FIELD_SEPARATOR);
    let filename = fields.next()?;
    let fingerprint = fields.next()?;
    if fields.next().is_some() || filename.is_empty() || fingerprint.is_empty() {
        return None;
    }
    Some(ArtifactEntry {
        filename: filename.to_string(),
        fingerprint: fingerprint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_in_order() {
        let m = ArtifactManifest::parse("cpd.jar|CA124VADFSDS\nsquid.jar|34535FSFSDF\n").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(
            m.entries(),
            &[
                ArtifactEntry {
                    filename: "cpd.jar".into(),
                    fingerprint: "CA124VADFSDS".into(),
                },
                ArtifactEntry {
                    filename: "squid.jar".into(),
                    fingerprint: "34535FSFSDF".into(),
                },
            ]
        );
    }

    #[test]
    fn skips_empty_lines() {
        let m = ArtifactManifest::parse("\na.jar|AAA\n\n\nb.jar|BBB").unwrap();
        let names: Vec<_> = m.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, ["a.jar", "b.jar"]);
    }

    #[test]
    fn empty_body_is_empty_manifest() {
        assert!(ArtifactManifest::parse("").unwrap().is_empty());
        assert!(ArtifactManifest::parse("\n\n").unwrap().is_empty());
    }

    #[test]
    fn single_field_line_rejects_whole_index() {
        let err = ArtifactManifest::parse("cpd.jar\n").unwrap_err();
        match &err {
            BootstrapError::MalformedIndex { line, raw } => {
                assert_eq!(*line, 1);
                assert_eq!(raw, "cpd.jar\n");
            }
            other => panic!("expected MalformedIndex, got {:?}", other),
        }
        assert!(err.to_string().contains("cpd.jar\n"));
    }

    #[test]
    fn one_bad_line_among_good_ones_rejects_everything() {
        let raw = "a.jar|AAA\nb.jar|BBB|extra\nc.jar|CCC\n";
        let err = ArtifactManifest::parse(raw).unwrap_err();
        assert!(matches!(err, BootstrapError::MalformedIndex { line: 2, .. }));
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn empty_fields_are_malformed() {
        assert!(ArtifactManifest::parse("|AAA\n").is_err());
        assert!(ArtifactManifest::parse("a.jar|\n").is_err());
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let m = ArtifactManifest::parse("a.jar|AAA\r\nb.jar|BBB\r\n").unwrap();
        assert_eq!(m.entries()[1].fingerprint, "BBB");
    }

    #[test]
    fn serializes_as_list_of_entries() {
        let m: ArtifactManifest = [ArtifactEntry {
            filename: "a.jar".into(),
            fingerprint: "AAA".into(),
        }]
        .into_iter()
        .collect();
        let toml = toml::to_string(&Wrapper { artifacts: &m }).unwrap();
        assert!(toml.contains("filename = \"a.jar\""));
        assert!(toml.contains("fingerprint = \"AAA\""));
    }

    #[derive(Serialize)]
    struct Wrapper<'a> {
        artifacts: &'a ArtifactManifest,
    }
}
