use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

/// Verses and supplications sent in the rotating devotional broadcast.
#[derive(Debug, Clone, Default)]
pub struct DevotionalContent {
    pub verses: Vec<String>,
    pub supplications: Vec<String>,
}

impl DevotionalContent {
    pub fn new(verses: Vec<String>, supplications: Vec<String>) -> Self {
        Self { verses, supplications }
    }

    pub fn load(verses_path: impl AsRef<Path>, supplications_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            verses: load_lines(verses_path)?,
            supplications: load_lines(supplications_path)?,
        })
    }

    /// One verse and one supplication, drawn independently.
    /// `None` if either list is empty.
    pub fn pick_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&str, &str)> {
        let verse = self.verses.choose(rng)?;
        let supplication = self.supplications.choose(rng)?;
        Some((verse.as_str(), supplication.as_str()))
    }
}

/// Reads a content file, one entry per line. Blank lines are skipped, entries are trimmed.
pub fn load_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file {}", path.display()))?;
    Ok(parse_lines(&raw))
}

pub fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_lines_skips_blank_lines() {
        let lines = parse_lines("first\n\n   \n  second  \r\nthird\n");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_pick_pair_draws_from_both_lists() {
        let content = DevotionalContent::new(
            vec!["verse".to_string()],
            vec!["dua a".to_string(), "dua b".to_string()],
        );
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (verse, dua) = content.pick_pair(&mut rng).unwrap();
            assert_eq!(verse, "verse");
            assert!(dua == "dua a" || dua == "dua b");
        }
    }

    #[test]
    fn test_pick_pair_empty_list() {
        let content = DevotionalContent::new(vec!["verse".to_string()], Vec::new());
        let mut rng = StdRng::seed_from_u64(7);
        assert!(content.pick_pair(&mut rng).is_none());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_lines("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("Failed to read content file"));
    }
}
