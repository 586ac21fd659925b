//! Pointer-width and compression heuristics.
//!
//! Neither property is declared in the container. Both are inferred by
//! checking whether `count * entry_size` matches the observed byte length of
//! every table at once.

use serde::{Deserialize, Serialize};

use super::header::TableLocations;
use super::layout::PointerWidth;
use crate::error::{Result, XseqError};

/// Outcome of matching table sizes against the candidate widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Detected(PointerWidth),
    /// Both widths fit. `preferred` is the first match in
    /// [`PointerWidth::CANDIDATES`] order.
    Ambiguous { preferred: PointerWidth },
    NoMatch,
}

/// What to do when both widths fit the observed sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbiguityPolicy {
    /// Take the first candidate (Narrow).
    #[default]
    PreferFirst,
    Reject,
}

/// Match `counts[i] * entry_size(i)` against `lengths[i]` for all four
/// tables, for each candidate width.
pub fn match_widths(counts: [usize; 4], lengths: [usize; 4]) -> Detection {
    let mut matched = PointerWidth::CANDIDATES.into_iter().filter(|width| {
        width
            .entry_sizes()
            .iter()
            .zip(counts.iter().zip(lengths.iter()))
            .all(|(size, (count, len))| count * size == *len)
    });

    match (matched.next(), matched.next()) {
        (Some(width), None) => Detection::Detected(width),
        (Some(width), Some(_)) => Detection::Ambiguous { preferred: width },
        _ => Detection::NoMatch,
    }
}

/// Tables are stored raw when some width explains every stored span
/// exactly; otherwise the spans are compressed lengths.
pub fn tables_compressed(locations: &TableLocations) -> bool {
    let counts = locations.tables().map(|t| t.count);
    let detection = match_widths(counts, locations.spans());
    log::debug!("stored span detection: {:?}", detection);
    detection == Detection::NoMatch
}

impl Detection {
    /// Turn the detection into a width according to `policy`.
    pub fn resolve(self, policy: AmbiguityPolicy) -> Result<PointerWidth> {
        match self {
            Detection::Detected(width) => Ok(width),
            Detection::Ambiguous { preferred } => match policy {
                AmbiguityPolicy::PreferFirst => {
                    log::warn!("table sizes fit both pointer widths, using {}", preferred);
                    Ok(preferred)
                }
                AmbiguityPolicy::Reject => Err(XseqError::AmbiguousFormat),
            },
            Detection::NoMatch => Err(XseqError::FormatDetection {
                reason: "no pointer width matches all four table sizes".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::header::TableLocation;

    #[test]
    fn detects_each_width() {
        assert_eq!(
            match_widths([2, 1, 3, 4], [40, 8, 36, 32]),
            Detection::Detected(PointerWidth::Narrow)
        );
        assert_eq!(
            match_widths([2, 1, 3, 4], [48, 16, 48, 64]),
            Detection::Detected(PointerWidth::Wide)
        );
        assert_eq!(match_widths([2, 1, 3, 4], [48, 8, 36, 32]), Detection::NoMatch);
    }

    #[test]
    fn empty_tables_are_ambiguous() {
        let detection = match_widths([0; 4], [0; 4]);
        assert_eq!(
            detection,
            Detection::Ambiguous { preferred: PointerWidth::Narrow }
        );
        assert_eq!(
            detection.resolve(AmbiguityPolicy::PreferFirst).unwrap(),
            PointerWidth::Narrow
        );
        assert!(matches!(
            detection.resolve(AmbiguityPolicy::Reject),
            Err(XseqError::AmbiguousFormat)
        ));
    }

    #[test]
    fn no_match_is_a_detection_error() {
        assert!(matches!(
            Detection::NoMatch.resolve(AmbiguityPolicy::PreferFirst),
            Err(XseqError::FormatDetection { .. })
        ));
    }

    #[test]
    fn compressed_spans() {
        let at = |offset, count| TableLocation { offset, count };
        let raw = TableLocations {
            function: at(24, 1),
            jump: at(44, 0),
            instruction: at(44, 1),
            argument: at(56, 0),
            string_offset: 56,
        };
        assert!(!tables_compressed(&raw));

        // Same counts, but each table carries a 4-byte compression header.
        let packed = TableLocations {
            function: at(24, 1),
            jump: at(48, 0),
            instruction: at(52, 1),
            argument: at(68, 0),
            string_offset: 72,
        };
        assert!(tables_compressed(&packed));
    }
}
