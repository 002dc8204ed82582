//! Mapping of compositor layer identifiers onto [`LayerKind`].
//!
//! The compositor reports a kind string per typed layer ("outline",
//! "copper-top", ...) but real archives also arrive with bare gerber
//! filenames, so the detector accepts both.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::LayerKind;

static KIND_PATTERNS: Lazy<Vec<(LayerKind, Regex)>> = Lazy::new(|| {
    vec![
        (
            LayerKind::Outline,
            Regex::new(r"(?i)^outline$|edge[-_\.]?cuts|[-_\.]outline|\.gko$|\.gm1$").unwrap(),
        ),
        (
            LayerKind::TopCopper,
            Regex::new(r"(?i)^copper[-_]?top$|[-_\.]F[-_\.]?Cu|top[-_\.]?copper|\.gtl$").unwrap(),
        ),
        (
            LayerKind::BottomCopper,
            Regex::new(r"(?i)^copper[-_]?bottom$|[-_\.]B[-_\.]?Cu|bottom[-_\.]?copper|\.gbl$")
                .unwrap(),
        ),
        (
            LayerKind::TopSoldermask,
            Regex::new(r"(?i)^soldermask[-_]?top$|[-_\.]F[-_\.]?Mask|\.gts$").unwrap(),
        ),
        (
            LayerKind::BottomSoldermask,
            Regex::new(r"(?i)^soldermask[-_]?bottom$|[-_\.]B[-_\.]?Mask|\.gbs$").unwrap(),
        ),
        (
            LayerKind::TopSilkscreen,
            Regex::new(r"(?i)^silkscreen[-_]?top$|[-_\.]F[-_\.]?Silk[sS]?|\.gto$").unwrap(),
        ),
        (
            LayerKind::BottomSilkscreen,
            Regex::new(r"(?i)^silkscreen[-_]?bottom$|[-_\.]B[-_\.]?Silk[sS]?|\.gbo$").unwrap(),
        ),
        (
            LayerKind::Drill,
            Regex::new(r"(?i)^drill$|\.drl$|\.xln$").unwrap(),
        ),
    ]
});

/// Resolve a kind identifier or filename to a [`LayerKind`].
///
/// Unknown identifiers map to [`LayerKind::Unknown`] rather than failing;
/// the assembler only requires the outline entry to be recognizable.
pub fn kind_from_name(name: &str) -> LayerKind {
    for (kind, pattern) in KIND_PATTERNS.iter() {
        if pattern.is_match(name) {
            return *kind;
        }
    }
    LayerKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_identifiers() {
        assert_eq!(kind_from_name("outline"), LayerKind::Outline);
        assert_eq!(kind_from_name("copper-top"), LayerKind::TopCopper);
        assert_eq!(kind_from_name("soldermask_bottom"), LayerKind::BottomSoldermask);
    }

    #[test]
    fn test_gerber_filenames() {
        assert_eq!(kind_from_name("board-Edge_Cuts.gbr"), LayerKind::Outline);
        assert_eq!(kind_from_name("board-F_Cu.gbr"), LayerKind::TopCopper);
        assert_eq!(kind_from_name("board-B_SilkS.gbr"), LayerKind::BottomSilkscreen);
        assert_eq!(kind_from_name("board.gtl"), LayerKind::TopCopper);
        assert_eq!(kind_from_name("board.drl"), LayerKind::Drill);
    }

    #[test]
    fn test_unknown_is_tolerated() {
        assert_eq!(kind_from_name("README.txt"), LayerKind::Unknown);
        assert_eq!(kind_from_name("README.txt").display_name(), "Unknown");
        assert!(!kind_from_name("README.txt").is_outline());
    }
}
