//! Box hierarchy levels.
//!
//! [`BoxType`] is a closed discriminant: the synthetic root, the granularity
//! levels of each recognition backend, and synthetic markers. Its numeric
//! codes appear in persisted files and must never change.

use crate::error::StructureError;

/// Hierarchy level or origin of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum BoxType {
    Root,
    TesseractDocument,
    TesseractPage,
    TesseractParagraph,
    TesseractLine,
    TesseractWord,
    EasyOcrBox,
    GcpDocument,
    GcpBlockTable,
    GcpBlockText,
    GcpBlockParagraph,
    GcpBlockWord,
    Custom,
    IdrsPage,
    IdrsZone,
    IdrsLine,
    IdrsWord,
    PredictedPage,
    AwsBlockPage,
    AwsBlockLine,
    AwsBlockWord,
}

impl BoxType {
    /// All box types in code order.
    pub const ALL: [BoxType; 21] = [
        BoxType::Root,
        BoxType::TesseractDocument,
        BoxType::TesseractPage,
        BoxType::TesseractParagraph,
        BoxType::TesseractLine,
        BoxType::TesseractWord,
        BoxType::EasyOcrBox,
        BoxType::GcpDocument,
        BoxType::GcpBlockTable,
        BoxType::GcpBlockText,
        BoxType::GcpBlockParagraph,
        BoxType::GcpBlockWord,
        BoxType::Custom,
        BoxType::IdrsPage,
        BoxType::IdrsZone,
        BoxType::IdrsLine,
        BoxType::IdrsWord,
        BoxType::PredictedPage,
        BoxType::AwsBlockPage,
        BoxType::AwsBlockLine,
        BoxType::AwsBlockWord,
    ];

    /// Stable numeric code used by the tabular and persisted formats.
    pub fn code(self) -> i64 {
        match self {
            BoxType::Root => 0,
            BoxType::TesseractDocument => 1,
            BoxType::TesseractPage => 2,
            BoxType::TesseractParagraph => 3,
            BoxType::TesseractLine => 4,
            BoxType::TesseractWord => 5,
            BoxType::EasyOcrBox => 6,
            BoxType::GcpDocument => 17,
            BoxType::GcpBlockTable => 20,
            BoxType::GcpBlockText => 21,
            BoxType::GcpBlockParagraph => 24,
            BoxType::GcpBlockWord => 25,
            BoxType::Custom => 30,
            BoxType::IdrsPage => 40,
            BoxType::IdrsZone => 41,
            BoxType::IdrsLine => 42,
            BoxType::IdrsWord => 43,
            BoxType::PredictedPage => 90,
            BoxType::AwsBlockPage => 100,
            BoxType::AwsBlockLine => 101,
            BoxType::AwsBlockWord => 102,
        }
    }

    /// Look up a box type by its numeric code.
    pub fn from_code(code: i64) -> Result<BoxType, StructureError> {
        BoxType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(StructureError::UnknownBoxType(code))
    }

    /// The type a box of this type must be attached under.
    ///
    /// `None` for the root only.
    pub fn preceding(self) -> Option<BoxType> {
        match self {
            BoxType::Root => None,
            BoxType::TesseractDocument => Some(BoxType::Root),
            BoxType::TesseractPage => Some(BoxType::TesseractDocument),
            BoxType::TesseractParagraph => Some(BoxType::TesseractPage),
            BoxType::TesseractLine => Some(BoxType::TesseractParagraph),
            BoxType::TesseractWord => Some(BoxType::TesseractLine),
            BoxType::EasyOcrBox => Some(BoxType::Root),
            BoxType::GcpDocument => Some(BoxType::Root),
            BoxType::GcpBlockTable => Some(BoxType::GcpDocument),
            BoxType::GcpBlockText => Some(BoxType::GcpDocument),
            BoxType::GcpBlockParagraph => Some(BoxType::GcpBlockText),
            BoxType::GcpBlockWord => Some(BoxType::GcpBlockParagraph),
            BoxType::Custom => Some(BoxType::Root),
            BoxType::IdrsPage => Some(BoxType::Root),
            BoxType::IdrsZone => Some(BoxType::IdrsPage),
            BoxType::IdrsLine => Some(BoxType::IdrsZone),
            BoxType::IdrsWord => Some(BoxType::IdrsLine),
            BoxType::PredictedPage => Some(BoxType::Root),
            BoxType::AwsBlockPage => Some(BoxType::Root),
            BoxType::AwsBlockLine => Some(BoxType::AwsBlockPage),
            BoxType::AwsBlockWord => Some(BoxType::AwsBlockLine),
        }
    }

    /// Whether boxes of this type hold one line of words.
    pub fn is_line(self) -> bool {
        matches!(
            self,
            BoxType::TesseractLine
                | BoxType::AwsBlockLine
                | BoxType::GcpBlockParagraph
                | BoxType::IdrsLine
        )
    }

    pub fn is_root(self) -> bool {
        self == BoxType::Root
    }
}

impl TryFrom<i64> for BoxType {
    type Error = StructureError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        BoxType::from_code(code)
    }
}

impl From<BoxType> for i64 {
    fn from(box_type: BoxType) -> i64 {
        box_type.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<i64> = BoxType::ALL.iter().map(|t| t.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), BoxType::ALL.len());
    }

    #[test]
    fn code_roundtrip() {
        for t in BoxType::ALL {
            assert_eq!(BoxType::from_code(t.code()), Ok(t));
        }
    }

    #[test]
    fn tesseract_codes_are_stable() {
        assert_eq!(BoxType::Root.code(), 0);
        assert_eq!(BoxType::TesseractWord.code(), 5);
        assert_eq!(BoxType::PredictedPage.code(), 90);
        assert_eq!(BoxType::AwsBlockWord.code(), 102);
    }

    #[test]
    fn unknown_code() {
        assert_eq!(
            BoxType::from_code(7),
            Err(StructureError::UnknownBoxType(7))
        );
    }

    #[test]
    fn every_chain_ends_at_root() {
        for t in BoxType::ALL {
            let mut current = t;
            let mut steps = 0;
            while let Some(prev) = current.preceding() {
                current = prev;
                steps += 1;
                assert!(steps < BoxType::ALL.len(), "cycle from {t:?}");
            }
            assert_eq!(current, BoxType::Root);
        }
    }

    #[test]
    fn line_types() {
        let lines: Vec<BoxType> = BoxType::ALL.into_iter().filter(|t| t.is_line()).collect();
        assert_eq!(
            lines,
            vec![
                BoxType::TesseractLine,
                BoxType::GcpBlockParagraph,
                BoxType::IdrsLine,
                BoxType::AwsBlockLine,
            ]
        );
    }
}
