use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// Kind of content an entry carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// A text note; the caption is the body
    Text,
    /// A photo with a source image and thumbnails
    Image,
    /// A video with a source attachment and thumbnails
    Video,
}

impl ArchiveType {
    /// Returns a human-readable string representation
    pub fn as_str(&self) -> &str {
        match self {
            ArchiveType::Text => "text",
            ArchiveType::Image => "image",
            ArchiveType::Video => "video",
        }
    }

    /// Resolve the archive type from the wire `type` string and the optional
    /// `attachmentType` override.
    ///
    /// An attachment type of `VIDEO` forces `Video` regardless of the record
    /// type (photo records sometimes carry a video attachment). Any other
    /// attachment type, or an unrecognized record type, is a parse error.
    pub fn resolve(entry_type: &str, attachment_type: Option<&str>) -> Result<Self> {
        if let Some(attachment) = attachment_type {
            if attachment.eq_ignore_ascii_case("VIDEO") {
                return Ok(ArchiveType::Video);
            }
            return Err(MirrorError::parse(format!(
                "unrecognized attachment type: {attachment}"
            )));
        }

        if entry_type.eq_ignore_ascii_case("TEXT") {
            Ok(ArchiveType::Text)
        } else if entry_type.eq_ignore_ascii_case("PHOTO")
            || entry_type.eq_ignore_ascii_case("IMAGE")
        {
            Ok(ArchiveType::Image)
        } else if entry_type.eq_ignore_ascii_case("VIDEO") {
            Ok(ArchiveType::Video)
        } else {
            Err(MirrorError::parse(format!(
                "unrecognized archive type: {entry_type}"
            )))
        }
    }
}

/// Gender of a child record in a journal summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse from the leading character of the wire string ('M'/'F',
    /// case-insensitive). Anything else is a parse error.
    pub fn from_wire(raw: &str) -> Result<Self> {
        match raw.chars().next() {
            Some('M') | Some('m') => Ok(Gender::Male),
            Some('F') | Some('f') => Ok(Gender::Female),
            _ => Err(MirrorError::parse(format!(
                "unrecognized gender value: {raw:?}"
            ))),
        }
    }

    /// Returns a human-readable string representation
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("TEXT", None, ArchiveType::Text)]
    #[case("text", None, ArchiveType::Text)]
    #[case("PHOTO", None, ArchiveType::Image)]
    #[case("IMAGE", None, ArchiveType::Image)]
    #[case("VIDEO", None, ArchiveType::Video)]
    #[case("PHOTO", Some("VIDEO"), ArchiveType::Video)]
    #[case("PHOTO", Some("video"), ArchiveType::Video)]
    fn test_archive_type_resolution(
        #[case] entry_type: &str,
        #[case] attachment: Option<&str>,
        #[case] expected: ArchiveType,
    ) {
        assert_eq!(ArchiveType::resolve(entry_type, attachment).unwrap(), expected);
    }

    #[test]
    fn test_unknown_archive_type_is_error() {
        assert!(ArchiveType::resolve("SCRIBBLE", None).is_err());
        assert!(ArchiveType::resolve("PHOTO", Some("AUDIO")).is_err());
    }

    #[test]
    fn test_archive_type_serde() {
        let serialized = serde_json::to_string(&ArchiveType::Image).unwrap();
        assert_eq!(serialized, r#""image""#);

        let deserialized: ArchiveType = serde_json::from_str(r#""video""#).unwrap();
        assert_eq!(deserialized, ArchiveType::Video);
    }

    #[rstest]
    #[case("MALE", Gender::Male)]
    #[case("male", Gender::Male)]
    #[case("M", Gender::Male)]
    #[case("FEMALE", Gender::Female)]
    #[case("f", Gender::Female)]
    fn test_gender_from_wire(#[case] raw: &str, #[case] expected: Gender) {
        assert_eq!(Gender::from_wire(raw).unwrap(), expected);
    }

    #[test]
    fn test_gender_rejects_unknown() {
        assert!(Gender::from_wire("").is_err());
        assert!(Gender::from_wire("X").is_err());
        assert!(Gender::from_wire("unknown").is_err());
    }
}
