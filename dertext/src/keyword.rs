//! Object keywords of the text grammar.

use dertree::Tag;

/// An object keyword: the word after the opening parenthesis.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Keyword {
    Bool,
    Int,
    Enum,
    Bits,
    Blob,
    Null,
    Oid,
    Numeric,
    Printable,
    Ia5,
    Teletex,
    General,
    Utf8,
    Bmp,
    Utf32,
    Utc,
    GenTime,
    Sequence,
    Set,
    SetDer,
    SetOf,
    SequenceNz,
    SetNz,
    SetDerNz,
    SetOfNz,
    Tag,
}

impl Keyword {
    /// Resolve a word to a keyword. Matching is case-insensitive.
    ///
    /// The `utf8` spelling family is UTF8String and nothing else;
    /// `utf16`/`bmp` is BMPString, `utf32`/`universalstring` is
    /// UniversalString.
    pub fn lookup(word: &str) -> Option<Keyword> {
        Some(match word.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Keyword::Bool,
            "int" | "integer" => Keyword::Int,
            "enum" | "enumerated" => Keyword::Enum,
            "bits" | "bitstring" => Keyword::Bits,
            "blob" | "octets" | "octetstring" => Keyword::Blob,
            "null" => Keyword::Null,
            "oid" => Keyword::Oid,
            "numeric" | "numericstring" => Keyword::Numeric,
            "printable" | "printablestring" => Keyword::Printable,
            "ia5" | "ia5string" => Keyword::Ia5,
            "teletex" | "teletexstring" | "t61" | "t61string" => Keyword::Teletex,
            "general" | "generalstring" => Keyword::General,
            "utf8" | "utf-8" | "utf8string" => Keyword::Utf8,
            "utf16" | "utf-16" | "bmp" | "bmpstring" => Keyword::Bmp,
            "utf32" | "utf-32" | "universalstring" => Keyword::Utf32,
            "utc" | "utctime" => Keyword::Utc,
            "gentime" | "generalizedtime" => Keyword::GenTime,
            "sequence" => Keyword::Sequence,
            "set" => Keyword::Set,
            "setder" => Keyword::SetDer,
            "setof" => Keyword::SetOf,
            "sequence-nz" => Keyword::SequenceNz,
            "set-nz" => Keyword::SetNz,
            "setder-nz" => Keyword::SetDerNz,
            "setof-nz" => Keyword::SetOfNz,
            "tag" => Keyword::Tag,
            _ => return None,
        })
    }

    /// The universal tag this keyword naturally carries, when it has
    /// one (`tag` does not: its tag always comes from the override).
    pub fn universal_tag(self) -> Option<Tag> {
        Some(match self {
            Keyword::Bool => Tag::BOOLEAN,
            Keyword::Int => Tag::INTEGER,
            Keyword::Enum => Tag::ENUMERATED,
            Keyword::Bits => Tag::BIT_STRING,
            Keyword::Blob => Tag::OCTET_STRING,
            Keyword::Null => Tag::NULL,
            Keyword::Oid => Tag::OBJECT_IDENTIFIER,
            Keyword::Numeric => Tag::NUMERIC_STRING,
            Keyword::Printable => Tag::PRINTABLE_STRING,
            Keyword::Ia5 => Tag::IA5_STRING,
            Keyword::Teletex => Tag::TELETEX_STRING,
            Keyword::General => Tag::GENERAL_STRING,
            Keyword::Utf8 => Tag::UTF8_STRING,
            Keyword::Bmp => Tag::BMP_STRING,
            Keyword::Utf32 => Tag::UNIVERSAL_STRING,
            Keyword::Utc => Tag::UTC_TIME,
            Keyword::GenTime => Tag::GENERALIZED_TIME,
            Keyword::Sequence | Keyword::SequenceNz => Tag::SEQUENCE,
            Keyword::Set
            | Keyword::SetNz
            | Keyword::SetDer
            | Keyword::SetDerNz
            | Keyword::SetOf
            | Keyword::SetOfNz => Tag::SET,
            Keyword::Tag => return None,
        })
    }

    /// The tag number this keyword denotes when used as a symbolic tag
    /// value inside `[class value]`. Only the plain type keywords are
    /// valid there.
    pub fn tag_value_number(self) -> Option<u32> {
        match self {
            Keyword::SetDer
            | Keyword::SetOf
            | Keyword::SequenceNz
            | Keyword::SetNz
            | Keyword::SetDerNz
            | Keyword::SetOfNz
            | Keyword::Tag => None,
            _ => self.universal_tag().map(|tag| tag.number),
        }
    }

    /// Does this keyword produce the constructed form?
    pub fn constructed(self) -> bool {
        matches!(
            self,
            Keyword::Sequence
                | Keyword::Set
                | Keyword::SetDer
                | Keyword::SetOf
                | Keyword::SequenceNz
                | Keyword::SetNz
                | Keyword::SetDerNz
                | Keyword::SetOfNz
                | Keyword::Tag
        )
    }

    /// Is this one of the restricted character string keywords?
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Keyword::Numeric
                | Keyword::Printable
                | Keyword::Ia5
                | Keyword::Teletex
                | Keyword::General
                | Keyword::Utf8
                | Keyword::Bmp
                | Keyword::Utf32
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Keyword;
    use dertree::Tag;

    #[test]
    fn aliases() {
        assert_eq!(Keyword::lookup("BOOL"), Some(Keyword::Bool));
        assert_eq!(Keyword::lookup("Integer"), Some(Keyword::Int));
        assert_eq!(Keyword::lookup("utf-8"), Some(Keyword::Utf8));
        assert_eq!(Keyword::lookup("utf8string"), Some(Keyword::Utf8));
        assert_eq!(Keyword::lookup("utf16"), Some(Keyword::Bmp));
        assert_eq!(Keyword::lookup("bmpstring"), Some(Keyword::Bmp));
        assert_eq!(Keyword::lookup("t61"), Some(Keyword::Teletex));
        assert_eq!(Keyword::lookup("set-nz"), Some(Keyword::SetNz));
        assert_eq!(Keyword::lookup("nonsense"), None);
    }

    #[test]
    fn natural_tags() {
        assert_eq!(Keyword::Bool.universal_tag(), Some(Tag::BOOLEAN));
        assert_eq!(Keyword::SetOf.universal_tag(), Some(Tag::SET));
        assert_eq!(Keyword::Tag.universal_tag(), None);
    }

    #[test]
    fn tag_value_keywords() {
        assert_eq!(Keyword::Sequence.tag_value_number(), Some(16));
        assert_eq!(Keyword::Enum.tag_value_number(), Some(10));
        assert_eq!(Keyword::SetOf.tag_value_number(), None);
    }
}
