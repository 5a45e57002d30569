use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DialogueError;

/// Single-letter Kokoro pipeline language code.
///
/// | Code | Language | espeak-ng code |
/// |---|---|---|
/// | `a` | American English | `en-us` |
/// | `b` | British English | `en-gb` |
/// | `e` | Spanish | `es` |
/// | `f` | French | `fr` |
/// | `h` | Hindi | `hi` |
/// | `i` | Italian | `it` |
/// | `j` | Japanese | `ja` |
/// | `p` | Brazilian Portuguese | `pt-br` |
/// | `z` | Mandarin Chinese | `cmn` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LangCode {
    #[default]
    AmericanEnglish,
    BritishEnglish,
    Spanish,
    French,
    Hindi,
    Italian,
    Japanese,
    BrazilianPortuguese,
    Mandarin,
}

impl LangCode {
    pub fn code(self) -> char {
        match self {
            LangCode::AmericanEnglish => 'a',
            LangCode::BritishEnglish => 'b',
            LangCode::Spanish => 'e',
            LangCode::French => 'f',
            LangCode::Hindi => 'h',
            LangCode::Italian => 'i',
            LangCode::Japanese => 'j',
            LangCode::BrazilianPortuguese => 'p',
            LangCode::Mandarin => 'z',
        }
    }

    /// Language argument passed to `espeak-ng -v`.
    pub fn espeak_code(self) -> &'static str {
        match self {
            LangCode::AmericanEnglish => "en-us",
            LangCode::BritishEnglish => "en-gb",
            LangCode::Spanish => "es",
            LangCode::French => "fr",
            LangCode::Hindi => "hi",
            LangCode::Italian => "it",
            LangCode::Japanese => "ja",
            LangCode::BrazilianPortuguese => "pt-br",
            LangCode::Mandarin => "cmn",
        }
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LangCode {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "a" => Ok(LangCode::AmericanEnglish),
            "b" => Ok(LangCode::BritishEnglish),
            "e" => Ok(LangCode::Spanish),
            "f" => Ok(LangCode::French),
            "h" => Ok(LangCode::Hindi),
            "i" => Ok(LangCode::Italian),
            "j" => Ok(LangCode::Japanese),
            "p" => Ok(LangCode::BrazilianPortuguese),
            "z" => Ok(LangCode::Mandarin),
            other => Err(DialogueError::Config(format!(
                "Unknown language code '{other}' (expected one of a, b, e, f, h, i, j, p, z)"
            ))),
        }
    }
}

impl TryFrom<String> for LangCode {
    type Error = DialogueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LangCode> for String {
    fn from(lang: LangCode) -> Self {
        lang.code().to_string()
    }
}
