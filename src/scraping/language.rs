// src/scraping/language.rs
//! Best-effort language identification of job titles.
//!
//! Short strings are noisy; results are a hint, and `None` means "unknown".

/// ISO 639-3 codes reported by whatlang, paired with their ISO 639-1 form.
const ISO_639_1: &[(&str, &str)] = &[
    ("afr", "af"),
    ("aka", "ak"),
    ("amh", "am"),
    ("ara", "ar"),
    ("aze", "az"),
    ("bel", "be"),
    ("ben", "bn"),
    ("bul", "bg"),
    ("cat", "ca"),
    ("ces", "cs"),
    ("cmn", "zh"),
    ("dan", "da"),
    ("deu", "de"),
    ("ell", "el"),
    ("eng", "en"),
    ("epo", "eo"),
    ("est", "et"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("guj", "gu"),
    ("heb", "he"),
    ("hin", "hi"),
    ("hrv", "hr"),
    ("hun", "hu"),
    ("hye", "hy"),
    ("ind", "id"),
    ("ita", "it"),
    ("jav", "jv"),
    ("jpn", "ja"),
    ("kan", "kn"),
    ("kat", "ka"),
    ("khm", "km"),
    ("kor", "ko"),
    ("lat", "la"),
    ("lav", "lv"),
    ("lit", "lt"),
    ("mal", "ml"),
    ("mar", "mr"),
    ("mkd", "mk"),
    ("mya", "my"),
    ("nep", "ne"),
    ("nld", "nl"),
    ("nob", "no"),
    ("ori", "or"),
    ("pan", "pa"),
    ("pes", "fa"),
    ("pol", "pl"),
    ("por", "pt"),
    ("ron", "ro"),
    ("rus", "ru"),
    ("sin", "si"),
    ("slk", "sk"),
    ("slv", "sl"),
    ("sna", "sn"),
    ("spa", "es"),
    ("srp", "sr"),
    ("swe", "sv"),
    ("tam", "ta"),
    ("tel", "te"),
    ("tgl", "tl"),
    ("tha", "th"),
    ("tuk", "tk"),
    ("tur", "tr"),
    ("ukr", "uk"),
    ("urd", "ur"),
    ("uzb", "uz"),
    ("vie", "vi"),
    ("yid", "yi"),
    ("zul", "zu"),
];

pub trait LanguageDetector: Send + Sync {
    /// ISO 639-1 code of `text`, when one can be guessed
    fn detect(&self, text: &str) -> Option<String>;
}

pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        Some(to_iso_639_1(info.lang().code()).to_string())
    }
}

/// Two-letter form of a three-letter code; unknown codes pass through
pub fn to_iso_639_1(code: &str) -> &str {
    ISO_639_1
        .iter()
        .find(|(three, _)| three.eq_ignore_ascii_case(code))
        .map(|(_, two)| *two)
        .unwrap_or(code)
}

/// Whether `detected` is one of the accepted codes (two- or three-letter)
pub fn is_accepted(detected: &str, accepted: &[String]) -> bool {
    let detected = to_iso_639_1(detected);
    accepted
        .iter()
        .any(|code| to_iso_639_1(code.trim()).eq_ignore_ascii_case(detected))
}
