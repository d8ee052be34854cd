//! Language tag canonicalization
//!
//! Language tags coming from ebook metadata are written in many forms
//! ("en", "eng", "en-US", "English"). Core properties want the ISO 639-1
//! two-letter code whenever one exists.

/// Turns free-form language tags into canonical codes
pub trait LanguageCanonicalizer {
    /// Canonical (ISO 639-2) code for a tag, or `None` when unrecognized
    fn canonicalize(&self, raw: &str) -> Option<String>;

    /// ISO 639-1 code for a canonical code, when one exists
    fn iso639_1(&self, canonical: &str) -> Option<String>;

    /// Value written to `dc:language`.
    ///
    /// Prefers the two-letter code, then the canonical code, and finally the
    /// raw tag verbatim when it cannot be recognized.
    fn language_value(&self, raw: &str) -> String {
        match self.canonicalize(raw) {
            Some(canonical) => self.iso639_1(&canonical).unwrap_or(canonical),
            None => raw.to_string(),
        }
    }
}

struct Language {
    iso1: Option<&'static str>,
    /// ISO 639-2/T (or 639-3) code, the canonical form
    iso3: &'static str,
    /// ISO 639-2/B bibliographic code when it differs from `iso3`
    bibliographic: Option<&'static str>,
    name: &'static str,
}

const fn lang(
    iso1: Option<&'static str>,
    iso3: &'static str,
    bibliographic: Option<&'static str>,
    name: &'static str,
) -> Language {
    Language {
        iso1,
        iso3,
        bibliographic,
        name,
    }
}

static LANGUAGES: &[Language] = &[
    lang(Some("af"), "afr", None, "afrikaans"),
    lang(Some("am"), "amh", None, "amharic"),
    lang(Some("ar"), "ara", None, "arabic"),
    lang(Some("az"), "aze", None, "azerbaijani"),
    lang(Some("be"), "bel", None, "belarusian"),
    lang(Some("bg"), "bul", None, "bulgarian"),
    lang(Some("bn"), "ben", None, "bengali"),
    lang(Some("bs"), "bos", None, "bosnian"),
    lang(Some("ca"), "cat", None, "catalan"),
    lang(Some("cs"), "ces", Some("cze"), "czech"),
    lang(Some("cy"), "cym", Some("wel"), "welsh"),
    lang(Some("da"), "dan", None, "danish"),
    lang(Some("de"), "deu", Some("ger"), "german"),
    lang(Some("el"), "ell", Some("gre"), "greek"),
    lang(Some("en"), "eng", None, "english"),
    lang(Some("eo"), "epo", None, "esperanto"),
    lang(Some("es"), "spa", None, "spanish"),
    lang(Some("et"), "est", None, "estonian"),
    lang(Some("eu"), "eus", Some("baq"), "basque"),
    lang(Some("fa"), "fas", Some("per"), "persian"),
    lang(Some("fi"), "fin", None, "finnish"),
    lang(Some("fr"), "fra", Some("fre"), "french"),
    lang(Some("ga"), "gle", None, "irish"),
    lang(Some("gl"), "glg", None, "galician"),
    lang(Some("gu"), "guj", None, "gujarati"),
    lang(Some("he"), "heb", None, "hebrew"),
    lang(Some("hi"), "hin", None, "hindi"),
    lang(Some("hr"), "hrv", None, "croatian"),
    lang(Some("hu"), "hun", None, "hungarian"),
    lang(Some("hy"), "hye", Some("arm"), "armenian"),
    lang(Some("id"), "ind", None, "indonesian"),
    lang(Some("is"), "isl", Some("ice"), "icelandic"),
    lang(Some("it"), "ita", None, "italian"),
    lang(Some("ja"), "jpn", None, "japanese"),
    lang(Some("ka"), "kat", Some("geo"), "georgian"),
    lang(Some("kk"), "kaz", None, "kazakh"),
    lang(Some("km"), "khm", None, "khmer"),
    lang(Some("kn"), "kan", None, "kannada"),
    lang(Some("ko"), "kor", None, "korean"),
    lang(Some("la"), "lat", None, "latin"),
    lang(Some("lo"), "lao", None, "lao"),
    lang(Some("lt"), "lit", None, "lithuanian"),
    lang(Some("lv"), "lav", None, "latvian"),
    lang(Some("mk"), "mkd", Some("mac"), "macedonian"),
    lang(Some("ml"), "mal", None, "malayalam"),
    lang(Some("mn"), "mon", None, "mongolian"),
    lang(Some("mr"), "mar", None, "marathi"),
    lang(Some("ms"), "msa", Some("may"), "malay"),
    lang(Some("my"), "mya", Some("bur"), "burmese"),
    lang(Some("nb"), "nob", None, "norwegian bokmal"),
    lang(Some("ne"), "nep", None, "nepali"),
    lang(Some("nl"), "nld", Some("dut"), "dutch"),
    lang(Some("nn"), "nno", None, "norwegian nynorsk"),
    lang(Some("no"), "nor", None, "norwegian"),
    lang(Some("pa"), "pan", None, "punjabi"),
    lang(Some("pl"), "pol", None, "polish"),
    lang(Some("pt"), "por", None, "portuguese"),
    lang(Some("ro"), "ron", Some("rum"), "romanian"),
    lang(Some("ru"), "rus", None, "russian"),
    lang(Some("si"), "sin", None, "sinhala"),
    lang(Some("sk"), "slk", Some("slo"), "slovak"),
    lang(Some("sl"), "slv", None, "slovenian"),
    lang(Some("sq"), "sqi", Some("alb"), "albanian"),
    lang(Some("sr"), "srp", None, "serbian"),
    lang(Some("sv"), "swe", None, "swedish"),
    lang(Some("sw"), "swa", None, "swahili"),
    lang(Some("ta"), "tam", None, "tamil"),
    lang(Some("te"), "tel", None, "telugu"),
    lang(Some("th"), "tha", None, "thai"),
    lang(Some("tl"), "tgl", None, "tagalog"),
    lang(Some("tr"), "tur", None, "turkish"),
    lang(Some("uk"), "ukr", None, "ukrainian"),
    lang(Some("ur"), "urd", None, "urdu"),
    lang(Some("uz"), "uzb", None, "uzbek"),
    lang(Some("vi"), "vie", None, "vietnamese"),
    lang(Some("xh"), "xho", None, "xhosa"),
    lang(Some("yo"), "yor", None, "yoruba"),
    lang(Some("zh"), "zho", Some("chi"), "chinese"),
    lang(Some("zu"), "zul", None, "zulu"),
    lang(None, "grc", None, "ancient greek"),
    lang(None, "ang", None, "old english"),
    lang(None, "enm", None, "middle english"),
    lang(None, "fro", None, "old french"),
    lang(None, "yue", None, "cantonese"),
];

/// Built-in ISO 639 table
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoLanguageTable;

impl IsoLanguageTable {
    fn find(key: &str) -> Option<&'static Language> {
        LANGUAGES.iter().find(|l| {
            l.iso3 == key || l.iso1 == Some(key) || l.bibliographic == Some(key) || l.name == key
        })
    }
}

impl LanguageCanonicalizer for IsoLanguageTable {
    fn canonicalize(&self, raw: &str) -> Option<String> {
        let normalized = raw.trim().to_lowercase().replace('_', "-");
        if normalized.is_empty() {
            return None;
        }

        // Whole-string match first so names like "norwegian bokmal" work,
        // then the primary subtag of a BCP 47 tag such as "en-US".
        Self::find(&normalized)
            .or_else(|| normalized.split('-').next().and_then(Self::find))
            .map(|l| l.iso3.to_string())
    }

    fn iso639_1(&self, canonical: &str) -> Option<String> {
        Self::find(&canonical.to_lowercase())
            .and_then(|l| l.iso1)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_forms() {
        let table = IsoLanguageTable;
        assert_eq!(table.canonicalize("en").as_deref(), Some("eng"));
        assert_eq!(table.canonicalize("ENG").as_deref(), Some("eng"));
        assert_eq!(table.canonicalize("en_GB").as_deref(), Some("eng"));
        assert_eq!(table.canonicalize("fre").as_deref(), Some("fra"));
        assert_eq!(table.canonicalize("German").as_deref(), Some("deu"));
        assert_eq!(table.canonicalize("klingon"), None);
        assert_eq!(table.canonicalize("  "), None);
    }

    #[test]
    fn test_language_value_prefers_two_letter_code() {
        let table = IsoLanguageTable;
        assert_eq!(table.language_value("en"), "en");
        assert_eq!(table.language_value("eng"), "en");
        assert_eq!(table.language_value("pt-BR"), "pt");
        assert_eq!(table.language_value("chi"), "zh");
    }

    #[test]
    fn test_language_value_without_two_letter_code() {
        let table = IsoLanguageTable;
        assert_eq!(table.language_value("grc"), "grc");
        assert_eq!(table.language_value("Ancient Greek"), "grc");
    }

    #[test]
    fn test_unrecognized_tag_is_kept_verbatim() {
        let table = IsoLanguageTable;
        assert_eq!(table.language_value("x-Klingon"), "x-Klingon");
    }
}
