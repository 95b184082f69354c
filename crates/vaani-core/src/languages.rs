//! Supported widget languages and their provider locale codes.

use std::borrow::Cow;

use serde::Serialize;

/// Display and routing information for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    /// Short code used by the widget (`en`, `hi`, ...).
    pub code: Cow<'static, str>,
    /// Locale code expected by the provider (`en-IN`, `hi-IN`, ...).
    pub provider_code: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub native: Cow<'static, str>,
    pub flag: Cow<'static, str>,
}

const fn lang(
    code: &'static str,
    provider_code: &'static str,
    name: &'static str,
    native: &'static str,
    flag: &'static str,
) -> LanguageInfo {
    LanguageInfo {
        code: Cow::Borrowed(code),
        provider_code: Cow::Borrowed(provider_code),
        name: Cow::Borrowed(name),
        native: Cow::Borrowed(native),
        flag: Cow::Borrowed(flag),
    }
}

/// Every language the widget may switch to.
pub const SUPPORTED_LANGUAGES: &[LanguageInfo] = &[
    lang("en", "en-IN", "English", "English", "🇺🇸"),
    lang("hi", "hi-IN", "Hindi", "हिन्दी", "🇮🇳"),
    lang("ta", "ta-IN", "Tamil", "தமிழ்", "🇮🇳"),
    lang("te", "te-IN", "Telugu", "తెలుగు", "🇮🇳"),
    lang("bn", "bn-IN", "Bengali", "বাংলা", "🇮🇳"),
    lang("gu", "gu-IN", "Gujarati", "ગુજરાતી", "🇮🇳"),
    lang("kn", "kn-IN", "Kannada", "ಕನ್ನಡ", "🇮🇳"),
    lang("ml", "ml-IN", "Malayalam", "മലയാളം", "🇮🇳"),
    lang("mr", "mr-IN", "Marathi", "मराठी", "🇮🇳"),
    lang("pa", "pa-IN", "Punjabi", "ਪੰਜਾਬੀ", "🇮🇳"),
    lang("or", "od-IN", "Odia", "ଓଡ଼ିଆ", "🇮🇳"),
    lang("as", "as-IN", "Assamese", "অসমীয়া", "🇮🇳"),
    lang("brx", "brx-IN", "Bodo", "बड़ो", "🇮🇳"),
    lang("doi", "doi-IN", "Dogri", "डोगरी", "🇮🇳"),
    lang("kok", "kok-IN", "Konkani", "कोंकणी", "🇮🇳"),
    lang("ks", "ks-IN", "Kashmiri", "کٲشُر", "🇮🇳"),
    lang("mai", "mai-IN", "Maithili", "मैथिली", "🇮🇳"),
    lang("mni", "mni-IN", "Manipuri", "ꯃꯤꯇꯩꯂꯣꯟ", "🇮🇳"),
    lang("ne", "ne-IN", "Nepali", "नेपाली", "🇮🇳"),
    lang("sa", "sa-IN", "Sanskrit", "संस्कृतम्", "🇮🇳"),
    lang("sat", "sat-IN", "Santali", "ᱥᱟᱱᱛᱟᱲᱤ", "🇮🇳"),
    lang("sd", "sd-IN", "Sindhi", "سنڌي", "🇮🇳"),
    lang("ur", "ur-IN", "Urdu", "اردو", "🇮🇳"),
];

/// Source code meaning "let the provider detect the language".
pub const AUTO_DETECT: &str = "auto";

fn lookup(code: &str) -> Option<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

pub fn is_supported(code: &str) -> bool {
    lookup(code).is_some()
}

/// Map a widget code to the provider's locale code.
///
/// Unknown codes (including already-qualified locales like `hi-IN`) and
/// [`AUTO_DETECT`] pass through unchanged.
pub fn provider_code(code: &str) -> String {
    match lookup(code) {
        Some(info) => info.provider_code.to_string(),
        None => code.to_string(),
    }
}

/// Display information for a code. Unknown codes echo the code itself as
/// name and native name, with a globe flag.
pub fn language_info(code: &str) -> LanguageInfo {
    match lookup(code) {
        Some(info) => info.clone(),
        None => LanguageInfo {
            code: Cow::Owned(code.to_string()),
            provider_code: Cow::Owned(code.to_string()),
            name: Cow::Owned(code.to_string()),
            native: Cow::Owned(code.to_string()),
            flag: Cow::Borrowed("🌐"),
        },
    }
}
