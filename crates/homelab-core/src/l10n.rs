//! Localization support using Project Fluent.
//!
//! Translations are compiled into the binary from `locales/<code>/main.ftl`.
//!
//! # Supported Locales
//!
//! - English (en) - Default fallback
//! - German (de)
//!
//! # Example
//!
//! ```
//! use homelab_core::l10n::Localizer;
//!
//! let localizer = Localizer::new("en").unwrap();
//! let message = localizer.get("scan-complete", Some(&[("count", "3")]));
//! assert_eq!(message, "Found 3 repositories");
//! ```

use crate::error::{Error, Result};
use fluent::{FluentArgs, FluentBundle, FluentResource};
use fluent_bundle::FluentValue;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// The default locale used when no locale is specified or loading fails.
pub const DEFAULT_LOCALE: &str = "en";

/// Locale codes with an embedded translation.
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "de"];

/// Formats user-facing messages for one locale.
pub struct Localizer {
    bundle: FluentBundle<FluentResource>,
    locale: LanguageIdentifier,
}

impl Localizer {
    /// Creates a Localizer for `locale_str`.
    ///
    /// Region and encoding suffixes are ignored (`de_DE.UTF-8` → `de`).
    /// Unsupported languages fall back to English.
    ///
    /// # Errors
    ///
    /// Returns an error if the language part is not a valid identifier.
    pub fn new(locale_str: &str) -> Result<Self> {
        let language = language_code(locale_str);
        let requested: LanguageIdentifier = language
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", locale_str)))?;

        let code = if embedded_locale(&language).is_some() {
            language
        } else {
            DEFAULT_LOCALE.to_string()
        };
        let locale: LanguageIdentifier = code
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", code)))?;
        if locale != requested {
            debug!(requested = %requested, "falling back to default locale");
        }

        let bundle = Self::load_bundle(&locale, &code)?;
        Ok(Self { bundle, locale })
    }

    /// Creates a Localizer for the system locale, see [`detect_system_locale`].
    pub fn from_system() -> Result<Self> {
        Self::new(&detect_system_locale())
    }

    fn load_bundle(locale: &LanguageIdentifier, code: &str) -> Result<FluentBundle<FluentResource>> {
        let source = embedded_locale(code)
            .ok_or_else(|| Error::l10n(format!("No translations for '{}'", code)))?;

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| Error::l10n(format!("Failed to parse FTL: {:?}", errors)))?;

        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        // Terminal output, no bidi isolation marks around placeables.
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|e| Error::l10n(format!("Failed to add resource: {:?}", e)))?;
        Ok(bundle)
    }

    /// Retrieves a translated message by its identifier.
    ///
    /// Argument values that parse as integers are passed as numbers so
    /// plural selectors work. Unknown ids come back as `[id]`.
    pub fn get(&self, msg_id: &str, args: Option<&[(&str, &str)]>) -> String {
        let Some(message) = self.bundle.get_message(msg_id) else {
            return format!("[{}]", msg_id);
        };
        let Some(pattern) = message.value() else {
            return format!("[{}]", msg_id);
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (key, value) in args {
                let value = match value.parse::<i64>() {
                    Ok(n) => FluentValue::from(n),
                    Err(_) => FluentValue::from(value.to_string()),
                };
                fluent_args.set(*key, value);
            }
            fluent_args
        });

        let mut errors = vec![];
        let formatted = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(msg_id, ?errors, "fluent formatting errors");
        }
        formatted.into_owned()
    }

    /// The locale actually in use.
    pub fn locale(&self) -> String {
        self.locale.to_string()
    }
}

/// Detects the system language from `LC_ALL`, `LC_MESSAGES`, then `LANG`.
///
/// Returns `"en"` when none is set.
pub fn detect_system_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .map(|value| language_code(&value))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// `de_DE.UTF-8` → `de`, `en-US` → `en`, `C` → `c`.
fn language_code(locale: &str) -> String {
    locale
        .split(['_', '.', '-', '@'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn embedded_locale(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some(include_str!("../locales/en/main.ftl")),
        "de" => Some(include_str!("../locales/de/main.ftl")),
        _ => None,
    }
}
