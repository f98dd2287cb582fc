// ==========================================
// Localisation (i18n)
// ==========================================
// rust-i18n, English (fallback) and Hindi
// Note: the rust_i18n::i18n! macro is invoked in lib.rs
// ==========================================

use crate::domain::types::BatchStatus;

pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "hi"];

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch locale; unsupported codes fall back to "en"
pub fn set_locale(locale: &str) {
    let locale = locale.trim();
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
    } else {
        tracing::warn!(locale, "unsupported locale, using en");
        rust_i18n::set_locale("en");
    }
}

/// Translate a key
///
/// # Example
/// ```no_run
/// use poultry_ledger::i18n::t;
/// let msg = t("notice.read_only");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a key and fill `%{name}` placeholders
///
/// # Example
/// ```no_run
/// use poultry_ledger::i18n::t_with_args;
/// let msg = t_with_args("audit.inventory_deficit", &[("count", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// Display label of a status in the current locale
pub fn status_label(status: BatchStatus) -> String {
    t(status.label_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale is process-global and tests run in parallel
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("hi");
        assert_eq!(current_locale(), "hi");

        set_locale("fr");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_lock_notices() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(t("notice.locked_pre_arrival"), "Locked until chicks arrive.");
        assert_eq!(t("notice.read_only"), "READ ONLY MODE - Batch Finalized");
        assert_eq!(status_label(BatchStatus::PreArrival), "Pre-Arrival");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("audit.inventory_deficit", &[("count", "3")]);
        assert!(msg.contains('3'));
        assert!(msg.contains("exceed"));

        set_locale("hi");
        let msg = t_with_args("audit.inventory_deficit", &[("count", "3")]);
        assert!(msg.contains('3'));
        set_locale("en");
    }
}
