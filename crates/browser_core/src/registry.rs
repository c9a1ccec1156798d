//! Process-wide registries named by the design notes (§5, §9): a dark-mode flag, a CSS
//! counter map, and an append-only web-font table. Each is encapsulated behind explicit
//! getters/setters rather than exposed as a bare global, so a future render-scoped
//! context can replace the backing storage without touching call sites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;

/// `-1` = auto (follow the OS), `0` = light, `1` = dark.
static DARK_MODE_OVERRIDE: AtomicI8 = AtomicI8::new(-1);
static DARK_MODE_SYSTEM: AtomicI8 = AtomicI8::new(0);

/// Set the user's explicit dark-mode override (`-1`, `0`, or `1`).
pub fn set_dark_mode_override(value: i8) {
    DARK_MODE_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Set what the platform shell reports as the system-level dark-mode preference.
pub fn set_system_dark_mode(is_dark: bool) {
    DARK_MODE_SYSTEM.store(i8::from(is_dark), Ordering::Relaxed);
}

/// Resolve whether dark mode is active for the current render, honoring the override.
pub fn is_dark_mode() -> bool {
    match DARK_MODE_OVERRIDE.load(Ordering::Relaxed) {
        0 => false,
        1 => true,
        _ => DARK_MODE_SYSTEM.load(Ordering::Relaxed) != 0,
    }
}

/// CSS counters (`counter-reset`/`counter-increment`), keyed by counter name.
/// Reset at the start of every render since the core does not support incremental
/// re-layout (§5: "a counter-state map reset at the start of every render").
static COUNTERS: Lazy<Mutex<HashMap<String, i64>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Clear all counters; called once at the start of `render_html`.
pub fn reset_counters() {
    if let Ok(mut counters) = COUNTERS.lock() {
        counters.clear();
    }
}

pub fn counter_reset(name: &str, value: i64) {
    if let Ok(mut counters) = COUNTERS.lock() {
        counters.insert(name.to_owned(), value);
    }
}

/// Increment a counter, creating it at zero first if it doesn't exist yet, and return
/// its new value.
pub fn counter_increment(name: &str, by: i64) -> i64 {
    let Ok(mut counters) = COUNTERS.lock() else { return 0 };
    let entry = counters.entry(name.to_owned()).or_insert(0);
    *entry += by;
    *entry
}

pub fn counter_value(name: &str) -> i64 {
    COUNTERS.lock().ok().and_then(|counters| counters.get(name).copied()).unwrap_or(0)
}

/// A registered `@font-face` entry. The actual glyph rasterization lives with the
/// platform font API (out of scope, §1); this registry only tracks which families and
/// weights have been declared so the style resolver can decide whether to fall back.
#[derive(Debug, Clone)]
pub struct FontFaceEntry {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    pub source_url: String,
}

static FONT_REGISTRY: Lazy<Mutex<Vec<FontFaceEntry>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Append-only: fonts are never removed once a render batch has registered them.
pub fn register_font_face(entry: FontFaceEntry) {
    if let Ok(mut fonts) = FONT_REGISTRY.lock() {
        fonts.push(entry);
    }
}

pub fn is_font_family_registered(family: &str) -> bool {
    FONT_REGISTRY
        .lock()
        .map(|fonts| fonts.iter().any(|font| font.family.eq_ignore_ascii_case(family)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Serialize tests touching process-wide statics so they don't race each other.
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn dark_mode_override_takes_precedence_over_system() {
        let _guard = TEST_LOCK.lock();
        set_system_dark_mode(false);
        set_dark_mode_override(1);
        assert!(is_dark_mode());
        set_dark_mode_override(-1);
        assert!(!is_dark_mode());
    }

    #[test]
    fn counters_reset_between_renders() {
        let _guard = TEST_LOCK.lock();
        counter_reset("section", 0);
        assert_eq!(counter_increment("section", 1), 1);
        assert_eq!(counter_increment("section", 1), 2);
        reset_counters();
        assert_eq!(counter_value("section"), 0);
    }

    #[test]
    fn font_registry_is_append_only_and_case_insensitive() {
        let _guard = TEST_LOCK.lock();
        register_font_face(FontFaceEntry {
            family: "Inter".to_owned(),
            weight: 400,
            italic: false,
            source_url: "inter.woff2".to_owned(),
        });
        assert!(is_font_family_registered("inter"));
    }
}
