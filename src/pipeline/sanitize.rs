//! Name sanitisation: raw metadata → filesystem-safe archive path parts.
//!
//! Both flavours run the same passes in the same order:
//!
//! 1. NFKD-normalise and keep only the ASCII part (accents fall off, `ﬁ`
//!    becomes `fi`, symbols without an ASCII form are dropped)
//! 2. Remove `<>:"/\|?*`
//! 3. Collapse whitespace runs to one space and trim
//! 4. Filenames only: spaces become underscores
//! 5. Optional truncation, then trailing dots/spaces are trimmed (Windows
//!    rejects them)
//!
//! The output of every pass is a fixed point of the whole pipeline, so
//! `sanitize(sanitize(x)) == sanitize(x)` for both flavours.

use unicode_normalization::UnicodeNormalization;

/// Default cap on a sanitised name, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 100;

/// Characters rejected in file or folder names on common filesystems.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Separator between levels of a hierarchical `Location` value.
pub const LOCATION_SEPARATOR: char = '>';

/// Sanitise a title for use as a file stem (no extension).
///
/// ```
/// use checklist_splitter::pipeline::sanitize::sanitize_filename;
/// assert_eq!(sanitize_filename("Pump/Valve: Check *1*", Some(100)), "PumpValve_Check_1");
/// ```
pub fn sanitize_filename(raw: &str, max_len: Option<usize>) -> String {
    let spaced = normalise(raw).replace(' ', "_");
    finish(spaced, max_len)
}

/// Sanitise one folder segment; spaces are kept.
pub fn sanitize_folder(raw: &str, max_len: Option<usize>) -> String {
    finish(normalise(raw), max_len)
}

/// Turn a `Location` chain such as `"Plant A > Building 3 > Room 12"` into
/// the folder prefix `"Plant A/Building 3/Room 12/"`.
///
/// Segments that sanitise to nothing are dropped; an empty result means
/// "archive root".
pub fn folder_path(location: &str, max_len: Option<usize>) -> String {
    let mut path = String::new();
    for segment in location.split(LOCATION_SEPARATOR) {
        let clean = sanitize_folder(segment, max_len);
        if !clean.is_empty() {
            path.push_str(&clean);
            path.push('/');
        }
    }
    path
}

fn normalise(raw: &str) -> String {
    let ascii: String = raw
        .nfkd()
        .filter(|c| c.is_ascii() && !ILLEGAL_CHARS.contains(c))
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn finish(mut name: String, max_len: Option<usize>) -> String {
    if let Some(max) = max_len {
        // Pure ASCII at this point, so byte and char lengths agree.
        name.truncate(max);
    }
    name.trim_end_matches(['.', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn filename_removes_illegal_and_underscores_spaces() {
        let once = sanitize_filename("Pump/Valve: Check *1*", Some(100));
        assert_eq!(once, "PumpValve_Check_1");
        assert_eq!(sanitize_filename(&once, Some(100)), once);
    }

    #[test]
    fn folder_keeps_spaces() {
        assert_eq!(
            sanitize_folder("  Building\t 3 <east> ", None),
            "Building 3 east"
        );
    }

    #[test]
    fn transliterates_accents() {
        assert_eq!(
            sanitize_filename("Café Röhre – Prüfung", None),
            "Cafe_Rohre_Prufung"
        );
    }

    #[test]
    fn folder_path_splits_location_chain() {
        assert_eq!(
            folder_path("Plant A > Building 3 > Room 12", Some(100)),
            "Plant A/Building 3/Room 12/"
        );
    }

    #[test]
    fn folder_path_drops_empty_segments() {
        assert_eq!(folder_path(" > Plant A >> ?? > ", None), "Plant A/");
        assert_eq!(folder_path("", None), "");
    }

    #[test]
    fn dot_segments_cannot_escape() {
        assert_eq!(folder_path(".. > . > Site", None), "Site/");
    }

    #[test]
    fn truncates_and_trims_trailing_separator_chars() {
        let long = format!("{} tail", "a".repeat(99));
        assert_eq!(sanitize_folder(&long, Some(100)), "a".repeat(99));
        assert_eq!(sanitize_filename(&long, Some(100)), format!("{}_", "a".repeat(99)));
        assert_eq!(sanitize_filename(&long, None).len(), 104);
    }

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(sanitize_folder("Room\u{7}12\n", None), "Room 12");
    }

    proptest! {
        #[test]
        fn filename_is_idempotent(raw in "\\PC{0,160}", cap in proptest::option::of(1usize..120)) {
            let once = sanitize_filename(&raw, cap);
            prop_assert_eq!(sanitize_filename(&once, cap), once);
        }

        #[test]
        fn folder_is_idempotent(raw in "\\PC{0,160}", cap in proptest::option::of(1usize..120)) {
            let once = sanitize_folder(&raw, cap);
            prop_assert_eq!(sanitize_folder(&once, cap), once);
        }

        #[test]
        fn never_contains_illegal_chars(raw in ".{0,160}") {
            let file = sanitize_filename(&raw, Some(DEFAULT_MAX_NAME_LEN));
            let folder = sanitize_folder(&raw, Some(DEFAULT_MAX_NAME_LEN));
            prop_assert!(!file.contains(ILLEGAL_CHARS));
            prop_assert!(!folder.contains(ILLEGAL_CHARS));
            prop_assert!(file.is_ascii() && folder.is_ascii());
            prop_assert!(file.len() <= DEFAULT_MAX_NAME_LEN);
        }
    }
}
