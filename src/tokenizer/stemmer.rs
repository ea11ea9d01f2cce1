// Light Portuguese suffix stripper. Not a full Snowball implementation:
// it conflates plural, a handful of derivational suffixes and the final
// theme vowel, which is enough to merge the common inflections of a term
// into one dictionary entry. Expects lowercased, accent-folded input.

// Derivational suffixes, longest first so e.g. "amento" wins over "mento".
const SUFFIXES: &[&str] = &[
    "amento", "imento", "idade", "mente", "izar", "ismo", "ista", "osa", "oso",
];

const MIN_STEM_CHARS: usize = 3;

/// Stems a single normalized term. Terms too short to carry a suffix are
/// returned unchanged.
pub fn stem(term: &str) -> String {
    let mut stem = term.to_string();

    // Plural of -ao words ("nacoes" and "nacao" meet at "naca").
    if stem.chars().count() > 4 {
        if let Some(root) = stem.strip_suffix("oes") {
            stem = format!("{}ao", root);
        }
    }

    if stem.chars().count() >= 4 && stem.ends_with('s') {
        stem.pop();
    }

    for suffix in SUFFIXES {
        if let Some(root) = stem.strip_suffix(suffix) {
            if root.chars().count() >= MIN_STEM_CHARS {
                stem = root.to_string();
            }
            break;
        }
    }

    if stem.chars().count() >= 4 && stem.ends_with(['a', 'e', 'o']) {
        stem.pop();
    }

    stem
}
