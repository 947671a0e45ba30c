//! Porter's suffix-stripping stemmer for English.
//!
//! The stemmer runs eight ordered stages over a lowercase term. Each stage is
//! exposed on its own so the classical per-step test pairs can be checked in
//! isolation; [`stem`] chains them.

/// Step 4 table (`m > 0` guard, first match wins).
const DERIVATIONAL_SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const INFLECTIONAL_SUFFIXES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const RESIDUAL_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou", "ism", "ate",
    "iti", "ous", "ive", "ize",
];

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u' | b'y')
}

fn is_strict_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// The measure `m` of a term: the number of `VC` pairs in its collapsed
/// consonant/vowel skeleton `[C](VC){m}[V]`.
pub fn measure(term: &str) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for &c in term.as_bytes() {
        let vowel = is_vowel(c);
        if prev_vowel && !vowel {
            m += 1;
        }
        prev_vowel = vowel;
    }
    m
}

/// Condition *v*: the stem contains a vowel.
pub fn contains_vowel(stem: &str) -> bool {
    stem.bytes().any(is_vowel)
}

/// Condition *d*: the stem ends in a double consonant (e.g. `-tt`, `-ss`).
pub fn ends_double_consonant(stem: &str) -> bool {
    let b = stem.as_bytes();
    b.len() >= 2
        && b[b.len() - 1].is_ascii()
        && b[b.len() - 1] == b[b.len() - 2]
        && !is_strict_vowel(b[b.len() - 1])
}

/// Condition *o*: the stem ends consonant-vowel-consonant and the final
/// consonant is not `w`, `x` or `y` (e.g. `-wil`, `-hop`).
pub fn ends_cvc(stem: &str) -> bool {
    let b = stem.as_bytes();
    if b.len() < 3 {
        return false;
    }
    let (c1, v, c2) = (b[b.len() - 3], b[b.len() - 2], b[b.len() - 1]);
    !is_strict_vowel(c1) && is_strict_vowel(v) && !is_strict_vowel(c2) && !matches!(c2, b'w' | b'x' | b'y')
}

/// Step 1: plurals (`sses`, `ies`, `ss`, `s`).
pub fn step1(term: &str) -> String {
    if let Some(base) = term.strip_suffix("sses") {
        format!("{base}ss")
    } else if let Some(base) = term.strip_suffix("ies") {
        format!("{base}i")
    } else if term.ends_with("ss") {
        term.to_string()
    } else if let Some(base) = term.strip_suffix('s') {
        base.to_string()
    } else {
        term.to_string()
    }
}

/// Step 2: past participles and gerunds (`eed`, `ed`, `ing`) with the clean-up
/// that follows a successful `ed`/`ing` removal.
pub fn step2(term: &str) -> String {
    if let Some(base) = term.strip_suffix("eed") {
        return if measure(base) > 0 { format!("{base}ee") } else { term.to_string() };
    }
    let base = term.strip_suffix("ed").or_else(|| term.strip_suffix("ing"));
    match base {
        Some(base) if contains_vowel(base) => {
            if base.ends_with("at") || base.ends_with("bl") || base.ends_with("iz") {
                format!("{base}e")
            } else if ends_double_consonant(base) && !base.ends_with(['l', 's', 'z']) {
                base[..base.len() - 1].to_string()
            } else if measure(base) == 1 && ends_cvc(base) {
                format!("{base}e")
            } else {
                base.to_string()
            }
        }
        _ => term.to_string(),
    }
}

/// Step 3: terminal `y` becomes `i` when the rest contains a vowel.
pub fn step3(term: &str) -> String {
    match term.strip_suffix('y') {
        Some(base) if contains_vowel(base) => format!("{base}i"),
        _ => term.to_string(),
    }
}

fn replace_first_suffix(term: &str, table: &[(&str, &str)]) -> String {
    for (suffix, replacement) in table {
        if let Some(base) = term.strip_suffix(*suffix) {
            if measure(base) > 0 {
                return format!("{base}{replacement}");
            }
            break;
        }
    }
    term.to_string()
}

/// Step 4: double suffixes mapped to single ones (`ational` → `ate`, ...).
pub fn step4(term: &str) -> String {
    replace_first_suffix(term, DERIVATIONAL_SUFFIXES)
}

/// Step 5: `-ic-`, `-full`, `-ness` and friends.
pub fn step5(term: &str) -> String {
    replace_first_suffix(term, INFLECTIONAL_SUFFIXES)
}

/// Step 6: residual suffixes stripped from stems with `m > 1`.
pub fn step6(term: &str) -> String {
    for suffix in RESIDUAL_SUFFIXES {
        if let Some(base) = term.strip_suffix(*suffix) {
            let m = measure(base);
            if m > 1 || (*suffix == "ion" && m == 1 && base.ends_with(['s', 't'])) {
                return base.to_string();
            }
            break;
        }
    }
    term.to_string()
}

/// Step 7: terminal `e`.
pub fn step7(term: &str) -> String {
    match term.strip_suffix('e') {
        Some(base) => {
            let m = measure(base);
            if m > 1 || (m == 1 && !ends_cvc(base)) {
                base.to_string()
            } else {
                term.to_string()
            }
        }
        None => term.to_string(),
    }
}

/// Step 8: `-ll` collapses to `-l` on long stems.
pub fn step8(term: &str) -> String {
    if term.ends_with('l') && ends_double_consonant(term) && measure(term) > 1 {
        term[..term.len() - 1].to_string()
    } else {
        term.to_string()
    }
}

/// Stems a lowercase English term.
pub fn stem(term: &str) -> String {
    let term = step1(term);
    let term = step2(&term);
    let term = step3(&term);
    let term = step4(&term);
    let term = step5(&term);
    let term = step6(&term);
    let term = step7(&term);
    step8(&term)
}

pub fn stem_terms(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| stem(t)).collect()
}

/// Lowercases a query, stems each whitespace-separated token and joins them
/// with single spaces.
pub fn stem_query(query: &str) -> String {
    query.to_lowercase().split_whitespace().map(stem).collect::<Vec<_>>().join(" ")
}
