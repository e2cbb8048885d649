//! Re-case an accepted suggestion to match what the user typed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CasePattern {
    /// More than one letter, all uppercase.
    AllUpper,
    AllLower,
    /// First letter uppercase, the rest lowercase.
    Capitalized,
    Mixed,
}

fn classify(letters: &[char]) -> CasePattern {
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        CasePattern::AllUpper
    } else if letters.iter().all(|c| c.is_lowercase()) {
        CasePattern::AllLower
    } else if letters[0].is_uppercase() && letters[1..].iter().all(|c| c.is_lowercase()) {
        CasePattern::Capitalized
    } else {
        CasePattern::Mixed
    }
}

/// Uppercase the first alphabetic character, skipping leading punctuation.
pub fn capitalize_first_letter(s: &str) -> String {
    let Some((idx, c)) = s.char_indices().find(|(_, c)| c.is_alphabetic()) else {
        return s.to_string();
    };
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..idx]);
    out.extend(c.to_uppercase());
    out.push_str(&s[idx + c.len_utf8()..]);
    out
}

/// Apply the case pattern of `original` (what was typed) to `candidate`.
///
/// Dictionary casing is trusted over the typed pattern when the candidate
/// carries exactly one capital (a proper noun such as "Parenzo") unless the
/// user typed in all caps, and whenever the user typed all lowercase but the
/// candidate has capitals ("mccartney" → "McCartney").
pub fn apply_casing(candidate: &str, original: &str, force_leading_capital: bool) -> String {
    if force_leading_capital {
        return capitalize_first_letter(candidate);
    }
    if original.is_empty() {
        return candidate.to_string();
    }

    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return candidate.to_string();
    }
    let pattern = classify(&letters);

    let candidate_upper = candidate.chars().filter(|c| c.is_uppercase()).count();
    if candidate_upper == 1 && pattern != CasePattern::AllUpper {
        return candidate.to_string();
    }
    if pattern == CasePattern::AllLower && candidate_upper > 0 {
        return candidate.to_string();
    }

    match pattern {
        CasePattern::AllUpper => candidate.to_uppercase(),
        CasePattern::Capitalized => capitalize_first_letter(candidate),
        CasePattern::AllLower => candidate.to_lowercase(),
        CasePattern::Mixed => candidate.to_string(),
    }
}
