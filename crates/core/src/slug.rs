//! Slug and acronym derivation from technique names.
//!
//! The slug is the technique's external identifier, so the rules here are
//! part of the API contract: lowercase, alphanumerics plus `_`, runs of
//! whitespace and hyphens collapsed to a single `-`, everything else
//! dropped.

/// Derive a URL-safe slug from a human-readable name.
///
/// ```
/// use tea_core::slug::slugify;
///
/// assert_eq!(slugify("SHAP"), "shap");
/// assert_eq!(slugify("Grad-CAM Visualisation"), "grad-cam-visualisation");
/// assert_eq!(slugify("  LIME (Local Surrogates)  "), "lime-local-surrogates");
/// ```
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
        // Any other punctuation is dropped without acting as a separator.
    }

    out
}

/// The n-th slug candidate for collision handling: `base`, `base-2`, `base-3`, ...
pub fn candidate(base: &str, n: u32) -> String {
    if n <= 1 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

/// Extract a parenthesised acronym from a name.
///
/// Returns the first `(XYZ)` group whose content is two or more ASCII
/// uppercase letters; anything else (mixed case, digits, single letters)
/// is ignored.
///
/// ```
/// use tea_core::slug::extract_acronym;
///
/// assert_eq!(
///     extract_acronym("SHapley Additive exPlanations (SHAP)"),
///     Some("SHAP".to_string())
/// );
/// assert_eq!(extract_acronym("Counterfactual Explanations"), None);
/// ```
pub fn extract_acronym(name: &str) -> Option<String> {
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let close = after.find(')')?;
        let inner = &after[..close];
        if inner.len() >= 2 && inner.chars().all(|c| c.is_ascii_uppercase()) {
            return Some(inner.to_string());
        }
        rest = &after[close + 1..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Integrated Gradients"), "integrated-gradients");
    }

    #[test]
    fn keeps_existing_hyphens_and_underscores() {
        assert_eq!(slugify("Grad-CAM"), "grad-cam");
        assert_eq!(slugify("t_sne projection"), "t_sne-projection");
    }

    #[test]
    fn drops_punctuation_without_splitting() {
        // The slash joins the two words, as the removed character leaves
        // no separator behind.
        assert_eq!(slugify("AI/ML Fairness"), "aiml-fairness");
        assert_eq!(slugify("What-if? Analysis!"), "what-if-analysis");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn empty_and_symbol_only_names_give_empty_slug() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn candidate_numbering() {
        assert_eq!(candidate("shap", 1), "shap");
        assert_eq!(candidate("shap", 2), "shap-2");
        assert_eq!(candidate("shap", 10), "shap-10");
    }

    #[test]
    fn acronym_requires_two_uppercase_letters() {
        assert_eq!(extract_acronym("Alpha (A)"), None);
        assert_eq!(extract_acronym("Alpha (AB)"), Some("AB".to_string()));
        assert_eq!(extract_acronym("Alpha (Ab)"), None);
        assert_eq!(extract_acronym("Alpha (A1)"), None);
    }

    #[test]
    fn acronym_skips_non_matching_groups() {
        assert_eq!(
            extract_acronym("Method (v2) for Testing (MT)"),
            Some("MT".to_string())
        );
    }

    #[test]
    fn acronym_unclosed_paren_is_none() {
        assert_eq!(extract_acronym("Broken (ACR"), None);
    }
}
