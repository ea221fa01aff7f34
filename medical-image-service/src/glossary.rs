use serde::{Deserialize, Serialize};

/// Medical vocabulary explained to the user, in display order.
pub const MEDICAL_GLOSSARY: &[(&str, &str)] = &[
    (
        "cerebral atrophy",
        "Shrinkage or loss of brain cells, often related to aging or diseases like Alzheimer’s.",
    ),
    (
        "lesion",
        "An area of abnormal tissue, which could be caused by disease or injury.",
    ),
    (
        "infarct",
        "Tissue death due to lack of blood supply, often seen in strokes.",
    ),
    ("edema", "Swelling caused by excess fluid trapped in tissues."),
    (
        "hemorrhage",
        "Excessive bleeding, either inside or outside the body.",
    ),
    (
        "calcification",
        "Build-up of calcium in body tissues, often hardening them.",
    ),
    (
        "contrast enhancement",
        "Technique using contrast agents in imaging to highlight areas, often related to inflammation or tumors.",
    ),
    (
        "ventricular dilation",
        "Enlargement of the brain's ventricles, may suggest hydrocephalus or brain atrophy.",
    ),
    (
        "mass effect",
        "Pressure from a mass (like a tumor) displacing surrounding brain structures.",
    ),
    (
        "midline shift",
        "A shift of brain structures from their normal position, usually due to swelling or mass.",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermExplanation {
    pub term: String,
    pub definition: String,
}

impl TermExplanation {
    /// Term with its first letter upper-cased and the rest lower-cased.
    pub fn display_term(&self) -> String {
        let mut chars = self.term.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

/// Find every glossary term occurring anywhere in `text`, ignoring case.
///
/// Matching is plain substring search: "edematous" matches "edema".
pub fn explain_terms(text: &str) -> Vec<TermExplanation> {
    let lower_text = text.to_lowercase();
    MEDICAL_GLOSSARY
        .iter()
        .filter(|(term, _)| lower_text.contains(term))
        .map(|&(term, definition)| TermExplanation {
            term: term.to_string(),
            definition: definition.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(found: &[TermExplanation]) -> Vec<&str> {
        found.iter().map(|e| e.term.as_str()).collect()
    }

    #[test]
    fn test_finds_terms_in_glossary_order() {
        let found = explain_terms("Patient shows signs of cerebral atrophy and mild edema");
        assert_eq!(terms(&found), vec!["cerebral atrophy", "edema"]);
        assert_eq!(
            found[1].definition,
            "Swelling caused by excess fluid trapped in tissues."
        );

        let found = explain_terms("midline shift secondary to mass effect");
        assert_eq!(terms(&found), vec!["mass effect", "midline shift"]);
    }

    #[test]
    fn test_no_terms_found() {
        assert!(explain_terms("Normal study. No acute findings.").is_empty());
        assert!(explain_terms("").is_empty());
        assert!(explain_terms("OCR failed: connection refused").is_empty());
    }

    #[test]
    fn test_matching_ignores_case_and_word_boundaries() {
        let found = explain_terms("HEMORRHAGE noted; perilesional EDEMATOUS change");
        assert_eq!(terms(&found), vec!["lesion", "edema", "hemorrhage"]);
    }

    #[test]
    fn test_glossary_keys_are_unique_and_lowercase() {
        for (i, (term, _)) in MEDICAL_GLOSSARY.iter().enumerate() {
            assert_eq!(*term, term.to_lowercase());
            assert!(MEDICAL_GLOSSARY[i + 1..].iter().all(|(other, _)| other != term));
        }
        assert_eq!(MEDICAL_GLOSSARY.len(), 10);
    }

    #[test]
    fn test_display_term() {
        let found = explain_terms("contrast enhancement");
        assert_eq!(found[0].display_term(), "Contrast enhancement");
    }
}
