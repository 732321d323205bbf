//! Built-in intent rules for a biomedical corpus.

use prism_core::models::IntentRule;

/// Name of the catch-all intent in the built-in rule set.
pub const GENERAL: &str = "general";

/// The built-in rules, most specific first. `general` is the catch-all.
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule::new(
            "trial_lookup",
            [
                r"\bNCT\d{8}\b",
                r"\bISRCTN\d{8}\b",
                r"\b\d{4}-\d{6}-\d{2}\b",
                r"\b(clinical\s+)?trials?\b",
                r"\bphase\s+(1|2|3|4|i|ii|iii|iv)\b",
                r"\b(endpoints?|enrol+ment|randomi[sz]ed)\b",
            ],
        )
        .with_boost("title_path", 2.0)
        .with_boost("section", 1.5),
        IntentRule::new(
            "safety",
            [
                r"\b(adverse\s+(events?|reactions?)|side[\s-]effects?)\b",
                r"\b(safety|toxicit(y|ies)|contraindicat\w*|boxed\s+warning|warnings?)\b",
            ],
        )
        .with_boost("section", 2.0),
        IntentRule::new(
            "dosing",
            [
                r"\b(dose|doses|dosing|dosage)\b",
                r"\b(mg/kg|mg/m2|titrat\w*|regimen|administration)\b",
            ],
        )
        .with_boost("section", 2.0),
        IntentRule::new(
            "mechanism",
            [
                r"\b(mechanism(\s+of\s+action)?|moa|pathways?)\b",
                r"\b(inhibit\w*|agonist|antagonist|receptors?|binds?\s+to)\b",
            ],
        )
        .with_boost("text", 1.2),
        IntentRule::new(GENERAL, [".*"]),
    ]
}
