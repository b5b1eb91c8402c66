use regex::Regex;

/// Canonicalizes the make/model strings cameras write into EXIF. Vendors
/// are inconsistent: some repeat the corporate name, some append a model
/// suffix to the make, some prefix the model with a redundant brand token.
/// Unrecognized input passes through unchanged.
pub struct IdentityNormalizer {
    make_corrections: Vec<(Regex, &'static str)>,
    model_prefixes: Regex,
}

impl IdentityNormalizer {
    pub fn new() -> Self {
        let table = [
            // Nokia phones report their corporate parent as the maker.
            (r"^HMD Global$", "Nokia"),
            (r"^NIKON( CORPORATION)?$", "Nikon"),
            // Canon repeats itself: "Canon Canon EOS 450D".
            (r"^Canon\b", "Canon"),
            (r"(?i)^sony\b", "Sony"),
            // Samsung phones append the model to the maker and vary case.
            (r"(?i)^samsung\b", "Samsung"),
            (r"(?i)^olympus\b", "Olympus"),
            (r"^OnePlus\b", "OnePlus"),
        ];
        let make_corrections = table
            .into_iter()
            .map(|(pattern, canonical)| {
                (Regex::new(pattern).expect("invalid make correction pattern"), canonical)
            })
            .collect();
        let model_prefixes = Regex::new(r"(?i)^(nikon|canon|sony|samsung|olympus|pentax)\s+")
            .expect("invalid model prefix pattern");
        Self { make_corrections, model_prefixes }
    }

    /// First matching correction wins; otherwise the trimmed input is kept.
    pub fn normalize_make(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        for (pattern, canonical) in &self.make_corrections {
            if pattern.is_match(trimmed) {
                return (*canonical).to_string();
            }
        }
        trimmed.to_string()
    }

    /// Strips a redundant brand token from the front of the model string,
    /// e.g. "NIKON D7000" becomes "D7000".
    pub fn normalize_model(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let stripped = self.model_prefixes.replace(trimmed, "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            trimmed.to_string()
        } else {
            stripped.to_string()
        }
    }
}

impl Default for IdentityNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
