//! Phone number normalization toward E.164.
//!
//! Numbers in contact exports show up in every shape: `+966 50 123 4567`,
//! `00966501234567`, `0501234567`, `966501234567`. Comparisons go through a
//! three-tier chain (see [`normalize_phone`]):
//! 1. country-aware detection (`PhoneNormalizer::detect`)
//! 2. generic E.164 validation (`PhoneNormalizer::validate`)
//! 3. the raw input, unchanged

/// Result of country-aware detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneDetection {
    pub is_valid: bool,
    /// `+<calling code><national number>` when valid, empty otherwise
    pub formatted_number: String,
    pub country_iso: Option<String>,
}

/// Result of generic validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneValidation {
    pub is_valid: bool,
    pub formatted: String,
    pub country_iso: Option<String>,
}

/// Phone number helper used by the `phoneNumber` matcher.
pub trait PhoneNormalizer: Send + Sync {
    /// Detect the country of `input` and format it as E.164.
    fn detect(&self, input: &str) -> PhoneDetection;

    /// Check that `input` has a plausible international shape.
    fn validate(&self, input: &str) -> PhoneValidation;
}

/// Normalize `input` through detection, then validation, then the raw value.
pub fn normalize_phone(normalizer: &dyn PhoneNormalizer, input: &str) -> String {
    let detected = normalizer.detect(input);
    if detected.is_valid {
        return detected.formatted_number;
    }

    let validated = normalizer.validate(input);
    if validated.is_valid {
        return validated.formatted;
    }

    input.to_string()
}

/// Digits of `number` after its country calling code.
///
/// International numbers with an unknown calling code, and numbers without
/// a leading `+`/`00`, come back as all of their digits.
pub fn national_number(number: &str) -> String {
    match clean(number) {
        Some((true, digits)) => match region_by_prefix(&digits) {
            Some(region) => digits[region.code.len()..].to_string(),
            None => digits,
        },
        Some((false, digits)) => digits,
        None => digits_only(number),
    }
}

pub(crate) fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

// =============================================================================
// Calling code table
// =============================================================================

struct Region {
    iso: &'static str,
    code: &'static str,
    /// Accepted national significant number lengths
    lengths: &'static [usize],
    /// Domestic trunk prefix, dropped when writing the number internationally
    trunk: Option<char>,
}

impl Region {
    /// National significant number for `digits` dialled in this region.
    fn national<'a>(&self, digits: &'a str) -> Option<&'a str> {
        match self.trunk {
            Some(trunk) => {
                let nsn = digits.strip_prefix(trunk).unwrap_or(digits);
                (self.lengths.contains(&nsn.len()) && !nsn.starts_with(trunk)).then_some(nsn)
            }
            None => self.lengths.contains(&digits.len()).then_some(digits),
        }
    }

    fn detection(&self, nsn: &str) -> PhoneDetection {
        PhoneDetection {
            is_valid: true,
            formatted_number: format!("+{}{}", self.code, nsn),
            country_iso: Some(self.iso.to_string()),
        }
    }
}

// Calling codes are prefix-free, so at most one entry matches a number.
const REGIONS: &[Region] = &[
    Region { iso: "SA", code: "966", lengths: &[9], trunk: Some('0') },
    Region { iso: "AE", code: "971", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "KW", code: "965", lengths: &[8], trunk: None },
    Region { iso: "QA", code: "974", lengths: &[8], trunk: None },
    Region { iso: "BH", code: "973", lengths: &[8], trunk: None },
    Region { iso: "OM", code: "968", lengths: &[8], trunk: None },
    Region { iso: "JO", code: "962", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "LB", code: "961", lengths: &[7, 8], trunk: Some('0') },
    Region { iso: "IQ", code: "964", lengths: &[8, 9, 10], trunk: Some('0') },
    Region { iso: "SY", code: "963", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "YE", code: "967", lengths: &[7, 8, 9], trunk: Some('0') },
    Region { iso: "PS", code: "970", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "EG", code: "20", lengths: &[8, 9, 10], trunk: Some('0') },
    Region { iso: "MA", code: "212", lengths: &[9], trunk: Some('0') },
    Region { iso: "DZ", code: "213", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "TN", code: "216", lengths: &[8], trunk: None },
    Region { iso: "LY", code: "218", lengths: &[8, 9], trunk: Some('0') },
    Region { iso: "SD", code: "249", lengths: &[9], trunk: Some('0') },
    Region { iso: "TR", code: "90", lengths: &[10], trunk: Some('0') },
    Region { iso: "IR", code: "98", lengths: &[10], trunk: Some('0') },
    Region { iso: "PK", code: "92", lengths: &[9, 10], trunk: Some('0') },
    Region { iso: "IN", code: "91", lengths: &[10], trunk: Some('0') },
    Region { iso: "GB", code: "44", lengths: &[9, 10], trunk: Some('0') },
    Region { iso: "FR", code: "33", lengths: &[9], trunk: Some('0') },
    Region { iso: "DE", code: "49", lengths: &[10, 11], trunk: Some('0') },
    Region { iso: "ES", code: "34", lengths: &[9], trunk: None },
    Region { iso: "IT", code: "39", lengths: &[9, 10], trunk: None },
    Region { iso: "NL", code: "31", lengths: &[9], trunk: Some('0') },
    Region { iso: "US", code: "1", lengths: &[10], trunk: None },
    Region { iso: "BR", code: "55", lengths: &[10, 11], trunk: Some('0') },
    Region { iso: "NG", code: "234", lengths: &[8, 10], trunk: Some('0') },
    Region { iso: "KE", code: "254", lengths: &[9], trunk: Some('0') },
    Region { iso: "ZA", code: "27", lengths: &[9], trunk: Some('0') },
    Region { iso: "ID", code: "62", lengths: &[9, 10, 11, 12], trunk: Some('0') },
    Region { iso: "MY", code: "60", lengths: &[9, 10], trunk: Some('0') },
    Region { iso: "PH", code: "63", lengths: &[10], trunk: Some('0') },
    Region { iso: "AU", code: "61", lengths: &[9], trunk: Some('0') },
    Region { iso: "RU", code: "7", lengths: &[10], trunk: None },
];

fn region_by_iso(iso: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.iso.eq_ignore_ascii_case(iso))
}

fn region_by_prefix(digits: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| digits.starts_with(r.code))
}

/// Strip formatting characters and the international prefix.
///
/// Returns `(is_international, digits)`, or `None` when anything other than
/// digits remains.
fn clean(input: &str) -> Option<(bool, String)> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();

    let (international, rest) = if let Some(rest) = compact.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = compact.strip_prefix("00") {
        (true, rest)
    } else {
        (false, compact.as_str())
    };

    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((international, rest.to_string()))
}

// =============================================================================
// Built-in normalizer
// =============================================================================

/// Table-driven normalizer covering the calling codes seen in contact data.
///
/// Numbers written without an international prefix are read in the default
/// region first (if one is set), then as an international number missing
/// its `+`.
#[derive(Default)]
pub struct CallingCodeNormalizer {
    default_region: Option<&'static Region>,
}

impl CallingCodeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read national-format numbers as belonging to `iso`.
    ///
    /// Unknown codes leave the normalizer without a default region.
    pub fn with_default_region(iso: &str) -> Self {
        let default_region = region_by_iso(iso);
        if default_region.is_none() {
            tracing::warn!("Unknown default phone region {}, ignoring", iso);
        }
        Self { default_region }
    }

    pub fn default_region(&self) -> Option<&'static str> {
        self.default_region.map(|r| r.iso)
    }

    fn detect_international(digits: &str) -> PhoneDetection {
        region_by_prefix(digits)
            .and_then(|region| {
                region
                    .national(&digits[region.code.len()..])
                    .map(|nsn| region.detection(nsn))
            })
            .unwrap_or_default()
    }
}

impl PhoneNormalizer for CallingCodeNormalizer {
    fn detect(&self, input: &str) -> PhoneDetection {
        let Some((international, digits)) = clean(input) else {
            return PhoneDetection::default();
        };

        if international {
            return Self::detect_international(&digits);
        }

        if let Some(region) = self.default_region {
            if let Some(nsn) = region.national(&digits) {
                return region.detection(nsn);
            }
        }

        Self::detect_international(&digits)
    }

    fn validate(&self, input: &str) -> PhoneValidation {
        match clean(input) {
            Some((true, digits)) if (8..=15).contains(&digits.len()) && !digits.starts_with('0') => {
                PhoneValidation {
                    is_valid: true,
                    country_iso: region_by_prefix(&digits).map(|r| r.iso.to_string()),
                    formatted: format!("+{digits}"),
                }
            }
            _ => PhoneValidation::default(),
        }
    }
}
