// src/activities/codes.rs

/// SPSI activity codes offered for billing notes.
pub const ACTIVITY_CODES: &[&str] = &[
    "5010: ENVIRONMENTAL MONITORING",
    "5020: IMPLEMENT SWPPP",
    "5030: VEGETATION MANAGEMENT",
    "5060: MOBILIZATION+",
    "5070: SURVEY+",
    "5080: SITE MANAGEMENT+",
    "5085: TRAFFIC CONTROL+",
    "5090: SITE PREP+",
    "6000: EXCAVATION & SHORING+",
    "6050: MATERIALS",
    "6100: REMOVAL (Settlement)+",
    "6200: FABRICATION AND INSTALL OF PIPING & VALVES+",
    "6300: POTHOLE SITE+",
    "6400: CONCRETE (Civil)+",
    "6500: BORING+",
    "6600: COATING+",
    "6700: CORROSION CONTROL / CATHODIC PROTECTION+",
    "6800: ILI TOOL RUN AND SUPPORT+",
    "6900: PERFORM STRENGTH TEST+",
    "7100: CONTROL PIPING+",
    "7200: SCADA INSTRUMENTATION+",
    "7300: ELECTRICAL+",
    "7400: BACKFILL+",
    "7500: SITE DEWATERING+",
    "7700: DEMOBILIZATION+",
    "7800: PERFORM INSPECTION",
    "8000: PERFORM NDE",
    "8400: CONSTRUCTION MANAGEMENT & OVERSIGHT",
    "8600: SAFETY+",
    "8700: HARD SITE RESTORATION+",
    "8800: SOFT SITE RESTORATION+",
];

/// Finds a code by its full label (case-insensitive) or by its number ("5060").
pub fn resolve_code(query: &str) -> Option<&'static str> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    ACTIVITY_CODES.iter().copied().find(|code| {
        code.eq_ignore_ascii_case(query)
            || code
                .split_once(':')
                .is_some_and(|(number, _)| number == query)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_number_and_label() {
        assert_eq!(resolve_code("5060"), Some("5060: MOBILIZATION+"));
        assert_eq!(resolve_code(" 8800 "), Some("8800: SOFT SITE RESTORATION+"));
        assert_eq!(resolve_code("6050: materials"), Some("6050: MATERIALS"));
        assert_eq!(resolve_code("9999"), None);
        assert_eq!(resolve_code(""), None);
    }

    #[test]
    fn test_codes_are_numbered_and_unique() {
        let mut numbers: Vec<&str> = ACTIVITY_CODES
            .iter()
            .map(|c| c.split_once(':').map(|(n, _)| n).unwrap_or(""))
            .collect();
        assert!(numbers.iter().all(|n| n.len() == 4 && n.chars().all(|c| c.is_ascii_digit())));
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), ACTIVITY_CODES.len());
    }
}
