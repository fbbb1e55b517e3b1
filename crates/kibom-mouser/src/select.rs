use std::cmp::Ordering;

use crate::client::PartCandidate;

/// Packaging categories preferred at prototype quantities, matched as a
/// case-insensitive substring of the candidate's packaging field.
pub const PREFERRED_PACKAGING: [&str; 2] = ["cut tape", "tray"];

fn is_preferred_packaging(packaging: &str) -> bool {
    let packaging = packaging.to_lowercase();
    PREFERRED_PACKAGING
        .iter()
        .any(|preferred| packaging.contains(preferred))
}

/// Pick the cheapest priced candidate, restricted to cut-tape/tray
/// packaging when any such candidate exists. Equal prices keep the first
/// occurrence in API response order. Candidates without a parseable price
/// never win.
pub fn select_best(candidates: &[PartCandidate]) -> Option<&PartCandidate> {
    let preferred: Vec<&PartCandidate> = candidates
        .iter()
        .filter(|c| is_preferred_packaging(&c.packaging))
        .collect();

    let pool = if preferred.is_empty() {
        candidates.iter().collect()
    } else {
        preferred
    };

    pool.into_iter()
        .filter(|c| c.unit_price.is_some())
        .min_by(|a, b| {
            a.unit_price
                .partial_cmp(&b.unit_price)
                .unwrap_or(Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(part_number: &str, price: Option<f64>, packaging: &str) -> PartCandidate {
        PartCandidate {
            mouser_part_number: part_number.to_string(),
            packaging: packaging.to_string(),
            availability: "In Stock".to_string(),
            unit_price: price,
        }
    }

    #[test]
    fn test_preferred_packaging_beats_cheaper_bulk() {
        let candidates = [
            candidate("A", Some(2.00), "Tray"),
            candidate("B", Some(1.50), "Bulk"),
            candidate("C", Some(1.80), "Cut Tape"),
        ];
        let best = select_best(&candidates).unwrap();
        assert_eq!(best.mouser_part_number, "C");
        assert_eq!(best.unit_price, Some(1.80));
    }

    #[test]
    fn test_falls_back_to_cheapest_overall() {
        let candidates = [
            candidate("A", Some(3.00), "Bulk"),
            candidate("B", Some(2.50), "Reel"),
        ];
        let best = select_best(&candidates).unwrap();
        assert_eq!(best.mouser_part_number, "B");
    }

    #[test]
    fn test_packaging_match_is_case_insensitive_substring() {
        let candidates = [
            candidate("A", Some(0.20), "Tape and Reel"),
            candidate("B", Some(0.30), "CUT TAPE MouseReel"),
        ];
        let best = select_best(&candidates).unwrap();
        assert_eq!(best.mouser_part_number, "B");
    }

    #[test]
    fn test_equal_prices_keep_first_occurrence() {
        let candidates = [
            candidate("A", Some(1.00), "Cut Tape"),
            candidate("B", Some(1.00), "Tray"),
        ];
        assert_eq!(select_best(&candidates).unwrap().mouser_part_number, "A");
    }

    #[test]
    fn test_priceless_candidates_never_win() {
        let candidates = [
            candidate("A", None, "Cut Tape"),
            candidate("B", Some(4.00), "Bulk"),
        ];
        // "A" holds the preferred subset but has no price, so nothing in
        // the restricted pool is quotable.
        assert_eq!(select_best(&candidates), None);

        let candidates = [candidate("A", None, "Bulk"), candidate("B", Some(4.00), "Bulk")];
        assert_eq!(select_best(&candidates).unwrap().mouser_part_number, "B");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(select_best(&[]), None);
    }
}
