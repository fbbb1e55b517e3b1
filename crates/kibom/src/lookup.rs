use std::collections::HashMap;

use kibom_csv::{BomRow, MatchMethod, Pricing};
use kibom_mouser::{MouserClient, PartCandidate, select_best};

/// Search backend seam so the orchestrator can be driven by a scripted
/// stub in tests.
pub trait PartSearch {
    fn search_by_part_number(&mut self, mpn: &str) -> Vec<PartCandidate>;
    fn search_by_keyword(&mut self, keyword: &str) -> Vec<PartCandidate>;
}

impl PartSearch for MouserClient {
    fn search_by_part_number(&mut self, mpn: &str) -> Vec<PartCandidate> {
        MouserClient::search_by_part_number(self, mpn)
    }

    fn search_by_keyword(&mut self, keyword: &str) -> Vec<PartCandidate> {
        MouserClient::search_by_keyword(self, keyword)
    }
}

/// Per-run lookup state: at most one search sequence per distinct part
/// identity, with repeated rows served from the cache.
pub struct PartLookup<S> {
    backend: S,
    cache: HashMap<String, Pricing>,
}

impl<S: PartSearch> PartLookup<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
        }
    }

    /// Price one BOM row: exact MPN search first, keyword fallback on the
    /// value field, `NotFound` when both come up empty.
    pub fn price_row(&mut self, row: &BomRow) -> Pricing {
        let key = identity(row);
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let pricing = self.search(row);
        self.cache.insert(key, pricing.clone());
        pricing
    }

    fn search(&mut self, row: &BomRow) -> Pricing {
        let mpn = row.mpn.trim();
        if !mpn.is_empty() {
            let candidates = self.backend.search_by_part_number(mpn);
            if let Some(pricing) = found(&candidates, MatchMethod::Mpn) {
                return pricing;
            }
        }

        let value = row.value.trim();
        if !value.is_empty() {
            let candidates = self.backend.search_by_keyword(value);
            if let Some(pricing) = found(&candidates, MatchMethod::Keyword) {
                return pricing;
            }
        }

        Pricing::NotFound
    }
}

fn found(candidates: &[PartCandidate], via: MatchMethod) -> Option<Pricing> {
    let best = select_best(candidates)?;
    Some(Pricing::Found {
        unit_price: best.unit_price?,
        mouser_part_number: best.mouser_part_number.clone(),
        packaging: best.packaging.clone(),
        via,
    })
}

/// Cache key for a row: the MPN when present, else value + footprint.
fn identity(row: &BomRow) -> String {
    let mpn = row.mpn.trim();
    if !mpn.is_empty() {
        return mpn.to_string();
    }
    format!("{}\u{1f}{}", row.value.trim(), row.footprint.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubSearch {
        by_mpn: HashMap<String, Vec<PartCandidate>>,
        by_keyword: HashMap<String, Vec<PartCandidate>>,
        mpn_calls: Vec<String>,
        keyword_calls: Vec<String>,
    }

    impl PartSearch for StubSearch {
        fn search_by_part_number(&mut self, mpn: &str) -> Vec<PartCandidate> {
            self.mpn_calls.push(mpn.to_string());
            self.by_mpn.get(mpn).cloned().unwrap_or_default()
        }

        fn search_by_keyword(&mut self, keyword: &str) -> Vec<PartCandidate> {
            self.keyword_calls.push(keyword.to_string());
            self.by_keyword.get(keyword).cloned().unwrap_or_default()
        }
    }

    fn candidate(part_number: &str, price: f64, packaging: &str) -> PartCandidate {
        PartCandidate {
            mouser_part_number: part_number.to_string(),
            packaging: packaging.to_string(),
            availability: "In Stock".to_string(),
            unit_price: Some(price),
        }
    }

    fn row(reference: &str, value: &str, footprint: &str, mpn: &str) -> BomRow {
        BomRow {
            reference: reference.to_string(),
            value: value.to_string(),
            footprint: footprint.to_string(),
            mpn: mpn.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mpn_match_skips_keyword_search() {
        let mut stub = StubSearch::default();
        stub.by_mpn.insert(
            "STM32F042K6T6".to_string(),
            vec![candidate("511-STM32F042K6T6", 2.10, "Tray")],
        );

        let mut lookup = PartLookup::new(stub);
        let pricing = lookup.price_row(&row("U1", "STM32F042", "LQFP-32", "STM32F042K6T6"));

        assert_eq!(
            pricing,
            Pricing::Found {
                unit_price: 2.10,
                mouser_part_number: "511-STM32F042K6T6".to_string(),
                packaging: "Tray".to_string(),
                via: MatchMethod::Mpn,
            }
        );
        assert_eq!(lookup.backend.mpn_calls, ["STM32F042K6T6"]);
        assert!(lookup.backend.keyword_calls.is_empty());
    }

    #[test]
    fn test_keyword_fallback_when_mpn_search_empty() {
        let mut stub = StubSearch::default();
        stub.by_keyword
            .insert("10k".to_string(), vec![candidate("ABC123", 0.05, "Cut Tape")]);

        let mut lookup = PartLookup::new(stub);
        let pricing = lookup.price_row(&row("R1,R2,R3", "10k", "R_0402", "XYZ999"));

        assert_eq!(pricing.status(), "Found by Value keyword");
        assert_eq!(lookup.backend.mpn_calls, ["XYZ999"]);
        assert_eq!(lookup.backend.keyword_calls, ["10k"]);
    }

    #[test]
    fn test_empty_mpn_goes_straight_to_keyword() {
        let mut stub = StubSearch::default();
        stub.by_keyword
            .insert("10k".to_string(), vec![candidate("ABC123", 0.05, "Cut Tape")]);

        let mut lookup = PartLookup::new(stub);
        let pricing = lookup.price_row(&row("R1", "10k", "R_0402", ""));

        assert_eq!(pricing.status(), "Found by Value keyword");
        assert!(lookup.backend.mpn_calls.is_empty());
    }

    #[test]
    fn test_both_searches_empty_is_not_found() {
        let mut lookup = PartLookup::new(StubSearch::default());
        let pricing = lookup.price_row(&row("U1", "STM32F042", "LQFP-32", "XYZ999"));

        assert_eq!(pricing, Pricing::NotFound);
        assert_eq!(lookup.backend.mpn_calls.len(), 1);
        assert_eq!(lookup.backend.keyword_calls.len(), 1);
    }

    #[test]
    fn test_blank_row_performs_no_search() {
        let mut lookup = PartLookup::new(StubSearch::default());
        let pricing = lookup.price_row(&row("MH1", "", "MountingHole", ""));

        assert_eq!(pricing, Pricing::NotFound);
        assert!(lookup.backend.mpn_calls.is_empty());
        assert!(lookup.backend.keyword_calls.is_empty());
    }

    #[test]
    fn test_repeated_identity_searches_once() {
        let mut stub = StubSearch::default();
        stub.by_mpn.insert(
            "RC0402FR-0710KL".to_string(),
            vec![candidate("603-RC0402FR-0710KL", 0.10, "Cut Tape")],
        );

        let mut lookup = PartLookup::new(stub);
        let first = lookup.price_row(&row("R1,R2", "10k", "R_0402", "RC0402FR-0710KL"));
        let second = lookup.price_row(&row("R7", "10k", "R_0402", "RC0402FR-0710KL"));

        assert_eq!(first, second);
        assert_eq!(lookup.backend.mpn_calls.len(), 1);
    }

    #[test]
    fn test_not_found_is_cached_too() {
        let mut lookup = PartLookup::new(StubSearch::default());
        lookup.price_row(&row("R1", "10k", "R_0402", ""));
        lookup.price_row(&row("R2", "10k", "R_0402", ""));

        assert_eq!(lookup.backend.keyword_calls.len(), 1);
    }

    #[test]
    fn test_identity_distinguishes_footprints() {
        let mut stub = StubSearch::default();
        stub.by_keyword
            .insert("10k".to_string(), vec![candidate("ABC123", 0.05, "Cut Tape")]);

        let mut lookup = PartLookup::new(stub);
        lookup.price_row(&row("R1", "10k", "R_0402", ""));
        lookup.price_row(&row("R2", "10k", "R_0805", ""));

        // Same value, different footprint: two distinct identities.
        assert_eq!(lookup.backend.keyword_calls.len(), 2);
    }
}
