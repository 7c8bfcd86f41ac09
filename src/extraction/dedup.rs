use std::collections::HashSet;

use crate::models::{Accession, AccessionArea};

/// Accession numbers already emitted for one source document.
///
/// Fax batches often repeat the same report. A registry lives exactly as long
/// as one document's extraction pass and is never shared between documents.
#[derive(Debug, Default)]
pub struct DeduplicationRegistry {
    seen: HashSet<(AccessionArea, u32)>,
}

impl DeduplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, accession: &Accession) -> bool {
        self.seen.contains(&(accession.area, accession.number))
    }

    /// Returns false when the accession was already registered
    pub fn register(&mut self, accession: &Accession) -> bool {
        self.seen.insert((accession.area, accession.number))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_once() {
        let mut registry = DeduplicationRegistry::new();
        let accession = Accession::new(AccessionArea::Csp, 2024, 1234);

        assert!(!registry.contains(&accession));
        assert!(registry.register(&accession));
        assert!(registry.contains(&accession));
        assert!(!registry.register(&accession));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_key_ignores_year_but_not_area() {
        let mut registry = DeduplicationRegistry::new();
        registry.register(&Accession::new(AccessionArea::Csp, 2024, 42));

        assert!(registry.contains(&Accession::new(AccessionArea::Csp, 2023, 42)));
        assert!(!registry.contains(&Accession::new(AccessionArea::Ccy, 2024, 42)));
    }
}
