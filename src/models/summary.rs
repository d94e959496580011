use serde::{Deserialize, Serialize};

/// Engine-supplied totals for one finished assembly. Trusted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyTotals {
    pub total: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed_seconds: f64,
}

impl AssemblyTotals {
    pub fn new(total: usize, failed: usize, skipped: usize, elapsed_seconds: f64) -> Self {
        Self {
            total,
            failed,
            skipped,
            elapsed_seconds,
        }
    }
}

/// Run-wide counters, folded from every `assembly_finished` a reporter sees.
///
/// Per-test notifications never touch these; they come only from the
/// engine's own per-assembly totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRunSummary {
    pub total: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed_seconds: f64,
    pub assemblies: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one assembly's totals into the summary. Counters saturate at `usize::MAX`.
    #[must_use]
    pub fn accumulate(self, totals: AssemblyTotals) -> Self {
        Self {
            total: self.total.saturating_add(totals.total),
            failed: self.failed.saturating_add(totals.failed),
            skipped: self.skipped.saturating_add(totals.skipped),
            elapsed_seconds: self.elapsed_seconds + totals.elapsed_seconds.max(0.0),
            assemblies: self.assemblies.saturating_add(1),
        }
    }

    /// The summary's counters, in the shape of a single assembly's totals.
    pub fn totals(&self) -> AssemblyTotals {
        AssemblyTotals::new(self.total, self.failed, self.skipped, self.elapsed_seconds)
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accumulates_two_assemblies() {
        let summary = TestRunSummary::new()
            .accumulate(AssemblyTotals::new(10, 2, 1, 3.456))
            .accumulate(AssemblyTotals::new(5, 0, 0, 1.0));

        assert_eq!(summary.total, 15);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert!((summary.elapsed_seconds - 4.456).abs() < 1e-9);
        assert_eq!(summary.assemblies, 2);
        assert!(summary.has_failures());
    }

    #[test]
    fn huge_engine_totals_saturate_instead_of_overflowing() {
        let summary = TestRunSummary::new()
            .accumulate(AssemblyTotals::new(usize::MAX, usize::MAX, usize::MAX, 1.0))
            .accumulate(AssemblyTotals::new(1, 1, 1, 1.0));

        assert_eq!(summary.total, usize::MAX);
        assert_eq!(summary.failed, usize::MAX);
        assert_eq!(summary.skipped, usize::MAX);
        assert_eq!(summary.assemblies, 2);
    }

    #[test]
    fn empty_summary_has_no_failures() {
        assert!(!TestRunSummary::new().has_failures());
    }

    proptest! {
        #[test]
        fn summary_equals_componentwise_sums(
            runs in prop::collection::vec((0usize..1000, 0usize..1000, 0usize..1000, 0.0f64..100.0), 0..20)
        ) {
            let summary = runs.iter().fold(TestRunSummary::new(), |acc, &(t, f, s, e)| {
                acc.accumulate(AssemblyTotals::new(t, f, s, e))
            });

            prop_assert_eq!(summary.total, runs.iter().map(|r| r.0).sum::<usize>());
            prop_assert_eq!(summary.failed, runs.iter().map(|r| r.1).sum::<usize>());
            prop_assert_eq!(summary.skipped, runs.iter().map(|r| r.2).sum::<usize>());
            prop_assert_eq!(summary.assemblies, runs.len());
            let elapsed: f64 = runs.iter().map(|r| r.3).sum();
            prop_assert!((summary.elapsed_seconds - elapsed).abs() < 1e-6);
        }

        #[test]
        fn counters_never_decrease(
            t in any::<usize>(), f in any::<usize>(), s in any::<usize>(), e in -5.0f64..100.0
        ) {
            let before = TestRunSummary::new().accumulate(AssemblyTotals::new(3, 1, 1, 0.5));
            let after = before.accumulate(AssemblyTotals::new(t, f, s, e));
            prop_assert!(after.total >= before.total);
            prop_assert!(after.failed >= before.failed);
            prop_assert!(after.skipped >= before.skipped);
            prop_assert!(after.elapsed_seconds >= before.elapsed_seconds);
        }
    }
}
