//! Plan Toggle
//!
//! Two switches, monthly and annual, of which exactly one is on.

use farm_core::LookupKey;
use serde::Serialize;

/// Mutually exclusive monthly/annual selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanToggle {
    monthly_selected: bool,
    annual_selected: bool,
}

impl Default for PlanToggle {
    fn default() -> Self {
        Self {
            monthly_selected: false,
            annual_selected: true,
        }
    }
}

impl PlanToggle {
    /// Flip the monthly switch; the annual one follows
    pub const fn set_monthly(&mut self, selected: bool) {
        self.monthly_selected = selected;
        self.annual_selected = !selected;
    }

    /// Flip the annual switch; the monthly one follows
    pub const fn set_annual(&mut self, selected: bool) {
        self.annual_selected = selected;
        self.monthly_selected = !selected;
    }

    pub const fn is_monthly(&self) -> bool {
        self.monthly_selected
    }

    pub const fn is_annual(&self) -> bool {
        self.annual_selected
    }

    /// Lookup key of the selected plan
    pub const fn selected(&self) -> LookupKey {
        if self.monthly_selected {
            LookupKey::PaidMonthly
        } else {
            LookupKey::PaidYearly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_annual() {
        let toggle = PlanToggle::default();
        assert!(toggle.is_annual());
        assert!(!toggle.is_monthly());
        assert_eq!(toggle.selected(), LookupKey::PaidYearly);
    }

    #[test]
    fn test_exactly_one_selected() {
        let mut toggle = PlanToggle::default();
        // every combination of switch and value, applied in a long sequence
        let steps = [
            (true, true),
            (true, false),
            (false, true),
            (false, false),
            (true, true),
            (false, true),
            (true, false),
            (false, false),
        ];

        for (monthly_switch, value) in steps.iter().cycle().take(64) {
            if *monthly_switch {
                toggle.set_monthly(*value);
                assert_eq!(toggle.is_monthly(), *value);
            } else {
                toggle.set_annual(*value);
                assert_eq!(toggle.is_annual(), *value);
            }
            assert_ne!(toggle.is_monthly(), toggle.is_annual());
        }
    }

    #[test]
    fn test_selected_follows_monthly() {
        let mut toggle = PlanToggle::default();
        toggle.set_monthly(true);
        assert_eq!(toggle.selected(), LookupKey::PaidMonthly);
        toggle.set_annual(true);
        assert_eq!(toggle.selected(), LookupKey::PaidYearly);
        toggle.set_annual(false);
        assert_eq!(toggle.selected(), LookupKey::PaidMonthly);
    }
}
