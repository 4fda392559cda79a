//! Cost derivation and price display.

use crate::catalog::CatalogSource;
use crate::models::{ProjectType, SelectedAddon};

const GROUP_SEPARATOR: char = '\u{a0}';
const CURRENCY_SUFFIX: &str = "\u{a0}zł";

/// Base price of the selected project type plus every selected addon.
///
/// Zero when no project type is selected.
pub fn total_cost(
    catalog: &dyn CatalogSource,
    project_type: Option<ProjectType>,
    addons: &[SelectedAddon],
) -> u64 {
    let Some(project_type) = project_type else {
        return 0;
    };

    addons
        .iter()
        .fold(catalog.base_price(project_type), |sum, addon| {
            sum.saturating_add(addon.price())
        })
}

/// Formats a whole-złoty amount the way pl-PL currency formatting does:
/// no decimals, groups of three separated by a no-break space from five
/// digits up, and a trailing ` zł`.
///
/// ```
/// use calc_core::calculator::pricing::format_price;
///
/// assert_eq!(format_price(500), "500\u{a0}zł");
/// assert_eq!(format_price(9990), "9990\u{a0}zł");
/// assert_eq!(format_price(14990), "14\u{a0}990\u{a0}zł");
/// ```
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 4 {
        return format!("{digits}{CURRENCY_SUFFIX}");
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    let leading = digits.len() % 3;
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (index + 3 - leading) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped.push_str(CURRENCY_SUFFIX);
    grouped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::Catalog;
    use crate::models::Addon;

    fn selected(
        label: &str,
        price: u64,
    ) -> SelectedAddon {
        SelectedAddon::new(ProjectType::Website, Addon::new(label, "", price))
    }

    #[test]
    fn total_is_zero_without_project_type() {
        let catalog = Catalog::builtin();

        assert_eq!(total_cost(&catalog, None, &[]), 0);
    }

    #[test]
    fn total_is_base_price_without_addons() {
        let catalog = Catalog::builtin();

        assert_eq!(total_cost(&catalog, Some(ProjectType::Website), &[]), 14_990);
    }

    #[test]
    fn total_adds_every_addon() {
        let catalog = Catalog::builtin();
        let addons = [selected("SEO", 500), selected("Blog", 1_500)];

        assert_eq!(
            total_cost(&catalog, Some(ProjectType::Website), &addons),
            16_990
        );
    }

    #[test]
    fn total_for_unknown_type_counts_only_addons() {
        let catalog = Catalog::new(Vec::new(), Vec::new());
        let addons = [selected("SEO", 500)];

        assert_eq!(total_cost(&catalog, Some(ProjectType::Website), &addons), 500);
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let catalog = Catalog::builtin();
        let addons = [selected("huge", u64::MAX)];

        assert_eq!(
            total_cost(&catalog, Some(ProjectType::Website), &addons),
            u64::MAX
        );
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(0), "0\u{a0}zł");
        assert_eq!(format_price(1_500), "1500\u{a0}zł");
        assert_eq!(format_price(15_490), "15\u{a0}490\u{a0}zł");
        assert_eq!(format_price(149_900), "149\u{a0}900\u{a0}zł");
        assert_eq!(format_price(1_234_567), "1\u{a0}234\u{a0}567\u{a0}zł");
    }
}
