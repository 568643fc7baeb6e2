use crate::archive::config::RenderOptions;
use crate::archive::gallery::render_table;
use crate::archive::keys::MonthKey;
use crate::archive::store::MonthlyAggregate;
use std::collections::{BTreeMap, BTreeSet};

/// Render the top-level index: the latest month newest-first, then every
/// month grouped by year (years descending, months ascending).
///
/// A month listed in `all_months` but missing from `aggregates` still gets
/// an archive link; as the highlight it renders an empty table.
pub fn render_index(
    all_months: &BTreeSet<MonthKey>,
    aggregates: &BTreeMap<MonthKey, MonthlyAggregate>,
    opts: &RenderOptions,
    gallery_link_prefix: &str,
) -> String {
    let mut out = format!("# {}\n\n{}\n\n", opts.index_title, opts.index_tagline);

    if let Some(current) = all_months.last() {
        out.push_str(&format!("## Current Month: {}\n\n", current.display_name()));
        let empty = MonthlyAggregate::new();
        let aggregate = aggregates.get(current).unwrap_or(&empty);
        out.push_str(&render_table(aggregate.values().rev(), opts));
        out.push('\n');
    }

    out.push_str("## Archive\n\n");
    for (year, months) in group_by_year(all_months).iter().rev() {
        let links = months
            .iter()
            .map(|month| {
                format!(
                    "[{}]({}/{}.md)",
                    month.month_label(),
                    gallery_link_prefix.trim_end_matches('/'),
                    month
                )
            })
            .collect::<Vec<_>>();
        out.push_str(&format!("**{year}**: | {}\n\n", links.join(" | ")));
    }

    out
}

fn group_by_year(months: &BTreeSet<MonthKey>) -> BTreeMap<&str, Vec<&MonthKey>> {
    let mut years: BTreeMap<&str, Vec<&MonthKey>> = BTreeMap::new();
    for month in months {
        years.entry(month.year()).or_default().push(month);
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::gallery::tests::sample;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).expect("month")
    }

    fn aggregate(days: &[&str]) -> MonthlyAggregate {
        days.iter().map(|d| sample(d, "Head | Title")).collect()
    }

    fn fixture() -> (BTreeSet<MonthKey>, BTreeMap<MonthKey, MonthlyAggregate>) {
        let mut aggregates = BTreeMap::new();
        aggregates.insert(month("202412"), aggregate(&["20241231"]));
        aggregates.insert(month("202501"), aggregate(&["20250101", "20250102"]));
        aggregates.insert(month("202502"), aggregate(&["20250201"]));
        aggregates.insert(
            month("202503"),
            aggregate(&["20250301", "20250310", "20250305"]),
        );
        let all = aggregates.keys().cloned().collect();
        (all, aggregates)
    }

    #[test]
    fn highlight_is_latest_month_newest_first() {
        let (all, aggregates) = fixture();
        let doc = render_index(&all, &aggregates, &RenderOptions::default(), "markdown");

        assert!(doc.contains("## Current Month: March 2025\n\n"));
        let archive_at = doc.find("## Archive").expect("archive");
        let highlight = &doc[..archive_at];
        let tenth = highlight.find("2025-03-10<br>").expect("10");
        let fifth = highlight.find("2025-03-05<br>").expect("05");
        let first = highlight.find("2025-03-01<br>").expect("01");
        assert!(tenth < fifth && fifth < first);
        assert!(!highlight.contains("2025-02-01"));
    }

    #[test]
    fn archive_groups_years_descending_months_ascending() {
        let (all, aggregates) = fixture();
        let doc = render_index(&all, &aggregates, &RenderOptions::default(), "markdown");

        let archive = &doc[doc.find("## Archive").expect("archive")..];
        assert_eq!(
            archive,
            "## Archive\n\n\
             **2025**: | [1](markdown/202501.md) | [2](markdown/202502.md) | [3](markdown/202503.md)\n\n\
             **2024**: | [12](markdown/202412.md)\n\n"
        );
    }

    #[test]
    fn preamble_uses_configured_titles() {
        let (all, aggregates) = fixture();
        let doc = render_index(&all, &aggregates, &RenderOptions::default(), "markdown");
        assert!(doc.starts_with(
            "# My Bing Wallpaper\n\nDaily Bing wallpapers collection\n\n## Current Month:"
        ));
    }

    #[test]
    fn output_is_deterministic() {
        let (all, aggregates) = fixture();
        let opts = RenderOptions::default();
        assert_eq!(
            render_index(&all, &aggregates, &opts, "markdown"),
            render_index(&all, &aggregates, &opts, "markdown")
        );
    }

    #[test]
    fn unreadable_latest_month_renders_empty_highlight() {
        let (mut all, aggregates) = fixture();
        all.insert(month("202504"));
        let doc = render_index(&all, &aggregates, &RenderOptions::default(), "pages/");
        assert!(doc.contains("## Current Month: April 2025\n\n| | | | |\n|:"));
        assert!(doc.contains("[4](pages/202504.md)"));
        let archive_at = doc.find("## Archive").expect("archive");
        assert!(!doc[..archive_at].contains("<a href="));
    }

    #[test]
    fn empty_store_renders_preamble_and_archive_heading() {
        let doc = render_index(
            &BTreeSet::new(),
            &BTreeMap::new(),
            &RenderOptions::default(),
            "markdown",
        );
        assert_eq!(
            doc,
            "# My Bing Wallpaper\n\nDaily Bing wallpapers collection\n\n## Archive\n\n"
        );
    }
}
