use super::ui;
use crate::core::{RateEntry, RateSnapshot, RateStore};
use anyhow::Result;
use clap::ValueEnum;
use comfy_table::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Rate,
    Code,
    Country,
}

/// Options that shape the rendered list.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub search: Option<String>,
    pub sort: SortKey,
    pub descending: bool,
}

/// A filtered and sorted view over a snapshot.
///
/// `lowest` and `highest` are pinned from the entries matching the search,
/// independent of the chosen sort.
#[derive(Debug)]
pub struct RateView<'a> {
    pub lowest: Option<&'a RateEntry>,
    pub highest: Option<&'a RateEntry>,
    pub rows: Vec<&'a RateEntry>,
    pub total: usize,
}

fn matches_search(entry: &RateEntry, needle: &str) -> bool {
    entry.country.to_lowercase().contains(needle)
        || entry.currency_code.to_lowercase().contains(needle)
}

impl<'a> RateView<'a> {
    pub fn derive(snapshot: &'a RateSnapshot, options: &ViewOptions) -> Self {
        let needle = options
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<&RateEntry> = snapshot
            .entries()
            .iter()
            .filter(|e| needle.as_deref().is_none_or(|n| matches_search(e, n)))
            .collect();

        // Snapshot entries are already ascending by rate
        let lowest = rows.first().copied();
        let highest = rows.last().copied();

        match options.sort {
            SortKey::Rate => {}
            SortKey::Code => rows.sort_by(|a, b| a.currency_code.cmp(&b.currency_code)),
            SortKey::Country => rows.sort_by_cached_key(|e| e.country.to_lowercase()),
        }
        if options.descending {
            rows.reverse();
        }

        RateView {
            lowest,
            highest,
            rows,
            total: snapshot.len(),
        }
    }

    pub fn render(&self) -> String {
        if self.total == 0 {
            return ui::style_text("No rates available yet.", ui::StyleType::Subtle);
        }
        if self.rows.is_empty() {
            return ui::style_text("No currencies match the search.", ui::StyleType::Error);
        }

        let mut output = String::new();
        if let (Some(lowest), Some(highest)) = (self.lowest, self.highest) {
            output.push_str(&format!(
                "{} {}\n{} {}\n\n",
                ui::style_text("Lowest: ", ui::StyleType::Label),
                ui::style_text(&pinned_line(lowest), ui::StyleType::Lowest),
                ui::style_text("Highest:", ui::StyleType::Label),
                ui::style_text(&pinned_line(highest), ui::StyleType::Highest),
            ));
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Country"),
            ui::header_cell("Code"),
            ui::header_cell("Rate (per USD)"),
            ui::header_cell("Last Updated"),
        ]);
        for entry in &self.rows {
            table.add_row(vec![
                Cell::new(&entry.country),
                Cell::new(&entry.currency_code),
                ui::rate_cell(entry.rate),
                Cell::new(ui::format_last_update(&entry.last_update)),
            ]);
        }
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("{} of {} currencies", self.rows.len(), self.total),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

fn pinned_line(entry: &RateEntry) -> String {
    format!(
        "{} ({}) {}",
        entry.country,
        entry.currency_code,
        ui::format_rate(entry.rate)
    )
}

/// Shows cached rates, refreshing them first unless `offline` is set.
pub async fn run(store: &RateStore, options: &ViewOptions, offline: bool) -> Result<()> {
    store.load_stored().await;

    let snapshot = if offline {
        store.current()
    } else {
        let pb = ui::new_spinner("Fetching rates...");
        let snapshot = store.refresh().await;
        pb.finish_and_clear();
        snapshot
    };

    println!("{}", RateView::derive(&snapshot, options).render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(country: &str, code: &str, rate: f64) -> RateEntry {
        RateEntry {
            country: country.to_string(),
            currency_code: code.to_string(),
            rate,
            last_update: "Sun, 18 Oct 2026 11:55:01 GMT".to_string(),
        }
    }

    fn snapshot() -> RateSnapshot {
        RateSnapshot::from_entries(vec![
            entry("Japan", "JPY", 148.5),
            entry("Eurozone", "EUR", 0.92),
            entry("U.K. Pound Sterling", "GBP", 0.77),
            entry("India", "INR", 83.1),
        ])
        .unwrap()
    }

    fn codes(view: &RateView) -> Vec<String> {
        view.rows.iter().map(|e| e.currency_code.clone()).collect()
    }

    #[test]
    fn test_default_view_is_ascending_by_rate() {
        let snapshot = snapshot();
        let view = RateView::derive(&snapshot, &ViewOptions::default());

        assert_eq!(codes(&view), vec!["GBP", "EUR", "INR", "JPY"]);
        assert_eq!(view.lowest.unwrap().currency_code, "GBP");
        assert_eq!(view.highest.unwrap().currency_code, "JPY");
        assert_eq!(view.total, 4);
    }

    #[test]
    fn test_search_matches_country_or_code() {
        let snapshot = snapshot();
        let options = ViewOptions {
            search: Some("  IND ".to_string()),
            ..ViewOptions::default()
        };
        let view = RateView::derive(&snapshot, &options);
        assert_eq!(codes(&view), vec!["INR"]);

        let options = ViewOptions {
            search: Some("u".to_string()),
            ..ViewOptions::default()
        };
        let view = RateView::derive(&snapshot, &options);
        assert_eq!(codes(&view), vec!["GBP", "EUR"]);
        assert_eq!(view.lowest.unwrap().currency_code, "GBP");
        assert_eq!(view.highest.unwrap().currency_code, "EUR");
    }

    #[test]
    fn test_sort_options() {
        let snapshot = snapshot();
        let options = ViewOptions {
            sort: SortKey::Code,
            ..ViewOptions::default()
        };
        let view = RateView::derive(&snapshot, &options);
        assert_eq!(codes(&view), vec!["EUR", "GBP", "INR", "JPY"]);

        let options = ViewOptions {
            sort: SortKey::Country,
            descending: true,
            ..ViewOptions::default()
        };
        let view = RateView::derive(&snapshot, &options);
        assert_eq!(codes(&view), vec!["GBP", "JPY", "INR", "EUR"]);
        // Pins do not follow the sort
        assert_eq!(view.lowest.unwrap().currency_code, "GBP");
        assert_eq!(view.highest.unwrap().currency_code, "JPY");
    }

    #[test]
    fn test_render_shows_pins_and_rows() {
        let snapshot = snapshot();
        let rendered = RateView::derive(&snapshot, &ViewOptions::default()).render();

        assert!(rendered.contains("U.K. Pound Sterling (GBP) 0.7700"));
        assert!(rendered.contains("Japan (JPY) 148.5000"));
        assert!(rendered.contains("2026-10-18 11:55 UTC"));
        assert!(rendered.contains("4 of 4 currencies"));
    }

    #[test]
    fn test_render_empty_states() {
        let empty = RateSnapshot::empty();
        let rendered = RateView::derive(&empty, &ViewOptions::default()).render();
        assert!(rendered.contains("No rates available yet."));

        let snapshot = snapshot();
        let options = ViewOptions {
            search: Some("zzz".to_string()),
            ..ViewOptions::default()
        };
        let view = RateView::derive(&snapshot, &options);
        assert!(view.lowest.is_none());
        assert!(view.render().contains("No currencies match the search."));
    }
}
