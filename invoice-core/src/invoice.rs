//! The invoice data model: one billing document, its billable service
//! entries, and its flat-fee cost items. Totals are always recomputed from
//! the current items, never cached, so edits are reflected immediately.

use chrono::{Datelike, NaiveDate};

use crate::error::InvoiceError;

/// One billable labor entry. The rate is captured from the invoice's
/// default rate when the entry is added, not referenced live.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceItem {
    pub date: NaiveDate,
    pub description: String,
    pub hours: f64,
    pub rate: f64,
}

impl ServiceItem {
    pub fn amount(&self) -> f64 {
        self.hours * self.rate
    }
}

/// One flat-fee or material entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CostItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl CostItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Aggregate root for one billing document. Owns its item collections;
/// items have no identity outside their invoice.
#[derive(Debug, Clone)]
pub struct Invoice {
    pub client_name: String,
    /// Canonical display form, MM/DD/YYYY.
    pub invoice_date: String,
    /// Hourly rate applied to service entries at the moment they are added.
    pub default_rate: f64,
    pub services: Vec<ServiceItem>,
    pub costs: Vec<CostItem>,
}

impl Invoice {
    pub fn new(
        client_name: impl Into<String>,
        invoice_date: impl Into<String>,
        default_rate: f64,
    ) -> Self {
        Invoice {
            client_name: client_name.into(),
            invoice_date: invoice_date.into(),
            default_rate,
            services: Vec::new(),
            costs: Vec::new(),
        }
    }

    /// Add a service entry, normalizing the description and capturing the
    /// current default rate.
    pub fn add_service(&mut self, date: NaiveDate, description: &str, hours: f64) {
        self.services.push(ServiceItem {
            date,
            description: normalize_description(description),
            hours,
            rate: self.default_rate,
        });
    }

    pub fn add_cost(&mut self, description: &str, quantity: f64, unit_price: f64) {
        self.costs.push(CostItem {
            description: normalize_description(description),
            quantity,
            unit_price,
        });
    }

    pub fn total_services(&self) -> f64 {
        self.services.iter().map(ServiceItem::amount).sum()
    }

    pub fn total_costs(&self) -> f64 {
        self.costs.iter().map(CostItem::total).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.total_services() + self.total_costs()
    }

    /// Services sorted by ascending date, ties keeping insertion order.
    pub fn services_by_date(&self) -> Vec<&ServiceItem> {
        let mut sorted: Vec<&ServiceItem> = self.services.iter().collect();
        sorted.sort_by_key(|s| s.date);
        sorted
    }

    /// Pre-render duplicate scan: pairs of service indices sharing the
    /// exact tuple (date, lowercased description, hours rounded to four
    /// decimals). Presentation-layer policy, not enforced by rendering.
    pub fn duplicate_services(&self) -> Vec<(usize, usize)> {
        fn key(item: &ServiceItem) -> (NaiveDate, String, i64) {
            (
                item.date,
                item.description.to_lowercase(),
                (item.hours * 10_000.0).round() as i64,
            )
        }
        let mut pairs = Vec::new();
        for i in 0..self.services.len() {
            for j in (i + 1)..self.services.len() {
                if key(&self.services[i]) == key(&self.services[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Plain-text preview of the invoice, used by the review step of a
    /// front end before export.
    pub fn summary(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "===== Invoice for {} =====", self.client_name);
        let _ = writeln!(
            out,
            "Date: {}    Rate: {:.2}\n",
            self.invoice_date, self.default_rate
        );

        if self.services.is_empty() {
            out.push_str("No services.\n\n");
        } else {
            out.push_str("SERVICES:\n");
            let _ = writeln!(
                out,
                "{:<10} {:<30} {:>5} {:>8} {:>10}",
                "Date", "Desc", "Hrs", "Rate", "Amt"
            );
            out.push_str(&"-".repeat(65));
            out.push('\n');
            for item in self.services_by_date() {
                let _ = writeln!(
                    out,
                    "{:<10} {:<30} {:>5.2} {:>8.2} {:>10.2}",
                    format_date_short(item.date),
                    item.description,
                    item.hours,
                    item.rate,
                    item.amount()
                );
            }
            out.push_str(&"-".repeat(65));
            out.push('\n');
            let _ = writeln!(
                out,
                "{:>55} {:>10.2}\n",
                "Total Service Fees",
                self.total_services()
            );
        }

        if self.costs.is_empty() {
            out.push_str("No costs.\n\n");
        } else {
            out.push_str("COSTS:\n");
            let _ = writeln!(
                out,
                "{:<30} {:>5} {:>8} {:>10}",
                "Desc", "Qty", "Unit", "Total"
            );
            out.push_str(&"-".repeat(55));
            out.push('\n');
            for cost in &self.costs {
                let _ = writeln!(
                    out,
                    "{:<30} {:>5.2} {:>8.2} {:>10.2}",
                    cost.description, cost.quantity, cost.unit_price, cost.total()
                );
            }
            out.push_str(&"-".repeat(55));
            out.push('\n');
            let _ = writeln!(out, "{:>45} {:>10.2}\n", "Total Costs", self.total_costs());
        }

        let _ = writeln!(out, "GRAND TOTAL: {:.2}", self.grand_total());
        out
    }
}

/// Trim surrounding whitespace and uppercase the first character.
pub fn normalize_description(s: &str) -> String {
    let s = s.trim();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse a user-entered date: `M/D`, `M/D/YY`, or `M/D/YYYY`.
/// Two-digit years are 2000-based; `M/D` uses `current_year`.
pub fn parse_user_date(s: &str, current_year: i32) -> Result<NaiveDate, InvoiceError> {
    let bad = || InvoiceError::BadDate(s.to_string());
    let parts: Vec<&str> = s.trim().split('/').collect();
    let (month, day, year) = match parts.as_slice() {
        [m, d] => (m.trim(), d.trim(), current_year),
        [m, d, y] => {
            let year: i32 = y.trim().parse().map_err(|_| bad())?;
            let year = if year < 100 { 2000 + year } else { year };
            (m.trim(), d.trim(), year)
        }
        _ => return Err(bad()),
    };
    let month: u32 = month.parse().map_err(|_| bad())?;
    let day: u32 = day.parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}

/// Table-row date form: `M/D/YY`, no zero padding on month or day.
pub fn format_date_short(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year() % 100)
}

/// Invoice-heading date form: `MM/DD/YYYY`.
pub fn format_date_full(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{:04}", date.month(), date.day(), date.year())
}
