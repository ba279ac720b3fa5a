//! Synthetic daily sales table used by the dashboard exporters.

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SAMPLE_DAYS: usize = 30;
pub const SALES_RANGE: (u32, u32) = (100, 500);
pub const PROFIT_RANGE: (u32, u32) = (10, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Clothing,
    Home,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Electronics, Category::Clothing, Category::Home];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Home => "Home",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SampleRow {
    pub date: NaiveDate,
    pub sales: u32,
    pub category: Category,
    pub profit: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleTable {
    pub rows: Vec<SampleRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub category: Category,
    pub days: usize,
    pub sales: u64,
    pub profit: u64,
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// 30 consecutive days from 2024-01-01 with uniform Sales, Profit and Category.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> SampleTable {
    let start = start_date();
    let rows = (0..SAMPLE_DAYS)
        .map(|i| SampleRow {
            date: start + Days::new(i as u64),
            sales: rng.gen_range(SALES_RANGE.0..=SALES_RANGE.1),
            category: Category::ALL[rng.gen_range(0..Category::ALL.len())],
            profit: rng.gen_range(PROFIT_RANGE.0..=PROFIT_RANGE.1),
        })
        .collect();
    SampleTable { rows }
}

impl SampleTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(date, sales)` points per category, categories in first-appearance order.
    pub fn series_by_category(&self) -> Vec<(Category, Vec<(NaiveDate, u32)>)> {
        let mut out: Vec<(Category, Vec<(NaiveDate, u32)>)> = Vec::new();
        for row in &self.rows {
            match out.iter_mut().find(|(c, _)| *c == row.category) {
                Some((_, points)) => points.push((row.date, row.sales)),
                None => out.push((row.category, vec![(row.date, row.sales)])),
            }
        }
        out
    }

    pub fn category_totals(&self) -> Vec<CategoryTotals> {
        Category::ALL
            .iter()
            .filter_map(|cat| {
                let rows: Vec<&SampleRow> = self.rows.iter().filter(|r| r.category == *cat).collect();
                if rows.is_empty() {
                    return None;
                }
                Some(CategoryTotals {
                    category: *cat,
                    days: rows.len(),
                    sales: rows.iter().map(|r| r.sales as u64).sum(),
                    profit: rows.iter().map(|r| r.profit as u64).sum(),
                })
            })
            .collect()
    }
}
