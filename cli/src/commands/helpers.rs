use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use d3tr_core::models::{FoodTemplate, Meal};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Like [`parse_date`], but a missing value stays missing instead of meaning today.
pub(crate) fn parse_optional_date(date_str: Option<String>) -> Result<Option<NaiveDate>> {
    date_str.map(|s| parse_date(Some(s))).transpose()
}

/// Fixed-width text bar for a 0-100 percentage. Values outside the range are
/// drawn as empty or full.
pub(crate) fn progress_bar(percent: f64, width: usize) -> String {
    let fraction = (percent / 100.0).clamp(0.0, 1.0);
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub(crate) fn print_meal_table(meals: &[Meal]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Meal")]
        meal_type: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "kcal")]
        calories: i64,
    }

    let rows: Vec<MealRow> = meals
        .iter()
        .map(|m| MealRow {
            id: m.id,
            date: m.date.format("%Y-%m-%d").to_string(),
            meal_type: m.meal_type.to_string(),
            food: truncate(&m.food_name, 35),
            calories: m.calories,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_template_table(templates: &[FoodTemplate]) {
    #[derive(Tabled)]
    struct TemplateRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal")]
        calories: i64,
    }

    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            id: t.id,
            name: truncate(&t.name, 40),
            calories: t.calories,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
