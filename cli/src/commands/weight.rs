use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use d3tr_core::models::{ChartSeries, NewWeightLog, UserId, WeightQuery};
use d3tr_core::service::TrackerService;

use super::helpers::{parse_date, parse_optional_date, progress_bar};

const CHART_WIDTH: usize = 30;

pub(crate) fn cmd_weight_log(
    svc: &TrackerService,
    user: &UserId,
    weight_kg: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let log = svc.record_weight(user, &NewWeightLog { date, weight_kg })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        println!(
            "Logged {:.1} kg for {}",
            log.weight_kg,
            log.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_edit(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    weight_kg: f64,
    json: bool,
) -> Result<()> {
    let log = svc.edit_weight(user, id, weight_kg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        println!(
            "Updated weight log {id}: {:.1} kg on {}",
            log.weight_kg,
            log.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_delete(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    json: bool,
) -> Result<()> {
    svc.delete_weight(user, id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted weight log {id}");
    }

    Ok(())
}

pub(crate) fn cmd_weight_history(
    svc: &TrackerService,
    user: &UserId,
    limit: Option<u32>,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> Result<()> {
    let start = parse_optional_date(from)?;
    let end = parse_optional_date(to)?;
    let query = match (limit, start, end) {
        (Some(n), _, _) => WeightQuery::Recent(n),
        (None, None, None) => WeightQuery::All,
        (None, start, end) => WeightQuery::Range { start, end },
    };
    let logs = svc.list_weights(user, query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else if logs.is_empty() {
        eprintln!("No weight logs found. Use `d3tr weight log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "ID")]
            id: i64,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
        }

        let rows: Vec<WeightRow> = logs
            .iter()
            .map(|l| WeightRow {
                id: l.id,
                date: l.date.format("%Y-%m-%d").to_string(),
                kg: format!("{:.1}", l.weight_kg),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

fn render_chart(chart: &ChartSeries) -> Vec<String> {
    let Some(domain) = chart.domain else {
        return Vec::new();
    };
    let span = domain.max - domain.min;
    chart
        .points
        .iter()
        .map(|p| {
            let percent = if span > 0.0 {
                (p.weight_kg - domain.min) / span * 100.0
            } else {
                100.0
            };
            format!(
                "{}  {:>5.1} kg {}",
                p.date.format("%m-%d"),
                p.weight_kg,
                progress_bar(percent, CHART_WIDTH)
            )
        })
        .collect()
}

pub(crate) fn cmd_weight_chart(svc: &TrackerService, user: &UserId, json: bool) -> Result<()> {
    let chart = svc.weight_chart(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    let Some(domain) = chart.domain else {
        eprintln!("No weight logs yet. Use `d3tr weight log` to record your weight.");
        return Ok(());
    };

    println!("Weight trend ({}-{} kg)\n", domain.min, domain.max);
    for line in render_chart(&chart) {
        println!("  {line}");
    }

    Ok(())
}
