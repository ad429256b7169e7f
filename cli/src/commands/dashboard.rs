use anyhow::Result;

use crate::gemini::GeminiClient;
use d3tr_core::commentary::{self, Commentary};
use d3tr_core::models::{CalorieStatus, Dashboard, UserId};
use d3tr_core::service::TrackerService;

use super::helpers::{parse_date, progress_bar};

const BAR_WIDTH: usize = 20;

fn status_label(status: CalorieStatus) -> &'static str {
    match status {
        CalorieStatus::Complete => "goal reached",
        CalorieStatus::OnTrack => "on track",
        CalorieStatus::Behind => "keep eating",
    }
}

fn render_dashboard(dash: &Dashboard) -> String {
    let d = &dash.distance;
    let w = &dash.weight;
    let c = &dash.calories;

    let mut out = String::new();
    out.push_str(&format!(
        "  DRIVE     {} yd -> {} yd  {} {:.0}%\n",
        d.estimated_distance,
        d.target_distance,
        progress_bar(d.progress_percent, BAR_WIDTH),
        d.progress_percent
    ));
    if d.reached {
        out.push_str("            Target distance reached!\n");
    } else {
        out.push_str(&format!("            {} yd to go", d.remaining_distance));
        if d.distance_gained > 0 {
            out.push_str(&format!(" (+{} yd since start)", d.distance_gained));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "  WEIGHT    {:.1} kg -> {:.1} kg  {} {:.0}%\n",
        w.current_weight,
        w.target_weight,
        progress_bar(w.progress_percent, BAR_WIDTH),
        w.progress_percent
    ));
    if w.reached {
        out.push_str("            Target weight reached!\n");
    } else {
        out.push_str(&format!("            {:.1} kg to go", w.remaining_weight));
        if w.weight_gained > 0.0 {
            out.push_str(&format!(" (+{:.1} kg since start)", w.weight_gained));
        }
        out.push('\n');
    }

    #[allow(clippy::cast_precision_loss)]
    let calorie_percent = c.progress_percent as f64;
    out.push_str(&format!(
        "  CALORIES  {} / {} kcal  {} {}% ({})\n",
        c.consumed,
        c.target,
        progress_bar(calorie_percent, BAR_WIDTH),
        c.progress_percent,
        status_label(c.status)
    ));
    if c.remaining > 0 {
        out.push_str(&format!("            {} kcal remaining today\n", c.remaining));
    }
    out
}

pub(crate) fn cmd_dashboard(
    svc: &TrackerService,
    user: &UserId,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let dash = svc.dashboard(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
    } else {
        println!("=== {} ===\n", date.format("%Y-%m-%d"));
        print!("{}", render_dashboard(&dash));
    }

    Ok(())
}

pub(crate) async fn cmd_feedback(
    svc: &TrackerService,
    user: &UserId,
    client: Option<&GeminiClient>,
    json: bool,
) -> Result<()> {
    let summary = svc.feedback_summary(user)?;
    let result = match client {
        Some(client) => {
            let prompt = commentary::build_prompt(&summary);
            Commentary::from_result(client.generate(&prompt).await)
        }
        None => Commentary::unconfigured(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use d3tr_core::models::{NewWeightLog, SetupRequest};

    fn ready_service() -> (TrackerService, UserId) {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = svc.create_account(None).unwrap().id;
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        svc.complete_setup(
            &user,
            &SetupRequest {
                start_weight: 70.0,
                target_weight: 80.0,
                start_distance: 260,
                target_distance: 300,
                target_calories: 3000,
                kg_to_yd_ratio: 4.0,
            },
            day,
        )
        .unwrap();
        (svc, user)
    }

    #[test]
    fn test_render_dashboard_text() {
        let (svc, user) = ready_service();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        svc.record_weight(
            &user,
            &NewWeightLog {
                date: day,
                weight_kg: 75.0,
            },
        )
        .unwrap();

        let text = render_dashboard(&svc.dashboard(&user, day).unwrap());
        assert!(text.contains("DRIVE     280 yd -> 300 yd"));
        assert!(text.contains("20 yd to go (+20 yd since start)"));
        assert!(text.contains("WEIGHT    75.0 kg -> 80.0 kg"));
        assert!(text.contains("0 / 3000 kcal"));
        assert!(text.contains("(keep eating)"));
        assert!(text.contains("3000 kcal remaining today"));
    }

    #[test]
    fn test_render_dashboard_hides_losses() {
        let (svc, user) = ready_service();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        svc.record_weight(
            &user,
            &NewWeightLog {
                date: day,
                weight_kg: 68.0,
            },
        )
        .unwrap();

        let text = render_dashboard(&svc.dashboard(&user, day).unwrap());
        assert!(text.contains("DRIVE     252 yd -> 300 yd"));
        assert!(text.contains("48 yd to go\n"));
        assert!(text.contains("12.0 kg to go\n"));
        assert!(!text.contains("since start"));
        assert!(!text.contains("+-"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(CalorieStatus::Complete), "goal reached");
        assert_eq!(status_label(CalorieStatus::OnTrack), "on track");
        assert_eq!(status_label(CalorieStatus::Behind), "keep eating");
    }

    #[tokio::test]
    async fn test_feedback_without_client_is_ok() {
        let (svc, user) = ready_service();
        cmd_feedback(&svc, &user, None, true).await.unwrap();
    }
}
