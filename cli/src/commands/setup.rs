use anyhow::Result;

use d3tr_core::models::{Profile, SettingsUpdate, SetupRequest, UserId};
use d3tr_core::service::TrackerService;

use super::helpers::parse_date;

fn fmt_opt<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v} {unit}"))
}

fn print_profile(profile: &Profile) {
    println!("Profile {}", profile.id);
    if let Some(ref email) = profile.email {
        println!("  Email:           {email}");
    }
    println!("  Start weight:    {}", fmt_opt(profile.start_weight, "kg"));
    println!("  Target weight:   {}", fmt_opt(profile.target_weight, "kg"));
    println!("  Start distance:  {}", fmt_opt(profile.start_distance, "yd"));
    println!("  Target distance: {} yd", profile.target_distance);
    println!("  Daily calories:  {} kcal", profile.target_calories);
    println!("  Ratio:           {} yd/kg", profile.kg_to_yd_ratio);
    match profile.start_date {
        Some(date) => println!("  Started:         {}", date.format("%Y-%m-%d")),
        None => println!("  Setup not completed yet. Run `d3tr setup`."),
    }
}

pub(crate) fn cmd_setup(
    svc: &TrackerService,
    user: &UserId,
    req: &SetupRequest,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let start_date = parse_date(date)?;
    let profile = svc.complete_setup(user, req, start_date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Setup complete. First weigh-in recorded for {start_date}.\n");
        print_profile(&profile);
    }

    Ok(())
}

pub(crate) fn cmd_settings_show(svc: &TrackerService, user: &UserId, json: bool) -> Result<()> {
    let profile = svc.get_profile(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }

    Ok(())
}

pub(crate) fn cmd_settings_set(
    svc: &TrackerService,
    user: &UserId,
    update: &SettingsUpdate,
    json: bool,
) -> Result<()> {
    let profile = svc.update_settings(user, update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Settings updated.\n");
        print_profile(&profile);
    }

    Ok(())
}
