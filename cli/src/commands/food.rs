use anyhow::{Result, bail};

use d3tr_core::models::{NewFoodTemplate, UpdateFoodTemplate, UserId};
use d3tr_core::service::TrackerService;

use super::helpers::print_template_table;

pub(crate) fn cmd_food_add(
    svc: &TrackerService,
    user: &UserId,
    name: String,
    calories: i64,
    json: bool,
) -> Result<()> {
    let template = svc.create_template(user, &NewFoodTemplate { name, calories })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
    } else {
        println!(
            "Added food {}: {} ({} kcal)",
            template.id, template.name, template.calories
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &TrackerService, user: &UserId, json: bool) -> Result<()> {
    let templates = svc.list_templates(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
    } else if templates.is_empty() {
        eprintln!("No saved foods. Use `d3tr food add` or `d3tr meal save`.");
    } else {
        print_template_table(&templates);
    }

    Ok(())
}

pub(crate) fn cmd_food_update(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    name: Option<String>,
    calories: Option<i64>,
    json: bool,
) -> Result<()> {
    if name.is_none() && calories.is_none() {
        bail!("Nothing to update. Use --name or --calories");
    }
    let template = svc.update_template(user, id, &UpdateFoodTemplate { name, calories })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
    } else {
        println!(
            "Updated food {id}: {} ({} kcal)",
            template.name, template.calories
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_delete(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    json: bool,
) -> Result<()> {
    svc.delete_template(user, id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted food {id}");
    }

    Ok(())
}
