use anyhow::{Result, bail};

use d3tr_core::models::{MealType, MealsByCategory, NewMeal, UpdateMeal, UserId};
use d3tr_core::service::TrackerService;

use super::helpers::{parse_date, parse_optional_date, print_meal_table};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_log(
    svc: &TrackerService,
    user: &UserId,
    name: Option<String>,
    calories: Option<i64>,
    food: Option<i64>,
    meal: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let meal_type: MealType = meal.parse()?;
    let date = parse_date(date)?;

    let (food_name, calories) = match (food, name, calories) {
        (Some(id), _, _) => {
            let template = svc.get_template(user, id)?;
            (template.name, template.calories)
        }
        (None, Some(name), Some(calories)) => (name, calories),
        _ => bail!("Provide a food name and calories, or --food <ID>"),
    };

    let meal = svc.log_meal(
        user,
        &NewMeal {
            date,
            meal_type,
            food_name,
            calories,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        println!(
            "Logged {} ({} kcal) as {} on {} [id {}]",
            meal.food_name,
            meal.calories,
            meal.meal_type,
            meal.date.format("%Y-%m-%d"),
            meal.id
        );
        let total = svc.daily_calorie_total(user, meal.date)?;
        println!("  Day total: {total} kcal");
    }

    Ok(())
}

fn print_grouped(summary: &MealsByCategory) {
    for group in &summary.groups {
        let label = group.meal_type.as_str().to_uppercase();
        println!("  {label} ({} kcal)", group.subtotal_calories);
        if group.meals.is_empty() {
            println!("    -");
        }
        for m in &group.meals {
            println!("    [{}] {}: {} kcal", m.id, m.food_name, m.calories);
        }
        println!();
    }
    println!("  TOTAL: {} kcal", summary.total_calories);
}

pub(crate) fn cmd_meal_list(
    svc: &TrackerService,
    user: &UserId,
    date: Option<String>,
    all: bool,
    json: bool,
) -> Result<()> {
    if all {
        let meals = svc.list_meals(user, None)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&meals)?);
        } else if meals.is_empty() {
            eprintln!("No meals logged yet. Use `d3tr meal log` to add one.");
        } else {
            print_meal_table(&meals);
        }
        return Ok(());
    }

    let date = parse_date(date)?;
    let summary = svc.meals_by_category(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== {} ===\n", date.format("%Y-%m-%d"));
        print_grouped(&summary);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_update(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    name: Option<String>,
    calories: Option<i64>,
    meal: Option<&str>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let update = UpdateMeal {
        date: parse_optional_date(date)?,
        meal_type: meal.map(str::parse::<MealType>).transpose()?,
        food_name: name,
        calories,
    };
    if update.is_empty() {
        bail!("Nothing to update. Use --name, --calories, --meal, or --date");
    }

    let meal = svc.update_meal(user, id, &update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        println!(
            "Updated meal {id}: {} ({} kcal) as {} on {}",
            meal.food_name,
            meal.calories,
            meal.meal_type,
            meal.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_meal_delete(
    svc: &TrackerService,
    user: &UserId,
    id: i64,
    json: bool,
) -> Result<()> {
    svc.delete_meal(user, id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted meal {id}");
    }

    Ok(())
}

pub(crate) fn cmd_meal_save(svc: &TrackerService, user: &UserId, id: i64, json: bool) -> Result<()> {
    let template = svc.template_from_meal(user, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
    } else {
        println!(
            "Saved {} ({} kcal) as food {}",
            template.name, template.calories, template.id
        );
    }

    Ok(())
}
