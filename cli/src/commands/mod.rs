mod dashboard;
mod food;
mod helpers;
mod meal;
mod setup;
mod user;
mod weight;

pub(crate) use dashboard::{cmd_dashboard, cmd_feedback};
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_update};
pub(crate) use meal::{cmd_meal_delete, cmd_meal_list, cmd_meal_log, cmd_meal_save, cmd_meal_update};
pub(crate) use setup::{cmd_settings_set, cmd_settings_show, cmd_setup};
pub(crate) use user::{cmd_user_create, cmd_user_token};
pub(crate) use weight::{
    cmd_weight_chart, cmd_weight_delete, cmd_weight_edit, cmd_weight_history, cmd_weight_log,
};
