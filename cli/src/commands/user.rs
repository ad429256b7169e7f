use anyhow::Result;

use d3tr_core::models::UserId;
use d3tr_core::service::TrackerService;

pub(crate) fn cmd_user_create(svc: &TrackerService, email: Option<&str>, json: bool) -> Result<()> {
    let profile = svc.create_account(email)?;
    let token = svc.issue_token(&profile.id)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "user": profile.id, "email": profile.email, "token": token })
        );
    } else {
        println!("Created account {}", profile.id);
        println!("  Token: {token}");
        println!("  Store it now, it cannot be shown again.");
    }

    Ok(())
}

pub(crate) fn cmd_user_token(svc: &TrackerService, user: &UserId, json: bool) -> Result<()> {
    let token = svc.issue_token(user)?;

    if json {
        println!("{}", serde_json::json!({ "user": user, "token": token }));
    } else {
        println!("New token for {user}:");
        println!("  {token}");
    }

    Ok(())
}
