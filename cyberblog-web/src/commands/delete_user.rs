//! Delete-user command - remove an account and everything it owns

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_context;
use crate::output;

pub fn run(data_dir: &Path, username: &str, force: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;

    if ctx.repository.get_user_by_username(username)?.is_none() {
        anyhow::bail!("User '{}' not found", username);
    }

    if !force {
        println!(
            "\n{}",
            format!(
                "This will delete '{}' with their profile, thoughts and sessions.",
                username
            )
            .yellow()
        );

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let user = ctx.account_service.delete_by_username(username)?;
    output::success(&format!("Deleted user '{}' (id {})", user.username, user.id));

    Ok(())
}
