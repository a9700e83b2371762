use anyhow::{Context, Result};

/// Prompts user to enter a GitLab private token for `domain`
pub fn prompt_for_token(domain: &str) -> Result<String> {
    eprintln!("GitLab private token required for {}.", domain);
    eprintln!("Create one at: https://{}/-/user_settings/personal_access_tokens", domain);
    eprintln!("Required scopes: api (read_api is enough for browsing)");
    eprintln!();

    let token = rpassword::prompt_password("Please input GitLab private token: ")
        .context("Failed to read token from stdin")?;

    clean_token(&token)
}

/// Trim surrounding whitespace and reject an empty token
pub fn clean_token(input: &str) -> Result<String> {
    let token = input.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}
