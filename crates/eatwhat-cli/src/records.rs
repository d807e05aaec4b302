//! Read-mostly database commands: history, favorites and categories.

use chrono::{DateTime, Utc};

use crate::context::AppContext;

fn fmt_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Prints the latest confirmations for the configured user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(ctx: &AppContext) -> anyhow::Result<()> {
    let pool = ctx.pool().await?;
    let rows = eatwhat_db::list_history(&pool, &ctx.config.user_key).await?;
    if rows.is_empty() {
        println!("no history yet; confirm a spin with `eatwhat spin --source db`");
        return Ok(());
    }

    println!("{:<18}{:<24}{:<8}{:<10}REJECTED", "WHEN", "NAME", "RATING", "PRICE");
    for row in &rows {
        println!(
            "{:<18}{:<24}{:<8}{:<10}{}",
            fmt_time(row.created_at),
            row.candidate_name,
            row.rating,
            row.price_label,
            row.rejected_count
        );
    }
    Ok(())
}

/// Prints the configured user's favorites.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_favorites(ctx: &AppContext) -> anyhow::Result<()> {
    let pool = ctx.pool().await?;
    let rows = eatwhat_db::list_favorites(&pool, &ctx.config.user_key).await?;
    if rows.is_empty() {
        println!("no favorites yet; add one with `eatwhat favorite <id>`");
        return Ok(());
    }

    println!("{:<6}{:<24}{:<8}{:<10}ADDRESS", "ID", "NAME", "RATING", "PRICE");
    for row in &rows {
        println!(
            "{:<6}{:<24}{:<8}{:<10}{}",
            row.candidate_id, row.candidate_name, row.rating, row.price_label, row.address
        );
    }
    Ok(())
}

/// Adds or removes a favorite.
///
/// # Errors
///
/// Returns an error if the candidate does not exist or a query fails.
pub(crate) async fn run_toggle_favorite(ctx: &AppContext, candidate_id: i64) -> anyhow::Result<()> {
    let pool = ctx.pool().await?;
    let toggle = match eatwhat_db::toggle_favorite(&pool, &ctx.config.user_key, candidate_id).await
    {
        Ok(toggle) => toggle,
        Err(eatwhat_db::DbError::NotFound) => {
            anyhow::bail!("restaurant {candidate_id} not found")
        }
        Err(e) => return Err(e.into()),
    };
    println!("favorite {toggle}: {candidate_id}");
    Ok(())
}

/// Shows one stored candidate.
///
/// # Errors
///
/// Returns an error if the candidate does not exist or the query fails.
pub(crate) async fn run_show(ctx: &AppContext, candidate_id: i64) -> anyhow::Result<()> {
    let pool = ctx.pool().await?;
    let detail = eatwhat_db::get_candidate(&pool, candidate_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("restaurant {candidate_id} not found"))?;
    let c = &detail.candidate;

    println!("{} (#{})", c.name, c.id);
    println!("Category: {}", detail.category_name.as_deref().unwrap_or("-"));
    println!("Rating:   {}", c.rating);
    println!("Price:    {}", c.price_label);
    println!("Address:  {}", c.address);
    println!("Point:    {:.6},{:.6}", c.lat, c.lng);
    if !c.tags.is_empty() {
        println!("Tags:     {}", c.tags.join(" / "));
    }
    println!("About:    {}", c.description);
    Ok(())
}

/// Lists categories in creation order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_categories(ctx: &AppContext) -> anyhow::Result<()> {
    let pool = ctx.pool().await?;
    let categories = eatwhat_db::list_categories(&pool).await?;
    if categories.is_empty() {
        println!("no categories yet; `eatwhat sync` or `eatwhat bootstrap` seeds them");
        return Ok(());
    }
    println!("{:<6}{:<16}ICON", "ID", "NAME");
    for category in &categories {
        println!(
            "{:<6}{:<16}{}",
            category.id,
            category.name,
            category.icon.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
