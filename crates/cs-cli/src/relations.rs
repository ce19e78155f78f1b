//! # Relations Subcommand
//!
//! Lists the current user's matches, the counterparts a certificate can be
//! requested for.

use anyhow::{Context, Result};
use clap::Args;

use cs_api_client::ApiClient;
use cs_core::{ListSorter, Relation, SortOrder};

/// Arguments for the `cs relations` subcommand.
#[derive(Args, Debug)]
pub struct RelationsArgs {
    /// Include dissolved matches.
    #[arg(long)]
    pub dissolved: bool,

    /// Sort by field (firstname, lastname, date, dissolved). Each repetition
    /// flips the direction, like clicking a column header again.
    #[arg(long = "sort")]
    pub sort: Vec<String>,

    /// Start with a descending sort.
    #[arg(long)]
    pub descending: bool,
}

/// Execute the relations subcommand.
pub async fn run_relations(args: &RelationsArgs, client: &ApiClient) -> Result<u8> {
    let user = client
        .current_user()
        .await
        .context("failed to load the current user")?;

    let mut rows: Vec<Relation> = if args.dissolved {
        user.relations().cloned().collect()
    } else {
        user.matches.clone()
    };
    if rows.is_empty() {
        println!("No matches found for {} {}", user.first_name, user.last_name);
        return Ok(0);
    }

    sort_relations(&mut rows, &args.sort, args.descending);
    print!("{}", render_relations(&rows));
    Ok(0)
}

/// Apply each sort key in turn with a single sorter.
pub fn sort_relations(rows: &mut [Relation], keys: &[String], descending: bool) {
    let start = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let mut sorter = ListSorter::starting_with(start);
    for key in keys {
        let order = sorter.sort(rows, key);
        tracing::debug!(%key, ?order, "relations sorted");
    }
}

/// One line per relation: id, name, start date, subjects, status.
pub fn render_relations(rows: &[Relation]) -> String {
    let mut out = String::new();
    for r in rows {
        let status = if r.dissolved { "dissolved" } else { "active" };
        out.push_str(&format!(
            "{}  {}  since {}  [{}]  {}\n",
            r.id,
            r.full_name(),
            r.started_at.date(),
            r.subjects.join(", "),
            status
        ));
    }
    out
}
