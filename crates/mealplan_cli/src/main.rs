//! `mealplan` command-line front-end.
//!
//! # Responsibility
//! - Resolve configuration from the environment and global flags.
//! - Map subcommands onto core services and print results.

mod cli;
mod import;

use anyhow::{anyhow, Context, Result};
use cli::{parse_args, Cli, Command};
use mealplan_core::repo::shopping_repo::ShoppingListRepository;
use mealplan_core::{
    init_logging, init_stderr_logging, open_db, DateRange, PlannerConfig, ShoppingList,
    ShoppingService, SqlitePlannerStore,
};

fn main() -> Result<()> {
    let cli = parse_args();
    let config = resolve_config(&cli);

    let logging = match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_stderr_logging(&config.log_level),
    };
    logging
        .map_err(|message| anyhow!(message))
        .context("failed to initialize logging")?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    if let Command::Import { bundle } = &cli.command {
        let summary = import::import_bundle(&conn, import::read_bundle(bundle)?)?;
        println!(
            "imported recipes={} dishes={} assignments={} categories={}",
            summary.recipes, summary.dishes, summary.assignments, summary.categories
        );
        return Ok(());
    }

    let store = SqlitePlannerStore::try_new(&conn)?;
    let service = ShoppingService::new(store, config.default_category.clone());

    match cli.command {
        Command::Import { .. } => {}
        Command::Generate { start, end } => {
            let range = DateRange::new(start, end)?;
            let list = service
                .generate_and_save(&range)
                .context("shopping list generation failed")?;
            print_list(&list);
        }
        Command::Regenerate { list_id } => {
            let list = service
                .regenerate_and_save(list_id)
                .context("shopping list regeneration failed")?;
            print_list(&list);
        }
        Command::Show { list_id } => print_list(&service.get(list_id)?),
        Command::Lists => {
            for summary in service.store().lists().list_shopping_lists()? {
                println!(
                    "{}  {}..{}  items={}",
                    summary.id, summary.start_date, summary.end_date, summary.item_count
                );
            }
        }
        Command::Check {
            list_id,
            name,
            unit,
            undo,
        } => {
            let list = service.set_item_checked(list_id, &name, &unit, !undo)?;
            print_list(&list);
        }
        Command::Cancel {
            list_id,
            name,
            unit,
            undo,
        } => {
            let list = service.set_item_canceled(list_id, &name, &unit, !undo)?;
            print_list(&list);
        }
        Command::Delete { list_id } => {
            service.store().lists().delete_shopping_list(list_id)?;
            println!("deleted {list_id}");
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> PlannerConfig {
    let mut config = PlannerConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

fn print_list(list: &ShoppingList) {
    println!(
        "list {}  {}..{}  pending={}/{}",
        list.id,
        list.start_date,
        list.end_date,
        list.pending_count(),
        list.items.len()
    );
    for group in list.grouped_by_category() {
        println!("[{}]", group.category);
        for item in group.items {
            let mark = match (item.checked, item.canceled) {
                (_, true) => "-",
                (true, false) => "x",
                (false, false) => " ",
            };
            println!(
                "  [{mark}] {} {} {}  ({} meals)",
                item.ingredient_name,
                format_quantity(item.quantity),
                item.unit,
                item.sources.len()
            );
        }
    }
}

fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}
