//! JSON bundle import.
//!
//! Dishes are saved once every component they name is stored, so a bundle
//! may list them in any order. The whole bundle is one transaction.

use anyhow::{bail, Context, Result};
use log::info;
use mealplan_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use mealplan_core::repo::dish_repo::SqliteDishRepository;
use mealplan_core::repo::menu_repo::SqliteMenuRepository;
use mealplan_core::{Dish, DishService, MenuAssignment, MenuService, Recipe};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Bundle {
    pub recipes: Vec<Recipe>,
    pub dishes: Vec<Dish>,
    pub assignments: Vec<MenuAssignment>,
    /// Ingredient name to category.
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub recipes: usize,
    pub dishes: usize,
    pub assignments: usize,
    pub categories: usize,
}

pub fn read_bundle(path: &Path) -> Result<Bundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bundle `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid bundle `{}`", path.display()))
}

/// Stores `bundle` atomically: on any error nothing from it is kept.
pub fn import_bundle(conn: &Connection, bundle: Bundle) -> Result<ImportSummary> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let summary = write_bundle(&tx, bundle)?;
    tx.commit().context("failed to commit bundle import")?;

    info!(
        "event=bundle_import module=cli status=ok recipes={} dishes={} assignments={} categories={}",
        summary.recipes, summary.dishes, summary.assignments, summary.categories
    );
    Ok(summary)
}

fn write_bundle(conn: &Connection, bundle: Bundle) -> Result<ImportSummary> {
    let dishes = DishService::new(SqliteDishRepository::try_new(conn)?);
    let menu = MenuService::new(SqliteMenuRepository::try_new(conn)?);
    let categories = SqliteCategoryRepository::try_new(conn)?;
    let mut summary = ImportSummary::default();

    for recipe in &bundle.recipes {
        dishes
            .save_recipe(recipe)
            .with_context(|| format!("failed to import recipe `{}`", recipe.id))?;
        summary.recipes += 1;
    }

    let mut stored: HashSet<String> = dishes
        .list_dishes()?
        .into_iter()
        .map(|dish| dish.id)
        .collect();
    let mut pending = bundle.dishes;
    while !pending.is_empty() {
        let (ready, blocked): (Vec<Dish>, Vec<Dish>) = pending.into_iter().partition(|dish| {
            dish.components_in_order()
                .iter()
                .all(|component| stored.contains(&component.contained_dish_id))
        });
        if ready.is_empty() {
            // Saving the first blocked dish reports which reference is broken.
            let dish = &blocked[0];
            dishes
                .save_dish(dish)
                .with_context(|| format!("failed to import dish `{}`", dish.id))?;
            bail!("dish `{}` could not be ordered after its components", dish.id);
        }
        for dish in ready {
            dishes
                .save_dish(&dish)
                .with_context(|| format!("failed to import dish `{}`", dish.id))?;
            stored.insert(dish.id);
            summary.dishes += 1;
        }
        pending = blocked;
    }

    for assignment in &bundle.assignments {
        menu.add_assignment(
            assignment.date,
            assignment.meal_type,
            &assignment.dish_id,
            assignment.portions,
        )
        .with_context(|| {
            format!(
                "failed to schedule `{}` on {} {}",
                assignment.dish_id, assignment.date, assignment.meal_type
            )
        })?;
        summary.assignments += 1;
    }

    for (ingredient, category) in &bundle.categories {
        categories
            .set_category(ingredient, category)
            .with_context(|| format!("failed to set category for `{ingredient}`"))?;
        summary.categories += 1;
    }

    Ok(summary)
}
