use chrono::NaiveDate;
use mealplan_core::db::open_db_in_memory;
use mealplan_core::repo::category_repo::CategoryRepository;
use mealplan_core::repo::dish_repo::DishRepository;
use mealplan_core::repo::menu_repo::MenuRepository;
use mealplan_core::repo::shopping_repo::ShoppingListRepository;
use mealplan_core::{
    DateRange, Dish, DishComponent, IngredientKey, IngredientLine, MealSource, MealType,
    MenuAssignment, PlanError, PlannerStore, Recipe, RepoError, ShoppingList, ShoppingListItem,
    ShoppingService, SqlitePlannerStore,
};
use rusqlite::Connection;
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn quantity_of(list: &ShoppingList, name: &str, unit: &str) -> Option<f64> {
    list.find_item(&IngredientKey::new(name, unit))
        .map(|item| item.quantity)
}

fn seed_menu_scenario(store: &SqlitePlannerStore<'_>) {
    let dishes = store.dishes();
    dishes
        .save_dish(&Dish::standalone(
            "salade",
            "Salade",
            2,
            vec![IngredientLine::new("tomato", 4.0, "pcs")],
        ))
        .unwrap();
    dishes
        .save_dish(&Dish::standalone(
            "poulet",
            "Poulet",
            1,
            vec![IngredientLine::new("chicken", 1.0, "kg")],
        ))
        .unwrap();
    dishes
        .save_dish(&Dish::composite(
            "menu",
            "Menu",
            vec![
                DishComponent::new("salade", 1, 0),
                DishComponent::new("poulet", 2, 1),
            ],
        ))
        .unwrap();
    store
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Lunch, "menu", 1))
        .unwrap();
    store.categories().set_category("tomato", "Légumes").unwrap();
}

fn service(conn: &Connection) -> ShoppingService<SqlitePlannerStore<'_>> {
    ShoppingService::new(SqlitePlannerStore::try_new(conn).unwrap(), "Divers")
}

#[test]
fn composite_menu_generates_expected_items() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_menu_scenario(service.store());

    let list = service
        .generate_and_save(&DateRange::single_day(day(1)))
        .unwrap();

    assert_eq!(list.items.len(), 2);
    assert_eq!(quantity_of(&list, "tomato", "pcs"), Some(2.0));
    assert_eq!(quantity_of(&list, "chicken", "kg"), Some(2.0));
    let categories: Vec<&str> = list.items.iter().map(|item| item.category.as_str()).collect();
    assert_eq!(categories, vec!["Divers", "Légumes"]);
    let tomato = list.find_item(&IngredientKey::new("tomato", "pcs")).unwrap();
    assert_eq!(
        tomato.sources,
        vec![MealSource {
            date: day(1),
            meal_type: MealType::Lunch,
            dish_name: "Menu".to_string(),
        }]
    );

    let stored = service.get(list.id).unwrap();
    assert_eq!(stored, list);
}

#[test]
fn recipe_linked_dishes_scale_by_recipe_servings() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let store = service.store();
    store
        .dishes()
        .save_recipe(&Recipe::new(
            "r-crepes",
            "Crêpes",
            4,
            vec![IngredientLine::new("Milk", 500.0, "ml")],
        ))
        .unwrap();
    store
        .dishes()
        .save_dish(&Dish::recipe_linked("crepes", "Crêpes", 4, "r-crepes"))
        .unwrap();
    store
        .menu()
        .add_assignment(&MenuAssignment::new(day(2), MealType::Breakfast, "crepes", 2))
        .unwrap();

    let list = service.generate(&DateRange::single_day(day(2))).unwrap();

    assert_eq!(quantity_of(&list, "milk", "ml"), Some(250.0));
}

#[test]
fn matching_units_merge_and_different_units_stay_apart() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let store = service.store();
    store
        .dishes()
        .save_dish(&Dish::standalone(
            "cake",
            "Cake",
            1,
            vec![IngredientLine::new("Sugar", 100.0, "g")],
        ))
        .unwrap();
    store
        .dishes()
        .save_dish(&Dish::standalone(
            "tea",
            "Tea",
            1,
            vec![IngredientLine::new("sugar ", 1.0, "cup")],
        ))
        .unwrap();
    store
        .dishes()
        .save_dish(&Dish::standalone(
            "flan",
            "Flan",
            1,
            vec![IngredientLine::new("SUGAR", 50.0, "g")],
        ))
        .unwrap();
    for (d, dish) in [(1, "cake"), (2, "tea"), (3, "flan")] {
        store
            .menu()
            .add_assignment(&MenuAssignment::new(day(d), MealType::Snack, dish, 1))
            .unwrap();
    }

    let list = service
        .generate(&DateRange::new(day(1), day(3)).unwrap())
        .unwrap();

    assert_eq!(list.items.len(), 2);
    assert_eq!(quantity_of(&list, "sugar", "g"), Some(150.0));
    assert_eq!(quantity_of(&list, "sugar", "cup"), Some(1.0));
    let grams = list.find_item(&IngredientKey::new("sugar", "g")).unwrap();
    assert_eq!(grams.sources.len(), 2);
}

#[test]
fn empty_range_yields_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_menu_scenario(service.store());

    let list = service
        .generate(&DateRange::single_day(day(20)))
        .unwrap();

    assert!(list.items.is_empty());
    assert_eq!(list.start_date, day(20));
}

#[test]
fn missing_dish_aborts_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_menu_scenario(service.store());
    service
        .store()
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Dinner, "ghost", 1))
        .unwrap();

    let err = service
        .generate_and_save(&DateRange::single_day(day(1)))
        .unwrap_err();

    assert!(matches!(err, PlanError::DishNotFound(id) if id == "ghost"));
    assert!(service.store().lists().list_shopping_lists().unwrap().is_empty());
}

#[test]
fn missing_recipe_is_reported_with_its_dish() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let store = service.store();
    store
        .dishes()
        .save_dish(&Dish::recipe_linked("stew", "Stew", 2, "r-gone"))
        .unwrap();
    store
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Dinner, "stew", 1))
        .unwrap();

    match service.generate(&DateRange::single_day(day(1))).unwrap_err() {
        PlanError::RecipeNotFound { recipe_id, dish_id } => {
            assert_eq!(recipe_id, "r-gone");
            assert_eq!(dish_id, "stew");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stored_cycle_aborts_generation_with_path() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let dishes = service.store().dishes();
    // The repository does not check the graph; only the dish service does.
    dishes
        .save_dish(&Dish::composite("a", "A", vec![DishComponent::new("b", 1, 0)]))
        .unwrap();
    dishes
        .save_dish(&Dish::composite("b", "B", vec![DishComponent::new("a", 1, 0)]))
        .unwrap();
    service
        .store()
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Lunch, "a", 1))
        .unwrap();

    match service
        .generate_and_save(&DateRange::single_day(day(1)))
        .unwrap_err()
    {
        PlanError::CompositionCycle(path) => assert_eq!(path, vec!["a", "b", "a"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.store().lists().list_shopping_lists().unwrap().is_empty());
}

#[test]
fn stored_self_containing_dish_aborts_generation_with_cycle() {
    let conn = open_db_in_memory().unwrap();
    // Written below the repository, which refuses self-containment.
    conn.execute_batch(
        "INSERT INTO dishes (dish_id, name, servings, source_kind) VALUES ('a', 'A', 1, 'composite');
         INSERT INTO dish_components (dish_id, contained_dish_id, quantity, sort_order)
         VALUES ('a', 'a', 1, 0);",
    )
    .unwrap();
    let service = service(&conn);
    service
        .store()
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Lunch, "a", 1))
        .unwrap();

    match service.generate(&DateRange::single_day(day(1))).unwrap_err() {
        PlanError::CompositionCycle(path) => assert_eq!(path, vec!["a", "a"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn regenerate_keeps_identity_and_surviving_flags() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_menu_scenario(service.store());
    let range = DateRange::single_day(day(1));
    let original = service.generate_and_save(&range).unwrap();

    service
        .set_item_checked(original.id, "Tomato", "pcs", true)
        .unwrap();
    service
        .set_item_canceled(original.id, "chicken", "kg", true)
        .unwrap();

    // Chicken disappears from the plan, tomato doubles, cheese appears.
    let store = service.store();
    store
        .dishes()
        .save_dish(&Dish::standalone(
            "cheese",
            "Cheese board",
            1,
            vec![
                IngredientLine::new("Tomato", 2.0, "pcs"),
                IngredientLine::new("Comté", 200.0, "g"),
            ],
        ))
        .unwrap();
    let assignments = store.menu().list_assignments(&range).unwrap();
    store
        .menu()
        .remove_assignment(assignments[0].assignment_id)
        .unwrap();
    store
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Lunch, "salade", 2))
        .unwrap();
    store
        .menu()
        .add_assignment(&MenuAssignment::new(day(1), MealType::Dinner, "cheese", 1))
        .unwrap();

    let regenerated = service.regenerate_and_save(original.id).unwrap();

    assert_eq!(regenerated.id, original.id);
    assert_eq!(regenerated.created_at, original.created_at);
    assert!(regenerated.updated_at.is_some());
    assert_eq!(quantity_of(&regenerated, "tomato", "pcs"), Some(6.0));
    assert_eq!(quantity_of(&regenerated, "chicken", "kg"), None);
    let tomato = regenerated
        .find_item(&IngredientKey::new("tomato", "pcs"))
        .unwrap();
    assert!(tomato.checked);
    let comte = regenerated
        .find_item(&IngredientKey::new("comté", "g"))
        .unwrap();
    assert!(!comte.checked && !comte.canceled);

    assert_eq!(service.get(original.id).unwrap(), regenerated);
}

#[test]
fn regenerate_unknown_list_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.regenerate_and_save(missing).unwrap_err(),
        PlanError::ShoppingListNotFound(id) if id == missing
    ));
}

#[test]
fn set_flag_on_unknown_item_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed_menu_scenario(service.store());
    let list = service
        .generate_and_save(&DateRange::single_day(day(1)))
        .unwrap();

    assert!(matches!(
        service
            .set_item_checked(list.id, "tomato", "kg", true)
            .unwrap_err(),
        PlanError::Persistence(RepoError::NotFound { .. })
    ));
}

fn item(name: &str, unit: &str, category: &str) -> ShoppingListItem {
    ShoppingListItem {
        ingredient_name: name.to_string(),
        quantity: 1.5,
        unit: unit.to_string(),
        category: category.to_string(),
        checked: false,
        canceled: false,
        sources: vec![MealSource {
            date: day(3),
            meal_type: MealType::Dinner,
            dish_name: "Soup".to_string(),
        }],
    }
}

fn list_with(created_at: i64, items: Vec<ShoppingListItem>) -> ShoppingList {
    ShoppingList {
        id: Uuid::new_v4(),
        start_date: day(1),
        end_date: day(7),
        created_at,
        updated_at: None,
        items,
    }
}

#[test]
fn repository_roundtrip_keeps_item_order_flags_and_sources() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlannerStore::try_new(&conn).unwrap();
    let mut zucchini = item("Zucchini", "pcs", "Légumes");
    zucchini.checked = true;
    let mut apple = item("Apple", "pcs", "Fruits");
    apple.canceled = true;
    let list = list_with(1_700_000_000_000, vec![zucchini, apple]);

    store.save_shopping_list(&list).unwrap();

    assert_eq!(store.load_shopping_list(list.id).unwrap(), Some(list));
    assert_eq!(store.load_shopping_list(Uuid::new_v4()).unwrap(), None);
}

#[test]
fn repository_save_preserves_created_at_on_replace() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlannerStore::try_new(&conn).unwrap();
    let mut list = list_with(100, vec![item("Rice", "g", "Épicerie")]);
    store.save_shopping_list(&list).unwrap();

    list.created_at = 999;
    list.updated_at = Some(200);
    list.items.clear();
    store.save_shopping_list(&list).unwrap();

    let loaded = store.load_shopping_list(list.id).unwrap().unwrap();
    assert_eq!(loaded.created_at, 100);
    assert_eq!(loaded.updated_at, Some(200));
    assert!(loaded.items.is_empty());
}

#[test]
fn repository_lists_newest_first_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlannerStore::try_new(&conn).unwrap();
    let older = list_with(100, vec![item("Rice", "g", "Épicerie")]);
    let newer = list_with(200, Vec::new());
    store.save_shopping_list(&older).unwrap();
    store.save_shopping_list(&newer).unwrap();

    let summaries = store.lists().list_shopping_lists().unwrap();
    let ids: Vec<Uuid> = summaries.iter().map(|summary| summary.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(summaries[1].item_count, 1);

    store.lists().delete_shopping_list(older.id).unwrap();
    assert!(store.load_shopping_list(older.id).unwrap().is_none());
    assert!(matches!(
        store.lists().delete_shopping_list(older.id).unwrap_err(),
        RepoError::NotFound { .. }
    ));
    let orphaned: i64 = conn
        .query_row("SELECT COUNT(*) FROM shopping_list_items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn item_flags_are_addressed_by_normalized_key() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let list = list_with(100, vec![item("Rice", "g", "Épicerie")]);
    service.store().save_shopping_list(&list).unwrap();

    service.set_item_checked(list.id, " RICE ", "g", true).unwrap();
    service.set_item_canceled(list.id, "rice", " g ", true).unwrap();

    let loaded = service.get(list.id).unwrap();
    assert!(loaded.items[0].checked && loaded.items[0].canceled);
    assert_eq!(loaded.created_at, 100);
    assert!(matches!(
        service.set_item_checked(list.id, "rice", "kg", true).unwrap_err(),
        PlanError::Persistence(RepoError::NotFound { .. })
    ));
}

#[test]
fn repository_rejects_inverted_range() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlannerStore::try_new(&conn).unwrap();
    let mut list = list_with(100, Vec::new());
    list.start_date = day(9);

    assert!(matches!(
        store.save_shopping_list(&list).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn failed_save_leaves_no_partial_list() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePlannerStore::try_new(&conn).unwrap();
    // Same key twice violates the per-list uniqueness of items.
    let list = list_with(100, vec![item("Rice", "g", "Épicerie"), item("rice", "g", "Épicerie")]);

    assert!(matches!(
        store.save_shopping_list(&list).unwrap_err(),
        RepoError::Db(_)
    ));
    assert!(store.load_shopping_list(list.id).unwrap().is_none());
    assert!(store.lists().list_shopping_lists().unwrap().is_empty());
}
