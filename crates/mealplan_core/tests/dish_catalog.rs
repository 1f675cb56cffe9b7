use mealplan_core::db::open_db_in_memory;
use mealplan_core::repo::dish_repo::{DishRepository, SqliteDishRepository};
use mealplan_core::repo::menu_repo::{MenuRepository, SqliteMenuRepository};
use mealplan_core::{
    Dish, DishComponent, DishService, DishSource, IngredientLine, MealType, MenuAssignment,
    ModelValidationError, PlanError, Recipe, RepoError,
};
use chrono::NaiveDate;

fn tomato_salad() -> Dish {
    Dish::standalone(
        "salad",
        "Tomato salad",
        2,
        vec![
            IngredientLine::new("Tomato", 4.0, "pcs"),
            IngredientLine::new("Olive oil", 20.0, "ml").with_notes("extra virgin"),
        ],
    )
}

fn chicken() -> Dish {
    Dish::standalone(
        "chicken",
        "Roast chicken",
        1,
        vec![IngredientLine::new("Chicken", 1.0, "pcs")],
    )
}

#[test]
fn standalone_dish_roundtrip_keeps_lines_and_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();

    repo.save_dish(&tomato_salad()).unwrap();

    let loaded = repo.get_dish("salad").unwrap().unwrap();
    assert_eq!(loaded, tomato_salad());
    match &loaded.source {
        DishSource::Standalone { ingredients } => {
            assert_eq!(ingredients[1].notes.as_deref(), Some("extra virgin"));
        }
        other => panic!("unexpected source: {other:?}"),
    }
}

#[test]
fn composite_components_load_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();
    repo.save_dish(&tomato_salad()).unwrap();
    repo.save_dish(&chicken()).unwrap();

    let menu = Dish::composite(
        "menu",
        "Sunday menu",
        vec![
            DishComponent::new("chicken", 1, 5),
            DishComponent::new("salad", 2, 1),
        ],
    );
    repo.save_dish(&menu).unwrap();

    let loaded = repo.get_dish("menu").unwrap().unwrap();
    let ids: Vec<&str> = loaded
        .components_in_order()
        .iter()
        .map(|component| component.contained_dish_id.as_str())
        .collect();
    assert_eq!(ids, vec!["salad", "chicken"]);
    assert_eq!(repo.list_parent_dish_ids("salad").unwrap(), vec!["menu"]);
}

#[test]
fn saving_again_replaces_components() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();
    repo.save_dish(&tomato_salad()).unwrap();
    repo.save_dish(&chicken()).unwrap();

    let mut menu = Dish::composite(
        "menu",
        "Menu",
        vec![
            DishComponent::new("salad", 1, 0),
            DishComponent::new("chicken", 1, 1),
        ],
    );
    repo.save_dish(&menu).unwrap();
    menu.source = DishSource::Composite {
        components: vec![DishComponent::new("chicken", 3, 0)],
    };
    repo.save_dish(&menu).unwrap();

    let loaded = repo.get_dish("menu").unwrap().unwrap();
    assert_eq!(loaded, menu);
    assert!(repo.list_parent_dish_ids("salad").unwrap().is_empty());
}

#[test]
fn recipe_roundtrip_and_missing_recipe() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();
    let recipe = Recipe::new(
        "r-soup",
        "Soup",
        4,
        vec![IngredientLine::new("Carrot", 8.0, "pcs")],
    );

    repo.save_recipe(&recipe).unwrap();

    assert_eq!(repo.get_recipe("r-soup").unwrap(), Some(recipe));
    assert_eq!(repo.get_recipe("r-missing").unwrap(), None);
}

#[test]
fn repository_rejects_invalid_dish_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();
    let broken = Dish::standalone(
        "bad",
        "Bad",
        1,
        vec![IngredientLine::new("Salt", -1.0, "g")],
    );

    let err = repo.save_dish(&broken).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.get_dish("bad").unwrap().is_none());
}

#[test]
fn service_rejects_unknown_component() {
    let conn = open_db_in_memory().unwrap();
    let service = DishService::new(SqliteDishRepository::try_new(&conn).unwrap());

    let menu = Dish::composite("menu", "Menu", vec![DishComponent::new("ghost", 1, 0)]);
    let err = service.save_dish(&menu).unwrap_err();

    assert!(matches!(err, PlanError::DishNotFound(id) if id == "ghost"));
}

#[test]
fn service_rejects_edit_that_closes_a_cycle() {
    let conn = open_db_in_memory().unwrap();
    let service = DishService::new(SqliteDishRepository::try_new(&conn).unwrap());
    service.save_dish(&chicken()).unwrap();
    service
        .save_dish(&Dish::composite(
            "b",
            "B",
            vec![DishComponent::new("chicken", 1, 0)],
        ))
        .unwrap();
    service
        .save_dish(&Dish::composite("a", "A", vec![DishComponent::new("b", 1, 0)]))
        .unwrap();

    let closing = Dish::composite(
        "b",
        "B",
        vec![
            DishComponent::new("chicken", 1, 0),
            DishComponent::new("a", 1, 1),
        ],
    );
    let err = service.save_dish(&closing).unwrap_err();

    match err {
        PlanError::CompositionCycle(path) => assert_eq!(path, vec!["b", "a", "b"]),
        other => panic!("unexpected error: {other}"),
    }
    let stored = service.get_dish("b").unwrap();
    assert_eq!(stored.components_in_order().len(), 1);
}

#[test]
fn self_containing_composite_is_rejected_on_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDishRepository::try_new(&conn).unwrap();
    let looped = Dish::composite("menu", "Menu", vec![DishComponent::new("menu", 1, 0)]);

    assert!(matches!(
        repo.save_dish(&looped).unwrap_err(),
        RepoError::Validation(ModelValidationError::SelfReference(_))
    ));
    let service = DishService::new(repo);
    assert!(matches!(
        service.save_dish(&looped).unwrap_err(),
        PlanError::Validation(ModelValidationError::SelfReference(id)) if id == "menu"
    ));
}

#[test]
fn service_maps_zero_component_quantity_to_invalid_quantity() {
    let conn = open_db_in_memory().unwrap();
    let service = DishService::new(SqliteDishRepository::try_new(&conn).unwrap());
    service.save_dish(&chicken()).unwrap();

    let menu = Dish::composite("menu", "Menu", vec![DishComponent::new("chicken", 0, 0)]);

    assert!(matches!(
        service.save_dish(&menu).unwrap_err(),
        PlanError::InvalidQuantity(_)
    ));
}

#[test]
fn delete_refuses_dish_still_in_use() {
    let conn = open_db_in_memory().unwrap();
    let service = DishService::new(SqliteDishRepository::try_new(&conn).unwrap());
    let menu_repo = SqliteMenuRepository::try_new(&conn).unwrap();
    service.save_dish(&chicken()).unwrap();
    service
        .save_dish(&Dish::composite(
            "menu",
            "Menu",
            vec![DishComponent::new("chicken", 1, 0)],
        ))
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    menu_repo
        .add_assignment(&MenuAssignment::new(date, MealType::Dinner, "chicken", 2))
        .unwrap();

    match service.delete_dish("chicken", &menu_repo).unwrap_err() {
        PlanError::DishInUse {
            dish_id,
            parent_ids,
            assignment_count,
        } => {
            assert_eq!(dish_id, "chicken");
            assert_eq!(parent_ids, vec!["menu"]);
            assert_eq!(assignment_count, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    service.delete_dish("menu", &menu_repo).unwrap();
    assert!(matches!(
        service.get_dish("menu").unwrap_err(),
        PlanError::DishNotFound(_)
    ));
}

#[test]
fn list_dishes_orders_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = DishService::new(SqliteDishRepository::try_new(&conn).unwrap());
    service.save_dish(&tomato_salad()).unwrap();
    service.save_dish(&chicken()).unwrap();

    let names: Vec<String> = service
        .list_dishes()
        .unwrap()
        .into_iter()
        .map(|dish| dish.name)
        .collect();
    assert_eq!(names, vec!["Roast chicken", "Tomato salad"]);
}
