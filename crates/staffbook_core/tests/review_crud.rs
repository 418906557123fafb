use rusqlite::Connection;
use staffbook_core::db::open_db_in_memory;
use staffbook_core::{
    DepartmentRepository, EmployeeRepository, RepoError, ReviewRepository,
    ReviewValidationError, SqliteDepartmentRepository, SqliteEmployeeRepository,
    SqliteReviewRepository,
};

#[test]
fn create_persists_and_populates_the_id() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let review = reviews.create(2023, "Good work", employee_id).unwrap();

    assert!(review.id().is_some());
    assert_eq!(review.year(), 2023);
    assert_eq!(review.summary(), "Good work");
    assert_eq!(review.employee_id(), employee_id);
    assert_eq!(review_row_count(&conn), 1);
}

#[test]
fn create_with_unknown_employee_fails_before_any_insert() {
    let conn = open_db_in_memory().unwrap();
    seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let err = reviews.create(2023, "Good work", 404).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Review(ReviewValidationError::UnknownEmployee { employee_id: 404 })
    ));
    assert_eq!(review_row_count(&conn), 0, "validation must run before SQL");
}

#[test]
fn save_is_a_silent_noop_for_persisted_records() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = reviews.create(2023, "Good work", employee_id).unwrap();
    let first_id = review.id();

    reviews.save(&mut review).unwrap();

    assert_eq!(review.id(), first_id);
    assert_eq!(review_row_count(&conn), 1);
}

#[test]
fn update_persists_in_place_changes() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = reviews.create(2023, "Good work", employee_id).unwrap();
    let id = review.id().unwrap();

    review.set_summary("Excellent work").unwrap();
    review.set_year(2024).unwrap();
    reviews.update(&review).unwrap();

    // Fresh materialization, as another session would see it.
    reviews.clear_cache();
    let reloaded = reviews.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.borrow().summary(), "Excellent work");
    assert_eq!(reloaded.borrow().year(), 2024);
}

#[test]
fn update_on_unsaved_record_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let review = reviews.new_review(2023, "Good work", employee_id).unwrap();
    let err = reviews.update(&review).unwrap_err();
    assert!(matches!(err, RepoError::NotPersisted { entity: "review" }));
}

#[test]
fn delete_removes_the_row_and_detaches_the_record() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = reviews.create(2023, "Good work", employee_id).unwrap();
    let old_id = review.id().unwrap();

    reviews.delete(&mut review).unwrap();

    assert_eq!(review.id(), None);
    assert!(reviews.find_by_id(old_id).unwrap().is_none());
    assert_eq!(review_row_count(&conn), 0);
}

#[test]
fn delete_on_unsaved_record_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = reviews.new_review(2023, "Good work", employee_id).unwrap();
    let err = reviews.delete(&mut review).unwrap_err();
    assert!(matches!(err, RepoError::NotPersisted { entity: "review" }));
}

#[test]
fn deleted_record_can_be_saved_again_as_a_new_row() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    let mut review = reviews.create(2023, "Good work", employee_id).unwrap();
    let old_id = review.id().unwrap();
    reviews.delete(&mut review).unwrap();

    reviews.save(&mut review).unwrap();

    let new_id = review.id().unwrap();
    assert_ne!(new_id, old_id);
    assert_eq!(review_row_count(&conn), 1);
    let reloaded = reviews.find_by_id(new_id).unwrap().unwrap();
    assert_eq!(reloaded.borrow().summary(), "Good work");
}

#[test]
fn get_all_round_trips_every_stored_row() {
    let conn = open_db_in_memory().unwrap();
    let employee_id = seed_employee(&conn);
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    reviews.create(2021, "Settled in quickly", employee_id).unwrap();
    reviews.create(2022, "Good work", employee_id).unwrap();
    reviews.create(2023, "Ready for promotion", employee_id).unwrap();

    let all = reviews.get_all().unwrap();
    assert_eq!(all.len(), 3);

    let summaries: Vec<String> = all
        .iter()
        .map(|review| review.borrow().summary().to_string())
        .collect();
    assert!(summaries.contains(&"Settled in quickly".to_string()));
    assert!(summaries.contains(&"Good work".to_string()));
    assert!(summaries.contains(&"Ready for promotion".to_string()));
    for review in &all {
        assert_eq!(review.borrow().employee_id(), employee_id);
        assert!(review.borrow().year() >= 2021);
    }
}

#[test]
fn find_by_employee_returns_only_that_employees_reviews() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_employee(&conn);
    let second = {
        let departments = SqliteDepartmentRepository::try_new(&conn).unwrap();
        let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
        let department = departments.create("Engineering", "Building B").unwrap();
        let employee = employees
            .create("Ada", "Engineer", department.id().unwrap())
            .unwrap();
        employee.id().unwrap()
    };
    let reviews = SqliteReviewRepository::try_new(&conn).unwrap();

    reviews.create(2022, "Good work", first).unwrap();
    reviews.create(2023, "Strong delivery", second).unwrap();
    reviews.create(2024, "Strong mentorship", second).unwrap();

    let for_second = reviews.find_by_employee(second).unwrap();
    assert_eq!(for_second.len(), 2);
    for review in &for_second {
        assert_eq!(review.borrow().employee_id(), second);
    }
}

fn seed_employee(conn: &Connection) -> i64 {
    let departments = SqliteDepartmentRepository::try_new(conn).unwrap();
    let employees = SqliteEmployeeRepository::try_new(conn).unwrap();
    let department = departments.create("Payroll", "Building A").unwrap();
    let employee = employees
        .create("Lee", "Manager", department.id().unwrap())
        .unwrap();
    employee.id().unwrap()
}

fn review_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))
        .unwrap()
}
