use rusqlite::Connection;
use staffbook_core::db::open_db_in_memory;
use staffbook_core::{
    DepartmentRepository, EmployeeRepository, EmployeeValidationError, RepoError,
    SqliteDepartmentRepository, SqliteEmployeeRepository,
};

#[test]
fn create_persists_and_populates_the_id() {
    let conn = open_db_in_memory().unwrap();
    let department_id = seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let employee = employees.create("Lee", "Manager", department_id).unwrap();

    assert!(employee.id().is_some());
    assert_eq!(employee.name(), "Lee");
    assert_eq!(employee.job_title(), "Manager");
    assert_eq!(employee.department_id(), department_id);
}

#[test]
fn create_with_unknown_department_fails_before_any_insert() {
    let conn = open_db_in_memory().unwrap();
    seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let err = employees.create("Lee", "Manager", 404).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Employee(EmployeeValidationError::UnknownDepartment { department_id: 404 })
    ));
    assert_eq!(employee_row_count(&conn), 0);
}

#[test]
fn empty_name_and_job_title_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let department_id = seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let err = employees.create("", "Manager", department_id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Employee(EmployeeValidationError::EmptyName)
    ));

    let err = employees.create("Lee", "", department_id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Employee(EmployeeValidationError::EmptyJobTitle)
    ));
}

#[test]
fn update_persists_in_place_changes() {
    let conn = open_db_in_memory().unwrap();
    let department_id = seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let mut employee = employees.create("Lee", "Manager", department_id).unwrap();
    let id = employee.id().unwrap();

    employee.set_job_title("Director").unwrap();
    employees.update(&employee).unwrap();

    employees.clear_cache();
    let reloaded = employees.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.borrow().job_title(), "Director");
}

#[test]
fn delete_removes_the_row_and_detaches_the_record() {
    let conn = open_db_in_memory().unwrap();
    let department_id = seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let mut employee = employees.create("Lee", "Manager", department_id).unwrap();
    let old_id = employee.id().unwrap();

    employees.delete(&mut employee).unwrap();

    assert_eq!(employee.id(), None);
    assert!(employees.find_by_id(old_id).unwrap().is_none());

    let err = employees.delete(&mut employee).unwrap_err();
    assert!(matches!(err, RepoError::NotPersisted { entity: "employee" }));
}

#[test]
fn find_by_name_returns_the_first_match() {
    let conn = open_db_in_memory().unwrap();
    let department_id = seed_department(&conn);
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    employees.create("Lee", "Manager", department_id).unwrap();
    employees.create("Ada", "Engineer", department_id).unwrap();

    let found = employees.find_by_name("Ada").unwrap().unwrap();
    assert_eq!(found.borrow().job_title(), "Engineer");
    assert!(employees.find_by_name("Nobody").unwrap().is_none());
}

#[test]
fn find_by_department_scopes_to_one_department() {
    let conn = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentRepository::try_new(&conn).unwrap();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let payroll = departments.create("Payroll", "Building A").unwrap();
    let engineering = departments.create("Engineering", "Building B").unwrap();
    let payroll_id = payroll.id().unwrap();
    let engineering_id = engineering.id().unwrap();

    employees.create("Lee", "Manager", payroll_id).unwrap();
    employees.create("Ada", "Engineer", engineering_id).unwrap();
    employees.create("Grace", "Engineer", engineering_id).unwrap();

    let staff = employees.find_by_department(engineering_id).unwrap();
    assert_eq!(staff.len(), 2);
    for employee in &staff {
        assert_eq!(employee.borrow().department_id(), engineering_id);
    }
}

fn seed_department(conn: &Connection) -> i64 {
    let departments = SqliteDepartmentRepository::try_new(conn).unwrap();
    let department = departments.create("Payroll", "Building A").unwrap();
    department.id().unwrap()
}

fn employee_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap()
}
