//! CLI seed entry point.
//!
//! # Responsibility
//! - Provide a minimal executable that seeds demo HR records and prints
//!   them, verifying `staffbook_core` wiring end to end.
//! - Keep output deterministic for quick local sanity checks.

use staffbook_core::{
    default_log_level, init_logging, open_db_in_memory, DepartmentRepository, EmployeeRepository,
    RepoResult, ReviewRepository, SqliteDepartmentRepository, SqliteEmployeeRepository,
    SqliteReviewRepository,
};

fn main() {
    let log_dir = std::env::temp_dir().join("staffbook-logs");
    if let Some(log_dir) = log_dir.to_str() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("staffbook_core version={}", staffbook_core::core_version());
    if let Err(err) = seed_and_print() {
        eprintln!("seed failed: {err}");
        std::process::exit(1);
    }
}

fn seed_and_print() -> RepoResult<()> {
    let conn = open_db_in_memory()?;
    let departments = SqliteDepartmentRepository::try_new(&conn)?;
    let employees = SqliteEmployeeRepository::try_new(&conn)?;
    let reviews = SqliteReviewRepository::try_new(&conn)?;

    let payroll = departments.create("Payroll", "Building A, 5th Floor")?;
    let hr = departments.create("Human Resources", "Building C, East Wing")?;
    let payroll_id = payroll.id().unwrap_or_default();
    let hr_id = hr.id().unwrap_or_default();

    let lee = employees.create("Lee", "Manager", payroll_id)?;
    let sasha = employees.create("Sasha", "Benefits Coordinator", hr_id)?;
    let lee_id = lee.id().unwrap_or_default();
    let sasha_id = sasha.id().unwrap_or_default();

    reviews.create(2023, "Efficient worker", lee_id)?;
    reviews.create(2022, "Great work ethic", sasha_id)?;
    reviews.create(2023, "Developing well as a team lead", sasha_id)?;

    for department in departments.get_all()? {
        println!("{}", department.borrow());
    }
    for employee in employees.get_all()? {
        println!("{}", employee.borrow());
    }
    for review in reviews.get_all()? {
        println!("{}", review.borrow());
    }

    Ok(())
}
