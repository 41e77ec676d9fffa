use sqlite_returning::SqlReturningError;
use sqlite_returning::statement::marker::{self, MARKER_DELIMITER};
use sqlite_returning::statement::{Operation, RowReference, Statement, delete, insert, update};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn insert_shapes() -> TestResult {
    let stmt = insert("users", &["name", "email"], &["id"])?;
    assert_eq!(stmt.sql(), "INSERT INTO \"users\" (\"name\", \"email\") VALUES (?1, ?2)");
    assert_eq!(
        stmt.to_sql(),
        format!(
            "INSERT INTO \"users\" (\"name\", \"email\") VALUES (?1, ?2){MARKER_DELIMITER}INSERT users,id"
        )
    );

    let stmt = insert::<&str, &str>("users", &[], &["id"])?;
    assert!(stmt.sql().ends_with("DEFAULT VALUES"));
    assert_eq!(stmt.sql(), "INSERT INTO \"users\" DEFAULT VALUES");
    Ok(())
}

#[test]
fn update_numbers_where_after_set() -> TestResult {
    let stmt = update("users", &["name", "email"], &["id", "tenant"], &["name"])?;
    assert_eq!(
        stmt.sql(),
        "UPDATE \"users\" SET \"name\" = ?1, \"email\" = ?2 WHERE \"id\" = ?3 AND \"tenant\" = ?4"
    );
    Ok(())
}

#[test]
fn delete_restarts_numbering() -> TestResult {
    let stmt = delete("users", &["id", "tenant"], &["name"])?;
    assert_eq!(stmt.sql(), "DELETE FROM \"users\" WHERE \"id\" = ?1 AND \"tenant\" = ?2");
    Ok(())
}

#[test]
fn no_returning_means_no_marker() -> TestResult {
    let none: &[&str] = &[];
    let statements = [
        insert("users", &["name"], none)?,
        insert::<&str, &str>("users", &[], none)?,
        update("users", &["name"], &["id"], none)?,
        delete("users", &["id"], none)?,
    ];
    for stmt in statements {
        assert!(stmt.returning().is_none());
        let text = stmt.to_sql();
        assert_eq!(text, stmt.sql());
        assert!(!marker::has_marker(&text));
    }
    Ok(())
}

#[test]
fn marker_round_trips_through_codec() -> TestResult {
    let cases = [
        (insert("users", &["name"], &["id", "name"])?, Operation::Insert),
        (update("users", &["name"], &["id"], &["name"])?, Operation::Update),
        (delete("users", &["id"], &["name", "id"])?, Operation::Delete),
        (insert("user accounts", &["full name"], &["full name"])?, Operation::Insert),
    ];
    for (stmt, operation) in cases {
        let text = stmt.to_sql();
        assert!(marker::has_marker(&text));

        let (real_sql, tail) = marker::split(&text)?;
        assert_eq!(real_sql, stmt.sql());

        let parsed = marker::parse(tail)?;
        let requested = stmt.returning().ok_or("returning requested")?;
        assert_eq!(parsed.operation(), operation);
        assert_eq!(parsed.table(), requested.table());
        assert_eq!(parsed.columns(), requested.columns());
        assert_eq!(&parsed, requested);

        assert_eq!(Statement::from_sql(&text)?, stmt);
    }

    // Identifiers the marker cannot carry are refused instead of round-tripping wrong.
    let delimiter = MARKER_DELIMITER.trim();
    let unsafe_columns = ["a,b", "id ", " id", "\tid", delimiter];
    for column in unsafe_columns {
        assert!(
            matches!(
                insert("users", &["name"], &[column]),
                Err(SqlReturningError::MarkerFormat(_))
            ),
            "column {column:?} was accepted"
        );
    }
    for table in ["users,admins", "users "] {
        assert!(matches!(
            delete(table, &["id"], &["id"]),
            Err(SqlReturningError::MarkerFormat(_))
        ));
    }
    Ok(())
}

#[test]
fn blank_returning_column_is_rejected() {
    for blank in ["", "   "] {
        assert!(matches!(
            insert("users", &["name"], &[blank]),
            Err(SqlReturningError::MarkerFormat(_))
        ));
        assert!(matches!(
            update("users", &["name"], &["id"], &["id", blank]),
            Err(SqlReturningError::MarkerFormat(_))
        ));
        assert!(matches!(
            delete("users", &["id"], &[blank]),
            Err(SqlReturningError::MarkerFormat(_))
        ));
    }
    // Field and filter identifiers are only quoted, never validated.
    let stmt = insert("users", &["a,b"], &["id"]).unwrap();
    assert_eq!(stmt.sql(), "INSERT INTO \"users\" (\"a,b\") VALUES (?1)");
}

#[test]
fn row_reference_follows_operation() {
    assert_eq!(Operation::Insert.row_reference(), RowReference::New);
    assert_eq!(Operation::Update.row_reference(), RowReference::New);
    assert_eq!(Operation::Delete.row_reference(), RowReference::Old);
}
