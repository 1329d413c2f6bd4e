//! Statement rendering and paging tests

use crate::query_builder::{Page, PageRequest, Sort, SortOrder, Statement, StatementKind};
use crate::validation::{Identifier, ValidatedTableName, ValidationError};

fn users() -> ValidatedTableName {
    ValidatedTableName::new("users").unwrap()
}

#[test]
fn test_basic_statement_text() {
    assert_eq!(Statement::select_all(&users()).text(), "SELECT * FROM users");
    assert_eq!(
        Statement::count(&users()).text(),
        "SELECT count(*) AS count FROM users"
    );
    assert_eq!(Statement::delete_all(&users()).text(), "DELETE FROM users");
}

#[test]
fn test_sorted_and_paged_select() {
    let sort = Sort::asc("last_name").and("age", SortOrder::Desc);
    let statement = Statement::select_all(&users())
        .order_by(&sort)
        .unwrap()
        .limit(10)
        .offset(20);

    assert_eq!(
        statement.text(),
        "SELECT * FROM users ORDER BY last_name ASC, age DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(statement.sort_keys().len(), 2);
    assert_eq!(statement.limit_value(), Some(10));
    assert_eq!(statement.offset_value(), Some(20));
}

#[test]
fn test_same_statement_renders_same_key() {
    let a = Statement::select_all(&users()).order_by(&Sort::desc("name")).unwrap();
    let b = Statement::select_all(&users()).order_by(&Sort::desc("name")).unwrap();
    assert_eq!(a.text(), b.text());
}

#[test]
fn test_sort_fields_are_validated() {
    let result = Statement::select_all(&users()).order_by(&Sort::asc("name; DELETE FROM users"));
    assert!(matches!(
        result,
        Err(ValidationError::InvalidCharacters { .. })
    ));
}

#[test]
fn test_native_statement() {
    let statement = Statement::native("  SELECT name FROM users WHERE age > 30 ").unwrap();
    assert_eq!(statement.kind(), StatementKind::Native);
    assert_eq!(statement.text(), "SELECT name FROM users WHERE age > 30");
    assert!(statement.table().is_none());

    assert_eq!(
        Statement::native("   ").unwrap_err(),
        ValidationError::Empty(Identifier::Statement)
    );
}

#[test]
fn test_page_request_offsets() {
    let request = PageRequest::of(3, 25);
    assert_eq!(request.offset(), 75);
    assert_eq!(request.next().page, 4);
    assert!(Sort::unsorted().is_unsorted());
}

#[test]
fn test_page_arithmetic() {
    let request = PageRequest::of(0, 10);
    let page = Page::new(vec![1, 2, 3], &request, 21);

    assert_eq!(page.total_pages(), 3);
    assert!(page.has_next());
    assert!(!page.has_previous());

    let last = Page::new(vec![21], &PageRequest::of(2, 10), 21);
    assert!(!last.has_next());
    assert!(last.has_previous());

    let doubled = page.map(|n| n * 2);
    assert_eq!(doubled.content, vec![2, 4, 6]);
}

#[test]
fn test_last_possible_page_does_not_overflow() {
    let request = PageRequest::of(u64::MAX, 10);
    assert_eq!(request.next().page, u64::MAX);
    assert_eq!(request.offset(), u64::MAX);

    let page = Page::new(Vec::<u8>::new(), &request, u64::MAX);
    assert!(!page.has_next());
    assert!(page.has_previous());
}
