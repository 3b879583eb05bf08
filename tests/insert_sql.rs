use stockpile::storage::questdb::build_insert_sql;

#[test]
fn single_row_statement() {
    let sql = build_insert_sql(1).expect("sql");
    assert_eq!(
        sql,
        "INSERT INTO stock_prices (timestamp, symbol, open, high, low, close, volume) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)"
    );
}

#[test]
fn batch_is_one_statement_covering_all_rows() {
    let sql = build_insert_sql(3).expect("sql");
    assert_eq!(sql.matches("VALUES").count(), 1);
    assert_eq!(sql.matches('(').count(), 4); // column list + 3 row tuples
    assert!(sql.ends_with("($15, $16, $17, $18, $19, $20, $21)"));
}

#[test]
fn empty_batch_builds_nothing() {
    assert!(build_insert_sql(0).is_none());
}
