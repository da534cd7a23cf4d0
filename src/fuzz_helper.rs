use crate::{
    parser::{Bindings, parse},
    to_sql::RenderConfig,
    translate::{column_name, translate_with},
};

// A few names for closure text to refer to
fn bindings() -> Bindings {
    let mut bindings = Bindings::new();
    bindings
        .bind("ids", vec![1, 2, 3])
        .bind("codes", ["a", "b'c"])
        .bind("empty", Vec::<i32>::new())
        .bind("min", 10)
        .bind("smallest", i64::MIN)
        .bind("huge", 1e300)
        .bind("nan", f64::NAN)
        .bind("name", "O'Brien")
        .bind("nothing", Option::<i32>::None)
        .bind(
            "since",
            chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap_or_default(),
        );
    bindings
}

/// Parses closure text and renders it every way the library can, ignoring
///  errors. Only a panic is a failure.
pub fn translate_expr(expr: &str) {
    let Ok(parsed) = parse(expr, &bindings()) else {
        return;
    };

    _ = translate_with(&parsed, &RenderConfig::inline());
    if let Ok(stmt) = translate_with(&parsed, &RenderConfig::bind()) {
        // Every placeholder has exactly one parameter
        assert_eq!(stmt.sql.matches('?').count(), stmt.params.len());
    }
    _ = column_name(&parsed);
    _ = parsed.to_string();
}
