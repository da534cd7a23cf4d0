use criterion::{Criterion, criterion_group, criterion_main};
use lambda_sql::{Bindings, parse};

const TESTS: [&str; 6] = [
    r#"|o| o.amount > 100 && o.status == "open""#,
    r#"|o| ids.contains(o.id)"#,
    r#"|o| (o.a == 1 || o.b == 2) && (o.c != 'x' || o.d <= -4.5)"#,
    r#"|o| ["a", "b", "c", "d", "e", "f", "g"].contains(o.code) && o.qty as f64 >= 2.5"#,
    r#"|o| o.createdAt"#,
    r#"|o| ((((((((((o.x > 0))))))))))"#,
];

fn parse_all(bindings: &Bindings) {
    for test in TESTS.iter() {
        _ = std::hint::black_box(parse(test, bindings));
    }
}

fn lex_all() {
    use lambda_sql::lex::Lexer;
    // we'll track the number of tokens seen to ensure that the loop below doesn't
    //  get optimized out
    let mut num_tokens: u64 = 0;
    for test in TESTS {
        let mut lexer = Lexer::new(test.as_bytes());
        loop {
            match lexer.next_token() {
                Ok(Some(_)) => num_tokens += 1,
                Ok(None) => break,
                Err(e) => panic!("Unexpected: {e}"),
            }
        }
    }
    std::hint::black_box(num_tokens);
}

fn criterion_benchmark(c: &mut Criterion) {
    let bindings = Bindings::new().with("ids", (0..100).collect::<Vec<i32>>());
    c.bench_function("lex closures", |b| b.iter(lex_all));
    c.bench_function("parse closures", |b| b.iter(|| parse_all(&bindings)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
