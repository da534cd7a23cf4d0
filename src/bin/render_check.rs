use lambda_sql::{Bindings, RenderConfig, parse, translate::translate_with};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = if std::env::args().skip(1).any(|arg| arg == "--bind") {
        RenderConfig::bind()
    } else {
        RenderConfig::inline()
    };
    let bindings = Bindings::new();

    for line in std::io::stdin().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("failed to read input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let now = std::time::Instant::now();
        let res = render(&line, &bindings, &config);
        print!("[in {}μs] ", now.elapsed().as_micros());
        match res {
            Err(e) => println!("Error rendering input: {e}"),
            Ok(stmt) if stmt.params.is_empty() => println!("{}", stmt.sql),
            Ok(stmt) => println!("{} -- {:?}", stmt.sql, stmt.params),
        }
    }
}

fn render(
    line: &str,
    bindings: &Bindings,
    config: &RenderConfig,
) -> lambda_sql::Result<lambda_sql::Statement> {
    let expr = parse(line, bindings)?;
    tracing::debug!(%expr, "parsed");
    Ok(translate_with(&expr, config)?)
}
