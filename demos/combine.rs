//! Run with `RUST_LOG=ruleit=debug cargo run --example combine` to see the
//! engine's events.

use ruleit::{Page, Record, RuleEngine};

fn main() -> Result<(), ruleit::RuleitError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut engine = RuleEngine::new();
    engine.compile("age > 30 AND department = 'Sales'", Some("senior_sales"))?;
    engine.compile("salary >= 50000 OR experience > 5", Some("well_paid"))?;
    engine.combine(
        Some("outlier"),
        &["age > 30", "age < 25"],
        &["XOR"],
    )?;

    for rule in engine.rules(Page::default()) {
        let label = rule.name.as_deref().unwrap_or("-");
        println!("#{} {label}: {}", rule.id, engine.render(rule.id)?);
    }

    let people = [
        Record::new()
            .set("age", 40)
            .set("department", "Sales")
            .set("salary", 42000)
            .set("experience", 9),
        Record::new().set("age", 28).set("department", "HR"),
        Record::new().set("salary", 61000),
    ];

    for (i, person) in people.iter().enumerate() {
        for name in ["senior_sales", "well_paid", "outlier"] {
            println!("person {i} {name}: {}", engine.evaluate(name, person)?);
        }
    }

    // a rule that cannot be evaluated reports why
    let ratio = engine.compile("done / total", None)?;
    let empty = Record::new().set("done", 3).set("total", 0);
    match engine.evaluate(ratio.id, &empty) {
        Ok(verdict) => println!("ratio: {verdict}"),
        Err(err) => println!("ratio failed ({:?}): {err}", err.kind()),
    }

    Ok(())
}
