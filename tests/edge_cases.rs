use ruleit::parse::{tokenize, ParseError};
use ruleit::{
    compile_source, CompileError, EngineConfig, ErrorKind, EvalError, Lexing, NodeSource, Record,
    RuleEngine, RuleitError, Verdict,
};

fn eval(source: &str, input: &Record) -> Result<Verdict, RuleitError> {
    let mut engine = RuleEngine::new();
    let rule = engine.compile(source, None)?;
    engine.evaluate(rule.id, input)
}

#[test]
fn empty_and_blank_input() {
    for source in ["", "   ", "\t\n"] {
        let err = compile_source(source, Lexing::Lenient).unwrap_err();
        assert!(matches!(err, CompileError::Parse(ParseError::EmptyInput)));
    }
}

#[test]
fn only_unrecognized_characters() {
    let err = compile_source("$#@", Lexing::Lenient).unwrap_err();
    assert!(matches!(err, CompileError::Parse(ParseError::EmptyInput)));
}

#[test]
fn lenient_lexing_drops_noise() {
    let input = Record::new().set("a", 5);
    assert_eq!(eval("a $> 3;", &input).unwrap(), Verdict::Bool(true));
}

#[test]
fn strict_lexing_reports_the_character() {
    let mut engine = RuleEngine::with_config(EngineConfig::strict());
    let err = engine.compile("a > 3;", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(
        err.to_string(),
        "parse error: unexpected character ';' at byte 5"
    );
}

#[test]
fn lone_operator_and_dangling_operand() {
    for source in ["AND", "a >", "> a"] {
        let err = compile_source(source, Lexing::Lenient).unwrap_err();
        assert!(
            matches!(err, CompileError::InsufficientOperands { .. }),
            "{source}: {err}"
        );
    }
}

#[test]
fn adjacent_operands_are_malformed() {
    let err = compile_source("a b > c", Lexing::Lenient).unwrap_err();
    assert!(matches!(err, CompileError::MalformedExpression { roots: 2 }));
}

#[test]
fn empty_parentheses() {
    assert!(compile_source("()", Lexing::Lenient).is_err());
}

#[test]
fn keyword_prefixes_are_identifiers() {
    let names: Vec<String> = tokenize("ORDER = ANDY")
        .map(|token| token.to_string())
        .collect();
    assert_eq!(names, vec!["ORDER", "=", "ANDY"]);

    let input = Record::new().set("ORDER", "x").set("ANDY", "x");
    assert_eq!(eval("ORDER = ANDY", &input).unwrap(), Verdict::Bool(true));
}

#[test]
fn lowercase_keywords_are_variables() {
    let err = compile_source("a and b", Lexing::Lenient).unwrap_err();
    assert!(matches!(err, CompileError::MalformedExpression { roots: 3 }));
}

#[test]
fn quoted_literals_keep_spaces_and_operators() {
    let input = Record::new().set("title", "R&D > Ops");
    assert_eq!(
        eval("title = 'R&D > Ops'", &input).unwrap(),
        Verdict::Bool(true)
    );
    assert_eq!(
        eval("title == \"R&D > Ops\"", &input).unwrap(),
        Verdict::Bool(true)
    );
}

#[test]
fn quoted_numbers_compare_numerically() {
    let input = Record::new().set("n", "7.0");
    assert_eq!(eval("n = '7'", &input).unwrap(), Verdict::Bool(true));
}

#[test]
fn text_comparison_is_a_coercion_error() {
    let input = Record::new().set("dept", "Sales");
    let err = eval("dept > 3", &input).unwrap_err();
    assert!(matches!(
        &err,
        RuleitError::Eval(EvalError::NotNumeric { value }) if value == "Sales"
    ));
    assert_eq!(err.kind(), ErrorKind::Coercion);
}

#[test]
fn modulo_by_zero() {
    let err = eval("x % 0", &Record::new().set("x", 4)).unwrap_err();
    assert!(matches!(err, RuleitError::Eval(EvalError::ModuloByZero)));
}

#[test]
fn zero_divisor_hidden_by_missing_data() {
    // unknown wins over the arithmetic error
    assert_eq!(
        eval("missing / 0", &Record::new()).unwrap(),
        Verdict::Unknown
    );
}

#[test]
fn short_circuit_skips_failing_branch() {
    let input = Record::new().set("dept", "Sales");
    assert_eq!(
        eval("dept = 'HR' AND dept > 3", &input).unwrap(),
        Verdict::Bool(false)
    );
    assert_eq!(
        eval("dept = 'Sales' OR dept > 3", &input).unwrap(),
        Verdict::Bool(true)
    );
    // XOR evaluates both sides, so the coercion failure surfaces
    assert!(eval("dept = 'Sales' XOR dept > 3", &input).is_err());
}

#[test]
fn arithmetic_result_is_numeric() {
    let input = Record::new().set("a", 2).set("b", 0.5);
    assert_eq!(eval("a * b - 1", &input).unwrap(), Verdict::Number(0.0));
}

#[test]
fn bare_literal_and_variable_rules() {
    assert_eq!(
        eval("'hello'", &Record::new()).unwrap(),
        Verdict::Text("hello".into())
    );
    assert_eq!(eval("42", &Record::new()).unwrap(), Verdict::Text("42".into()));
    assert_eq!(eval("who", &Record::new()).unwrap(), Verdict::Unknown);
}

#[test]
fn long_chain_within_depth_limit() {
    let source = vec!["x"; 300].join(" + ");
    let total = eval(&source, &Record::new().set("x", 1)).unwrap();
    assert_eq!(total, Verdict::Number(300.0));
}

#[test]
fn chain_beyond_depth_limit_fails_cleanly() {
    let source = vec!["x"; 2000].join(" + ");
    let err = eval(&source, &Record::new().set("x", 1)).unwrap_err();
    assert!(matches!(
        err,
        RuleitError::Eval(EvalError::DepthExceeded { limit: 512 })
    ));
}

#[test]
fn deep_parentheses() {
    let source = format!("{}a{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(
        eval(&source, &Record::new().set("a", "v")).unwrap(),
        Verdict::Text("v".into())
    );
}

#[test]
fn decimal_literals() {
    let input = Record::new().set("rate", 0.25);
    assert_eq!(eval("rate < 0.3", &input).unwrap(), Verdict::Bool(true));
    assert_eq!(eval("rate >= 0.25", &input).unwrap(), Verdict::Bool(true));
}

#[test]
fn very_deep_chain_still_renders() {
    let terms = 200_000;
    let source = vec!["x"; terms].join(" + ");
    let ast = compile_source(&source, Lexing::Lenient).unwrap().ast;
    assert!(matches!(
        ast.evaluate(&Record::new().set("x", 1)),
        Err(EvalError::DepthExceeded { limit: 512 })
    ));

    let text = ast.to_string();
    assert_eq!(text.matches('x').count(), terms);
    assert_eq!(text.matches('(').count(), terms - 1);

    let mut engine = RuleEngine::new();
    let rule = engine.compile(&source, Some("deep")).unwrap();
    assert_eq!(engine.store().display(rule.root).to_string(), text);
    assert!(engine.render("deep").is_err());
}
