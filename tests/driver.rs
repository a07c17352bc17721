//! End-to-end tests for the driver: frontend -> passes -> backend.
use firrtlator::Firrtlator;
use std::io::Write;
use std::path::Path;

const SAMPLE: &str = "circuit c : @[c.fir 1:1]\n\
                      \x20 module m : @[c.fir 2:1]\n\
                      \x20   input a : UInt<1> @[c.fir 3:1]\n\
                      \x20   output b : UInt<1> @[c.fir 4:1]\n\
                      \x20   when a : @[c.fir 5:1]\n\
                      \x20     b <= UInt<1>(1) @[c.fir 6:1]\n\
                      \x20   else : @[c.fir 7:1]\n\
                      \x20     b <= UInt<1>(0) @[c.fir 8:1]\n";

/// The same source with every `@[...]` token removed.
fn strip_source_infos(source: &str) -> String {
    source
        .lines()
        .map(|line| match line.find(" @[") {
            Some(at) => &line[..at],
            None => line,
        })
        .map(|line| format!("{}\n", line))
        .collect()
}

fn emit(firrtlator: &mut Firrtlator, backend: &str) -> String {
    let mut buf = Vec::new();
    firrtlator.generate_to(backend, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn minimal_circuit_round_trips() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator
        .parse_str("min.fir", "circuit top :\n", "firrtl")
        .unwrap();
    let circuit = firrtlator.circuit().unwrap();
    assert_eq!(circuit.id, "top");
    assert!(circuit.modules.is_empty());
    assert!(circuit.info.is_none());
    assert_eq!(emit(&mut firrtlator, "firrtl"), "circuit top :\n");
}

#[test]
fn stripinfo_emits_the_annotation_free_source() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator.parse_str("c.fir", SAMPLE, "firrtl").unwrap();
    firrtlator.pass("stripinfo").unwrap();
    let stripped = emit(&mut firrtlator, "firrtl");

    let mut reference = Firrtlator::new().unwrap();
    reference
        .parse_str("c.fir", &strip_source_infos(SAMPLE), "firrtl")
        .unwrap();
    assert_eq!(stripped, emit(&mut reference, "firrtl"));
}

#[test]
fn stripinfo_is_idempotent() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator.parse_str("c.fir", SAMPLE, "firrtl").unwrap();
    firrtlator.pass("stripinfo").unwrap();
    let once = emit(&mut firrtlator, "firrtl");
    firrtlator.pass("stripinfo").unwrap();
    assert_eq!(once, emit(&mut firrtlator, "firrtl"));
}

#[test]
fn pass_and_generate_require_a_circuit() {
    let mut firrtlator = Firrtlator::new().unwrap();
    assert!(firrtlator.pass("stripinfo").is_err());
    let mut buf = Vec::new();
    assert!(firrtlator.generate_to("firrtl", &mut buf).is_err());
}

#[test]
fn a_failed_parse_poisons_the_circuit() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator
        .parse_str("ok.fir", "circuit top :\n", "firrtl")
        .unwrap();
    assert!(firrtlator.circuit().is_some());
    assert!(firrtlator
        .parse_str("bad.fir", "circuit top\n", "firrtl")
        .is_err());
    assert!(firrtlator.circuit().is_none());
    assert!(firrtlator.pass("stripinfo").is_err());
}

#[test]
fn unknown_plugins_fail_loudly() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator
        .parse_str("c.fir", "circuit top :\n", "firrtl")
        .unwrap();
    assert!(firrtlator.pass("widths").unwrap_err().is_registry());
    let mut buf = Vec::new();
    assert!(firrtlator
        .generate_to("verilog", &mut buf)
        .unwrap_err()
        .is_registry());
    assert!(firrtlator
        .parse_str("c.v", "module top;", "verilog")
        .unwrap_err()
        .is_registry());
}

#[test]
fn extensions_select_the_plugins() {
    let firrtlator = Firrtlator::new().unwrap();
    assert_eq!(
        firrtlator.frontend_for(Path::new("x.fir")).unwrap(),
        "firrtl"
    );
    assert_eq!(
        firrtlator.backend_for(Path::new("x.dot")).unwrap(),
        "dot"
    );
    assert_eq!(
        firrtlator.backend_for(Path::new("x.tree")).unwrap(),
        "tree"
    );
    assert!(firrtlator.backend_for(Path::new("x.v")).is_err());
    assert!(firrtlator.backend_for(Path::new("x")).is_err());
}

#[test]
fn file_to_file_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.fir");
    let mut f = std::fs::File::create(&input).unwrap();
    f.write_all(SAMPLE.as_bytes()).unwrap();
    drop(f);

    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator.parse_file(&input, None).unwrap();
    firrtlator.pass("stripinfo").unwrap();

    let fir_out = dir.path().join("out.fir");
    firrtlator.generate(&fir_out, None).unwrap();
    let emitted = std::fs::read_to_string(&fir_out).unwrap();
    assert!(emitted.starts_with("circuit c :\n"));
    assert!(!emitted.contains("@["));

    let dot_out = dir.path().join("out.dot");
    firrtlator.generate(&dot_out, None).unwrap();
    let dot = std::fs::read_to_string(&dot_out).unwrap();
    assert!(dot.starts_with("digraph c {"));

    let tree_out = dir.path().join("out.tree");
    firrtlator.generate(&tree_out, None).unwrap();
    let tree = std::fs::read_to_string(&tree_out).unwrap();
    assert!(tree.starts_with("(circuit) id=c"));
}

#[test]
fn missing_input_file_is_an_io_error() {
    let mut firrtlator = Firrtlator::new().unwrap();
    assert!(firrtlator
        .parse_file(Path::new("/nonexistent/x.fir"), None)
        .is_err());
}

#[test]
fn emitted_firrtl_parses_back_to_the_same_circuit() {
    let mut firrtlator = Firrtlator::new().unwrap();
    firrtlator.parse_str("c.fir", SAMPLE, "firrtl").unwrap();
    let emitted = emit(&mut firrtlator, "firrtl");
    let original = firrtlator.circuit().unwrap().clone();

    let mut again = Firrtlator::new().unwrap();
    again.parse_str("c2.fir", &emitted, "firrtl").unwrap();
    assert_eq!(&original, again.circuit().unwrap());
}
