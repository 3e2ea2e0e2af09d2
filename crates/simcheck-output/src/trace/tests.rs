use super::*;

#[test]
fn test_parse_trace_entry_with_location() {
    let entry = TraceEntry::parse("Fetch: addi a0,a0,1 [fact.c:12]").unwrap();

    assert_eq!(entry.stage, Stage::Fetch);
    assert_eq!(entry.instruction, "addi a0,a0,1");
    assert_eq!(entry.file(), Some("fact.c"));
    assert_eq!(entry.line(), Some(12));
    assert!(entry.has_debug_info());
}

#[test]
fn test_parse_trace_entry_without_location() {
    let entry = TraceEntry::parse("Decode: add a1, a0, a2").unwrap();

    assert_eq!(entry.stage, Stage::Decode);
    assert_eq!(entry.instruction, "add a1, a0, a2");
    assert_eq!(entry.location, None);
}

#[test]
fn test_parse_trace_entry_all_stages() {
    for stage in Stage::ALL {
        let line = format!("{stage}: nop");
        let entry = TraceEntry::parse(&line).unwrap();
        assert_eq!(entry.stage, stage);
    }
}

#[test]
fn test_parse_trace_entry_surrounding_whitespace() {
    let entry = TraceEntry::parse("   Writeback:   sw ra,12(sp)   [crt0.S:7]  ").unwrap();
    assert_eq!(entry.stage, Stage::Writeback);
    assert_eq!(entry.instruction, "sw ra,12(sp)");
    assert_eq!(entry.line(), Some(7));
}

#[test]
fn test_parse_trace_entry_malformed_bracket() {
    // Not a crash and not dropped: the entry just has no debug info.
    let entry = TraceEntry::parse("Fetch: addi x1, x0, 1 [fact.c:abc]").unwrap();
    assert_eq!(entry.stage, Stage::Fetch);
    assert_eq!(entry.location, None);
    assert_eq!(entry.instruction, "addi x1, x0, 1 [fact.c:abc]");

    let entry = TraceEntry::parse("Fetch: addi x1, x0, 1 [fact.c]").unwrap();
    assert_eq!(entry.location, None);

    let entry = TraceEntry::parse("Execute: jal ra, 0x200 [main.c:12").unwrap();
    assert_eq!(entry.location, None);
}

#[test]
fn test_parse_trace_entry_line_overflow() {
    let entry = TraceEntry::parse("Fetch: nop [a.c:99999999999999999999999]").unwrap();
    assert_eq!(entry.location, None);
    assert_eq!(entry.instruction, "nop [a.c:99999999999999999999999]");
}

#[test]
fn test_parse_trace_entry_keeps_non_positive_lines() {
    let entry = TraceEntry::parse("Fetch: nop [a.S:0]").unwrap();
    assert_eq!(entry.line(), Some(0));

    let entry = TraceEntry::parse("Fetch: nop [a.S:-3]").unwrap();
    assert_eq!(entry.line(), Some(-3));
}

#[test]
fn test_parse_trace_rejects_non_trace_lines() {
    assert!(TraceEntry::parse("").is_none());
    assert!(TraceEntry::parse("Machine stopped on ECALL exception.").is_none());
    assert!(TraceEntry::parse("Fetch:").is_none());
    assert!(TraceEntry::parse("Fetching: nop").is_none());
    assert!(TraceEntry::parse("Retire: nop").is_none());
    assert!(TraceEntry::parse("cycles: 120").is_none());
}

#[test]
fn test_parse_trace_mixed_output_preserves_order() {
    let text = "\
QtRvSim banner
Fetch: addi a0,zero,5 [fact.S:3]
warning: something odd
Fetch: jal ra,fact [fact.S:4]
Fetch: ebreak
cycles: 42
";
    let entries = parse_trace(text);

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].instruction, "addi a0,zero,5");
    assert_eq!(entries[1].line(), Some(4));
    assert_eq!(entries[2].instruction, "ebreak");
    assert!(!entries[2].has_debug_info());
}

#[test]
fn test_parse_trace_empty() {
    assert!(parse_trace("").is_empty());
    assert!(parse_trace("R10:0x00000001\n").is_empty());
}

#[test]
fn test_trace_entry_display() {
    let entry = TraceEntry::parse("Fetch: addi a0,a0,1 [fact.c:12]").unwrap();
    assert_eq!(entry.to_string(), "Fetch: addi a0,a0,1 [fact.c:12]");
}

#[test]
fn test_stage_from_str() {
    assert_eq!("Memory".parse::<Stage>(), Ok(Stage::Memory));
    assert!("memory".parse::<Stage>().is_err());
}
