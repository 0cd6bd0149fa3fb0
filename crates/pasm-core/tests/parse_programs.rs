//! Whole-program parsing scenarios and canonical form properties.

use pasm_core::{
    parse_source, AliasTable, ArgKind, Argument, InstructionDescriptor, ParseErrorKind,
    ParseOptions, Parser, Width,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn descriptor() -> InstructionDescriptor {
    [
        ("nop", vec![]),
        ("ret", vec![]),
        ("jmp", vec![ArgKind::Label]),
        ("call", vec![ArgKind::Label]),
        ("let", vec![ArgKind::Register, ArgKind::Register]),
        ("leti", vec![ArgKind::Register, ArgKind::Bytes(Width::Dword)]),
        ("set_mainwarp", vec![ArgKind::Bytes(Width::Dword)]),
        ("window_time", vec![ArgKind::Bytes(Width::Byte)]),
        ("bgm", vec![ArgKind::Bytes(Width::Word)]),
        ("message", vec![ArgKind::Bytes(Width::Dword), ArgKind::String]),
        ("fleti", vec![ArgKind::Register, ArgKind::Float]),
        ("HEX:", vec![ArgKind::Data]),
        ("switch_jmp", vec![ArgKind::Register, ArgKind::LabelArray]),
        ("switch_call", vec![ArgKind::Register, ArgKind::LabelArray]),
        ("set_qt_cancel", vec![ArgKind::Label]),
        ("va_start", vec![ArgKind::RegisterArray]),
        ("list", vec![ArgKind::Array]),
    ]
    .into_iter()
    .collect()
}

fn aliases() -> AliasTable {
    [("msg", "message"), ("leto", "let")].into_iter().collect()
}

fn parse(source: &str) -> Result<pasm_core::ParseOutput, pasm_core::ParseError> {
    parse_source(source, &descriptor(), &aliases(), &ParseOptions::default())
}

fn fixing() -> ParseOptions {
    ParseOptions {
        fix_labels: true,
        ..ParseOptions::default()
    }
}

#[test]
fn full_listing_renders_canonically() {
    let source = "\
// quest setup
0:      set_mainwarp 1
        leti R60, -1
        msg 0x2A, 'Hello!'   // greeting
        fleti R1, 1.5
        HEX: aa bb 0c
        switch_jmp R60, 2:1:2
1:      ret
2:      leto r3, R4
        window_time 10
        bgm 0x1f
";
    let output = parse(source).unwrap();

    let expected = [
        "0:      set_mainwarp 00000001",
        "        leti R60, FFFFFFFF",
        "        message 0000002A, 'Hello!'",
        "        fleti R1, 1.5",
        "        HEX: AA BB 0C",
        "        switch_jmp R60, 2:1:2",
        "1:      ret ",
        "2:      let r3, R4",
        "        window_time 0A",
        "        bgm 001F",
    ];
    let rendered = output.program.render();
    assert_eq!(rendered.lines().collect::<Vec<_>>(), expected);
    assert!(rendered.ends_with('\n'));
    assert!(output.warnings.is_empty());
}

#[test]
fn three_line_block_comment_is_skipped() {
    let source = "nop\n/* first\n   let R1, R2 and other noise\n   last */\n10: ret";
    let output = parse(source).unwrap();

    assert_eq!(output.program.len(), 2);
    assert_eq!(output.program.statements()[1].label(), Some(10));
}

#[test]
fn code_inside_block_comment_is_not_validated() {
    let source = "/*\nbogus R999, 'unterminated\n*/\nret";
    assert_eq!(parse(source).unwrap().program.len(), 1);
}

#[test]
fn redefined_label_fails_on_second_occurrence() {
    let error = parse("7: nop\njmp 7\n   7:  ret").unwrap_err();

    assert_eq!(error.kind, ParseErrorKind::LabelRedefined { label: 7 });
    assert_eq!(error.line, 3);
    assert_eq!(error.column, 3);
    assert_eq!(error.text, "   7:  ret");
}

#[test]
fn missing_label_warns_once() {
    let output = parse("jmp 50\ncall 50\n").unwrap();

    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].label, 50);
    assert!(!output.warnings[0].stub_added);
    assert_eq!(output.program.len(), 2);
}

#[test]
fn fix_mode_synthesizes_stub() {
    let output = parse_source("jmp 50", &descriptor(), &aliases(), &fixing()).unwrap();

    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].stub_added);
    assert_eq!(output.program.len(), 2);

    let stub = &output.program.statements()[1];
    assert_eq!(stub.label(), Some(50));
    assert_eq!(stub.opcode(), "ret");
    assert!(stub.arguments().is_empty());
}

#[test]
fn label_arrays_are_checked_but_register_arrays_are_not() {
    let source = "1: switch_call R0, 3:1:8:9\nva_start 2:200:201\n";
    let output = parse_source(source, &descriptor(), &aliases(), &fixing()).unwrap();

    let missing: Vec<u16> = output.warnings.iter().map(|w| w.label).collect();
    assert_eq!(missing, vec![8, 9]);
    assert_eq!(
        output.program.render(),
        "1:      switch_call R0, 3:1:8:9\n        va_start 2:200:201\n8:      ret \n9:      ret \n"
    );
}

#[test]
fn forward_references_resolve() {
    let output = parse("jmp 100\nset_qt_cancel 100\n100: ret").unwrap();
    assert!(output.warnings.is_empty());
}

#[rstest]
#[case("jmp x", ParseErrorKind::LabelFormat, 4)]
#[case("jmp 65536", ParseErrorKind::LabelRange { value: "65536".into() }, 4)]
#[case("70000: ret", ParseErrorKind::LabelRange { value: "70000".into() }, 0)]
#[case("12 ret", ParseErrorKind::LabelSyntax, 2)]
#[case("12:", ParseErrorKind::OpcodeMissing, 3)]
#[case("  frob R1", ParseErrorKind::OpcodeUnknown { opcode: "frob".into() }, 2)]
#[case("ret / note", ParseErrorKind::CommentFormat, 4)]
#[case("let R1, X2", ParseErrorKind::RegisterFormat { token: "X2".into() }, 8)]
#[case("let R256, R1", ParseErrorKind::RegisterRange { value: "256".into() }, 4)]
#[case("window_time 255", ParseErrorKind::ByteFormat { width: Width::Byte }, 12)]
#[case("fleti R1, 1e3", ParseErrorKind::FloatFormat, 10)]
#[case("list 0:1", ParseErrorKind::ArrayFormat { token: "0:1".into() }, 5)]
#[case("list 3:1:2", ParseErrorKind::ArrayCountMismatch { count: "3".into() }, 5)]
#[case("message 1, hello", ParseErrorKind::StringExpected, 11)]
#[case("message 1, 'abc", ParseErrorKind::StringUnterminated, 15)]
#[case("let R1 R2", ParseErrorKind::SeparatorExpected, 7)]
#[case("HEX: zz", ParseErrorKind::DataExpected, 5)]
fn single_line_errors(#[case] source: &str, #[case] kind: ParseErrorKind, #[case] column: usize) {
    let error = parse(source).unwrap_err();
    assert_eq!(error.kind, kind);
    assert_eq!(error.line, 1);
    assert_eq!(error.column, column);
}

#[test]
fn error_report_points_at_column() {
    let error = parse("nop\n\tlet R1 R2").unwrap_err();
    assert_eq!(
        error.report(),
        "Error line 2, position 8: Was expecting separator ','.\n\tlet R1 R2\n\t       ^"
    );
}

#[test]
fn crlf_lines_are_accepted() {
    let output = parse("nop\r\n1: ret\r\n").unwrap();
    assert_eq!(output.program.render(), "        nop \n1:      ret \n");
}

#[test]
fn parser_can_be_driven_line_by_line() {
    let descriptor = descriptor();
    let aliases = aliases();
    let mut parser = Parser::new(&descriptor, &aliases);

    for line in ["0: jmp 1", "/* skip", "*/", "1: jmp 2"] {
        parser.parse_line(line).unwrap();
    }
    let output = parser.finish(&fixing());

    assert_eq!(output.program.len(), 3);
    assert_eq!(output.program.statements()[2].label(), Some(2));
}

#[test]
fn quotes_next_to_backslashes_survive_rendering() {
    let output = parse("msg 0, \"a\\'\"").unwrap();
    let expected = Argument::String("a\\'".into());
    assert_eq!(output.program.statements()[0].arguments()[1], expected);

    let rendered = output.program.render();
    assert_eq!(rendered, "        message 00000000, 'a\\\\''\n");

    let again = parse(&rendered).unwrap();
    assert_eq!(again.program.statements()[0].arguments()[1], expected);
    assert_eq!(again.program.render(), rendered);
}

fn reparse(text: &str) -> String {
    parse(text).unwrap().program.render()
}

fn byte_hex() -> impl Strategy<Value = String> {
    // Canonical byte tokens that are read back as hex: a leading zero or a letter.
    any::<u8>()
        .prop_map(|b| format!("{b:02X}"))
        .prop_filter("reads back as hex", |hex| {
            hex.starts_with('0') || hex.chars().any(|c| c.is_ascii_alphabetic())
        })
}

proptest! {
    #[test]
    fn property_negative_decimals_wrap_to_width(n in 1u32..100) {
        let output = parse(&format!("window_time -{n}\nbgm -{n}\nset_mainwarp -{n}")).unwrap();
        let wrapped = (!n).wrapping_add(1);
        let rendered: Vec<String> = output.program.iter().map(|s| s.arguments()[0].to_string()).collect();

        prop_assert_eq!(&rendered[0], &format!("{:02X}", wrapped & 0xFF));
        prop_assert_eq!(&rendered[1], &format!("{:04X}", wrapped & 0xFFFF));
        prop_assert_eq!(&rendered[2], &format!("{wrapped:08X}"));
    }

    #[test]
    fn property_dword_decimal_is_zero_padded_hex(value in 0u32..100_000_000) {
        let output = parse(&format!("set_mainwarp {value}")).unwrap();
        let argument = &output.program.statements()[0].arguments()[0];
        prop_assert_eq!(argument.to_string(), format!("{value:08X}"));
    }

    #[test]
    fn property_arrays_with_matching_count_are_accepted(elements in prop::collection::vec(0u16..=u16::MAX, 1..8)) {
        let body: Vec<String> = elements.iter().map(ToString::to_string).collect();
        let token = format!("{}:{}", elements.len(), body.join(":"));
        let output = parse(&format!("list {token}")).unwrap();

        let Argument::Array(array) = &output.program.statements()[0].arguments()[0] else {
            panic!("expected an array argument");
        };
        prop_assert_eq!(array.count(), elements.len());
        prop_assert_eq!(array.values::<u16>().collect::<Vec<_>>(), elements);
    }

    #[test]
    fn property_render_is_idempotent(
        label in prop::option::of(0u16..=u16::MAX),
        register in 0u8..=255,
        dword in 0u32..0x1000_0000,
        byte in byte_hex(),
        text in "([ -~]{0,11}[ -\\[\\]-~])?",
        float in "-?[0-9]{1,3}\\.[0-9]{1,3}",
        data in prop::collection::vec(any::<u8>(), 1..6),
    ) {
        let prefix = label.map(|l| format!("{l}:")).unwrap_or_default();
        let quoted = text.replace('\'', "\\'");
        let data: Vec<String> = data.iter().map(|b| format!("{b:x}")).collect();
        let source = format!(
            "{prefix} leti r{register}, 0x{dword:x}\n\
             window_time {byte}\n\
             msg 0, '{quoted}'\n\
             fleti R0, {float}\n\
             HEX: {}\n",
            data.join(" ")
        );

        let once = reparse(&source);
        let twice = reparse(&once);
        prop_assert_eq!(once, twice);
    }
}
