#![no_main]

use libfuzzer_sys::fuzz_target;
use pasm_core::{AliasTable, ArgKind, InstructionDescriptor, ParseOptions, Parser, Width};

fn descriptor() -> InstructionDescriptor {
    [
        ("ret", vec![]),
        ("jmp", vec![ArgKind::Label]),
        ("leti", vec![ArgKind::Register, ArgKind::Bytes(Width::Dword)]),
        ("set_floor", vec![ArgKind::Bytes(Width::Byte), ArgKind::Float]),
        ("message", vec![ArgKind::Bytes(Width::Word), ArgKind::String]),
        ("HEX:", vec![ArgKind::Data]),
        ("switch_jmp", vec![ArgKind::Register, ArgKind::LabelArray]),
        ("jmp_on", vec![ArgKind::Label, ArgKind::RegisterArray]),
        ("list", vec![ArgKind::Array]),
    ]
    .into_iter()
    .collect()
}

fuzz_target!(|data: &[u8]| {
    let descriptor = descriptor();
    let aliases: AliasTable = [("msg", "message")].into_iter().collect();
    let source = String::from_utf8_lossy(data);

    let mut parser = Parser::new(&descriptor, &aliases);
    for line in source.lines() {
        if let Err(error) = parser.parse_line(line) {
            let _ = error.report();
            return;
        }
    }

    let options = ParseOptions {
        fix_labels: true,
        ..ParseOptions::default()
    };
    let output = parser.finish(&options);

    // Rendered output always parses again, stubs included.
    let rendered = output.program.render();
    let reparsed = pasm_core::parse_source(&rendered, &descriptor, &aliases, &options)
        .expect("rendered program must parse");
    assert_eq!(reparsed.program.len(), output.program.len());
    assert!(reparsed.warnings.is_empty());
});
