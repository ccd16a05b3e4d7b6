//! Integration tests for the IPPcode22 VM, driven by source text through the
//! loader.

use ippvm_common::{ExitCode, Program, Value, VarRef};
use ippvm_vm::{Halt, RuntimeError, StatKind, VM};

// ============================================================
// Helper functions
// ============================================================

fn program(body: &str) -> Program {
    ippvm_loader::load(&format!(".IPPcode22\n{body}")).expect("test program must load")
}

/// Run `body` with `input` on stdin; returns the outcome and stdout.
fn run_io(body: &str, input: &str) -> (Result<Halt, RuntimeError>, String) {
    let program = program(body);
    let mut out = Vec::new();
    let result = VM::new(&program)
        .with_input(input.as_bytes())
        .with_output(&mut out)
        .with_diagnostics(std::io::sink())
        .execute();
    (result, String::from_utf8(out).expect("utf-8 output"))
}

fn run_ok(body: &str) -> String {
    let (result, out) = run_io(body, "");
    result.expect("program should succeed");
    out
}

fn run_err(body: &str) -> RuntimeError {
    run_io(body, "").0.expect_err("program should fail")
}

fn exit_code(body: &str) -> ExitCode {
    run_err(body).exit_code()
}

fn var(text: &str) -> VarRef {
    text.parse().expect("valid variable reference")
}

// ============================================================
// Frames and variables
// ============================================================

#[test]
fn undeclared_read_is_undefined_variable() {
    assert_eq!(exit_code("WRITE GF@x"), ExitCode::UndefinedVariable);
}

#[test]
fn declared_unwritten_read_is_missing_value() {
    assert_eq!(exit_code("DEFVAR GF@x\nWRITE GF@x"), ExitCode::MissingValue);
}

#[test]
fn redefinition_is_semantic_error() {
    let err = run_err("DEFVAR GF@x\nDEFVAR GF@x");
    assert_eq!(err.exit_code(), ExitCode::Semantic);
    assert_eq!(err.at(), 2);
}

#[test]
fn missing_frames() {
    assert_eq!(exit_code("DEFVAR LF@x"), ExitCode::UndefinedFrame);
    assert_eq!(exit_code("DEFVAR TF@x"), ExitCode::UndefinedFrame);
    assert_eq!(exit_code("PUSHFRAME"), ExitCode::UndefinedFrame);
    assert_eq!(exit_code("POPFRAME"), ExitCode::UndefinedFrame);
}

#[test]
fn move_into_undeclared_fails() {
    assert_eq!(exit_code("MOVE GF@x int@1"), ExitCode::UndefinedVariable);
}

#[test]
fn frame_lifecycle() {
    let out = run_ok(
        "CREATEFRAME
         DEFVAR TF@a
         MOVE TF@a string@local
         PUSHFRAME
         WRITE LF@a
         POPFRAME
         WRITE TF@a",
    );
    assert_eq!(out, "locallocal");
}

#[test]
fn createframe_discards_staged_frame() {
    assert_eq!(
        exit_code("CREATEFRAME\nDEFVAR TF@a\nMOVE TF@a int@1\nCREATEFRAME\nWRITE TF@a"),
        ExitCode::UndefinedVariable
    );
}

// ============================================================
// Arithmetic
// ============================================================

#[test]
fn integer_and_promoted_addition() {
    assert_eq!(run_ok("DEFVAR GF@r\nADD GF@r int@3 int@4\nWRITE GF@r"), "7");
    assert_eq!(
        run_ok("DEFVAR GF@r\nADD GF@r int@3 float@4.0\nWRITE GF@r"),
        "0x1.c000000000000p+2"
    );
}

#[test]
fn division_results() {
    assert_eq!(run_ok("DEFVAR GF@r\nIDIV GF@r int@-7 int@2\nWRITE GF@r"), "-4");
    assert_eq!(
        run_ok("DEFVAR GF@r\nDIV GF@r int@7 int@2\nWRITE GF@r"),
        "0x1.c000000000000p+1"
    );
}

#[test]
fn division_by_zero() {
    assert_eq!(
        exit_code("DEFVAR GF@r\nIDIV GF@r int@1 int@0"),
        ExitCode::OperandValue
    );
    assert_eq!(
        exit_code("DEFVAR GF@r\nIDIV GF@r int@1 float@0x0p+0"),
        ExitCode::OperandValue
    );
    assert_eq!(
        exit_code("DEFVAR GF@r\nDIV GF@r float@1.5 float@0.0"),
        ExitCode::OperandValue
    );
}

#[test]
fn division_by_zero_before_target_lookup() {
    let (result, out) = run_io(
        "DEFVAR GF@x
         MOVE GF@x int@10
         DEFVAR GF@y
         MOVE GF@y int@0
         IDIV GF@z GF@x GF@y",
        "",
    );
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::OperandValue);
    assert_eq!(err.at(), 5);
    assert_eq!(out, "");
}

#[test]
fn arithmetic_on_string_is_type_error() {
    let err = run_err("DEFVAR GF@r\nADD GF@r int@1 string@a");
    assert_eq!(err.exit_code(), ExitCode::OperandType);
    assert!(err.to_string().contains("ADD accepts only int, float"));
}

#[test]
fn invalid_literal_is_malformed() {
    assert_eq!(
        exit_code("DEFVAR GF@r\nADD GF@r int@x1 int@1"),
        ExitCode::MalformedProgram
    );
}

// ============================================================
// Relational and boolean operators
// ============================================================

#[test]
fn equality_with_nil() {
    assert_eq!(run_ok("DEFVAR GF@r\nEQ GF@r nil@nil nil@nil\nWRITE GF@r"), "true");
    assert_eq!(run_ok("DEFVAR GF@r\nEQ GF@r nil@nil int@0\nWRITE GF@r"), "false");
}

#[test]
fn equality_across_kinds_is_type_error() {
    assert_eq!(
        exit_code("DEFVAR GF@r\nEQ GF@r int@1 string@1"),
        ExitCode::OperandType
    );
}

#[test]
fn ordering_rules() {
    assert_eq!(run_ok("DEFVAR GF@r\nLT GF@r bool@false bool@true\nWRITE GF@r"), "true");
    assert_eq!(run_ok("DEFVAR GF@r\nGT GF@r string@b string@abc\nWRITE GF@r"), "true");
    assert_eq!(exit_code("DEFVAR GF@r\nLT GF@r nil@nil nil@nil"), ExitCode::OperandType);
    assert_eq!(exit_code("DEFVAR GF@r\nGT GF@r int@1 float@1.0"), ExitCode::OperandType);
}

#[test]
fn boolean_operators() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@r
             AND GF@r bool@true bool@false
             WRITE GF@r
             OR GF@r bool@true bool@false
             WRITE GF@r
             NOT GF@r GF@r
             WRITE GF@r"
        ),
        "falsetruefalse"
    );
    assert_eq!(exit_code("DEFVAR GF@r\nNOT GF@r int@1"), ExitCode::OperandType);
}

// ============================================================
// Strings and conversions
// ============================================================

#[test]
fn write_decodes_escapes() {
    assert_eq!(run_ok("WRITE string@a\\010"), "a\n");
    assert_eq!(run_ok("WRITE string@x\\032y\\035"), "x y#");
}

#[test]
fn write_renders_each_kind() {
    assert_eq!(
        run_ok("WRITE int@-5\nWRITE bool@true\nWRITE nil@nil\nWRITE float@0.5"),
        "-5true0x1.0000000000000p-1"
    );
}

#[test]
fn string_operations() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@s
             DEFVAR GF@n
             CONCAT GF@s string@hel string@lo
             STRLEN GF@n GF@s
             WRITE GF@n
             GETCHAR GF@n GF@s int@1
             WRITE GF@n
             SETCHAR GF@s int@0 string@Jx
             WRITE GF@s
             STRI2INT GF@n GF@s int@0
             WRITE GF@n"
        ),
        "5eJello74"
    );
}

#[test]
fn string_index_out_of_range() {
    assert_eq!(
        exit_code("DEFVAR GF@r\nGETCHAR GF@r string@abc int@3"),
        ExitCode::StringOperation
    );
    assert_eq!(
        exit_code("DEFVAR GF@r\nSTRI2INT GF@r string@abc int@-1"),
        ExitCode::StringOperation
    );
    assert_eq!(
        exit_code("DEFVAR GF@s\nMOVE GF@s string@abc\nSETCHAR GF@s int@0 string@"),
        ExitCode::StringOperation
    );
}

#[test]
fn setchar_needs_initialized_string() {
    assert_eq!(
        exit_code("DEFVAR GF@s\nSETCHAR GF@s int@0 string@a"),
        ExitCode::MissingValue
    );
    assert_eq!(
        exit_code("DEFVAR GF@s\nMOVE GF@s int@1\nSETCHAR GF@s int@0 string@a"),
        ExitCode::OperandType
    );
}

#[test]
fn conversions() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@r
             INT2CHAR GF@r int@65
             WRITE GF@r
             INT2FLOAT GF@r int@2
             WRITE GF@r
             FLOAT2INT GF@r float@-2.75
             WRITE GF@r"
        ),
        "A0x1.0000000000000p+1-2"
    );
    assert_eq!(
        exit_code("DEFVAR GF@r\nINT2CHAR GF@r int@1114112"),
        ExitCode::StringOperation
    );
    assert_eq!(exit_code("DEFVAR GF@r\nFLOAT2INT GF@r float@inf"), ExitCode::OperandValue);
}

#[test]
fn type_reports_kinds() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@t
             DEFVAR GF@u
             TYPE GF@t GF@u
             WRITE GF@t
             WRITE string@|
             TYPE GF@t GF@u
             WRITE GF@t
             WRITE string@|
             TYPE GF@t float@1.0
             WRITE GF@t
             TYPE GF@t GF@t
             WRITE GF@t"
        ),
        "||floatstring"
    );
}

// ============================================================
// Input
// ============================================================

#[test]
fn read_each_kind() {
    let (result, out) = run_io(
        "DEFVAR GF@v
         READ GF@v int
         WRITE GF@v
         READ GF@v bool
         WRITE GF@v
         READ GF@v string
         WRITE GF@v
         READ GF@v float
         WRITE GF@v",
        "42\nTRUE\nhello world\n0x1.8p+1\n",
    );
    result.unwrap();
    assert_eq!(out, "42truehello world0x1.8000000000000p+1");
}

#[test]
fn read_bad_line_or_eof_is_nil() {
    let (result, out) = run_io(
        "DEFVAR GF@v
         DEFVAR GF@t
         READ GF@v int
         TYPE GF@t GF@v
         WRITE GF@t
         READ GF@v bool
         WRITE GF@v
         READ GF@v string
         TYPE GF@t GF@v
         WRITE GF@t",
        "abc\nyes\n",
    );
    result.unwrap();
    assert_eq!(out, "nilfalsenil");
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn call_returns_after_call_site() {
    assert_eq!(
        run_ok(
            "JUMP main
             LABEL greet
             WRITE string@hi
             RETURN
             LABEL main
             CALL greet
             WRITE string@!
             CALL greet"
        ),
        "hi!hi"
    );
}

#[test]
fn return_on_empty_call_stack() {
    assert_eq!(exit_code("RETURN"), ExitCode::MissingValue);
}

#[test]
fn undefined_label() {
    let err = run_err("WRITE int@1\nJUMP nowhere");
    assert_eq!(err.exit_code(), ExitCode::Semantic);
    assert_eq!(err.at(), 2);
}

#[test]
fn duplicate_label_detected_before_execution() {
    let (result, out) = run_io("WRITE int@1\nLABEL a\nLABEL a", "");
    assert_eq!(result.unwrap_err().exit_code(), ExitCode::Semantic);
    assert_eq!(out, "");
}

#[test]
fn conditional_loop() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@i
             MOVE GF@i int@0
             LABEL loop
             WRITE GF@i
             ADD GF@i GF@i int@1
             JUMPIFNEQ loop GF@i int@3
             JUMPIFEQ done GF@i int@3
             WRITE string@unreachable
             LABEL done"
        ),
        "012"
    );
}

#[test]
fn jumpifeq_nil_against_any_kind() {
    assert_eq!(
        run_ok("JUMPIFEQ skip nil@nil string@x\nWRITE string@ran\nLABEL skip"),
        "ran"
    );
    assert_eq!(
        exit_code("JUMPIFEQ skip int@1 bool@true\nLABEL skip"),
        ExitCode::OperandType
    );
}

#[test]
fn exit_codes_and_range() {
    let (result, out) = run_io("WRITE int@1\nEXIT int@7\nWRITE int@2", "");
    assert_eq!(result, Ok(Halt::Exit(7)));
    assert_eq!(out, "1");
    assert_eq!(exit_code("EXIT int@50"), ExitCode::OperandValue);
    assert_eq!(exit_code("EXIT int@-1"), ExitCode::OperandValue);
    assert_eq!(exit_code("EXIT string@0"), ExitCode::OperandType);
}

#[test]
fn empty_program_finishes() {
    assert_eq!(run_io("", "").0, Ok(Halt::Finished));
}

// ============================================================
// Operand stack
// ============================================================

#[test]
fn stack_addition_into_variable() {
    let program = program("DEFVAR GF@r\nPUSHS int@2\nPUSHS int@3\nADDS\nPOPS GF@r");
    let mut vm = VM::new(&program).with_output(std::io::sink());
    vm.execute().unwrap();
    assert_eq!(vm.frames().read(&var("GF@r")), Ok(&Value::Int(5)));
    assert!(vm.stack().is_empty());
}

#[test]
fn stack_operand_order() {
    assert_eq!(
        run_ok("DEFVAR GF@r\nPUSHS int@7\nPUSHS int@2\nSUBS\nPOPS GF@r\nWRITE GF@r"),
        "5"
    );
    assert_eq!(
        run_ok("DEFVAR GF@r\nPUSHS string@ab\nPUSHS int@1\nSTRI2INTS\nPOPS GF@r\nWRITE GF@r"),
        "98"
    );
}

#[test]
fn stack_underflow() {
    let err = run_err("PUSHS int@1\nADDS");
    assert_eq!(err.exit_code(), ExitCode::MissingValue);
    assert_eq!(exit_code("DEFVAR GF@r\nPOPS GF@r"), ExitCode::MissingValue);
    assert_eq!(exit_code("NOTS"), ExitCode::MissingValue);
}

#[test]
fn clears_empties_stack() {
    assert_eq!(
        exit_code("DEFVAR GF@r\nPUSHS int@1\nPUSHS int@2\nCLEARS\nPOPS GF@r"),
        ExitCode::MissingValue
    );
}

#[test]
fn stack_jumps_and_comparisons() {
    assert_eq!(
        run_ok(
            "DEFVAR GF@r
             PUSHS int@1
             PUSHS int@1
             JUMPIFEQS same
             WRITE string@no
             LABEL same
             PUSHS int@1
             PUSHS int@2
             LTS
             NOTS
             POPS GF@r
             WRITE GF@r"
        ),
        "false"
    );
}

/// Run `body` and return the operand stack it leaves behind.
fn stack_after(body: &str) -> Vec<Value> {
    let program = program(body);
    let mut vm = VM::new(&program)
        .with_input(std::io::empty())
        .with_output(std::io::sink());
    vm.execute().expect("program should succeed");
    vm.stack().to_vec()
}

#[test]
fn stack_arithmetic_variants() {
    assert_eq!(
        stack_after("PUSHS int@9\nPUSHS int@6\nPUSHS int@7\nMULS"),
        vec![Value::Int(9), Value::Int(42)]
    );
    assert_eq!(stack_after("PUSHS int@7\nPUSHS int@2\nIDIVS"), vec![Value::Int(3)]);
    assert_eq!(stack_after("PUSHS int@-7\nPUSHS int@2\nIDIVS"), vec![Value::Int(-4)]);
    assert_eq!(stack_after("PUSHS int@1\nPUSHS int@4\nDIVS"), vec![Value::Float(0.25)]);
    assert_eq!(
        stack_after("PUSHS float@3.0\nPUSHS int@2\nDIVS"),
        vec![Value::Float(1.5)]
    );
}

#[test]
fn stack_relational_and_boolean_variants() {
    assert_eq!(stack_after("PUSHS int@3\nPUSHS int@2\nGTS"), vec![Value::Bool(true)]);
    assert_eq!(stack_after("PUSHS int@2\nPUSHS int@3\nGTS"), vec![Value::Bool(false)]);
    assert_eq!(
        stack_after("PUSHS bool@true\nPUSHS bool@false\nANDS"),
        vec![Value::Bool(false)]
    );
    assert_eq!(
        stack_after("PUSHS bool@false\nPUSHS bool@true\nORS"),
        vec![Value::Bool(true)]
    );
    assert_eq!(
        exit_code("PUSHS int@1\nPUSHS bool@true\nANDS"),
        ExitCode::OperandType
    );
}

#[test]
fn stack_conversion_variants() {
    assert_eq!(
        stack_after("PUSHS int@65\nINT2CHARS"),
        vec![Value::String("A".into())]
    );
    assert_eq!(stack_after("PUSHS int@2\nINT2FLOATS"), vec![Value::Float(2.0)]);
    assert_eq!(stack_after("PUSHS float@2.75\nFLOAT2INTS"), vec![Value::Int(2)]);
    assert_eq!(exit_code("PUSHS int@-1\nINT2CHARS"), ExitCode::StringOperation);
    assert_eq!(exit_code("PUSHS float@1.0\nINT2FLOATS"), ExitCode::OperandType);
}

#[test]
fn stack_jump_if_not_equal() {
    assert_eq!(
        run_ok("PUSHS nil@nil\nPUSHS int@0\nJUMPIFNEQS differ\nWRITE string@same\nLABEL differ\nWRITE string@end"),
        "end"
    );
    assert_eq!(
        run_ok("PUSHS nil@nil\nPUSHS nil@nil\nJUMPIFNEQS differ\nWRITE string@same\nLABEL differ"),
        "same"
    );
    assert_eq!(
        exit_code("PUSHS int@1\nPUSHS string@1\nJUMPIFNEQS l\nLABEL l"),
        ExitCode::OperandType
    );
    assert!(stack_after("PUSHS int@1\nPUSHS int@2\nJUMPIFNEQS l\nLABEL l").is_empty());
}

#[test]
fn stack_variants_check_depth() {
    for op in ["MULS", "IDIVS", "DIVS", "GTS", "ANDS", "ORS", "JUMPIFNEQS l\nLABEL l"] {
        let body = format!("PUSHS int@1\n{op}");
        assert_eq!(exit_code(&body), ExitCode::MissingValue, "{op}");
    }
    for op in ["INT2CHARS", "INT2FLOATS", "FLOAT2INTS"] {
        assert_eq!(exit_code(op), ExitCode::MissingValue, "{op}");
    }
}

#[test]
fn stack_division_by_zero() {
    assert_eq!(exit_code("PUSHS int@1\nPUSHS int@0\nDIVS"), ExitCode::OperandValue);
    assert_eq!(exit_code("PUSHS float@1.0\nPUSHS float@0.0\nDIVS"), ExitCode::OperandValue);
    assert_eq!(exit_code("PUSHS int@1\nPUSHS int@0\nIDIVS"), ExitCode::OperandValue);
}

#[test]
fn default_input_leaves_stdin_unlocked() {
    let program = program("WRITE string@ok");
    let stdin = std::io::stdin();
    let lock = stdin.lock();
    let mut out = Vec::new();
    let halt = VM::new(&program)
        .with_input(lock)
        .with_output(&mut out)
        .execute();
    assert_eq!(halt, Ok(Halt::Finished));
    assert_eq!(out, b"ok");
}

// ============================================================
// Stats and debugging
// ============================================================

#[test]
fn stats_counts() {
    let program = program(
        "DEFVAR GF@i
         MOVE GF@i int@0
         LABEL loop
         ADD GF@i GF@i int@1
         DPRINT GF@i
         JUMPIFNEQ loop GF@i int@4
         CREATEFRAME
         DEFVAR TF@a
         DEFVAR TF@b
         BREAK",
    );
    let mut vm = VM::new(&program)
        .with_output(std::io::sink())
        .with_diagnostics(std::io::sink())
        .with_stats();
    vm.execute().unwrap();
    let stats = vm.stats().unwrap();
    // DEFVAR, MOVE, 4 x (ADD, JUMPIFNEQ), CREATEFRAME, 2 x DEFVAR
    assert_eq!(stats.insts(), 13);
    // ADD and JUMPIFNEQ both ran 4 times; LABEL and DPRINT never count.
    assert_eq!(stats.hot(), 4);
    assert_eq!(stats.vars(), 3);
    assert_eq!(
        stats.report(&[StatKind::Vars, StatKind::Insts]),
        "3\n13\n"
    );
}

#[test]
fn dprint_and_break_write_diagnostics() {
    let program = program("DEFVAR GF@x\nMOVE GF@x string@a\\032b\nPUSHS int@1\nDPRINT GF@x\nBREAK");
    let mut diagnostics = Vec::new();
    let mut out = Vec::new();
    VM::new(&program)
        .with_output(&mut out)
        .with_diagnostics(&mut diagnostics)
        .execute()
        .unwrap();
    let text = String::from_utf8(diagnostics).unwrap();
    assert!(text.starts_with("a b\n"));
    assert!(text.contains("BREAK at instruction 5 (order 5), 4 executed"));
    assert!(text.contains("operand stack: [int@1]"));
    assert!(text.contains("GF: x=string@a\\032b"));
    assert!(text.contains("TF: (undefined)"));
    assert!(out.is_empty());
}
