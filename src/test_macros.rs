//! Declarative macros for generating CLI parsing, execute and output tests.
//!
//! Instead of writing repetitive test functions, declare the test cases and
//! let the macro generate the actual test code.

// =============================================================================
// CLI Test Macros
// =============================================================================

/// Parse `n1ql_compiler <command> <args..>` and check fields of the parsed command.
///
/// Fields left out of `expect` are not checked, so the same form covers
/// defaults and explicit options.
#[macro_export]
macro_rules! cli_parse_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),* $(,)?],
        expect: { $($field:ident : $expected:expr),+ $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let args = Args::try_parse_from(["n1ql_compiler", $cmd $(, $arg)*]).unwrap();
            let crate::commands::Command::$variant(cmd) = args.command else {
                panic!(concat!("expected the ", $cmd, " command"));
            };
            $(
                assert_eq!(cmd.$field, $expected, concat!("field ", stringify!($field)));
            )+
        }
    };
}

/// Check that `n1ql_compiler <command> <args..>` is rejected, optionally
/// naming `mentions` in the error.
#[macro_export]
macro_rules! cli_reject_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),* $(,)?]
        $(, mentions: $needle:literal)? $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["n1ql_compiler", $cmd $(, $arg)*]);
            assert!(result.is_err(), concat!($cmd, " should reject these arguments"));
            $(
                let err = result.unwrap_err().to_string();
                assert!(err.contains($needle), "error: {}", err);
            )?
        }
    };
}

// =============================================================================
// Execute Test Macros
// =============================================================================

/// Generate a test that executes a command against a config fixture.
///
/// # Example
/// ```ignore
/// execute_test! {
///     test_name: test_simple_property,
///     fixture: config,
///     cmd: DeriveCmd { .. },
///     assertions: |result| {
///         assert!(result.query.statement.contains("`firstname` = $1"));
///     },
/// }
/// ```
#[macro_export]
macro_rules! execute_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        cmd: $cmd:expr,
        assertions: |$result:ident| $body:block $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: crate::config::ConfigFile) {
            use crate::commands::Execute;
            let $result = $cmd.execute(&$fixture).expect("Execute should succeed");
            $body
        }
    };
}

/// Generate a test that verifies command execution fails with a message.
#[macro_export]
macro_rules! execute_error_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        cmd: $cmd:expr,
        message_contains: $needle:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: crate::config::ConfigFile) {
            use crate::commands::Execute;
            let err = $cmd.execute(&$fixture).expect_err("Execute should fail");
            assert!(
                err.to_string().contains($needle),
                "error '{}' should contain '{}'",
                err,
                $needle
            );
        }
    };
}

// =============================================================================
// Output Test Macros
// =============================================================================

/// Generate a test that verifies text output matches expected string.
#[macro_export]
macro_rules! output_text_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            assert_eq!($fixture.to_text(), $expected);
        }
    };
}

/// Generate a test that verifies JSON output is valid and contains expected fields.
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Json);
            let parsed: serde_json::Value = serde_json::from_str(&output)
                .expect("Should produce valid JSON");
            $(
                assert_eq!(parsed[$field], $expected, concat!("JSON field mismatch: ", $field));
            )*
        }
    };
}

/// Generate a test that verifies Toon output contains expected strings.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), concat!("Toon output should contain: ", $needle));
            )*
        }
    };
}
