//! CLI parsing tests for the compile command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;
    use std::path::PathBuf;

    crate::cli_reject_test! {
        command: "compile",
        test_name: test_requires_file,
        args: [],
        mentions: "<FILE>",
    }

    crate::cli_parse_test! {
        command: "compile",
        variant: Compile,
        test_name: test_defaults,
        args: ["requests/person.json"],
        expect: {
            file: PathBuf::from("requests/person.json"),
            count: false,
        },
    }

    crate::cli_parse_test! {
        command: "compile",
        variant: Compile,
        test_name: test_with_count,
        args: ["request.json", "--count"],
        expect: { count: true },
    }

    crate::cli_reject_test! {
        command: "compile",
        test_name: test_rejects_unknown_flag,
        args: ["request.json", "--limit", "5"],
        mentions: "--limit",
    }
}
