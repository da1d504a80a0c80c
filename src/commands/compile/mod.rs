mod cli_tests;
mod execute;

use clap::Args;
use std::path::PathBuf;

/// Compile a JSON request file (predicate tree or derived method)
#[derive(Args, Debug)]
#[command(after_help = "\
Request files are tagged by front end:

  {\"kind\": \"derived\", \"entity\": \"Person\", \"method\": \"findByAgeLessThan\", \"args\": [21]}

  {\"kind\": \"predicate\", \"entity\": \"Person\",
   \"where\": {\"operation\": {\"op\": \"eq\", \"args\": [{\"path\": \"firstname\"}, {\"constant\": \"Oliver\"}]}},
   \"sort\": [{\"property\": \"age\", \"direction\": \"desc\"}], \"limit\": 10}

Examples:
  n1ql_compiler compile request.json
  n1ql_compiler compile request.json --count --format json")]
pub struct CompileCmd {
    /// Path to the JSON request file
    pub file: PathBuf,

    /// Also emit the count statement for the same criteria
    #[arg(long, default_value_t = false)]
    pub count: bool,
}
