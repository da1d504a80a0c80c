mod execute;

use clap::Args;

use crate::query::value::Argument;

/// Compile a derived repository method name into a statement
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  n1ql_compiler derive findByFirstname -e Person -a Oliver
  n1ql_compiler derive findByAgeBetween -e Person -a 18 -a 65
  n1ql_compiler derive findByLastnameIn -e Person -a '[\"a\", \"b\"]'
  n1ql_compiler derive findByGender -e Person -a '{\"enum\": \"FEMALE\"}'
  n1ql_compiler derive findByAgeOrderByFirstname -e Person -a 30 --page 2 --size 20 --count")]
pub struct DeriveCmd {
    /// Repository method name, e.g. findByLastnameAndAgeLessThan
    pub method: String,

    /// Mapped entity the method belongs to
    #[arg(short, long)]
    pub entity: String,

    /// Method argument as JSON, repeated in parameter order. Text that is not
    /// valid JSON is taken as a string.
    #[arg(short = 'a', long = "arg", value_parser = parse_argument, allow_hyphen_values = true)]
    pub args: Vec<Argument>,

    /// Zero-based page number
    #[arg(long, requires = "size")]
    pub page: Option<u64>,

    /// Page size
    #[arg(long, requires = "page", value_parser = clap::value_parser!(u64).range(1..))]
    pub size: Option<u64>,

    /// Also emit the count statement for the same criteria
    #[arg(long, default_value_t = false)]
    pub count: bool,
}

fn parse_argument(raw: &str) -> Result<Argument, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Argument::from(raw)))
}
