use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "selodir",
    version,
    about = "terminal directory browser for Selo Verde company datasets",
    long_about = "Selodir fetches a JSON array of company records and renders it as a filterable card directory: batch output to the terminal or a file, or a full-screen interactive browser.\n\nExamples:\n  selodir -u https://selo.example/data/companies.json\n  selodir -u https://selo.example/data/companies.json -s Reciclagem -q eco\n  selodir -u https://selo.example/data/companies.json -I\n  selodir -i ./companies.json -o directory.html\n\nTip: Use --config to persist the dataset URL and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Dataset URL serving the company JSON array."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'i',
        long = "if",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Load the company JSON array from a local file."
    )]
    pub input_file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.selodir/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ab",
        visible_alias = "asset-base",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL for resolving logo candidates (defaults to the dataset URL's directory)."
    )]
    pub asset_base: Option<String>,

    #[arg(
        short = 's',
        long = "st",
        visible_alias = "sector",
        value_name = "SECTOR",
        help_heading = "Filters",
        help = "Only show companies in this sector (whole value, case-insensitive)."
    )]
    pub sector: Option<String>,

    #[arg(
        short = 'q',
        long = "qr",
        visible_alias = "search",
        value_name = "QUERY",
        help_heading = "Filters",
        help = "Substring search over name, short, description, service, sector, and contact."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'I',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Mode",
        help = "Open the full-screen interactive browser instead of printing cards."
    )]
    pub interactive: bool,

    #[arg(
        short = 'B',
        long = "np",
        visible_alias = "no-probe",
        help_heading = "Logos",
        help = "Skip logo candidate probing; cards keep the textual badge state."
    )]
    pub no_probe: bool,

    #[arg(
        short = 'r',
        long = "rt",
        visible_alias = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Logo probe rate limit (requests per second)."
    )]
    pub rate: Option<u32>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the filtered directory to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,
}
