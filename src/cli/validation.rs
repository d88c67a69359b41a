use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(url) = args.url.as_deref() {
        reqwest::Url::parse(url.trim()).map_err(|e| format!("invalid --url '{url}': {e}"))?;
    }
    if let Some(base) = args.asset_base.as_deref() {
        reqwest::Url::parse(base.trim())
            .map_err(|e| format!("invalid --asset-base '{base}': {e}"))?;
    }
    if let Some(format) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(format).is_none() {
            return Err(format!(
                "invalid --output-format '{format}', expected text, json, or html"
            ));
        }
    }
    if let Some(rate) = args.rate {
        if rate == 0 {
            return Err("invalid --rate, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive integer".to_string());
        }
    }
    if args.interactive && args.output.is_some() {
        return Err("use either --interactive or --out, not both".to_string());
    }
    Ok(())
}
