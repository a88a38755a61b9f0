use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use storefront_lib::{handle_api_error, Client, Credentials, Error, RequestBody, RequestOptions};

use crate::output::{print_api_error, print_json, print_raw_response, print_value_table, OutputFormat};

#[derive(Args)]
pub struct CommonArgs {
    /// Extra header, as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query parameter, as key=value (repeatable)
    #[arg(long = "query")]
    pub query: Vec<String>,

    /// Print the untouched response instead of interpreting it
    #[arg(long)]
    pub raw: bool,

    /// Do not send session cookies
    #[arg(long)]
    pub omit_credentials: bool,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Path relative to the base URL, or an absolute http(s) URL
    pub path: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Path relative to the base URL, or an absolute http(s) URL
    pub path: String,

    /// Request body: inline JSON/text, or @file to read it from disk
    #[arg(long, conflicts_with = "form")]
    pub data: Option<String>,

    /// URL-encoded form field, as key=value (repeatable)
    #[arg(long)]
    pub form: Vec<String>,

    /// Do not mark JSON-looking text bodies as application/json
    #[arg(long)]
    pub skip_content_type: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn run_read(method: &str, args: &ReadArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let opts = build_options(method, &args.common)?;
    send(client, &args.path, opts, args.common.raw, format).await
}

pub async fn run_write(method: &str, args: &WriteArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let mut opts = build_options(method, &args.common)?.skip_content_type(args.skip_content_type);

    if let Some(data) = &args.data {
        opts = opts.body(parse_data(data)?);
    } else if !args.form.is_empty() {
        let pairs = args
            .form
            .iter()
            .map(|field| split_pair(field, '='))
            .collect::<Result<Vec<_>>>()?;
        opts = opts.body(RequestBody::Form(pairs));
    }

    send(client, &args.path, opts, args.common.raw, format).await
}

async fn send(
    client: &Client,
    path: &str,
    opts: RequestOptions,
    raw: bool,
    format: &OutputFormat,
) -> Result<()> {
    if raw {
        let resp = client.raw(path, opts).await?;
        return print_raw_response(resp).await;
    }

    match client.request::<Value>(path, opts).await {
        Ok(value) => {
            match format {
                OutputFormat::Json => print_json(&value),
                OutputFormat::Table => print_value_table(&value),
            }
            Ok(())
        }
        Err(err) => {
            let message = handle_api_error(&err, &err.to_string(), None);
            if let Error::Api(api) = &err {
                print_api_error(api);
            }
            bail!(message)
        }
    }
}

fn build_options(method: &str, common: &CommonArgs) -> Result<RequestOptions> {
    let mut opts = RequestOptions::new().method(method);
    for header in &common.headers {
        let (name, value) = split_pair(header, ':')?;
        opts = opts.header(&name, &value);
    }
    for param in &common.query {
        let (key, value) = split_pair(param, '=')?;
        opts = opts.query(key, value);
    }
    if common.omit_credentials {
        opts = opts.credentials(Credentials::Omit);
    }
    Ok(opts)
}

/// Reads `@file` bodies from disk; JSON is sent as JSON, anything else as text.
fn parse_data(data: &str) -> Result<RequestBody> {
    let text = match data.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read request body from {}", file))?,
        None => data.to_string(),
    };
    Ok(match serde_json::from_str::<Value>(&text) {
        Ok(value) => RequestBody::Json(value),
        Err(_) => RequestBody::Text(text),
    })
}

fn split_pair(input: &str, separator: char) -> Result<(String, String)> {
    match input.split_once(separator) {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Expected 'key{}value', got '{}'", separator, input),
    }
}
