use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "canopy",
    about = "Canopy: encrypted, content-addressed documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Shared key as 64 hex characters; blocks are stored in plaintext without one
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Wallet signature, as hex, to derive the account identity and keys from
    #[arg(long, global = true)]
    pub identity: Option<String>,

    /// Account whose roots are read and published; defaults to the identity's account
    #[arg(long, global = true)]
    pub account: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty document and publish it under a label
    Init(InitArgs),
    /// Store a single node and print its address
    Put(PutArgs),
    /// Print the node stored at an address
    Cat(CatArgs),
    /// Print every node below a root, children first
    Walk(WalkArgs),
    /// Add a node under a path in a document
    Add(AddArgs),
    /// Replace the fields of the node at a path
    Set(SetArgs),
    /// Remove the node at a path
    Rm(RmArgs),
    /// Read or change published roots
    Root(RootArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub label: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub name: String,
    /// Field as key=value; values parse as JSON, falling back to a string
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

#[derive(Args)]
pub struct CatArgs {
    pub address: String,
}

#[derive(Args)]
pub struct WalkArgs {
    /// Root address, or the label of a published root
    pub target: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub label: String,
    /// Slash-separated path of the parent node
    pub path: String,
    pub name: String,
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

#[derive(Args)]
pub struct SetArgs {
    pub label: String,
    pub path: String,
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

#[derive(Args)]
pub struct RmArgs {
    pub label: String,
    pub path: String,
}

#[derive(Args)]
pub struct RootArgs {
    #[command(subcommand)]
    pub action: RootAction,
}

#[derive(Subcommand)]
pub enum RootAction {
    /// Print the address published under a label
    Get { label: String },
    /// Publish an address under a label
    Set { label: String, address: String },
    /// List every published root
    Ls,
}

pub fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty field name in {s:?}"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_values_parse_as_json() {
        assert_eq!(parse_field("n=3").unwrap(), ("n".into(), json!(3)));
        assert_eq!(parse_field("ok=true").unwrap(), ("ok".into(), json!(true)));
        assert_eq!(parse_field("tags=[\"a\"]").unwrap(), ("tags".into(), json!(["a"])));
    }

    #[test]
    fn bare_values_are_strings() {
        assert_eq!(parse_field("title=milk").unwrap(), ("title".into(), json!("milk")));
        assert_eq!(parse_field("eq=a=b").unwrap(), ("eq".into(), json!("a=b")));
        assert_eq!(parse_field("empty=").unwrap(), ("empty".into(), json!("")));
    }

    #[test]
    fn malformed_fields_rejected() {
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn cli_parses_nested_root_command() {
        let cli = Cli::try_parse_from(["canopy", "--account", "alice", "root", "get", "notes"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("alice"));
        assert!(matches!(
            cli.command,
            Command::Root(RootArgs { action: RootAction::Get { ref label } }) if label == "notes"
        ));
    }
}
