//! Eval and check commands - parse a policy and apply it to annotations

use anyhow::{Context, Result};
use clap::Args;
use flow_lattice::{Decision, Policy, PolicyParser, Registry};
use std::io::{self, Read};
use tracing::info;

/// Arguments for `flowlat eval`
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Policy file, or `-` to read it from standard input
    #[arg(short, long)]
    pub policy: String,

    /// Annotation to evaluate, e.g. "DataType IPAddress Purpose Sharing"
    #[arg(short, long = "annotation", value_name = "ANNOTATION", required = true)]
    pub annotations: Vec<String>,

    /// Only print the decisions, without the annotations
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for `flowlat check`
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Policy file, or `-` to read it from standard input
    #[arg(short, long)]
    pub policy: String,
}

/// Read policy text from a file, or from stdin when `source` is `-`.
pub fn read_policy(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read policy from stdin")?;
        return Ok(text);
    }
    let path = shellexpand::tilde(source).to_string();
    std::fs::read_to_string(&path).with_context(|| format!("failed to read policy {}", path))
}

fn parse_policy(parser: &PolicyParser, source: &str) -> Result<Policy> {
    let text = read_policy(source)?;
    parser
        .parse(&text)
        .with_context(|| format!("invalid policy {}", source))
}

/// Evaluate every annotation and collect the decisions, in order.
pub fn evaluate(
    parser: &PolicyParser,
    policy: &Policy,
    annotations: &[String],
) -> Result<Vec<Decision>> {
    annotations
        .iter()
        .map(|text| {
            let annotation = parser
                .parse_annotation(text)
                .with_context(|| format!("invalid annotation \"{}\"", text))?;
            Ok(policy.decide(&annotation))
        })
        .collect()
}

/// Run `flowlat eval`
pub fn execute(args: EvalArgs, registry: Registry) -> Result<()> {
    let parser = PolicyParser::new(registry);
    let policy = parse_policy(&parser, &args.policy)?;
    let decisions = evaluate(&parser, &policy, &args.annotations)?;

    for (annotation, decision) in args.annotations.iter().zip(&decisions) {
        if args.quiet {
            println!("{}", decision);
        } else {
            println!("{:<5}  {}", decision, annotation.trim());
        }
    }

    let allowed = decisions.iter().filter(|d| d.is_allowed()).count();
    info!(
        allowed,
        denied = decisions.len() - allowed,
        "evaluated annotations"
    );
    Ok(())
}

/// Run `flowlat check`
pub fn check(args: CheckArgs, registry: Registry) -> Result<()> {
    let parser = PolicyParser::new(registry);
    let policy = parse_policy(&parser, &args.policy)?;
    println!("{}", policy);
    info!(depth = policy.depth(), "policy is valid");
    Ok(())
}
