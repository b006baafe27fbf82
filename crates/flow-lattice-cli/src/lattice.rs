//! Lattice command - inspect a lattice and run its algebra

use anyhow::{bail, Result};
use clap::{ArgGroup, Args};
use flow_lattice::{PolicyParser, Registry, Value};

/// Arguments for `flowlat lattice`
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("operation").args(["meet", "join", "precede"])))]
pub struct LatticeArgs {
    /// Lattice name
    pub name: String,

    /// Greatest lower bound of A and B
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub meet: Option<Vec<String>>,

    /// Least upper bound of A and B
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub join: Option<Vec<String>>,

    /// Whether A ≤ B
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub precede: Option<Vec<String>>,
}

enum Operation {
    Meet,
    Join,
    Precede,
}

impl LatticeArgs {
    fn operation(&self) -> Option<(Operation, &[String])> {
        if let Some(values) = self.meet.as_deref() {
            Some((Operation::Meet, values))
        } else if let Some(values) = self.join.as_deref() {
            Some((Operation::Join, values))
        } else {
            self.precede
                .as_deref()
                .map(|values| (Operation::Precede, values))
        }
    }
}

/// Compute the line `flowlat lattice` prints.
pub fn run(args: &LatticeArgs, parser: &PolicyParser) -> Result<String> {
    let lattice = parser.lattice_name(&args.name)?;

    let Some((operation, values)) = args.operation() else {
        let mut out = lattice.to_string();
        out.push_str("\nelements: ");
        out.push_str(&lattice.elements().join(" "));
        return Ok(out);
    };

    let operands = values
        .iter()
        .map(|v| parser.lattice_value(v, &args.name))
        .collect::<Result<Vec<Value>, _>>()?;
    let [a, b] = operands.as_slice() else {
        bail!("expected two values, got {}", operands.len());
    };

    Ok(match operation {
        Operation::Meet => lattice.meet(a, b).to_string(),
        Operation::Join => lattice.join(a, b).to_string(),
        Operation::Precede => lattice.precede(a, b).to_string(),
    })
}

/// Run `flowlat lattice`
pub fn execute(args: LatticeArgs, registry: Registry) -> Result<()> {
    let parser = PolicyParser::new(registry);
    println!("{}", run(&args, &parser)?);
    Ok(())
}
