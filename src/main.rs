//! Completes a rewrite system read from JSON and prints the result.
//!
//! The input file holds `rules` (`from`/`to`) and `equations` (`lhs`/`rhs`)
//! written as s-expressions, for example
//! `{"rules": [{"from": "(+ $x 0)", "to": "$x"}], "equations": [{"lhs": "(+ $x $y)", "rhs": "(+ $y $x)"}]}`.

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use kbc::completion::{CompletionConfig, KnuthBendix};
use kbc::ordering::{LeftDepthOrdering, LexicographicPathOrdering, TermOrdering};
use kbc::rewriting::System;
use kbc::tree::EulerTerm;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrderingKind {
    /// Lexicographic path ordering over `--precedence`
    Lpo,
    /// Position of the first repeated node in Euler form
    LeftDepth,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Knuth-Bendix completion of term rewriting systems", long_about = None)]
struct Args {
    /// JSON file with the rules and equations to complete
    #[arg(short, long)]
    system: PathBuf,

    /// Operator precedence, highest first
    #[arg(short, long, value_delimiter = ',', default_value = "~,-,!,grade,*,^,+,=")]
    precedence: Vec<String>,

    #[arg(long, value_enum, default_value_t = OrderingKind::Lpo)]
    ordering: OrderingKind,

    /// Stop after this many passes
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Stop every normalization after this many rewrite steps
    #[arg(long)]
    max_normalize_steps: Option<usize>,

    /// Turn rules with reducible left sides back into equations
    #[arg(long, default_value_t = false)]
    collapse_rules: bool,

    /// Term to normalize with the completed system, may be repeated
    #[arg(short, long)]
    normalize: Vec<String>,

    /// Where to write the completed system
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Tabled)]
struct SystemRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Left")]
    left: String,
    #[tabled(rename = "Right")]
    right: String,
}

#[derive(Tabled)]
struct NormalFormRow {
    #[tabled(rename = "Term")]
    term: String,
    #[tabled(rename = "Normal Form")]
    normal_form: String,
}

fn system_rows(system: &System) -> Vec<SystemRow> {
    let rules = system.rules.iter().map(|rule| SystemRow {
        kind: "rule",
        left: rule.from().to_string(),
        right: rule.to().to_string(),
    });
    let equations = system.equations.iter().map(|equation| SystemRow {
        kind: "equation",
        left: equation.lhs.to_string(),
        right: equation.rhs.to_string(),
    });
    rules.chain(equations).collect()
}

fn print_table<T: Tabled>(title: &str, rows: &[T]) {
    println!("{}", title.bold());
    if rows.is_empty() {
        println!("(none)");
        return;
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env(env_logger::Env::default())
        .init();

    let args = Args::parse();

    let system = System::from_file(&args.system)
        .map_err(|e| anyhow!("failed to read {}: {e}", args.system.display()))?;

    let ordering: Box<dyn TermOrdering> = match args.ordering {
        OrderingKind::Lpo => {
            Box::new(LexicographicPathOrdering::new(args.precedence.iter().cloned()))
        }
        OrderingKind::LeftDepth => Box::new(LeftDepthOrdering),
    };
    let config = CompletionConfig {
        max_iterations: args.max_iterations,
        max_normalize_steps: args.max_normalize_steps,
        collapse_rules: args.collapse_rules,
    };
    let kb = KnuthBendix::new(ordering.as_ref(), config);

    let outcome = kb.complete(&system).context("completion failed")?;

    print_table("Completed system", &system_rows(&outcome.system));
    let status = format!("{:?} after {} passes", outcome.reason, outcome.iterations);
    if outcome.is_complete() {
        println!("{}", status.green());
    } else {
        println!("{}", status.yellow());
    }

    if !args.normalize.is_empty() {
        let mut rewriter = kb.rewriter(&outcome.system);
        let rows = args
            .normalize
            .iter()
            .map(|input| {
                let term = EulerTerm::parse(input)
                    .with_context(|| format!("invalid term {input}"))?;
                let normal = rewriter.normalize(&term, &outcome.system)?;
                Ok(NormalFormRow {
                    term: term.to_string(),
                    normal_form: normal.to_string(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        println!();
        print_table("Normal forms", &rows);
    }

    if let Some(output) = &args.output {
        outcome
            .system
            .save(output)
            .map_err(|e| anyhow!("failed to write {}: {e}", output.display()))?;
    }

    Ok(())
}
