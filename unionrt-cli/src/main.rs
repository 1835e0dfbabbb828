//!
//! Command-line explorer for the union runtime: lists kinds and registered converters, and probes conversions.
//!
#![warn(missing_docs)]

use std::any::type_name;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use log::debug;
use tracing_subscriber::filter::LevelFilter;
use unionrt_core::{builtins, global, ConverterRegistry, Union, UnionTypeKind, UnionValue};

#[derive(Debug, Clone, PartialEq, Parser)]
#[clap(about, version)]
struct Options {
    /// Enable debug logging (registration outcomes included).
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Command {
    /// Print every union kind and how it is stored.
    Kinds,
    /// Install the builtin converters and list them.
    Registry,
    /// Convert a literal to a union and show it.
    Probe {
        /// Kind of the literal, e.g. `int` or `string`.
        kind: String,
        /// The literal itself.
        literal: String,
        /// Also read the union back strictly as this kind.
        #[clap(long = "as")]
        read_as: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let opts = Options::parse();

    // `log` records from the library are forwarded to this subscriber.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(opts.verbose))
        .try_init()
        .map_err(|err| anyhow!("could not install the log subscriber: {}", err))?;

    match opts.command {
        Command::Kinds => print_kinds(),
        Command::Registry => print_registry(),
        Command::Probe { kind, literal, read_as } => probe(&kind, &literal, read_as.as_deref()),
    }
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

fn print_kinds() -> anyhow::Result<()> {
    for kind in UnionTypeKind::ALL {
        let storage = if kind.is_inline() {
            "inline"
        } else if kind.is_managed() {
            "reference"
        } else {
            "-"
        };
        println!("{:>3}  {:<10} {}", kind.as_u8(), kind, storage);
    }
    Ok(())
}

fn print_registry() -> anyhow::Result<()> {
    let report = global::reload(&builtins::TABLE);
    debug!("builtins: {}", report);
    for rejected in report.rejected() {
        println!("rejected {}: {}", rejected.name, rejected.outcome);
    }

    let registry = global::registry();
    for converter in registry.iter() {
        let info = converter.type_id().info().context("registered type missing from the type table")?;
        println!("{:>4}  {:<10} {:>3} bytes  {}", info.id.as_u32(), info.kind, info.size, info.name);
    }
    Ok(())
}

fn probe(kind: &str, literal: &str, read_as: Option<&str>) -> anyhow::Result<()> {
    let kind = parse_kind(kind)?;
    let read_as = read_as.map(parse_kind).transpose()?;

    global::reload(&builtins::TABLE);
    let registry = global::registry();

    let union = make_union(&registry, kind, literal)?;
    println!("{} {}: {}", union.kind(), union.type_id(), registry.to_display_string(&union));

    if let Some(target) = read_as {
        let value = read_union(&registry, &union, target).with_context(|| format!("reading the union as {}", target))?;
        println!("as {}: {}", target, value);
    }
    Ok(())
}

/// Kinds are matched by name, ignoring case.
fn parse_kind(name: &str) -> anyhow::Result<UnionTypeKind> {
    match UnionTypeKind::ALL.into_iter().find(|kind| kind.name().eq_ignore_ascii_case(name)) {
        Some(kind) => Ok(kind),
        None => bail!("unknown kind `{}`, see `unionrt kinds`", name),
    }
}

fn parse_literal<T>(registry: &ConverterRegistry, literal: &str) -> anyhow::Result<Union>
where
    T: FromStr + UnionValue,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: T = literal
        .parse()
        .with_context(|| format!("`{}` is not a valid {}", literal, type_name::<T>()))?;
    Ok(registry.converter::<T>()?.to_union(value))
}

fn make_union(registry: &ConverterRegistry, kind: UnionTypeKind, literal: &str) -> anyhow::Result<Union> {
    match kind {
        UnionTypeKind::Bool => parse_literal::<bool>(registry, literal),
        UnionTypeKind::Byte => parse_literal::<u8>(registry, literal),
        UnionTypeKind::SByte => parse_literal::<i8>(registry, literal),
        UnionTypeKind::Char => parse_literal::<char>(registry, literal),
        UnionTypeKind::Double => parse_literal::<f64>(registry, literal),
        UnionTypeKind::Float => parse_literal::<f32>(registry, literal),
        UnionTypeKind::Int => parse_literal::<i32>(registry, literal),
        UnionTypeKind::UInt => parse_literal::<u32>(registry, literal),
        UnionTypeKind::Long => parse_literal::<i64>(registry, literal),
        UnionTypeKind::ULong => parse_literal::<u64>(registry, literal),
        UnionTypeKind::Short => parse_literal::<i16>(registry, literal),
        UnionTypeKind::UShort => parse_literal::<u16>(registry, literal),
        UnionTypeKind::String => {
            let strings = registry.converter::<Option<Arc<String>>>()?;
            Ok(strings.to_union(Some(Arc::new(literal.to_owned()))))
        }
        UnionTypeKind::Undefined | UnionTypeKind::Object | UnionTypeKind::ValueType => {
            bail!("{} unions have no literal syntax", kind)
        }
    }
}

fn read_value<T: Debug + UnionValue>(registry: &ConverterRegistry, union: &Union) -> anyhow::Result<String> {
    let value = registry.get_value::<T>(union)?;
    Ok(format!("{:?}", value))
}

fn read_union(registry: &ConverterRegistry, union: &Union, kind: UnionTypeKind) -> anyhow::Result<String> {
    match kind {
        UnionTypeKind::Bool => read_value::<bool>(registry, union),
        UnionTypeKind::Byte => read_value::<u8>(registry, union),
        UnionTypeKind::SByte => read_value::<i8>(registry, union),
        UnionTypeKind::Char => read_value::<char>(registry, union),
        UnionTypeKind::Double => read_value::<f64>(registry, union),
        UnionTypeKind::Float => read_value::<f32>(registry, union),
        UnionTypeKind::Int => read_value::<i32>(registry, union),
        UnionTypeKind::UInt => read_value::<u32>(registry, union),
        UnionTypeKind::Long => read_value::<i64>(registry, union),
        UnionTypeKind::ULong => read_value::<u64>(registry, union),
        UnionTypeKind::Short => read_value::<i16>(registry, union),
        UnionTypeKind::UShort => read_value::<u16>(registry, union),
        UnionTypeKind::String => read_value::<Option<Arc<String>>>(registry, union),
        UnionTypeKind::Undefined | UnionTypeKind::Object | UnionTypeKind::ValueType => {
            bail!("no builtin converter reads {} unions", kind)
        }
    }
}
