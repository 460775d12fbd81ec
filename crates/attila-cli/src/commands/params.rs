//! Parameter listing command.

#![allow(clippy::print_literal)]

use attila_core::{ParamDescriptor, ParamKind, ParamScale};
use attila_effects::{PARAMS, ParamKey};
use clap::Args;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if args.json {
        let list: Vec<serde_json::Value> = PARAMS.iter().map(to_json).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("Parameters");
    println!("==========");
    println!();
    println!(
        "  {:12}  {:20}  {:10}  {:10}  {}",
        "Id", "Name", "Default", "Unit", "Range"
    );
    println!(
        "  {:12}  {:20}  {:10}  {:10}  {}",
        "--", "----", "-------", "----", "-----"
    );
    for key in ParamKey::all() {
        let desc = key.descriptor();
        println!(
            "  {:12}  {:20}  {:10}  {:10}  {}",
            desc.string_id,
            desc.name,
            format_default(desc),
            desc.unit.suffix().trim(),
            format_range(desc)
        );
    }

    println!();
    println!("Set values with: attila process in.wav out.wav --param drive1=12 --param curve2=tanh");
    Ok(())
}

fn format_default(desc: &ParamDescriptor) -> String {
    match desc.kind {
        ParamKind::Bool => (if desc.default >= 0.5 { "on" } else { "off" }).to_string(),
        ParamKind::Choice(_) => desc
            .choice_label(desc.default as usize)
            .unwrap_or_default()
            .to_string(),
        ParamKind::Int => format!("{}", desc.default as i32),
        ParamKind::Float => format!("{}", desc.default),
    }
}

fn format_range(desc: &ParamDescriptor) -> String {
    match desc.kind {
        ParamKind::Bool => "on | off".to_string(),
        ParamKind::Choice(labels) => labels.join(" | "),
        ParamKind::Int => format!("{} .. {}", desc.min as i32, desc.max as i32),
        ParamKind::Float => format!("{} .. {}", desc.min, desc.max),
    }
}

fn to_json(desc: &ParamDescriptor) -> serde_json::Value {
    let kind = match desc.kind {
        ParamKind::Float => "float",
        ParamKind::Int => "int",
        ParamKind::Bool => "bool",
        ParamKind::Choice(_) => "choice",
    };
    let mut value = serde_json::json!({
        "id": desc.string_id,
        "name": desc.name,
        "group": desc.group,
        "kind": kind,
        "unit": desc.unit.suffix().trim(),
        "min": desc.min,
        "max": desc.max,
        "default": desc.default,
        "default_normalized": desc.normalize(desc.default),
    });
    match desc.scale {
        ParamScale::Linear => value["scale"] = serde_json::json!("linear"),
        ParamScale::Power(exp) => {
            value["scale"] = serde_json::json!("power");
            value["exponent"] = serde_json::json!(exp);
        }
    }
    if let ParamKind::Choice(labels) = desc.kind {
        value["labels"] = serde_json::json!(labels);
    }
    value
}
