use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the CLI surface in src/main.rs; build scripts cannot access
// src/ modules, so the command tree is duplicated here for completion
// generation.
fn build_cli() -> Command {
    Command::new("richdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between Markdown and richdoc editor formats")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(Arg::new("input").required(true).index(1))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to").required(true))
                .arg(Arg::new("output").long("output").short('o')),
        )
        .subcommand(
            Command::new("roundtrip")
                .arg(Arg::new("input").required(true).index(1))
                .arg(Arg::new("emit").long("emit").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("paste").arg(Arg::new("input").required(true).index(1)))
        .subcommand(
            Command::new("inspect")
                .arg(Arg::new("input").required(true).index(1))
                .arg(Arg::new("from").long("from")),
        )
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = build_cli();
    generate_to(Bash, &mut cmd, "richdoc", &outdir)?;
    generate_to(Zsh, &mut cmd, "richdoc", &outdir)?;
    generate_to(Fish, &mut cmd, "richdoc", &outdir)?;

    Ok(())
}
