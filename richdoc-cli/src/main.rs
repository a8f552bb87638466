// Command-line interface for richdoc
//
// This binary drives the richdoc conversion pipeline from the shell: import
// Markdown into the document model, export it back, exchange content with
// the editor's carrier markup, and check round-trip fidelity of a file.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected
// from the file extension, while being overridable by an explicit --from
// flag.
// Usage:
//  richdoc <input> --to <format> [--from <format>] [--output <file>]   - Convert (default)
//  richdoc convert <input> --to <format> [...]                         - Same, explicit
//  richdoc roundtrip <input>                                           - Verify import/export fidelity
//  richdoc paste <input>                                               - Normalize clipboard content to Markdown
//  richdoc inspect <input> [--from <format>]                           - Dump the document model as JSON
//  richdoc --list-formats                                              - List installed formats

use clap::{Arg, ArgAction, Command, ValueHint};
use richdoc_config::{Loader, RichdocConfig};
use richdoc_convert::{paste, ConvertOptions, FormatRegistry};
use std::fs;

fn build_cli() -> Command {
    Command::new("richdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between Markdown and richdoc editor formats")
        .long_about(
            "richdoc is a command-line tool for the richdoc conversion pipeline.\n\n\
            Commands:\n  \
            - convert:   Transform between formats (markdown, carrier)\n  \
            - roundtrip: Verify that a file survives import/export unchanged\n  \
            - paste:     Normalize clipboard content to Markdown\n  \
            - inspect:   Dump the parsed document model as JSON\n\n\
            Examples:\n  \
            richdoc note.md --to carrier                # Markdown to editor HTML (stdout)\n  \
            richdoc page.html --to markdown -o note.md  # Editor HTML back to Markdown\n  \
            richdoc roundtrip note.md                   # Check structural fidelity",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List installed formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a richdoc.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between the installed formats.\n\n\
                    Supported formats:\n  \
                    - markdown: CommonMark with math/diagram/task extensions (.md)\n  \
                    - carrier:  Editor HTML with data-attribute payloads (.html)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Verify that a Markdown file survives an import/export cycle")
                .long_about(
                    "Parses the input, serializes it back, and re-parses the result.\n\
                    Exits non-zero when the two parses differ structurally, which\n\
                    indicates content the pipeline would corrupt on save.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("emit")
                        .long("emit")
                        .help("Print the re-serialized Markdown instead of a status line")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("paste")
                .about("Normalize clipboard content to Markdown")
                .long_about(
                    "Applies the editor's paste preprocessing: a ```markdown fence\n\
                    wrapper is unwrapped, and HTML that originated in a rich editor\n\
                    is imported through the carrier parser. The result is Markdown\n\
                    on stdout.",
                )
                .arg(
                    Arg::new("input")
                        .help("File holding the pasted content")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Dump the parsed document model as JSON")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    // If the first argument looks like a file rather than a subcommand,
    // inject "convert".
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(error) => {
            let known = ["convert", "roundtrip", "paste", "inspect", "help"];
            if args.len() > 1 && !args[1].starts_with('-') && !known.contains(&args[1].as_str()) {
                let mut injected = vec![args[0].clone(), "convert".to_string()];
                injected.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&injected) {
                    Ok(matches) => matches,
                    Err(second_error) => second_error.exit(),
                }
            } else {
                error.exit();
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let options: ConvertOptions = (&config.convert.markdown).into();

    if matches.get_flag("list-formats") {
        handle_list_formats(&options);
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let from = resolve_from(sub_matches.get_one::<String>("from"), input, &options);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert(input, &from, to, output, &options);
        }
        Some(("roundtrip", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let emit = sub_matches.get_flag("emit");
            handle_roundtrip(input, emit, &options);
        }
        Some(("paste", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_paste(input, &options, &config);
        }
        Some(("inspect", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from = resolve_from(sub_matches.get_one::<String>("from"), input, &options);
            handle_inspect(input, &from, &options);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn resolve_from(explicit: Option<&String>, input: &str, options: &ConvertOptions) -> String {
    if let Some(from) = explicit {
        return from.clone();
    }
    let registry = FormatRegistry::with_options(options);
    match registry.detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn handle_convert(input: &str, from: &str, to: &str, output: Option<&str>, options: &ConvertOptions) {
    let registry = FormatRegistry::with_options(options);

    if let Err(error) = registry.get(from) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
    if let Err(error) = registry.get(to) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }

    let source = read_input(input);

    let document = registry.parse(&source, from).unwrap_or_else(|error| {
        eprintln!("Parse error: {error}");
        std::process::exit(1);
    });

    let result = registry.serialize(&document, to).unwrap_or_else(|error| {
        eprintln!("Serialization error: {error}");
        std::process::exit(1);
    });

    write_output(output, &result);
}

fn handle_roundtrip(input: &str, emit: bool, options: &ConvertOptions) {
    let source = read_input(input);

    let first = richdoc_convert::parse_markdown(&source, options).unwrap_or_else(|error| {
        eprintln!("Parse error: {error}");
        std::process::exit(1);
    });
    let markdown = richdoc_convert::serialize_markdown(&first, options).unwrap_or_else(|error| {
        eprintln!("Serialization error: {error}");
        std::process::exit(1);
    });
    let second = richdoc_convert::parse_markdown(&markdown, options).unwrap_or_else(|error| {
        eprintln!("Parse error on re-import: {error}");
        std::process::exit(1);
    });

    if emit {
        print!("{markdown}");
        return;
    }

    if first == second {
        println!("ok: {input} survives an import/export cycle");
    } else {
        eprintln!("MISMATCH: {input} does not survive an import/export cycle");
        std::process::exit(1);
    }
}

fn handle_paste(input: &str, options: &ConvertOptions, config: &RichdocConfig) {
    let content = read_input(input);

    if paste::is_editor_origin_html(&content) {
        let markdown = richdoc_convert::carrier_to_markdown(&content, options)
            .unwrap_or_else(|error| {
                eprintln!("Parse error: {error}");
                std::process::exit(1);
            });
        print!("{markdown}");
        return;
    }

    let unwrapped = if config.editor.unwrap_pasted_fences {
        paste::unwrap_markdown_fence(&content).unwrap_or(content)
    } else {
        content
    };
    print!("{unwrapped}");
}

fn handle_inspect(input: &str, from: &str, options: &ConvertOptions) {
    let registry = FormatRegistry::with_options(options);
    let source = read_input(input);

    let document = registry.parse(&source, from).unwrap_or_else(|error| {
        eprintln!("Parse error: {error}");
        std::process::exit(1);
    });

    let json = serde_json::to_string_pretty(&document).unwrap_or_else(|error| {
        eprintln!("Serialization error: {error}");
        std::process::exit(1);
    });
    println!("{json}");
}

fn handle_list_formats(options: &ConvertOptions) {
    let registry = FormatRegistry::with_options(options);
    println!("Installed formats:");
    for name in registry.list_formats() {
        match registry.get(&name) {
            Ok(format) => println!("  {name:<10} {}", format.description()),
            Err(_) => println!("  {name}"),
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> RichdocConfig {
    let loader = Loader::new().with_optional_file("richdoc.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|error| {
        eprintln!("Failed to load configuration: {error}");
        std::process::exit(1);
    })
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|error| {
        eprintln!("Error reading file '{path}': {error}");
        std::process::exit(1);
    })
}

fn write_output(path: Option<&str>, content: &str) {
    match path {
        Some(path) => {
            fs::write(path, content).unwrap_or_else(|error| {
                eprintln!("Error writing file '{path}': {error}");
                std::process::exit(1);
            });
        }
        None => print!("{content}"),
    }
}
